use {
    lexopt::{Arg, Parser},
    recur::{RecurrenceRule, Temporal},
};

use crate::args::{Configurable, Usage, parse_value};

/// One or more recurrence rules given as positional arguments.
///
/// When `single` is set, only the first positional argument is consumed,
/// so that later positional arguments are offered to other targets.
#[derive(Debug)]
pub struct Rules {
    rules: Vec<RecurrenceRule>,
    single: bool,
}

impl Rules {
    pub const USAGE: Usage = Usage::arg(
        "<rule>",
        "A recurrence rule, e.g., `FREQ=DAILY;COUNT=10`.",
        r#"
A recurrence rule, e.g., `FREQ=DAILY;COUNT=10`.

This is the value of an RFC 5545 RRULE property: a list of `NAME=VALUE` parts
separated by semicolons. `FREQ` is required. Part names and values are
case insensitive, and parts may be given in any order. Every BY rule may be
given, along with `INTERVAL`, `WKST` and one of `COUNT` or `UNTIL`.

Values of `UNTIL` may be dates (`19971224`), local datetimes
(`19971224T000000`) or UTC datetimes (`19971224T000000Z`). The extended
formats, like `1997-12-24T00:00:00Z`, are also accepted.
"#,
    );

    /// Accept exactly one rule.
    pub fn one() -> Rules {
        Rules { rules: vec![], single: true }
    }

    /// Accept one or more rules.
    pub fn many() -> Rules {
        Rules { rules: vec![], single: false }
    }

    /// Returns the rules given, or an error if there were none.
    pub fn get(&self) -> anyhow::Result<&[RecurrenceRule]> {
        anyhow::ensure!(!self.rules.is_empty(), "missing required <rule>");
        Ok(&self.rules)
    }

    /// Returns the first rule given, or an error if there were none.
    pub fn first(&self) -> anyhow::Result<&RecurrenceRule> {
        Ok(&self.get()?[0])
    }
}

impl Configurable for Rules {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        let Arg::Value(ref v) = *arg else { return Ok(false) };
        if self.single && !self.rules.is_empty() {
            return Ok(false);
        }
        let rule: RecurrenceRule = parse_value(v, "<rule>")?;
        self.rules.push(rule);
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        std::slice::from_ref(&Rules::USAGE)
    }
}

/// The value a recurrence starts from.
#[derive(Debug)]
pub struct Start {
    start: Option<Temporal>,
    required: bool,
}

impl Start {
    pub const USAGE: Usage = Usage::arg(
        "<start>",
        "The first occurrence, e.g., `1997-09-02T09:00[America/New_York]`.",
        r#"
The first occurrence, e.g., `1997-09-02T09:00[America/New_York]`.

The kind of this value determines the kind of every occurrence produced. It
may be a date (`2016-06-11`), a datetime without a time zone
(`1997-09-02T09:00`), a datetime with a time zone
(`1997-09-02T09:00[America/New_York]`) or a UTC datetime
(`19970902T130000Z`). The basic formats used by iCalendar, like
`19970902T090000`, are accepted too.

Date-only start values cannot be used with sub-daily frequencies or with
the `BYHOUR`, `BYMINUTE` and `BYSECOND` rules.
"#,
    );

    pub fn required() -> Start {
        Start { start: None, required: true }
    }

    pub fn optional() -> Start {
        Start { start: None, required: false }
    }

    /// Returns the start value, if one was given.
    ///
    /// This returns an error if a start value is required but missing.
    pub fn get(&self) -> anyhow::Result<Option<&Temporal>> {
        anyhow::ensure!(
            !self.required || self.start.is_some(),
            "missing required <start>",
        );
        Ok(self.start.as_ref())
    }
}

impl Configurable for Start {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        let Arg::Value(ref v) = *arg else { return Ok(false) };
        if self.start.is_some() {
            return Ok(false);
        }
        self.start = Some(parse_value(v, "<start>")?);
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        std::slice::from_ref(&Start::USAGE)
    }
}

#[cfg(test)]
mod tests {
    use crate::args::configure;

    use super::*;

    fn run(
        args: &[&str],
        rules: &mut Rules,
        start: &mut Start,
    ) -> anyhow::Result<()> {
        let mut p = Parser::from_args(args.iter().copied());
        configure(&mut p, "", &mut [rules, start])
    }

    #[test]
    fn rule_then_start() {
        let (mut rules, mut start) = (Rules::one(), Start::required());
        run(&["freq=daily;count=2", "2025-01-01"], &mut rules, &mut start)
            .unwrap();
        assert_eq!(rules.first().unwrap().to_string(), "FREQ=DAILY;COUNT=2");
        assert_eq!(
            start.get().unwrap(),
            Some(&"2025-01-01".parse::<Temporal>().unwrap()),
        );
    }

    #[test]
    fn missing() {
        let (mut rules, mut start) = (Rules::one(), Start::required());
        run(&[], &mut rules, &mut start).unwrap();
        insta::assert_snapshot!(
            rules.get().unwrap_err(),
            @"missing required <rule>",
        );
        insta::assert_snapshot!(
            start.get().unwrap_err(),
            @"missing required <start>",
        );

        let (mut rules, mut start) = (Rules::one(), Start::optional());
        run(&["FREQ=YEARLY"], &mut rules, &mut start).unwrap();
        assert_eq!(start.get().unwrap(), None);
    }

    #[test]
    fn invalid() {
        let (mut rules, mut start) = (Rules::many(), Start::optional());
        let err = run(&["FREQ=DAILY;BYHOUR=24"], &mut rules, &mut start)
            .unwrap_err();
        insta::assert_snapshot!(
            format!("{err:#}"),
            @r#"<rule>: invalid 'by hour' value `24` (values must be in range 0..=23)"#,
        );
    }
}

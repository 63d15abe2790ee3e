use std::io::Write;

use crate::{
    args::{
        self,
        positional::{Rules, Start},
    },
    style::Theme,
};

const USAGE: &'static str = r#"
Report likely mistakes in a recurrence rule.

Some rules are valid, but probably don't do what their author intended. For
example, RFC 5545 says that `BYWEEKNO` only applies at yearly frequency,
and `BYMONTHDAY=31` can never match in a rule with `BYMONTH=2`. Rules like
these are still expanded, but this command points them out.

When <start> is given, the rule is also checked against it. For example, an
`UNTIL` value should have the same kind as the start value.

Every problem is printed on its own line. If there are any problems, the
exit code is 1. Otherwise, `ok` is printed and the exit code is 0.

USAGE:
    recur check <rule> [<start>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Check a rule that asks for a day February doesn't have:

        $ recur check 'FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30'
        'by day of the month' value `30` can never occur in the selected months
        found 1 problem in `FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30`

REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut rules = Rules::one();
    let mut start = Start::optional();
    args::configure(p, USAGE, &mut [&mut rules, &mut start])?;

    let rule = rules.first()?;
    let problems = match start.get()? {
        None => rule.check(),
        Some(start) => rule.check_start(start),
    };
    let theme = Theme::stdout();
    let mut wtr = std::io::stdout().lock();
    if problems.is_empty() {
        writeln!(wtr, "{}", theme.ok("ok"))?;
        return Ok(());
    }
    for problem in problems.iter() {
        writeln!(wtr, "{}", theme.warning(problem))?;
    }
    wtr.flush()?;
    let noun = if problems.len() == 1 { "problem" } else { "problems" };
    anyhow::bail!("found {} {noun} in `{rule}`", problems.len())
}

// Rendering and parsing of recurrence rule value text, e.g.,
// `FREQ=MONTHLY;INTERVAL=2;BYDAY=-1SU`.
//
// The rendered form is canonical: parts always come in the same order and
// BY rule values are sorted. Parsing is more forgiving about case and part
// order, but otherwise rejects anything RFC 5545 doesn't define.

use std::{fmt::Write, str::FromStr};

use jiff::civil::Weekday;

use crate::{
    error::ParseError,
    rule::{ByRule, ByWeekday, Frequency, RecurrenceRule, Termination},
    temporal::Temporal,
};

impl std::fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "FREQ={}", self.frequency())?;
        if self.interval() != 1 {
            write!(f, ";INTERVAL={}", self.interval())?;
        }
        if let Some(weekday) = self.declared_week_start() {
            write!(f, ";WKST={}", weekday_code(weekday))?;
        }
        match *self.termination() {
            Termination::Unbounded => {}
            Termination::Count(count) => write!(f, ";COUNT={count}")?,
            Termination::Until(ref until) => {
                f.write_str(";UNTIL=")?;
                write_until(until, f)?;
            }
        }
        for by in self.by_rules() {
            write!(f, ";{by}")?;
        }
        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<RecurrenceRule, ParseError> {
        let mut seen: Vec<String> = vec![];
        let mut freq = None;
        let mut interval = None;
        let mut count = None;
        let mut until = None;
        let mut week_start = None;
        let mut by = vec![];
        for part in s.trim().split(';') {
            let part = part.trim();
            // Tolerate a trailing `;`.
            if part.is_empty() {
                continue;
            }
            let Some((name, value)) = part.split_once('=') else {
                return Err(ParseError::Malformed(part.to_string()));
            };
            let name = name.trim().to_ascii_uppercase();
            let value = value.trim();
            if seen.contains(&name) {
                return Err(ParseError::DuplicatePart(name));
            }
            match &*name {
                "FREQ" => freq = Some(value.parse::<Frequency>()?),
                "INTERVAL" => interval = Some(parse_int("INTERVAL", value)?),
                "COUNT" => count = Some(parse_int("COUNT", value)?),
                "UNTIL" => {
                    let t = value.parse::<Temporal>().map_err(|err| {
                        invalid("UNTIL", value, err.to_string())
                    })?;
                    until = Some(t);
                }
                "WKST" => week_start = Some(parse_weekday("WKST", value)?),
                "BYMONTH" => {
                    by.push(ByRule::Month(parse_ints("BYMONTH", value)?))
                }
                "BYWEEKNO" => {
                    by.push(ByRule::WeekNumber(parse_ints("BYWEEKNO", value)?))
                }
                "BYYEARDAY" => {
                    by.push(ByRule::YearDay(parse_ints("BYYEARDAY", value)?))
                }
                "BYMONTHDAY" => {
                    by.push(ByRule::MonthDay(parse_ints("BYMONTHDAY", value)?))
                }
                "BYDAY" => {
                    let weekdays = value
                        .split(',')
                        .map(|v| v.parse::<ByWeekday>())
                        .collect::<Result<_, _>>()?;
                    by.push(ByRule::Day(weekdays));
                }
                "BYHOUR" => {
                    by.push(ByRule::Hour(parse_ints("BYHOUR", value)?))
                }
                "BYMINUTE" => {
                    by.push(ByRule::Minute(parse_ints("BYMINUTE", value)?))
                }
                "BYSECOND" => {
                    by.push(ByRule::Second(parse_ints("BYSECOND", value)?))
                }
                "BYSETPOS" => {
                    let positions = parse_ints("BYSETPOS", value)?;
                    by.push(ByRule::SetPosition(positions))
                }
                _ => return Err(ParseError::UnknownPart(name)),
            }
            seen.push(name);
        }

        let freq = freq.ok_or(ParseError::MissingFrequency)?;
        let mut builder = RecurrenceRule::builder(freq);
        if let Some(interval) = interval {
            builder.interval(interval);
        }
        if let Some(count) = count {
            builder.count(count);
        }
        if let Some(until) = until {
            builder.until(until);
        }
        if let Some(weekday) = week_start {
            builder.week_start(weekday);
        }
        for rule in by {
            builder.by_rule(rule);
        }
        Ok(builder.build()?)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Frequency, ParseError> {
        use self::Frequency::*;

        let freq = match &*s.to_ascii_uppercase() {
            "YEARLY" => Yearly,
            "MONTHLY" => Monthly,
            "WEEKLY" => Weekly,
            "DAILY" => Daily,
            "HOURLY" => Hourly,
            "MINUTELY" => Minutely,
            "SECONDLY" => Secondly,
            _ => {
                return Err(invalid("FREQ", s, "unrecognized frequency"));
            }
        };
        Ok(freq)
    }
}

impl std::fmt::Display for ByRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        fn list<T: std::fmt::Display>(
            f: &mut std::fmt::Formatter,
            values: &[T],
        ) -> std::fmt::Result {
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{v}")?;
            }
            Ok(())
        }

        write!(f, "{}=", self.kind().as_str())?;
        match *self {
            ByRule::Month(ref v) => list(f, v),
            ByRule::WeekNumber(ref v) => list(f, v),
            ByRule::YearDay(ref v) => list(f, v),
            ByRule::MonthDay(ref v) => list(f, v),
            ByRule::Day(ref v) => list(f, v),
            ByRule::Hour(ref v) => list(f, v),
            ByRule::Minute(ref v) => list(f, v),
            ByRule::Second(ref v) => list(f, v),
            ByRule::SetPosition(ref v) => list(f, v),
        }
    }
}

impl std::fmt::Display for ByWeekday {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(nth) = self.nth() {
            write!(f, "{nth}")?;
        }
        f.write_str(weekday_code(self.weekday()))
    }
}

impl FromStr for ByWeekday {
    type Err = ParseError;

    /// Parses `MO`, `1MO`, `+1MO` or `-1MO`.
    fn from_str(s: &str) -> Result<ByWeekday, ParseError> {
        let s = s.trim();
        let split = s.len().saturating_sub(2);
        if !s.is_char_boundary(split) {
            return Err(invalid("BYDAY", s, "unrecognized weekday"));
        }
        let (nth, code) = s.split_at(split);
        let weekday = parse_weekday("BYDAY", code)?;
        if nth.is_empty() {
            return Ok(ByWeekday::Any(weekday));
        }
        let nth = nth.parse::<i8>().map_err(|err| {
            invalid("BYDAY", s, format!("invalid weekday number: {err}"))
        })?;
        Ok(ByWeekday::numbered(nth, weekday))
    }
}

/// Returns the two letter code RFC 5545 uses for a weekday.
pub(crate) fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "MO",
        Weekday::Tuesday => "TU",
        Weekday::Wednesday => "WE",
        Weekday::Thursday => "TH",
        Weekday::Friday => "FR",
        Weekday::Saturday => "SA",
        Weekday::Sunday => "SU",
    }
}

fn parse_weekday(
    part: &'static str,
    code: &str,
) -> Result<Weekday, ParseError> {
    let weekday = match &*code.to_ascii_uppercase() {
        "MO" => Weekday::Monday,
        "TU" => Weekday::Tuesday,
        "WE" => Weekday::Wednesday,
        "TH" => Weekday::Thursday,
        "FR" => Weekday::Friday,
        "SA" => Weekday::Saturday,
        "SU" => Weekday::Sunday,
        _ => return Err(invalid(part, code, "unrecognized weekday")),
    };
    Ok(weekday)
}

/// Writes the `UNTIL` form of a temporal value. Zoned values are written
/// in UTC.
fn write_until(
    until: &Temporal,
    f: &mut std::fmt::Formatter,
) -> std::fmt::Result {
    match *until {
        Temporal::Date(d) => write!(f, "{}", d.strftime("%Y%m%d")),
        Temporal::Local(dt) => write!(f, "{}", dt.strftime("%Y%m%dT%H%M%S")),
        Temporal::Zoned(ref zdt) => {
            write!(f, "{}", zdt.timestamp().strftime("%Y%m%dT%H%M%SZ"))
        }
    }
}

fn parse_int<T: FromStr<Err = std::num::ParseIntError>>(
    part: &'static str,
    value: &str,
) -> Result<T, ParseError> {
    value.parse().map_err(|err| invalid(part, value, format!("{err}")))
}

fn parse_ints<T: FromStr<Err = std::num::ParseIntError>>(
    part: &'static str,
    value: &str,
) -> Result<Box<[T]>, ParseError> {
    value.split(',').map(|v| parse_int(part, v.trim())).collect()
}

fn invalid(
    part: &'static str,
    value: &str,
    reason: impl Into<String>,
) -> ParseError {
    ParseError::InvalidValue {
        part,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday::*, date};

    use super::*;

    fn roundtrip(s: &str) -> String {
        s.parse::<RecurrenceRule>().unwrap().to_string()
    }

    fn parse_err(s: &str) -> String {
        match s.parse::<RecurrenceRule>() {
            Err(err) => err.to_string(),
            Ok(ok) => panic!("expected parse error, but got:\n{ok:?}"),
        }
    }

    #[test]
    fn canonical_is_stable() {
        for s in [
            "FREQ=DAILY;COUNT=10",
            "FREQ=DAILY;UNTIL=19971224T000000Z",
            "FREQ=DAILY;INTERVAL=10;COUNT=5",
            "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=MO,TU,WE,TH,FR,SA,SU",
            "FREQ=WEEKLY;INTERVAL=2;WKST=SU;COUNT=4;BYDAY=TU,SU",
            "FREQ=MONTHLY;COUNT=10;BYDAY=1FR",
            "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=SU,-1SU,1SU",
            "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
            "FREQ=MONTHLY;BYMONTHDAY=13;BYDAY=FR",
            "FREQ=MONTHLY;COUNT=3;BYDAY=TU,WE,TH;BYSETPOS=3",
            "FREQ=DAILY;UNTIL=20160611",
            "FREQ=HOURLY;UNTIL=20160611T120000;BYMINUTE=0,30",
            "FREQ=YEARLY;BYYEARDAY=-366,1,100",
        ] {
            assert_eq!(roundtrip(s), s);
        }
    }

    #[test]
    fn parse_is_forgiving() {
        insta::assert_snapshot!(
            roundtrip("byday=fr,+1mo ; freq=monthly;interval=1;"),
            @"FREQ=MONTHLY;BYDAY=FR,1MO",
        );
        insta::assert_snapshot!(
            roundtrip("FREQ=WEEKLY;BYDAY=0TU;BYMONTH=3,1,3"),
            @"FREQ=WEEKLY;BYMONTH=1,3;BYDAY=TU",
        );
        insta::assert_snapshot!(
            roundtrip("FREQ=DAILY;UNTIL=1997-12-24T00:00:00-05:00[America/New_York]"),
            @"FREQ=DAILY;UNTIL=19971224T050000Z",
        );
    }

    #[test]
    fn parsed_rule_matches_builder() {
        let parsed: RecurrenceRule =
            "FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU;BYHOUR=8,9;BYMINUTE=30"
                .parse()
                .unwrap();
        let built = RecurrenceRule::builder(Frequency::Yearly)
            .interval(2)
            .by_month(1)
            .by_week_day(Sunday)
            .by_hour([8, 9])
            .by_minute(30)
            .build()
            .unwrap();
        assert_eq!(parsed, built);

        let built = RecurrenceRule::builder(Frequency::Daily)
            .until(date(2016, 6, 11))
            .build()
            .unwrap();
        insta::assert_snapshot!(built, @"FREQ=DAILY;UNTIL=20160611");
    }

    #[test]
    fn errors() {
        insta::assert_snapshot!(
            parse_err("COUNT=10"),
            @"recurrence rule is missing the required `FREQ` part",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;COUNT"),
            @"recurrence rule part `COUNT` is not of the form `NAME=VALUE`",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;BYEASTER=1"),
            @"unrecognized recurrence rule part `BYEASTER`",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;freq=weekly"),
            @"recurrence rule part `FREQ` occurs more than once",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=FORTNIGHTLY"),
            @"invalid value `FORTNIGHTLY` for `FREQ`: unrecognized frequency",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;BYDAY=MO,XX"),
            @"invalid value `XX` for `BYDAY`: unrecognized weekday",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;BYDAY=1+MO"),
            @"invalid value `1+MO` for `BYDAY`: invalid weekday number: invalid digit found in string",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;BYHOUR=1,,2"),
            @"invalid value `` for `BYHOUR`: cannot parse integer from empty string",
        );
        insta::assert_snapshot!(
            parse_err("FREQ=DAILY;INTERVAL=0;BYMONTH=13"),
            @"interval value of `0` is invalid (interval must be greater than or equal to 1); invalid 'by month' value `13` (values must be in range 1..=12)",
        );
    }
}

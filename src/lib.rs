/*!
An RFC 5545 recurrence rule expansion engine.

Given a [`RecurrenceRule`] and a start value, this crate lazily produces the
occurrences of the rule, in order and without duplicates. Start values may
be dates, local (floating) datetimes or datetimes in a time zone, via
[`Temporal`]. All calendar and time zone arithmetic is done with
[`jiff`](https://docs.rs/jiff).

# Example

This finds the last Sunday of each month, starting in September 1997:

```
use recur::{RecurrenceRule, Temporal};

let rule: RecurrenceRule = "FREQ=MONTHLY;COUNT=3;BYDAY=-1SU".parse()?;
let start: Temporal = "1997-09-28T09:00[America/New_York]".parse()?;
let got: Vec<String> =
    rule.iter(&start)?.map(|t| t.to_string()).collect();
assert_eq!(got, vec![
    "1997-09-28T09:00:00-04:00[America/New_York]",
    "1997-10-26T09:00:00-05:00[America/New_York]",
    "1997-11-30T09:00:00-05:00[America/New_York]",
]);

# Ok::<(), Box<dyn std::error::Error>>(())
```

Rules can also be built directly:

```
use jiff::civil::{Weekday, date};
use recur::{Frequency, RecurrenceRule, Temporal};

let rule = RecurrenceRule::builder(Frequency::Weekly)
    .interval(2)
    .count(4)
    .by_week_day([Weekday::Tuesday, Weekday::Sunday])
    .week_start(Weekday::Sunday)
    .build()?;
assert_eq!(rule.to_string(), "FREQ=WEEKLY;INTERVAL=2;WKST=SU;COUNT=4;BYDAY=TU,SU");

let start = Temporal::Date(date(1997, 8, 5));
let got: Vec<String> =
    rule.iter(&start)?.map(|t| t.to_string()).collect();
assert_eq!(got, vec!["1997-08-05", "1997-08-17", "1997-08-19", "1997-08-31"]);

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Logging

This crate emits `log` messages at the `debug` and `trace` levels, but
never installs a logger itself.
*/

pub use crate::{
    error::{ConfigurationError, ParseError},
    iter::Occurrences,
    rule::{
        ByRule, ByRuleKind, ByWeekday, Frequency, IntoByWeekdayIter,
        IntoI8Iter, IntoI16Iter, IntoI32Iter, RecurrenceRule,
        RecurrenceRuleBuilder, Termination,
    },
    temporal::{Temporal, TemporalKind},
};

mod error;
mod expand;
mod iter;
mod rule;
mod temporal;
mod text;
mod weekdate;

use std::cmp::Ordering;

use jiff::{
    Span, ToSpan,
    civil::{Date, DateTime, Time, Weekday},
};

use crate::{
    rule::{ByRule, ByRuleKind, ByWeekday, Frequency, RecurrenceRule},
    temporal::{Frame, Temporal},
    weekdate::{WeekDate, first_of_week, last_of_week},
};

/// An infinite sequence of period seeds, one for each repetition of a rule.
///
/// Each seed is the first day of its period (the first of the year, the
/// first of the month or the first day of the week), carrying the time of
/// day of the anchor. For daily and finer frequencies, seeds are the anchor
/// plus some number of periods.
///
/// Aligning seeds to the start of their period means adding periods never
/// needs to "constrain" the day of the month. For example, adding one month
/// to 2025-01-31 gives 2025-02-28 in Jiff, but adding one month to
/// 2025-01-01 always gives 2025-02-01.
#[derive(Clone, Debug)]
pub(crate) struct PeriodSeeds {
    freq: Frequency,
    interval: i64,
    origin: DateTime,
    /// The index of the next seed to produce. When this is `None`, Jiff's
    /// supported range has been exhausted.
    index: Option<i64>,
}

impl PeriodSeeds {
    pub(crate) fn new(rule: &RecurrenceRule, anchor: DateTime) -> PeriodSeeds {
        let origin = match rule.frequency() {
            Frequency::Yearly => anchor.with().month(1).day(1).build().ok(),
            Frequency::Monthly => anchor.with().day(1).build().ok(),
            Frequency::Weekly => {
                first_of_week(rule.week_start(), anchor.date())
                    .map(|date| date.to_datetime(anchor.time()))
            }
            _ => Some(anchor),
        };
        PeriodSeeds {
            freq: rule.frequency(),
            interval: i64::from(rule.interval()),
            origin: origin.unwrap_or(anchor),
            index: origin.map(|_| 0),
        }
    }

    /// Moves ahead so that the next seed is the first one at or after `dt`.
    ///
    /// Seeds before the next one are never revisited. This only applies to
    /// sub-daily frequencies, where seeds are a fixed civil duration apart.
    pub(crate) fn skip_to(&mut self, dt: DateTime) {
        let unit: i128 = match self.freq {
            Frequency::Hourly => 3_600,
            Frequency::Minutely => 60,
            Frequency::Secondly => 1,
            _ => return,
        };
        let Some(index) = self.index else { return };
        let step = unit * i128::from(self.interval) * 1_000_000_000;
        let nanos = dt.duration_since(self.origin).as_nanos();
        // The index of the first seed at or after `dt`, rounding up.
        let Ok(target) = i64::try_from((nanos + step - 1).div_euclid(step))
        else {
            self.index = None;
            return;
        };
        self.index = Some(index.max(target));
    }

    /// Returns the earliest possible datetime in the period of `seed`.
    pub(crate) fn floor(&self, seed: DateTime) -> DateTime {
        let time = match self.freq {
            Frequency::Hourly => Time::new(seed.hour(), 0, 0, 0),
            Frequency::Minutely => Time::new(seed.hour(), seed.minute(), 0, 0),
            Frequency::Secondly => {
                Time::new(seed.hour(), seed.minute(), seed.second(), 0)
            }
            _ => Ok(Time::midnight()),
        };
        seed.date().to_datetime(time.unwrap_or(Time::midnight()))
    }
}

impl Iterator for PeriodSeeds {
    type Item = DateTime;

    fn next(&mut self) -> Option<DateTime> {
        let index = self.index?;
        // Each seed is computed from the origin instead of the previous
        // seed. It doesn't matter much for aligned periods, but it avoids
        // accumulating anything surprising.
        let seed = index
            .checked_mul(self.interval)
            .and_then(|n| periods(self.freq, n))
            .and_then(|span| self.origin.checked_add(span).ok());
        self.index = seed.and_then(|_| index.checked_add(1));
        seed
    }
}

impl std::iter::FusedIterator for PeriodSeeds {}

/// Returns a span of `n` periods of the given frequency.
fn periods(freq: Frequency, n: i64) -> Option<Span> {
    let span = Span::new();
    let result = match freq {
        Frequency::Yearly => span.try_years(n),
        Frequency::Monthly => span.try_months(n),
        Frequency::Weekly => span.try_weeks(n),
        Frequency::Daily => span.try_days(n),
        Frequency::Hourly => span.try_hours(n),
        Frequency::Minutely => span.try_minutes(n),
        Frequency::Secondly => span.try_seconds(n),
    };
    result.ok()
}

/// How finely the candidates of a period have been resolved so far.
///
/// Candidates start at the granularity of the frequency. So for a yearly
/// rule, the month and day of a candidate are meaningless until some BY
/// rule (or the anchor) picks them.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Granularity {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Granularity {
    fn of(freq: Frequency) -> Granularity {
        match freq {
            Frequency::Yearly => Granularity::Year,
            Frequency::Monthly => Granularity::Month,
            Frequency::Weekly => Granularity::Week,
            Frequency::Daily => Granularity::Day,
            Frequency::Hourly => Granularity::Hour,
            Frequency::Minutely => Granularity::Minute,
            Frequency::Secondly => Granularity::Second,
        }
    }

    /// Returns the field a BY rule inspects or sets.
    fn field(by: &ByRule) -> Granularity {
        match *by {
            ByRule::Month(_) => Granularity::Month,
            ByRule::WeekNumber(_) => Granularity::Week,
            ByRule::YearDay(_) | ByRule::MonthDay(_) | ByRule::Day(_) => {
                Granularity::Day
            }
            ByRule::Hour(_) => Granularity::Hour,
            ByRule::Minute(_) => Granularity::Minute,
            ByRule::Second(_) | ByRule::SetPosition(_) => Granularity::Second,
        }
    }

    /// Returns true when candidates at this granularity have a meaningful
    /// value for `field`.
    ///
    /// Weeks and months cut across one another, so a week doesn't know its
    /// month and a month doesn't know its week.
    fn determines(self, field: Granularity) -> bool {
        match self {
            Granularity::Year => false,
            Granularity::Month => field == Granularity::Month,
            Granularity::Week => field == Granularity::Week,
            _ => field <= self,
        }
    }
}

/// The candidates of a single period as they move through the BY rules.
#[derive(Debug)]
struct Candidates<'r> {
    set: Vec<DateTime>,
    marker: Granularity,
    /// Limits that couldn't be applied yet because the candidates weren't
    /// resolved finely enough.
    deferred: Vec<&'r ByRule>,
}

/// Expands a single period seed into the occurrences of that period.
#[derive(Clone, Debug)]
pub(crate) struct Expander {
    rule: RecurrenceRule,
    anchor: DateTime,
    frame: Frame,
}

impl Expander {
    pub(crate) fn new(rule: RecurrenceRule, start: &Temporal) -> Expander {
        let frame = Frame::of(start, rule.frequency());
        Expander { rule, anchor: start.datetime(), frame }
    }

    /// Returns every value generated by the rule in the period of `seed`,
    /// sorted and without duplicates.
    ///
    /// This may include values before the anchor. Filtering those is left
    /// to the caller, since BYSETPOS positions count them.
    pub(crate) fn expand(&self, seed: DateTime) -> Vec<Temporal> {
        let mut cands = Candidates {
            set: vec![seed],
            marker: Granularity::of(self.rule.frequency()),
            deferred: vec![],
        };
        for by in self.rule.by_rules() {
            if Granularity::field(by) > Granularity::Day {
                cands = self.settle(cands);
            }
            cands = self.apply(cands, by);
        }
        let cands = self.settle(cands);

        let mut civil = cands.set;
        civil.sort();
        civil.dedup();
        let mut set = Vec::with_capacity(civil.len());
        for dt in civil {
            self.frame.resolve(dt, &mut set);
        }
        // Resolving both instants of a fold can put one out of order.
        set.sort_by(|t1, t2| t1.partial_cmp(t2).unwrap_or(Ordering::Equal));
        set.dedup();

        if let Some(ByRule::SetPosition(positions)) =
            self.rule.get(ByRuleKind::SetPosition)
        {
            let len = set.len();
            set = set
                .into_iter()
                .enumerate()
                .filter(|&(i, _)| satisfies_set_pos(positions, i, len))
                .map(|(_, t)| t)
                .collect();
        }
        log::trace!("expanded {seed} into {} values", set.len());
        set
    }

    /// Returns false when no datetime on `date` can be an occurrence.
    ///
    /// At sub-daily frequencies, every BY rule on the month, week or day is
    /// a limit, so a day failing one of them can be skipped entirely.
    pub(crate) fn day_matches(&self, date: Date) -> bool {
        if self.rule.frequency() <= Frequency::Daily {
            return true;
        }
        let dt = date.to_datetime(Time::midnight());
        self.rule
            .by_rules()
            .iter()
            .filter(|by| Granularity::field(by) <= Granularity::Day)
            .all(|by| self.satisfies(by, dt))
    }

    /// Runs a single BY rule over the candidates.
    fn apply<'r>(
        &self,
        mut cands: Candidates<'r>,
        by: &'r ByRule,
    ) -> Candidates<'r> {
        let field = Granularity::field(by);
        if self.expands(by, cands.marker) {
            let mut set = vec![];
            for &dt in cands.set.iter() {
                self.expand_by(by, dt, cands.marker, &mut set);
            }
            cands.set = set;
            cands.marker = match *by {
                ByRule::Month(_) => Granularity::Month,
                _ => field.max(Granularity::Day),
            };
        } else if cands.marker.determines(field) {
            cands.set.retain(|&dt| self.satisfies(by, dt));
        } else {
            cands.deferred.push(by);
        }
        cands
    }

    /// Resolves candidates coarser than a day using the anchor, and then
    /// applies any deferred limits.
    fn settle<'r>(&self, mut cands: Candidates<'r>) -> Candidates<'r> {
        if cands.marker < Granularity::Day {
            let marker = cands.marker;
            cands.set = cands
                .set
                .into_iter()
                .filter_map(|dt| self.default_day(dt, marker))
                .collect();
            cands.marker = Granularity::Day;
        }
        for by in cands.deferred.drain(..) {
            cands.set.retain(|&dt| self.satisfies(by, dt));
        }
        cands
    }

    /// Returns true when `by` should generate new candidates instead of
    /// filtering existing ones.
    ///
    /// This follows the table of expansions and limits in RFC 5545. Rules
    /// that RFC 5545 calls "not applicable" at a frequency are limits.
    fn expands(&self, by: &ByRule, marker: Granularity) -> bool {
        use self::Frequency::*;

        let freq = self.rule.frequency();
        match *by {
            ByRule::Month(_) => marker == Granularity::Year,
            ByRule::WeekNumber(_) => {
                freq == Yearly && marker <= Granularity::Month
            }
            ByRule::YearDay(_) => freq == Yearly && marker < Granularity::Day,
            ByRule::MonthDay(_) => {
                matches!(freq, Yearly | Monthly) && marker < Granularity::Day
            }
            ByRule::Day(_) => {
                matches!(freq, Yearly | Monthly | Weekly)
                    && marker < Granularity::Day
            }
            ByRule::Hour(_) => marker < Granularity::Hour,
            ByRule::Minute(_) => marker < Granularity::Minute,
            ByRule::Second(_) => marker < Granularity::Second,
            // Positions are selected once the whole period is known.
            ByRule::SetPosition(_) => false,
        }
    }

    /// Pushes every datetime `by` generates from `dt` into `out`.
    ///
    /// The period generated within is the year, month or week of `dt`,
    /// according to `marker`.
    fn expand_by(
        &self,
        by: &ByRule,
        dt: DateTime,
        marker: Granularity,
        out: &mut Vec<DateTime>,
    ) {
        let wkst = self.rule.week_start();
        let Some(period) = Period::new(marker, wkst, dt.date()) else {
            return;
        };
        let at = |date: Date| date.to_datetime(dt.time());
        match *by {
            ByRule::Month(ref months) => {
                out.extend(
                    months
                        .iter()
                        .filter_map(|&m| {
                            dt.with().month(m).day(1).build().ok()
                        }),
                );
            }
            ByRule::WeekNumber(_) => {
                out.extend(
                    period
                        .days()
                        .filter(|&d| self.satisfies(by, at(d)))
                        .map(at),
                );
            }
            ByRule::YearDay(ref days) => {
                let days_in_year = dt.days_in_year();
                out.extend(
                    days.iter()
                        .filter_map(|&day| {
                            // Add 1 because -1 is the last day of the year,
                            // and the days of the year are 1-indexed.
                            let day = if day < 0 {
                                days_in_year + day + 1
                            } else {
                                day
                            };
                            dt.with().day_of_year(day).build().ok()
                        })
                        .filter(|d| period.contains(d.date())),
                );
            }
            ByRule::MonthDay(ref days) => {
                let months = match marker {
                    Granularity::Year => 1..=12,
                    _ => dt.month()..=dt.month(),
                };
                for month in months {
                    let Ok(first) = dt.with().month(month).day(1).build()
                    else {
                        continue;
                    };
                    let days_in_month = first.days_in_month();
                    out.extend(days.iter().filter_map(|&day| {
                        // Add 1 because -1 is the last day of month, and the
                        // days of the month are 1-indexed.
                        let day = if day < 0 {
                            days_in_month + day + 1
                        } else {
                            day
                        };
                        first.with().day(day).build().ok()
                    }));
                }
            }
            ByRule::Day(ref weekdays) => {
                for &bywd in weekdays.iter() {
                    match bywd {
                        ByWeekday::Any(weekday) => {
                            out.extend(period.weekdays(weekday).map(at));
                        }
                        ByWeekday::Numbered { nth, weekday } => {
                            let date = period.nth_weekday(nth, weekday);
                            out.extend(date.map(at));
                        }
                    }
                }
            }
            ByRule::Hour(ref hours) => {
                out.extend(
                    hours
                        .iter()
                        .filter_map(|&h| dt.with().hour(h).build().ok()),
                );
            }
            ByRule::Minute(ref minutes) => {
                out.extend(
                    minutes
                        .iter()
                        .filter_map(|&m| dt.with().minute(m).build().ok()),
                );
            }
            ByRule::Second(ref seconds) => {
                out.extend(
                    seconds
                        .iter()
                        .filter_map(|&s| dt.with().second(s).build().ok()),
                );
            }
            ByRule::SetPosition(_) => out.push(dt),
        }
    }

    /// Returns true if and only if `dt` is consistent with `by`.
    fn satisfies(&self, by: &ByRule, dt: DateTime) -> bool {
        match *by {
            ByRule::Month(ref months) => {
                months.binary_search(&dt.month()).is_ok()
            }
            ByRule::WeekNumber(ref weeks) => {
                let Some(wd) =
                    WeekDate::from_date(self.rule.week_start(), dt.date())
                else {
                    return false;
                };
                weeks.binary_search(&wd.week()).is_ok()
                    || weeks.binary_search(&wd.week_from_end()).is_ok()
            }
            ByRule::YearDay(ref days) => {
                let positive = dt.day_of_year();
                // Minus 1 because -1 is the last day of the year, and the
                // days of the year are 1-indexed.
                let negative = positive - 1 - dt.days_in_year();
                days.binary_search(&positive).is_ok()
                    || days.binary_search(&negative).is_ok()
            }
            ByRule::MonthDay(ref days) => {
                let positive = dt.day();
                let negative = positive - 1 - dt.days_in_month();
                days.binary_search(&positive).is_ok()
                    || days.binary_search(&negative).is_ok()
            }
            ByRule::Day(ref weekdays) => {
                let date = dt.date();
                weekdays.iter().any(|bywd| match *bywd {
                    ByWeekday::Any(weekday) => date.weekday() == weekday,
                    ByWeekday::Numbered { nth, weekday } => {
                        date.weekday() == weekday
                            && self.numbered_period(date).is_some_and(|p| {
                                p.nth_weekday(nth, weekday) == Some(date)
                            })
                    }
                })
            }
            ByRule::Hour(ref hours) => hours.binary_search(&dt.hour()).is_ok(),
            ByRule::Minute(ref minutes) => {
                minutes.binary_search(&dt.minute()).is_ok()
            }
            ByRule::Second(ref seconds) => {
                seconds.binary_search(&dt.second()).is_ok()
            }
            ByRule::SetPosition(_) => true,
        }
    }

    /// Picks a day for a candidate that no BY rule has resolved to a day.
    ///
    /// This uses the corresponding fields of the anchor. When that gives an
    /// invalid date (like February 30), there is no occurrence.
    fn default_day(
        &self,
        dt: DateTime,
        marker: Granularity,
    ) -> Option<DateTime> {
        match marker {
            Granularity::Year => dt
                .with()
                .month(self.anchor.month())
                .day(self.anchor.day())
                .build()
                .ok(),
            Granularity::Month => {
                dt.with().day(self.anchor.day()).build().ok()
            }
            Granularity::Week => {
                let wkst = self.rule.week_start();
                let start = first_of_week(wkst, dt.date())?;
                let offset = self.anchor.weekday().since(wkst);
                let date = start.checked_add(i32::from(offset).days()).ok()?;
                Some(date.to_datetime(dt.time()))
            }
            _ => Some(dt),
        }
    }

    /// Returns the period within which numbered weekdays are counted.
    fn numbered_period(&self, date: Date) -> Option<Period> {
        let marker = if self.rule.is_monthly_scope() {
            Granularity::Month
        } else {
            Granularity::Year
        };
        Period::new(marker, self.rule.week_start(), date)
    }
}

/// Returns true if and only if the given `position` in an ordered set of
/// length `len` is one of `positions`.
fn satisfies_set_pos(positions: &[i32], position: usize, len: usize) -> bool {
    let Ok(position) = i32::try_from(position) else { return false };
    let Ok(len) = i32::try_from(len) else { return false };
    let positive = position + 1;
    // Minus 1 because -1 is the last value of a set, and the positions of a
    // set are 1-indexed according to RFC 5545.
    let negative = positive - 1 - len;
    positions.binary_search(&positive).is_ok()
        || positions.binary_search(&negative).is_ok()
}

/// An inclusive range of dates making up a year, month or week.
#[derive(Clone, Copy, Debug)]
struct Period {
    start: Date,
    end: Date,
}

impl Period {
    fn new(marker: Granularity, wkst: Weekday, date: Date) -> Option<Period> {
        let (start, end) = match marker {
            Granularity::Year => (date.first_of_year(), date.last_of_year()),
            Granularity::Month => {
                (date.first_of_month(), date.last_of_month())
            }
            Granularity::Week => {
                (first_of_week(wkst, date)?, last_of_week(wkst, date)?)
            }
            _ => (date, date),
        };
        Some(Period { start, end })
    }

    fn contains(self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    fn days(self) -> impl Iterator<Item = Date> {
        self.start.series(1.day()).take_while(move |&d| d <= self.end)
    }

    /// Returns every date in this period falling on `weekday`.
    fn weekdays(self, weekday: Weekday) -> impl Iterator<Item = Date> {
        let ahead = weekday.since(self.start.weekday());
        self.start
            .checked_add(i32::from(ahead).days())
            .ok()
            .into_iter()
            .flat_map(|first| first.series(1.week()))
            .take_while(move |&d| d <= self.end)
    }

    /// Returns the `nth` date in this period falling on `weekday`.
    ///
    /// A positive `nth` counts from the start and a negative one from the
    /// end, with `1` and `-1` being the first and last.
    fn nth_weekday(self, nth: i8, weekday: Weekday) -> Option<Date> {
        let weeks = (i32::from(nth.unsigned_abs()) - 1) * 7;
        let date = if nth > 0 {
            let ahead = weekday.since(self.start.weekday());
            self.start.checked_add((i32::from(ahead) + weeks).days()).ok()?
        } else {
            let back = self.end.weekday().since(weekday);
            self.end.checked_sub((i32::from(back) + weeks).days()).ok()?
        };
        self.contains(date).then_some(date)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday::*, date};

    use super::*;

    fn seeds(rule: &RecurrenceRule, anchor: &str, n: usize) -> String {
        let anchor: DateTime = anchor.parse().unwrap();
        PeriodSeeds::new(rule, anchor)
            .take(n)
            .map(|dt| dt.to_string())
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn expand(rule: &RecurrenceRule, start: &str, seed: &str) -> String {
        let start: Temporal = start.parse().unwrap();
        let seed: DateTime = seed.parse().unwrap();
        Expander::new(rule.clone(), &start)
            .expand(seed)
            .into_iter()
            .map(|t| t.to_string())
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn seeds_are_period_aligned() {
        let rule = RecurrenceRule::builder(Frequency::Monthly)
            .interval(5)
            .build()
            .unwrap();
        insta::assert_snapshot!(seeds(&rule, "2025-01-31T09:00", 4), @r"
        2025-01-01T09:00:00
        2025-06-01T09:00:00
        2025-11-01T09:00:00
        2026-04-01T09:00:00
        ");

        let rule = RecurrenceRule::builder(Frequency::Weekly)
            .week_start(Sunday)
            .build()
            .unwrap();
        insta::assert_snapshot!(seeds(&rule, "1997-08-05T09:00", 2), @r"
        1997-08-03T09:00:00
        1997-08-10T09:00:00
        ");

        let rule = RecurrenceRule::builder(Frequency::Hourly)
            .interval(7)
            .build()
            .unwrap();
        insta::assert_snapshot!(seeds(&rule, "2025-01-31T21:30", 3), @r"
        2025-01-31T21:30:00
        2025-02-01T04:30:00
        2025-02-01T11:30:00
        ");
    }

    #[test]
    fn seeds_stop_at_range_limit() {
        let rule = RecurrenceRule::builder(Frequency::Yearly).build().unwrap();
        let anchor = date(9998, 6, 1).at(0, 0, 0, 0);
        assert_eq!(PeriodSeeds::new(&rule, anchor).count(), 2);
    }

    #[test]
    fn floor() {
        let rule = RecurrenceRule::builder(Frequency::Minutely).build().unwrap();
        let seeds = PeriodSeeds::new(&rule, date(2025, 1, 1).at(0, 0, 0, 0));
        assert_eq!(
            seeds.floor(date(2025, 3, 4).at(5, 6, 7, 8)),
            date(2025, 3, 4).at(5, 6, 0, 0),
        );
        let rule = RecurrenceRule::builder(Frequency::Yearly).build().unwrap();
        let seeds = PeriodSeeds::new(&rule, date(2025, 1, 1).at(0, 0, 0, 0));
        assert_eq!(
            seeds.floor(date(2025, 1, 1).at(9, 0, 0, 0)),
            date(2025, 1, 1).at(0, 0, 0, 0),
        );
    }

    #[test]
    fn yearly_defaults_to_anchor_day() {
        let rule = RecurrenceRule::builder(Frequency::Yearly).build().unwrap();
        insta::assert_snapshot!(
            expand(&rule, "2024-02-29", "2025-01-01T00:00"),
            @"",
        );
        insta::assert_snapshot!(
            expand(&rule, "2024-02-29", "2028-01-01T00:00"),
            @"2028-02-29",
        );
    }

    #[test]
    fn month_days_never_wrap() {
        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_month_day(30)
            .build()
            .unwrap();
        let got = expand(&rule, "2025-01-30", "2025-01-01T00:00");
        assert_eq!(got.lines().count(), 11);
        assert!(!got.contains("-02-"));
    }

    #[test]
    fn weekly_with_deferred_month_limit() {
        // BYMONTH can't limit a week before the week is resolved to days.
        let rule = RecurrenceRule::builder(Frequency::Weekly)
            .by_month(2)
            .by_week_day([Monday, Sunday])
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "2025-01-27T10:00", "2025-01-27T10:00"),
            @"2025-02-02T10:00:00",
        );
    }

    #[test]
    fn numbered_weekdays_in_year_and_month() {
        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_week_day([(20, Monday), (-1, Friday)])
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "1997-01-01T09:00", "1997-01-01T09:00"),
            @r"
        1997-05-19T09:00:00
        1997-12-26T09:00:00
        ",
        );

        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_month(3)
            .by_week_day((-1, Sunday))
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "2025-01-01", "2025-01-01T00:00"),
            @"2025-03-30",
        );

        // As a limit, the ordinal is still relative to the month.
        let rule = RecurrenceRule::builder(Frequency::Monthly)
            .by_month_day(8..=14)
            .by_week_day((2, Tuesday))
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "2025-01-01", "2025-04-01T00:00"),
            @"2025-04-08",
        );
    }

    #[test]
    fn week_numbers() {
        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_week(20)
            .by_week_day(Monday)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "1997-05-12T09:00", "1997-01-01T09:00"),
            @"1997-05-12T09:00:00",
        );

        // Days of the calendar year in week 1 of the next week year count.
        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_week(1)
            .by_week_day(Tuesday)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "2019-01-01", "2019-01-01T00:00"),
            @r"
        2019-01-01
        2019-12-31
        ",
        );

        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_week(-1)
            .by_week_day([Monday, Sunday])
            .build()
            .unwrap();
        // The Sunday of the last week of 2020 is in 2021.
        insta::assert_snapshot!(
            expand(&rule, "2020-01-01", "2020-01-01T00:00"),
            @"2020-12-28",
        );
    }

    #[test]
    fn set_positions() {
        let rule = RecurrenceRule::builder(Frequency::Monthly)
            .by_week_day([Monday, Tuesday, Wednesday, Thursday, Friday])
            .by_set_position([-1, 1, 40])
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, "1997-09-29T09:00", "1997-09-01T09:00"),
            @r"
        1997-09-01T09:00:00
        1997-09-30T09:00:00
        ",
        );
    }

    #[test]
    fn skip_seeds_to_day() {
        let rule = RecurrenceRule::builder(Frequency::Hourly)
            .interval(7)
            .build()
            .unwrap();
        let anchor: DateTime = "2025-01-31T21:30".parse().unwrap();
        let mut seeds = PeriodSeeds::new(&rule, anchor);
        seeds.skip_to("2025-02-03T00:00".parse().unwrap());
        insta::assert_snapshot!(seeds.next().unwrap(), @"2025-02-03T05:30:00");
        // Skipping backwards does nothing.
        seeds.skip_to("2025-01-01T00:00".parse().unwrap());
        insta::assert_snapshot!(seeds.next().unwrap(), @"2025-02-03T12:30:00");
    }

    #[test]
    fn time_zone_gaps_and_folds() {
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .by_hour([1, 2])
            .by_minute(30)
            .build()
            .unwrap();
        let start = "2024-03-01T01:30[America/New_York]";
        insta::assert_snapshot!(
            expand(&rule, start, "2024-03-10T01:30"),
            @"2024-03-10T01:30:00-05:00[America/New_York]",
        );
        insta::assert_snapshot!(
            expand(&rule, start, "2024-11-03T01:30"),
            @r"
        2024-11-03T01:30:00-04:00[America/New_York]
        2024-11-03T02:30:00-05:00[America/New_York]
        ",
        );

        let rule = RecurrenceRule::builder(Frequency::Hourly)
            .by_minute(30)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            expand(&rule, start, "2024-11-03T01:00"),
            @r"
        2024-11-03T01:30:00-04:00[America/New_York]
        2024-11-03T01:30:00-05:00[America/New_York]
        ",
        );
    }

    #[test]
    fn periods() {
        let p = Period::new(Granularity::Month, Monday, date(2025, 2, 10))
            .unwrap();
        assert_eq!(p.nth_weekday(1, Saturday), Some(date(2025, 2, 1)));
        assert_eq!(p.nth_weekday(4, Friday), Some(date(2025, 2, 28)));
        assert_eq!(p.nth_weekday(5, Friday), None);
        assert_eq!(p.nth_weekday(-1, Friday), Some(date(2025, 2, 28)));
        assert_eq!(p.nth_weekday(-4, Saturday), Some(date(2025, 2, 1)));
        assert_eq!(p.nth_weekday(-5, Saturday), None);
        assert_eq!(p.weekdays(Monday).count(), 4);
        assert_eq!(p.days().count(), 28);

        let p = Period::new(Granularity::Week, Sunday, date(2025, 2, 10))
            .unwrap();
        assert_eq!((p.start, p.end), (date(2025, 2, 9), date(2025, 2, 15)));
    }
}

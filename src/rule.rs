use std::{
    cmp::Ordering,
    ops::{Range, RangeInclusive},
    sync::Arc,
};

use jiff::civil::{Date, Weekday};

use crate::{
    error::ConfigurationError,
    iter::Occurrences,
    temporal::{Temporal, TemporalKind},
};

// A rule is just data. It doesn't know its start value, so the same rule can
// be expanded from any number of starting points. Every call to `iter` builds
// a fresh pipeline that owns a clone of the rule (which is just an `Arc`
// clone).

/// An RFC 5545 recurrence rule.
///
/// Rules are built with [`RecurrenceRule::builder`] or parsed from their
/// value text (e.g., `FREQ=MONTHLY;BYDAY=-1SU`). Once built, a rule is
/// immutable and guaranteed to be well formed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecurrenceRule {
    inner: Arc<RecurrenceRuleInner>,
}

#[derive(Debug, Eq, PartialEq)]
struct RecurrenceRuleInner {
    freq: Frequency,
    interval: i32,
    // `None` means the default (Monday). We remember whether it was given
    // so that rendering doesn't invent a `WKST` part.
    week_start: Option<Weekday>,
    termination: Termination,
    // At most one per kind, in canonical order.
    by: Box<[ByRule]>,
}

impl RecurrenceRule {
    /// Returns a builder for constructing a `RecurrenceRule`.
    ///
    /// The frequency is the only thing required to create a rule.
    pub fn builder(freq: Frequency) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(freq)
    }

    /// Returns an iterator over all occurrences of this rule when started
    /// from `start`.
    ///
    /// Every occurrence has the same kind as `start`. The iterator may be
    /// unbounded when the rule has no `COUNT` or `UNTIL`, in which case it
    /// only stops at the limits of Jiff's supported range. Callers should
    /// use `take(N)` in that case.
    ///
    /// A rule that can never match (see [`RecurrenceRule::check`]) produces
    /// nothing, but only after walking its periods to the end of that range.
    /// At sub-daily frequencies, days that can't match are skipped whole, so
    /// this is at most one step per day.
    ///
    /// This returns an error when the rule needs a time of day but `start`
    /// is a date.
    pub fn iter(
        &self,
        start: &Temporal,
    ) -> Result<Occurrences, ConfigurationError> {
        self.check_kind(start)?;
        Occurrences::new(self.clone(), start.clone(), None)
    }

    /// Like [`RecurrenceRule::iter`], but skips occurrences before `resume`.
    ///
    /// Skipped occurrences still count towards `COUNT`, so resuming never
    /// changes which occurrences belong to the rule.
    pub fn iter_from(
        &self,
        start: &Temporal,
        resume: &Temporal,
    ) -> Result<Occurrences, ConfigurationError> {
        self.check_kind(start)?;
        Occurrences::new(self.clone(), start.clone(), Some(resume.clone()))
    }

    /// Returns the frequency of this rule.
    pub fn frequency(&self) -> Frequency {
        self.inner.freq
    }

    /// Returns the number of frequency periods between each repetition.
    pub fn interval(&self) -> i32 {
        self.inner.interval
    }

    /// Returns the weekday on which weeks start. Defaults to Monday.
    pub fn week_start(&self) -> Weekday {
        self.inner.week_start.unwrap_or(Weekday::Monday)
    }

    /// Returns the week start only if one was given explicitly.
    pub(crate) fn declared_week_start(&self) -> Option<Weekday> {
        self.inner.week_start
    }

    pub fn termination(&self) -> &Termination {
        &self.inner.termination
    }

    /// Returns every BY rule in this recurrence rule, in canonical order.
    pub fn by_rules(&self) -> &[ByRule] {
        &self.inner.by
    }

    /// Returns the BY rule of the given kind, if present.
    pub fn get(&self, kind: ByRuleKind) -> Option<&ByRule> {
        self.inner.by.iter().find(|by| by.kind() == kind)
    }

    pub fn has(&self, kind: ByRuleKind) -> bool {
        self.get(kind).is_some()
    }

    /// Returns a list of problems with this rule that aren't strict errors.
    ///
    /// RFC 5545 marks some combinations of BY rules and frequencies as "not
    /// applicable." These rules are still accepted and expanded (typically
    /// as limits), but they probably don't do what their author intended.
    pub fn check(&self) -> Vec<String> {
        let mut warnings = vec![];
        let freq = self.frequency();
        if self.has(ByRuleKind::WeekNumber) && freq != Frequency::Yearly {
            warnings.push(format!(
                "'by week' is only meaningful at yearly frequency, \
                 but the frequency is {}",
                freq.as_str(),
            ));
        }
        if self.has(ByRuleKind::YearDay)
            && matches!(
                freq,
                Frequency::Monthly | Frequency::Weekly | Frequency::Daily
            )
        {
            warnings.push(format!(
                "'by day of the year' is not meaningful at {} frequency",
                freq.as_str(),
            ));
        }
        if self.has(ByRuleKind::MonthDay) && freq == Frequency::Weekly {
            warnings.push(
                "'by day of the month' is not meaningful at weekly frequency"
                    .to_string(),
            );
        }
        if let Some(ByRule::Day(weekdays)) = self.get(ByRuleKind::Day) {
            if self.is_monthly_scope() {
                for &v in weekdays.iter() {
                    let Some(nth) = v.nth() else { continue };
                    if !(-5..=5).contains(&nth) {
                        warnings.push(format!(
                            "numbered weekday `{v}` can never occur \
                             within a single month",
                        ));
                    }
                }
            }
        }
        if let (Some(ByRule::Month(months)), Some(ByRule::MonthDay(days))) =
            (self.get(ByRuleKind::Month), self.get(ByRuleKind::MonthDay))
        {
            // Use a leap year so that February has the most days possible.
            let longest = months
                .iter()
                .filter_map(|&m| Date::new(2000, m, 1).ok())
                .map(|d| d.days_in_month())
                .max()
                .unwrap_or(31);
            for &day in days.iter() {
                if day.unsigned_abs() > longest.unsigned_abs() {
                    warnings.push(format!(
                        "'by day of the month' value `{day}` can never \
                         occur in the selected months",
                    ));
                }
            }
        }
        warnings
    }

    /// Like [`RecurrenceRule::check`], but also checks this rule against a
    /// particular start value.
    pub fn check_start(&self, start: &Temporal) -> Vec<String> {
        let mut warnings = self.check();
        if let Err(err) = self.check_kind(start) {
            warnings.extend(err.violations().iter().cloned());
        }
        let Termination::Until(ref until) = *self.termination() else {
            return warnings;
        };
        if until.kind() != start.kind() {
            warnings.push(format!(
                "'until' value `{until}` is {} but start value `{start}` \
                 is {}",
                kind_name(until.kind()),
                kind_name(start.kind()),
            ));
        }
        if let (Temporal::Zoned(_), Temporal::Zoned(zdt)) = (start, until) {
            if zdt.time_zone().iana_name() != Some("UTC") {
                warnings.push(format!(
                    "'until' value `{until}` should be in UTC since the \
                     start value has a time zone",
                ));
            }
        }
        warnings
    }

    /// Returns an error when this rule can't be expanded from `start`.
    fn check_kind(&self, start: &Temporal) -> Result<(), ConfigurationError> {
        if start.kind() != TemporalKind::Date {
            return Ok(());
        }
        let mut violations = vec![];
        if self.frequency() > Frequency::Daily {
            violations.push(format!(
                "{} frequency cannot be used with date-only start \
                 value `{start}`",
                self.frequency().as_str(),
            ));
        }
        for kind in [ByRuleKind::Hour, ByRuleKind::Minute, ByRuleKind::Second]
        {
            if self.has(kind) {
                violations.push(format!(
                    "'{}' cannot be used with date-only start value \
                     `{start}`",
                    kind.description(),
                ));
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::new(violations))
        }
    }

    /// Returns true when numbered weekdays count within a month instead of
    /// within a year.
    pub(crate) fn is_monthly_scope(&self) -> bool {
        self.frequency() == Frequency::Monthly || self.has(ByRuleKind::Month)
    }
}

fn kind_name(kind: TemporalKind) -> &'static str {
    match kind {
        TemporalKind::Date => "a date",
        TemporalKind::Local => "a local datetime",
        TemporalKind::Zoned => "a zoned datetime",
    }
}

/// How a recurrence ends.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Termination {
    /// The recurrence never ends.
    #[default]
    Unbounded,
    /// The recurrence ends after this many occurrences.
    Count(u32),
    /// The recurrence ends after the last occurrence at or before this
    /// value.
    Until(Temporal),
}

/// The size of each period of a recurrence.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
}

impl Frequency {
    /// Returns the name of this frequency as it appears in value text.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
            Frequency::Hourly => "HOURLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Secondly => "SECONDLY",
        }
    }
}

/// A type describing "day of week" inputs.
///
/// This implements `Ord` even though the actual order of weekdays cannot be
/// determined unless the _start_ of the week is known. It exists to sort
/// and de-duplicate BYDAY values, and to render them in a stable order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ByWeekday {
    /// Every occurrence of the weekday in a period.
    Any(Weekday),
    /// The `nth` occurrence of the weekday in a period. Negative values
    /// count from the end of the period.
    Numbered { nth: i8, weekday: Weekday },
}

impl ByWeekday {
    /// Creates a numbered weekday. A `nth` of `0` means every occurrence.
    pub fn numbered(nth: i8, weekday: Weekday) -> ByWeekday {
        if nth == 0 {
            ByWeekday::Any(weekday)
        } else {
            ByWeekday::Numbered { nth, weekday }
        }
    }

    pub fn weekday(&self) -> Weekday {
        match *self {
            ByWeekday::Any(weekday) => weekday,
            ByWeekday::Numbered { weekday, .. } => weekday,
        }
    }

    /// Returns the ordinal, if this is a numbered weekday.
    pub fn nth(&self) -> Option<i8> {
        match *self {
            ByWeekday::Any(_) => None,
            ByWeekday::Numbered { nth, .. } => Some(nth),
        }
    }

    fn normalize(self) -> ByWeekday {
        match self {
            ByWeekday::Numbered { nth, weekday } => {
                ByWeekday::numbered(nth, weekday)
            }
            any => any,
        }
    }
}

impl Ord for ByWeekday {
    fn cmp(&self, rhs: &ByWeekday) -> Ordering {
        let key = |bywd: &ByWeekday| {
            let offset = bywd.weekday().to_monday_one_offset();
            (bywd.nth().is_some(), bywd.nth(), offset)
        };
        key(self).cmp(&key(rhs))
    }
}

impl PartialOrd for ByWeekday {
    fn partial_cmp(&self, rhs: &ByWeekday) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

/// The kind of a [`ByRule`]. Kinds are ordered canonically.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ByRuleKind {
    Month,
    WeekNumber,
    YearDay,
    MonthDay,
    Day,
    Hour,
    Minute,
    Second,
    SetPosition,
}

impl ByRuleKind {
    /// Returns the name of this kind as it appears in value text.
    pub fn as_str(&self) -> &'static str {
        match *self {
            ByRuleKind::Month => "BYMONTH",
            ByRuleKind::WeekNumber => "BYWEEKNO",
            ByRuleKind::YearDay => "BYYEARDAY",
            ByRuleKind::MonthDay => "BYMONTHDAY",
            ByRuleKind::Day => "BYDAY",
            ByRuleKind::Hour => "BYHOUR",
            ByRuleKind::Minute => "BYMINUTE",
            ByRuleKind::Second => "BYSECOND",
            ByRuleKind::SetPosition => "BYSETPOS",
        }
    }

    /// Returns a human readable description, for use in messages.
    fn description(&self) -> &'static str {
        match *self {
            ByRuleKind::Month => "by month",
            ByRuleKind::WeekNumber => "by week",
            ByRuleKind::YearDay => "by day of the year",
            ByRuleKind::MonthDay => "by day of the month",
            ByRuleKind::Day => "by week day",
            ByRuleKind::Hour => "by hour",
            ByRuleKind::Minute => "by minute",
            ByRuleKind::Second => "by second",
            ByRuleKind::SetPosition => "by set position",
        }
    }
}

/// A single BY rule of a recurrence rule, along with its values.
///
/// Values are always sorted and de-duplicated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ByRule {
    Month(Box<[i8]>),
    // can be negative
    WeekNumber(Box<[i8]>),
    // can be negative
    YearDay(Box<[i16]>),
    // can be negative
    MonthDay(Box<[i8]>),
    Day(Box<[ByWeekday]>),
    Hour(Box<[i8]>),
    Minute(Box<[i8]>),
    Second(Box<[i8]>),
    // can be negative
    SetPosition(Box<[i32]>),
}

impl ByRule {
    pub fn kind(&self) -> ByRuleKind {
        match *self {
            ByRule::Month(_) => ByRuleKind::Month,
            ByRule::WeekNumber(_) => ByRuleKind::WeekNumber,
            ByRule::YearDay(_) => ByRuleKind::YearDay,
            ByRule::MonthDay(_) => ByRuleKind::MonthDay,
            ByRule::Day(_) => ByRuleKind::Day,
            ByRule::Hour(_) => ByRuleKind::Hour,
            ByRule::Minute(_) => ByRuleKind::Minute,
            ByRule::Second(_) => ByRuleKind::Second,
            ByRule::SetPosition(_) => ByRuleKind::SetPosition,
        }
    }
}

/// A builder for constructing a valid recurrence rule.
#[derive(Clone, Debug)]
pub struct RecurrenceRuleBuilder {
    freq: Frequency,
    interval: i32,
    week_start: Option<Weekday>,
    count: Option<u32>,
    until: Option<Temporal>,
    by_month: Vec<i8>,
    by_week: Vec<i8>,
    by_year_day: Vec<i16>,
    by_month_day: Vec<i8>,
    by_week_day: Vec<ByWeekday>,
    by_hour: Vec<i8>,
    by_minute: Vec<i8>,
    by_second: Vec<i8>,
    by_set_pos: Vec<i32>,
}

impl RecurrenceRuleBuilder {
    fn new(freq: Frequency) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder {
            freq,
            interval: 1,
            week_start: None,
            count: None,
            until: None,
            by_month: vec![],
            by_week: vec![],
            by_year_day: vec![],
            by_month_day: vec![],
            by_week_day: vec![],
            by_hour: vec![],
            by_minute: vec![],
            by_second: vec![],
            by_set_pos: vec![],
        }
    }

    /// Builds the rule, or returns every problem found with it.
    pub fn build(&self) -> Result<RecurrenceRule, ConfigurationError> {
        fn sort_and_dedup<T: Clone + Ord>(slice: &[T]) -> Box<[T]> {
            let mut vec = slice.to_vec();
            vec.sort();
            vec.dedup();
            vec.into_boxed_slice()
        }

        let mut violations = vec![];
        if self.interval < 1 {
            violations.push(format!(
                "interval value of `{}` is invalid \
                 (interval must be greater than or equal to 1)",
                self.interval,
            ));
        }
        if self.count == Some(0) {
            violations.push(
                "count value of `0` is invalid \
                 (count must be greater than or equal to 1)"
                    .to_string(),
            );
        }
        if self.count.is_some() && self.until.is_some() {
            violations.push(
                "'count' and 'until' cannot both be used in the same rule"
                    .to_string(),
            );
        }

        check_range(&mut violations, ByRuleKind::Month, &self.by_month, 1, 12);
        check_signed(
            &mut violations,
            ByRuleKind::WeekNumber,
            &self.by_week,
            53,
        );
        check_signed(
            &mut violations,
            ByRuleKind::YearDay,
            &self.by_year_day,
            366,
        );
        check_signed(
            &mut violations,
            ByRuleKind::MonthDay,
            &self.by_month_day,
            31,
        );
        for &v in self.by_week_day.iter() {
            let Some(nth) = v.normalize().nth() else { continue };
            // Numbered weekdays are only allowed for YEARLY or MONTHLY
            // frequencies...
            if !matches!(self.freq, Frequency::Yearly | Frequency::Monthly) {
                violations.push(format!(
                    "numbered weekday `{v}` is only allowed at \
                     yearly or monthly frequencies",
                ));
            // ... except when using YEARLY frequency with BYWEEKNO set.
            } else if self.freq == Frequency::Yearly
                && !self.by_week.is_empty()
            {
                violations.push(format!(
                    "numbered weekday `{v}` is only allowed at yearly \
                     frequency when 'by week' is not used",
                ));
            }
            if !(-53..=53).contains(&nth) {
                violations.push(format!(
                    "invalid numbered 'by week day' value `{v}` \
                     (values must be in range 1..=53 or -53..=-1)",
                ));
            }
        }
        check_range(&mut violations, ByRuleKind::Hour, &self.by_hour, 0, 23);
        check_range(
            &mut violations,
            ByRuleKind::Minute,
            &self.by_minute,
            0,
            59,
        );
        // RFC 5545 technically allows a value of `60` here, presumably for
        // leap seconds. Jiff doesn't support leap seconds, and clamping
        // doesn't really make sense here, so just reject it.
        check_range(
            &mut violations,
            ByRuleKind::Second,
            &self.by_second,
            0,
            59,
        );
        check_signed(
            &mut violations,
            ByRuleKind::SetPosition,
            &self.by_set_pos,
            366,
        );

        let mut by = vec![];
        if !self.by_month.is_empty() {
            by.push(ByRule::Month(sort_and_dedup(&self.by_month)));
        }
        if !self.by_week.is_empty() {
            by.push(ByRule::WeekNumber(sort_and_dedup(&self.by_week)));
        }
        if !self.by_year_day.is_empty() {
            by.push(ByRule::YearDay(sort_and_dedup(&self.by_year_day)));
        }
        if !self.by_month_day.is_empty() {
            by.push(ByRule::MonthDay(sort_and_dedup(&self.by_month_day)));
        }
        if !self.by_week_day.is_empty() {
            let weekdays: Vec<ByWeekday> =
                self.by_week_day.iter().map(|v| v.normalize()).collect();
            by.push(ByRule::Day(sort_and_dedup(&weekdays)));
        }
        if !self.by_hour.is_empty() {
            by.push(ByRule::Hour(sort_and_dedup(&self.by_hour)));
        }
        if !self.by_minute.is_empty() {
            by.push(ByRule::Minute(sort_and_dedup(&self.by_minute)));
        }
        if !self.by_second.is_empty() {
            by.push(ByRule::Second(sort_and_dedup(&self.by_second)));
        }
        // A BYSETPOS specific error is that, if it's given, then there MUST
        // be another BY* rule.
        if !self.by_set_pos.is_empty() {
            if by.is_empty() {
                violations.push(
                    "when 'by set position' is used, at least one other \
                     'by' rule must be specified, but all are empty"
                        .to_string(),
                );
            }
            by.push(ByRule::SetPosition(sort_and_dedup(&self.by_set_pos)));
        }

        if !violations.is_empty() {
            log::debug!("rejecting recurrence rule: {violations:?}");
            return Err(ConfigurationError::new(violations));
        }
        let termination = match (self.count, &self.until) {
            (Some(count), _) => Termination::Count(count),
            (None, Some(until)) => Termination::Until(until.clone()),
            (None, None) => Termination::Unbounded,
        };
        let inner = Arc::new(RecurrenceRuleInner {
            freq: self.freq,
            interval: self.interval,
            week_start: self.week_start,
            termination,
            by: by.into_boxed_slice(),
        });
        Ok(RecurrenceRule { inner })
    }

    pub fn interval(&mut self, interval: i32) -> &mut RecurrenceRuleBuilder {
        self.interval = interval;
        self
    }

    pub fn week_start(
        &mut self,
        weekday: Weekday,
    ) -> &mut RecurrenceRuleBuilder {
        self.week_start = Some(weekday);
        self
    }

    /// Ends the recurrence after `count` occurrences.
    pub fn count(&mut self, count: u32) -> &mut RecurrenceRuleBuilder {
        self.count = Some(count);
        self
    }

    /// Ends the recurrence at the last occurrence on or before `until`.
    ///
    /// When `until` is a date and the start value has a time, `until`
    /// refers to the end of that day.
    pub fn until<T: Into<Temporal>>(
        &mut self,
        until: T,
    ) -> &mut RecurrenceRuleBuilder {
        self.until = Some(until.into());
        self
    }

    pub fn by_month<I: IntoI8Iter>(
        &mut self,
        months: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_month.extend(months.into_i8_iter());
        self
    }

    pub fn by_week<I: IntoI8Iter>(
        &mut self,
        weeks: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_week.extend(weeks.into_i8_iter());
        self
    }

    pub fn by_year_day<I: IntoI16Iter>(
        &mut self,
        days: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_year_day.extend(days.into_i16_iter());
        self
    }

    pub fn by_month_day<I: IntoI8Iter>(
        &mut self,
        days: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_month_day.extend(days.into_i8_iter());
        self
    }

    pub fn by_week_day<I: IntoByWeekdayIter>(
        &mut self,
        week_days: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_week_day.extend(week_days.into_by_weekday_iter());
        self
    }

    pub fn by_hour<I: IntoI8Iter>(
        &mut self,
        hours: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_hour.extend(hours.into_i8_iter());
        self
    }

    pub fn by_minute<I: IntoI8Iter>(
        &mut self,
        minutes: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_minute.extend(minutes.into_i8_iter());
        self
    }

    pub fn by_second<I: IntoI8Iter>(
        &mut self,
        seconds: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_second.extend(seconds.into_i8_iter());
        self
    }

    pub fn by_set_position<I: IntoI32Iter>(
        &mut self,
        positions: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_set_pos.extend(positions.into_i32_iter());
        self
    }

    /// Adds the values of an already constructed BY rule.
    ///
    /// Values are merged with any previously given for the same kind.
    pub fn by_rule(&mut self, rule: ByRule) -> &mut RecurrenceRuleBuilder {
        match rule {
            ByRule::Month(v) => self.by_month.extend(v.into_vec()),
            ByRule::WeekNumber(v) => self.by_week.extend(v.into_vec()),
            ByRule::YearDay(v) => self.by_year_day.extend(v.into_vec()),
            ByRule::MonthDay(v) => self.by_month_day.extend(v.into_vec()),
            ByRule::Day(v) => self.by_week_day.extend(v.into_vec()),
            ByRule::Hour(v) => self.by_hour.extend(v.into_vec()),
            ByRule::Minute(v) => self.by_minute.extend(v.into_vec()),
            ByRule::Second(v) => self.by_second.extend(v.into_vec()),
            ByRule::SetPosition(v) => self.by_set_pos.extend(v.into_vec()),
        }
        self
    }
}

/// Records a violation for each value outside of `min..=max`.
fn check_range<T: Copy + Into<i32> + std::fmt::Display>(
    violations: &mut Vec<String>,
    kind: ByRuleKind,
    values: &[T],
    min: i32,
    max: i32,
) {
    for &v in values.iter() {
        let v32: i32 = v.into();
        if !(min..=max).contains(&v32) {
            violations.push(format!(
                "invalid '{}' value `{v}` \
                 (values must be in range {min}..={max})",
                kind.description(),
            ));
        }
    }
}

/// Records a violation for each value outside of `1..=max` or `-max..=-1`.
fn check_signed<T: Copy + Into<i32> + std::fmt::Display>(
    violations: &mut Vec<String>,
    kind: ByRuleKind,
    values: &[T],
    max: i32,
) {
    for &v in values.iter() {
        let v32: i32 = v.into();
        if v32 == 0 || !(-max..=max).contains(&v32) {
            violations.push(format!(
                "invalid '{}' value `{v}` \
                 (values must be in range 1..={max} or -{max}..=-1)",
                kind.description(),
            ));
        }
    }
}

// The builder methods accept integers in a number of flexible ways:
//
// * A single integer: `5`
// * An array of integers: `[1, 3, 5]`.
// * A single range of integers: `5..8` or `5..=8`.
// * An array of ranges of integers: `[5..=10, 15..=20]`.
// * A `Vec` of integers.
//
// There is one trait per integer type instead of one generic trait with an
// associated type. With an associated type, integer literals like `5` don't
// get inferred to the right type and callers would need to write `5i8`.
macro_rules! into_integer_iter {
    ($(#[$doc:meta])* $name:ident, $method:ident, $int:ty) => {
        $(#[$doc])*
        pub trait $name {
            fn $method(self) -> impl Iterator<Item = $int>;
        }

        impl $name for $int {
            fn $method(self) -> impl Iterator<Item = $int> {
                std::iter::once(self)
            }
        }

        impl $name for Range<$int> {
            fn $method(self) -> impl Iterator<Item = $int> {
                self
            }
        }

        impl $name for RangeInclusive<$int> {
            fn $method(self) -> impl Iterator<Item = $int> {
                self
            }
        }

        impl $name for Vec<$int> {
            fn $method(self) -> impl Iterator<Item = $int> {
                self.into_iter()
            }
        }

        impl<const N: usize> $name for [$int; N] {
            fn $method(self) -> impl Iterator<Item = $int> {
                self.into_iter()
            }
        }

        impl<const N: usize> $name for [Range<$int>; N] {
            fn $method(self) -> impl Iterator<Item = $int> {
                self.into_iter().flatten()
            }
        }

        impl<const N: usize> $name for [RangeInclusive<$int>; N] {
            fn $method(self) -> impl Iterator<Item = $int> {
                self.into_iter().flatten()
            }
        }
    };
}

into_integer_iter!(
    /// A sequence of `i8` integers for `RecurrenceRuleBuilder` methods.
    IntoI8Iter,
    into_i8_iter,
    i8
);
into_integer_iter!(
    /// A sequence of `i16` integers for `RecurrenceRuleBuilder` methods.
    IntoI16Iter,
    into_i16_iter,
    i16
);
into_integer_iter!(
    /// A sequence of `i32` integers for `RecurrenceRuleBuilder` methods.
    IntoI32Iter,
    into_i32_iter,
    i32
);

/// A sequence of weekdays for `RecurrenceRuleBuilder::by_week_day`.
///
/// This permits weekdays to be given as a `ByWeekday`, a plain `Weekday`
/// (meaning any), a `(nth, Weekday)` pair, an inclusive range of weekdays,
/// or arrays of any of these.
pub trait IntoByWeekdayIter {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday>;
}

impl IntoByWeekdayIter for ByWeekday {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        std::iter::once(self)
    }
}

impl IntoByWeekdayIter for Weekday {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        std::iter::once(ByWeekday::Any(self))
    }
}

impl IntoByWeekdayIter for (i8, Weekday) {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        std::iter::once(ByWeekday::numbered(self.0, self.1))
    }
}

impl IntoByWeekdayIter for RangeInclusive<Weekday> {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        let (start, end) = (*self.start(), *self.end());
        // +1 since this is inclusive. `Weekday::until` is always `0..=6`.
        let count = 1 + usize::from(start.until(end).unsigned_abs());
        start.cycle_forward().take(count).map(ByWeekday::Any)
    }
}

impl IntoByWeekdayIter for Vec<ByWeekday> {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter()
    }
}

impl<const N: usize> IntoByWeekdayIter for [ByWeekday; N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter()
    }
}

impl<const N: usize> IntoByWeekdayIter for [Weekday; N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter().map(ByWeekday::Any)
    }
}

impl<const N: usize> IntoByWeekdayIter for [(i8, Weekday); N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter().map(|(nth, weekday)| ByWeekday::numbered(nth, weekday))
    }
}

impl<const N: usize> IntoByWeekdayIter for [RangeInclusive<Weekday>; N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter().flat_map(|range| range.into_by_weekday_iter())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday::*, date};

    use super::*;

    #[test]
    fn canonical_order_and_values() {
        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_set_position(-1)
            .by_week_day([Friday, Monday, Monday])
            .by_month([6, 1, 6])
            .by_month(3..=4)
            .build()
            .unwrap();
        assert_eq!(
            rule.by_rules(),
            &[
                ByRule::Month(vec![1, 3, 4, 6].into()),
                ByRule::Day(
                    vec![ByWeekday::Any(Monday), ByWeekday::Any(Friday)]
                        .into()
                ),
                ByRule::SetPosition(vec![-1].into()),
            ],
        );
        assert_eq!(rule.week_start(), Monday);
        assert_eq!(rule.interval(), 1);
        assert_eq!(rule.termination(), &Termination::Unbounded);
    }

    #[test]
    fn zero_ordinal_means_any() {
        let rule = RecurrenceRule::builder(Frequency::Weekly)
            .by_week_day((0, Tuesday))
            .build()
            .unwrap();
        assert_eq!(
            rule.get(ByRuleKind::Day),
            Some(&ByRule::Day(vec![ByWeekday::Any(Tuesday)].into())),
        );
    }

    #[test]
    fn weekday_order() {
        let mut weekdays = vec![
            ByWeekday::numbered(-1, Sunday),
            ByWeekday::numbered(1, Friday),
            ByWeekday::Any(Sunday),
            ByWeekday::numbered(1, Monday),
            ByWeekday::Any(Monday),
        ];
        weekdays.sort();
        assert_eq!(
            weekdays,
            vec![
                ByWeekday::Any(Monday),
                ByWeekday::Any(Sunday),
                ByWeekday::numbered(-1, Sunday),
                ByWeekday::numbered(1, Monday),
                ByWeekday::numbered(1, Friday),
            ],
        );
    }

    #[test]
    fn weekday_ranges_wrap() {
        let got: Vec<ByWeekday> =
            (Saturday..=Monday).into_by_weekday_iter().collect();
        assert_eq!(
            got,
            vec![
                ByWeekday::Any(Saturday),
                ByWeekday::Any(Sunday),
                ByWeekday::Any(Monday),
            ],
        );
    }

    #[test]
    fn errors_are_collected() {
        let err = RecurrenceRule::builder(Frequency::Weekly)
            .interval(0)
            .count(0)
            .by_month(13)
            .by_week_day((1, Monday))
            .by_hour(24)
            .build()
            .unwrap_err();
        insta::assert_snapshot!(err.violations().join("\n"), @r"
        interval value of `0` is invalid (interval must be greater than or equal to 1)
        count value of `0` is invalid (count must be greater than or equal to 1)
        invalid 'by month' value `13` (values must be in range 1..=12)
        numbered weekday `1MO` is only allowed at yearly or monthly frequencies
        invalid 'by hour' value `24` (values must be in range 0..=23)
        ");
    }

    #[test]
    fn errors_one_by_one() {
        fn expect_err(builder: &mut RecurrenceRuleBuilder) -> String {
            match builder.build() {
                Err(err) => err.to_string(),
                Ok(ok) => {
                    panic!("expected recurrence rule error, but got:\n{ok:?}")
                }
            }
        }

        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Daily)
                    .count(5)
                    .until(date(2025, 1, 1)),
            ),
            @"'count' and 'until' cannot both be used in the same rule",
        );
        insta::assert_snapshot!(
            expect_err(RecurrenceRule::builder(Frequency::Yearly).by_week(0)),
            @"invalid 'by week' value `0` (values must be in range 1..=53 or -53..=-1)",
        );
        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Yearly).by_year_day(-367)
            ),
            @"invalid 'by day of the year' value `-367` (values must be in range 1..=366 or -366..=-1)",
        );
        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Monthly).by_month_day(32)
            ),
            @"invalid 'by day of the month' value `32` (values must be in range 1..=31 or -31..=-1)",
        );
        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Yearly)
                    .by_week(20)
                    .by_week_day((1, Monday)),
            ),
            @"numbered weekday `1MO` is only allowed at yearly frequency when 'by week' is not used",
        );
        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Yearly)
                    .by_week_day((54, Monday)),
            ),
            @"invalid numbered 'by week day' value `54MO` (values must be in range 1..=53 or -53..=-1)",
        );
        insta::assert_snapshot!(
            expect_err(RecurrenceRule::builder(Frequency::Minutely).by_second(60)),
            @"invalid 'by second' value `60` (values must be in range 0..=59)",
        );
        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Monthly).by_set_position(1)
            ),
            @"when 'by set position' is used, at least one other 'by' rule must be specified, but all are empty",
        );
        insta::assert_snapshot!(
            expect_err(
                RecurrenceRule::builder(Frequency::Monthly)
                    .by_week_day(Friday)
                    .by_set_position(0)
            ),
            @"invalid 'by set position' value `0` (values must be in range 1..=366 or -366..=-1)",
        );
    }

    #[test]
    fn warnings() {
        let rule = RecurrenceRule::builder(Frequency::Monthly)
            .by_week(1)
            .by_year_day(100)
            .by_week_day((6, Friday))
            .build()
            .unwrap();
        insta::assert_snapshot!(rule.check().join("\n"), @r"
        'by week' is only meaningful at yearly frequency, but the frequency is MONTHLY
        'by day of the year' is not meaningful at MONTHLY frequency
        numbered weekday `6FR` can never occur within a single month
        ");

        let rule = RecurrenceRule::builder(Frequency::Weekly)
            .by_month(2)
            .by_month_day([1, 30, -31])
            .build()
            .unwrap();
        insta::assert_snapshot!(rule.check().join("\n"), @r"
        'by day of the month' is not meaningful at weekly frequency
        'by day of the month' value `-31` can never occur in the selected months
        'by day of the month' value `30` can never occur in the selected months
        ");

        let rule = RecurrenceRule::builder(Frequency::Yearly)
            .by_week_day((20, Monday))
            .build()
            .unwrap();
        assert!(rule.check().is_empty());
    }

    #[test]
    fn warnings_against_start() {
        let start: Temporal =
            "1997-09-02T09:00[America/New_York]".parse().unwrap();
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .until(date(1997, 12, 24))
            .build()
            .unwrap();
        insta::assert_snapshot!(rule.check_start(&start).join("\n"), @"'until' value `1997-12-24` is a date but start value `1997-09-02T09:00:00-04:00[America/New_York]` is a zoned datetime");

        let until: Temporal =
            "1997-12-24T00:00[America/New_York]".parse().unwrap();
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .until(until)
            .build()
            .unwrap();
        insta::assert_snapshot!(rule.check_start(&start).join("\n"), @"'until' value `1997-12-24T00:00:00-05:00[America/New_York]` should be in UTC since the start value has a time zone");

        let until: Temporal = "19971224T000000Z".parse().unwrap();
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .until(until)
            .build()
            .unwrap();
        assert!(rule.check_start(&start).is_empty());
    }

    #[test]
    fn date_start_needs_date_rule() {
        let start = Temporal::Date(date(2016, 6, 11));
        let rule = RecurrenceRule::builder(Frequency::Hourly)
            .by_minute(5)
            .build()
            .unwrap();
        let err = rule.iter(&start).unwrap_err();
        insta::assert_snapshot!(err, @"HOURLY frequency cannot be used with date-only start value `2016-06-11`; 'by minute' cannot be used with date-only start value `2016-06-11`");

        let rule =
            RecurrenceRule::builder(Frequency::Daily).build().unwrap();
        assert!(rule.iter(&start).is_ok());
    }
}

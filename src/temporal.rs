use std::cmp::Ordering;

use jiff::{
    Span, Timestamp, Zoned,
    civil::{Date, DateTime, Time, Weekday},
    tz::{AmbiguousOffset, TimeZone},
};

use crate::{rule::Frequency, weekdate::WeekDate};

/// A point on the calendar that a recurrence rule is expanded from.
///
/// RFC 5545 allows the start of a recurrence (`DTSTART`) to be a date
/// without a time, a "floating" local datetime without any time zone, or a
/// datetime in a particular time zone. Every occurrence produced from a
/// start value has the same kind as that start value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Temporal {
    /// A calendar date with no time of day.
    Date(Date),
    /// A civil datetime not tied to any time zone.
    Local(DateTime),
    /// A datetime in a specific time zone.
    Zoned(Zoned),
}

/// The kind of a [`Temporal`] value, without any of its data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TemporalKind {
    Date,
    Local,
    Zoned,
}

impl Temporal {
    /// Returns the kind of this value.
    pub fn kind(&self) -> TemporalKind {
        match *self {
            Temporal::Date(_) => TemporalKind::Date,
            Temporal::Local(_) => TemporalKind::Local,
            Temporal::Zoned(_) => TemporalKind::Zoned,
        }
    }

    /// Returns the civil datetime of this value. For a date, the time is
    /// midnight. For a zoned datetime, this is its wall clock time.
    pub fn datetime(&self) -> DateTime {
        match *self {
            Temporal::Date(d) => d.to_datetime(Time::midnight()),
            Temporal::Local(dt) => dt,
            Temporal::Zoned(ref zdt) => zdt.datetime(),
        }
    }

    /// Returns the civil date of this value.
    pub fn date(&self) -> Date {
        self.datetime().date()
    }

    pub fn year(&self) -> i16 {
        self.datetime().year()
    }

    pub fn month(&self) -> i8 {
        self.datetime().month()
    }

    pub fn day(&self) -> i8 {
        self.datetime().day()
    }

    pub fn weekday(&self) -> Weekday {
        self.datetime().weekday()
    }

    pub fn day_of_year(&self) -> i16 {
        self.datetime().day_of_year()
    }

    /// Returns the week number of this value, where weeks start on `start`.
    ///
    /// Week 1 is the first week with at least four days in the year, so
    /// dates near the start or end of a year can belong to a week of the
    /// neighboring year.
    pub fn week_of_year(&self, start: Weekday) -> Option<i8> {
        WeekDate::from_date(start, self.date()).map(|wd| wd.week())
    }

    /// The hour of this value. Always `0` for dates.
    pub fn hour(&self) -> i8 {
        self.datetime().hour()
    }

    /// The minute of this value. Always `0` for dates.
    pub fn minute(&self) -> i8 {
        self.datetime().minute()
    }

    /// The second of this value. Always `0` for dates.
    pub fn second(&self) -> i8 {
        self.datetime().second()
    }

    /// Adds the given span to this value, preserving its kind.
    ///
    /// Zoned values use time zone aware arithmetic, so adding a day across
    /// a DST transition keeps the wall clock time.
    pub fn checked_add(&self, span: Span) -> Result<Temporal, jiff::Error> {
        Ok(match *self {
            Temporal::Date(d) => Temporal::Date(d.checked_add(span)?),
            Temporal::Local(dt) => Temporal::Local(dt.checked_add(span)?),
            Temporal::Zoned(ref zdt) => {
                Temporal::Zoned(zdt.checked_add(span)?)
            }
        })
    }

    /// Converts this value to the same kind as `like`.
    ///
    /// When a date becomes a datetime, `end_of_day` decides whether it
    /// refers to the first or the last instant of that day. Civil values
    /// become zoned by interpreting them in the time zone of `like`, and
    /// zoned values become civil by taking their own wall clock time.
    pub(crate) fn to_kind_of(
        &self,
        like: &Temporal,
        end_of_day: bool,
    ) -> Result<Temporal, jiff::Error> {
        let civil = match *self {
            Temporal::Date(d) if end_of_day => d.to_datetime(Time::MAX),
            ref t => t.datetime(),
        };
        Ok(match (self, like) {
            (_, Temporal::Date(_)) => Temporal::Date(self.date()),
            (_, Temporal::Local(_)) => Temporal::Local(civil),
            (Temporal::Zoned(zdt), Temporal::Zoned(other)) => {
                Temporal::Zoned(zdt.with_time_zone(other.time_zone().clone()))
            }
            (_, Temporal::Zoned(other)) => {
                Temporal::Zoned(civil.to_zoned(other.time_zone().clone())?)
            }
        })
    }
}

impl PartialOrd for Temporal {
    /// Values of different kinds are incomparable.
    fn partial_cmp(&self, other: &Temporal) -> Option<Ordering> {
        match (self, other) {
            (Temporal::Date(a), Temporal::Date(b)) => Some(a.cmp(b)),
            (Temporal::Local(a), Temporal::Local(b)) => Some(a.cmp(b)),
            (Temporal::Zoned(a), Temporal::Zoned(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Temporal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Temporal::Date(ref d) => d.fmt(f),
            Temporal::Local(ref dt) => dt.fmt(f),
            Temporal::Zoned(ref zdt) => zdt.fmt(f),
        }
    }
}

impl std::str::FromStr for Temporal {
    type Err = jiff::Error;

    /// Parses a date, a datetime or a zoned datetime.
    ///
    /// Both the extended (`1997-09-02T09:00:00`) and basic
    /// (`19970902T090000`) ISO 8601 formats are accepted. A bracketed time
    /// zone annotation makes a zoned value, and so does a trailing `Z`, which
    /// is interpreted in UTC.
    fn from_str(s: &str) -> Result<Temporal, jiff::Error> {
        let s = s.trim();
        if s.ends_with(']') {
            Ok(Temporal::Zoned(s.parse()?))
        } else if s.ends_with(['Z', 'z']) {
            let ts: Timestamp = s.parse()?;
            Ok(Temporal::Zoned(ts.to_zoned(TimeZone::UTC)))
        } else if s.contains(['T', 't', ' ']) {
            Ok(Temporal::Local(s.parse()?))
        } else {
            Ok(Temporal::Date(s.parse()?))
        }
    }
}

impl From<Date> for Temporal {
    fn from(d: Date) -> Temporal {
        Temporal::Date(d)
    }
}

impl From<DateTime> for Temporal {
    fn from(dt: DateTime) -> Temporal {
        Temporal::Local(dt)
    }
}

impl From<Zoned> for Temporal {
    fn from(zdt: Zoned) -> Temporal {
        Temporal::Zoned(zdt)
    }
}

/// How civil datetimes produced by expansion become [`Temporal`] values.
///
/// This is derived from the start value and frequency of a recurrence.
#[derive(Clone, Debug)]
pub(crate) enum Frame {
    Date,
    Local,
    Zoned {
        tz: TimeZone,
        /// Whether a civil datetime in a fold refers to both of its instants.
        /// Only sub-daily frequencies step through the repeated hour.
        both_in_fold: bool,
    },
}

impl Frame {
    pub(crate) fn of(start: &Temporal, freq: Frequency) -> Frame {
        match *start {
            Temporal::Date(_) => Frame::Date,
            Temporal::Local(_) => Frame::Local,
            Temporal::Zoned(ref zdt) => Frame::Zoned {
                tz: zdt.time_zone().clone(),
                both_in_fold: matches!(
                    freq,
                    Frequency::Hourly
                        | Frequency::Minutely
                        | Frequency::Secondly
                ),
            },
        }
    }

    /// Converts a civil datetime into zero or more values in this frame.
    ///
    /// In a time zone, a civil datetime falling in a gap doesn't exist and
    /// is skipped. One falling in a fold resolves to its first instant,
    /// unless the frame steps through folds, in which case both instants
    /// are produced, earliest first.
    pub(crate) fn resolve(&self, dt: DateTime, out: &mut Vec<Temporal>) {
        let (tz, both_in_fold) = match *self {
            Frame::Date => {
                out.push(Temporal::Date(dt.date()));
                return;
            }
            Frame::Local => {
                out.push(Temporal::Local(dt));
                return;
            }
            Frame::Zoned { ref tz, both_in_fold } => (tz, both_in_fold),
        };
        let mut push = |offset: jiff::tz::Offset| match offset
            .to_timestamp(dt)
        {
            Ok(ts) => out.push(Temporal::Zoned(ts.to_zoned(tz.clone()))),
            Err(err) => {
                log::trace!(
                    "dropping {dt} in {tz:?}: {err}",
                    tz = tz.iana_name(),
                );
            }
        };
        match tz.to_ambiguous_zoned(dt).offset() {
            AmbiguousOffset::Unambiguous { offset } => push(offset),
            AmbiguousOffset::Gap { .. } => {
                log::trace!(
                    "skipping {dt} since it falls in a gap in {tz:?}",
                    tz = tz.iana_name(),
                );
            }
            AmbiguousOffset::Fold { before, after } => {
                push(before);
                if both_in_fold {
                    push(after);
                }
            }
        }
    }

    /// Converts a civil datetime to the latest instant it could refer to.
    ///
    /// This is used for comparing the start of a period with the end of a
    /// recurrence, so a gap resolves to the instant after the gap.
    pub(crate) fn latest(&self, dt: DateTime) -> Option<Temporal> {
        match *self {
            Frame::Date => Some(Temporal::Date(dt.date())),
            Frame::Local => Some(Temporal::Local(dt)),
            Frame::Zoned { ref tz, .. } => {
                tz.to_ambiguous_zoned(dt).later().ok().map(Temporal::Zoned)
            }
        }
    }
}

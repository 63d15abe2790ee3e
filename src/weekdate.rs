use jiff::{
    ToSpan,
    civil::{Date, Weekday},
};

/// A week date whose weeks may begin on any weekday.
///
/// This is what RFC 5545 calls the week numbering scheme controlled by
/// `WKST`. When weeks start on Monday, this agrees with ISO 8601 week dates
/// (and thus with `jiff::civil::ISOWeekDate`).
#[derive(Clone, Copy, Debug)]
pub(crate) struct WeekDate {
    // The weekday on which weeks start. This is the key difference from
    // `jiff::civil::ISOWeekDate`, which always starts on Monday.
    start: Weekday,
    year: i16,
    week: i8,
    weekday: Weekday,
}

impl WeekDate {
    /// Returns the week date for the given Gregorian date.
    ///
    /// The first week of a week numbering year starts on `start` and is the
    /// first week with at least four of its days in the Gregorian year.
    ///
    /// This returns `None` only when the week containing `date` starts
    /// before Jiff's minimum supported date.
    pub(crate) fn from_date(start: Weekday, date: Date) -> Option<WeekDate> {
        let mut start_of_year = week_start_of_year(start, date.year())?;
        if date < start_of_year {
            start_of_year = week_start_of_year(start, date.year() - 1)?;
        } else if let Some(next) = date
            .year()
            .checked_add(1)
            .and_then(|next| week_start_of_year(start, next))
        {
            // Fails only in year 9999, where `date` can never reach the
            // start of the following week year anyway.
            if date >= next {
                start_of_year = next;
            }
        }

        let days = start_of_year.until(date).ok()?.get_days();
        // +1 because weeks are one-indexed. A week year never has more than
        // 53 weeks, so this always fits.
        let week = i8::try_from(days / 7).ok()? + 1;
        // The Gregorian year 3 days after the first day of a week year is
        // always the week year itself.
        let year = start_of_year.checked_add(3.days()).ok()?.year();
        Some(WeekDate { start, year, week, weekday: date.weekday() })
    }

    /// The week numbering year. Near the start or end of a Gregorian year,
    /// this can differ from the Gregorian year of the date.
    pub(crate) fn year(self) -> i16 {
        self.year
    }

    /// The one-indexed week number, in the range `1..=53`.
    pub(crate) fn week(self) -> i8 {
        self.week
    }

    /// The week number counted from the end of the week year, where `-1`
    /// is the last week.
    pub(crate) fn week_from_end(self) -> i8 {
        self.week - 1 - self.weeks_in_year()
    }

    /// Returns the number of weeks in the week year of this week date.
    pub(crate) fn weeks_in_year(self) -> i8 {
        if is_long_year(self.start, self.year) { 53 } else { 52 }
    }
}

/// Returns the first day of the week containing `date`, for weeks that
/// start on `start`.
pub(crate) fn first_of_week(start: Weekday, date: Date) -> Option<Date> {
    let back = date.weekday().since(start);
    date.checked_sub(i32::from(back).days()).ok()
}

/// Returns the last day of the week containing `date`, for weeks that
/// start on `start`.
pub(crate) fn last_of_week(start: Weekday, date: Date) -> Option<Date> {
    let last = start.wrapping_sub(1);
    let ahead = last.since(date.weekday());
    date.checked_add(i32::from(ahead).days()).ok()
}

/// Returns true when the week year `year` (weeks starting on `start`) has
/// 53 weeks instead of 52.
fn is_long_year(start: Weekday, year: i16) -> bool {
    // Inspired by: https://en.wikipedia.org/wiki/ISO_week_date#Weeks_per_year
    let Ok(last) = Date::new(year, 12, 31) else { return false };
    let weekday = last.weekday();
    weekday == start.wrapping_add(3)
        || (last.in_leap_year() && weekday == start.wrapping_add(4))
}

/// Returns the first date of the first week of `year`.
///
/// The date returned always falls on `start`.
fn week_start_of_year(start: Weekday, year: i16) -> Option<Date> {
    // RFC 5545 says:
    //
    // > A week is defined as a seven day period, starting on the day of the
    // > week defined to be the week start (see WKST). Week number one of the
    // > calendar year is the first week that contains at least four (4) days
    // > in that calendar year.
    //
    // Which means that Jan 4 is always in the first week of the year.
    let jan4 = Date::new(year, 1, 4).ok()?;
    first_of_week(start, jan4)
}

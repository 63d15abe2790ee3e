use crate::{
    error::ConfigurationError,
    expand::{Expander, PeriodSeeds},
    rule::{RecurrenceRule, Termination},
    temporal::{Frame, Temporal},
};

/// Every value generated by a rule, period after period, in order.
///
/// At most one period is buffered at a time. Values not strictly after the
/// previously produced value are dropped, which removes duplicates between
/// periods.
#[derive(Clone, Debug)]
struct Sequence {
    expander: Expander,
    seeds: PeriodSeeds,
    frame: Frame,
    /// The values of the current period, in reverse order so that the next
    /// one can be popped off the end.
    buffer: Vec<Temporal>,
    last: Option<Temporal>,
    /// When a period starts after this, no more values can be produced.
    horizon: Option<Temporal>,
    done: bool,
}

impl Sequence {
    fn new(
        rule: RecurrenceRule,
        start: &Temporal,
        horizon: Option<Temporal>,
    ) -> Sequence {
        let seeds = PeriodSeeds::new(&rule, start.datetime());
        let frame = Frame::of(start, rule.frequency());
        Sequence {
            expander: Expander::new(rule, start),
            seeds,
            frame,
            buffer: vec![],
            last: None,
            horizon,
            done: false,
        }
    }

    /// Loads the values of the next period into the buffer.
    ///
    /// Returns false when there are no more periods.
    fn refill(&mut self) -> bool {
        let Some(seed) = self.seeds.next() else { return false };
        // This isn't needed for correctness, since the terminator stops at
        // the end of a recurrence anyway. But when most periods are empty
        // (say, February 30), this is what bounds the amount of work done.
        if let Some(ref horizon) = self.horizon {
            let floor = self.seeds.floor(seed);
            match self.frame.latest(floor) {
                Some(ref first) if first <= horizon => {}
                _ => return false,
            }
        }
        if !self.expander.day_matches(seed.date()) {
            // Without this, a sub-daily rule that can never match would
            // visit every second (say) until the end of Jiff's range.
            let next_day = seed
                .date()
                .tomorrow()
                .map(|date| date.to_datetime(jiff::civil::Time::midnight()));
            match next_day {
                Ok(dt) => self.seeds.skip_to(dt),
                Err(_) => return false,
            }
            self.buffer.clear();
            return true;
        }
        let mut set = self.expander.expand(seed);
        set.reverse();
        self.buffer = set;
        true
    }
}

impl Iterator for Sequence {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        while !self.done {
            let Some(next) = self.buffer.pop() else {
                self.done = !self.refill();
                continue;
            };
            if self.last.as_ref().is_some_and(|last| next <= *last) {
                continue;
            }
            self.last = Some(next.clone());
            return Some(next);
        }
        None
    }
}

/// An iterator over the occurrences of a recurrence rule.
///
/// This is created by [`RecurrenceRule::iter`] or
/// [`RecurrenceRule::iter_from`]. Occurrences are strictly increasing and
/// have the same kind as the start value.
#[derive(Clone, Debug)]
pub struct Occurrences {
    seq: Sequence,
    anchor: Temporal,
    until: Option<Temporal>,
    remaining: Option<u32>,
    resume: Option<Temporal>,
    done: bool,
}

impl Occurrences {
    pub(crate) fn new(
        rule: RecurrenceRule,
        start: Temporal,
        resume: Option<Temporal>,
    ) -> Result<Occurrences, ConfigurationError> {
        let convert = |what: &str, t: &Temporal, end_of_day: bool| {
            t.to_kind_of(&start, end_of_day).map_err(|err| {
                ConfigurationError::new(vec![format!(
                    "could not convert {what} value `{t}` to the kind of \
                     start value `{start}`: {err}",
                )])
            })
        };
        let (until, remaining) = match *rule.termination() {
            Termination::Unbounded => (None, None),
            Termination::Count(count) => (None, Some(count)),
            // A date-only UNTIL includes the whole day.
            Termination::Until(ref until) => {
                (Some(convert("'until'", until, true)?), None)
            }
        };
        let resume = match resume {
            None => None,
            Some(ref resume) => Some(convert("resume", resume, false)?),
        };
        log::debug!(
            "expanding `{rule}` from {start} \
             (until: {until:?}, count: {remaining:?}, resume: {resume:?})",
        );
        Ok(Occurrences {
            seq: Sequence::new(rule, &start, until.clone()),
            anchor: start,
            until,
            remaining,
            resume,
            done: false,
        })
    }
}

impl Iterator for Occurrences {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        while !self.done && self.remaining != Some(0) {
            let Some(next) = self.seq.next() else { break };
            // The first period may generate values before the anchor.
            if next < self.anchor {
                continue;
            }
            if self.until.as_ref().is_some_and(|until| next > *until) {
                break;
            }
            if let Some(ref mut remaining) = self.remaining {
                *remaining -= 1;
            }
            // Skipped, but still counted.
            if self.resume.as_ref().is_some_and(|resume| next < *resume) {
                continue;
            }
            return Some(next);
        }
        self.done = true;
        None
    }
}

impl std::iter::FusedIterator for Occurrences {}

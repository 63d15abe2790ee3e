use std::ffi::OsStr;

use recur::{RecurrenceRule, Temporal};


/// Return a command for the `recur` binary with no arguments.
fn recur_bare() -> crate::command::Command {
    crate::command::bin("recur")
        .env("TZ", "America/New_York")
        .env("RECUR_LOG", "off")
        .env("NO_COLOR", "1")
}

/// Return a command for the `recur` binary with the given arguments appended
/// to it.
fn recur<T: AsRef<OsStr>>(
    args: impl IntoIterator<Item = T>,
) -> crate::command::Command {
    recur_bare().args(args)
}

/// Parses a rule, panicking on failure.
fn rule(s: &str) -> RecurrenceRule {
    s.parse().unwrap()
}

/// Parses a temporal value, panicking on failure.
fn temporal(s: &str) -> Temporal {
    s.parse().unwrap()
}

/// Expands `rule` from `start` and returns at most `limit` occurrences,
/// one per line.
fn seq(rule: &str, start: &str, limit: usize) -> String {
    crate::rule(rule)
        .iter(&crate::temporal(start))
        .unwrap()
        .take(limit)
        .map(|t| t.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

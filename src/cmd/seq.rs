use std::io::Write;

use {anyhow::Context, recur::Temporal};

use crate::{
    args::{
        self, Usage,
        positional::{Rules, Start},
    },
    style::Theme,
};

const USAGE: &'static str = r#"
Print the occurrences of an RFC 5545 recurrence rule.

Occurrences are printed one per line, in chronological order and without
duplicates. Each occurrence has the same kind as <start>: a date, a datetime
or a datetime in a time zone.

Unless the rule has a `COUNT` or `UNTIL` part, or the `-n/--limit` flag is
given, occurrences are generated until the maximum supported datetime is
reached. Piping into `head` works too.

The problems `recur check` would report for <rule> and <start> are printed
to stderr as warnings. They don't stop the rule from being expanded.

USAGE:
    recur seq <rule> <start>

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Print the last Sunday of the next three months:

        $ recur seq 'FREQ=MONTHLY;COUNT=3;BYDAY=-1SU' 1997-09-28T09:00[America/New_York]
        1997-09-28T09:00:00-04:00[America/New_York]
        1997-10-26T09:00:00-05:00[America/New_York]
        1997-11-30T09:00:00-05:00[America/New_York]

    %snip-start%

    Find the last work day of each month:

        $ recur seq -n4 'FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1' 2016-06-30
        2016-06-30
        2016-07-29
        2016-08-31
        2016-09-30

    Resume a long running sequence without changing which occurrences
    count towards `COUNT`:

        $ recur seq --after 1997-09-09 'FREQ=DAILY;COUNT=10' 1997-09-02T09:00
        1997-09-09T09:00:00
        1997-09-10T09:00:00
        1997-09-11T09:00:00

    %snip-end%
REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    let mut rules = Rules::one();
    let mut start = Start::required();
    args::configure(p, USAGE, &mut [&mut config, &mut rules, &mut start])?;

    let rule = rules.first()?;
    let start = start.get()?.context("missing required <start>")?;
    let occurrences = match config.after {
        None => rule.iter(start),
        Some(ref after) => rule.iter_from(start, after),
    }
    .with_context(|| format!("cannot expand `{rule}` from `{start}`"))?;
    let theme = Theme::stderr();
    for warning in rule.check_start(start) {
        eprintln!("{}: {warning}", theme.warning("warning"));
    }

    let mut wtr = std::io::stdout().lock();
    for t in occurrences.take(config.limit.unwrap_or(usize::MAX)) {
        writeln!(wtr, "{t}")?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    limit: Option<usize>,
    after: Option<Temporal>,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Short('n') | Long("limit") => {
                self.limit = Some(args::parse(p, "-n/--limit")?);
            }
            Long("after") => {
                self.after = Some(args::parse(p, "--after")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const LIMIT: Usage = Usage::flag(
            "-n/--limit <number>",
            "Print at most this many occurrences.",
            r#"
Print at most this many occurrences.

This is applied after the rule's own `COUNT` or `UNTIL`, so it can only make
the output shorter. When used with `--after`, only printed occurrences are
limited.
"#,
        );
        const AFTER: Usage = Usage::flag(
            "--after <datetime>",
            "Skip occurrences before this point.",
            r#"
Skip occurrences before this point.

Skipped occurrences still count towards the rule's `COUNT`. So the output
is always a suffix of the output without this flag.

This may be a date, a datetime or a datetime in a time zone. It is converted
to the kind of <start> before comparing. For example, a date is taken as
midnight at the start of that day.
"#,
        );
        &[LIMIT, AFTER]
    }
}

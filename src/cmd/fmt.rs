use std::io::Write;

use crate::args::{self, positional::Rules};

const USAGE: &'static str = r#"
Print recurrence rules in canonical form.

Each rule is parsed and printed back on its own line. In canonical form, part
names are upper case and appear in a fixed order: `FREQ`, `INTERVAL`, `WKST`,
`COUNT` or `UNTIL`, and then BY rules in the order RFC 5545 applies them.
Values within each BY rule are sorted and deduplicated. `INTERVAL=1` is
omitted.

Printing a rule in canonical form and parsing it again always produces the
same rule.

USAGE:
    recur fmt <rule> ...

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Normalize a hand written rule:

        $ recur fmt 'byday=su,sa;freq=monthly;bymonthday=13,7,8'
        FREQ=MONTHLY;BYMONTHDAY=7,8,13;BYDAY=SA,SU

REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut rules = Rules::many();
    args::configure(p, USAGE, &mut [&mut rules])?;

    let mut wtr = std::io::stdout().lock();
    for rule in rules.get()? {
        writeln!(wtr, "{rule}")?;
    }
    wtr.flush()?;
    Ok(())
}

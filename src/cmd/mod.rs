mod check;
mod fmt;
mod seq;

const USAGE: &'static str = "\
Expand, normalize and check RFC 5545 recurrence rules.

USAGE:
    recur <command> ...

COMMANDS:
    check  Report likely mistakes in a recurrence rule
    fmt    Print recurrence rules in canonical form
    seq    Print the occurrences of a recurrence rule
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    log::trace!("running command `{cmd}`");
    match &*cmd {
        "check" => check::run(p),
        "fmt" => fmt::run(p),
        "seq" => seq::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}

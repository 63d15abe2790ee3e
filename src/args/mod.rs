use std::{
    ffi::OsStr,
    fmt::{Debug, Display, Write},
    str::FromStr,
    sync::LazyLock,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
    regex::Regex,
};

pub mod positional;

/// Something that knows how to consume some of a command's arguments.
///
/// A command is configured from a list of these. Each argument is offered
/// to every target in turn until one of them accepts it.
pub trait Configurable: Debug {
    /// Returns true if `arg` was consumed by this target.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    /// The docs for the flags and arguments this target accepts.
    fn usage(&self) -> &[Usage] {
        &[]
    }
}

/// Feeds every remaining argument in `p` to `targets`.
///
/// `-h` and `--help` are handled here by returning a [`Help`] error built
/// from `usage`. In `usage`, `%args%` and `%flags%` are replaced with the
/// docs of the targets, and everything between a `%snip-start%` line and a
/// `%snip-end%` line only appears in the long (`--help`) output.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    /// Removes the `%snip-start%` ... `%snip-end%` blocks, markers included,
    /// for the short docs.
    static REMOVE_SNIPS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^\s*%snip-start%\p{any}*?%snip-end%\s*$").unwrap()
    });

    /// Removes only the markers, for the long docs.
    static REMOVE_SNIP_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^\s*%snip-(start|end)%\s*$").unwrap()
    });

    while let Some(arg) = p.next()? {
        match arg {
            Arg::Short('h') | Arg::Long("help") => {
                let long = arg == Arg::Long("help");
                let args = collect_usage(targets, false);
                let flags = collect_usage(targets, true);
                let (usage, args, flags) = if long {
                    let usage = REMOVE_SNIP_MARKERS.replace_all(usage, "");
                    (usage, Usage::long(&args), Usage::long(&flags))
                } else {
                    let usage = REMOVE_SNIPS.replace_all(usage, "");
                    (usage, Usage::short(&args), Usage::short(&flags))
                };
                let usage =
                    usage.replace("%args%", &args).replace("%flags%", &flags);
                return Err(anyhow::Error::from(Help(
                    usage.trim().to_string(),
                )));
            }
            Arg::Long("version") => return Err(anyhow::Error::from(Version)),
            _ => {}
        }
        // The long flag name borrows from `p`, but targets need `p` mutably
        // to read flag values. So give the name a home of its own.
        let long_flag: Option<String> = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match (long_flag.as_deref(), arg) {
            (Some(flag), _) => Arg::Long(flag),
            (None, Arg::Short(c)) => Arg::Short(c),
            (None, Arg::Value(value)) => Arg::Value(value),
            (None, Arg::Long(_)) => unreachable!(),
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

/// Collects the docs for either the flags or the positional arguments.
///
/// Flags are sorted by their long name. Positional arguments keep the order
/// in which they must be given.
fn collect_usage(targets: &[&mut dyn Configurable], flag: bool) -> Vec<Usage> {
    let mut usages = vec![];
    if flag {
        usages.extend([Help::USAGE, Version::USAGE]);
    }
    for t in targets.iter() {
        usages.extend(t.usage().iter().copied().filter(|u| u.flag == flag));
    }
    if flag {
        usages.sort_by_key(|u| {
            u.format
                .split_once(", ")
                .map(|(_, long)| long)
                .unwrap_or(u.format)
                .trim_start_matches('-')
        });
    }
    usages
}

/// Parses the next argument in `p` as a command name.
///
/// When there are no more arguments, the usage is returned as an error.
/// `-h/--help` and `--version` are handled as in [`configure`].
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let arg = match p.next()? {
        Some(arg) => arg,
        None => anyhow::bail!("{}", usage),
    };
    let cmd = match arg {
        Arg::Value(cmd) => cmd.string()?,
        Arg::Short('h') | Arg::Long("help") => {
            return Err(anyhow::Error::from(Help(usage.to_string())));
        }
        Arg::Long("version") => return Err(anyhow::Error::from(Version)),
        arg => return Err(arg.unexpected().into()),
    };
    Ok(cmd)
}

/// Parses the value of the flag just seen by `p` into a `T`.
///
/// Any error messages will include the given flag name in them.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let osv = p.value().context(flag_name)?;
    parse_value(&osv, flag_name)
}

/// Parses a flag value or positional argument into a `T`.
///
/// Only the `Display` output of a parse error is kept, since the error types
/// parsed here already describe their causes in full.
pub fn parse_value<T>(osv: &OsStr, name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let Some(strv) = osv.to_str() else {
        let err = lexopt::Error::NonUnicodeValue(osv.to_os_string());
        return Err(anyhow::Error::from(err).context(name));
    };
    strv.parse().map_err(|err| anyhow::Error::msg(err).context(name))
}

/// The documentation of a single flag or positional argument.
///
/// [`Usage::short`] and [`Usage::long`] render a list of these into the
/// `%args%` and `%flags%` sections of a command's help output.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// Whether this is a flag (optional) or an argument (required).
    pub flag: bool,
    /// For example, `-n, --limit <number>`.
    pub format: &'static str,
    /// A one line description.
    pub short: &'static str,
    /// A description that may span several paragraphs.
    pub long: &'static str,
}

impl Usage {
    pub const fn flag(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: true, format, short, long }
    }

    pub const fn arg(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: false, format, short, long }
    }

    /// Formats a two column table of formats and short descriptions.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let Some(max_len) = usages.iter().map(|u| u.format.len()).max() else {
            return result;
        };
        for usage in usages.iter() {
            let padding = " ".repeat(MIN_SPACE + max_len - usage.format.len());
            // Writing to a `String` never fails.
            let _ = writeln!(
                result,
                "    {}{}{}",
                usage.format, padding, usage.short
            );
        }
        result
    }

    /// Formats each usage followed by its long description, wrapped and
    /// indented below it.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            let _ = writeln!(result, "    {}", usage.format);
            for (j, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if j > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace('\n', " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}

/// The error returned for `-h/--help`.
///
/// `main` sniffs this out and prints it to stdout with a success exit code.
#[derive(Debug)]
pub struct Help(String);

impl Help {
    const USAGE: Usage = Usage::flag(
        "-h/--help",
        "Print the help output.",
        r#"
Print the help output.

The short flag, -h, shows one line per flag. The long flag, --help, shows the
complete documentation, including additional examples.
"#,
    );
}

impl std::fmt::Display for Help {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Help {}

/// The error returned for `--version`.
///
/// Like [`Help`], this is printed to stdout with a success exit code.
#[derive(Debug)]
pub struct Version;

impl Version {
    const USAGE: Usage = Usage::flag(
        "--version",
        "Print the version of recur.",
        "Print the version of recur.",
    );
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let semver = option_env!("CARGO_PKG_VERSION").unwrap_or("N/A");
        match option_env!("RECUR_BUILD_GIT_HASH") {
            None => write!(f, "recur {semver}"),
            Some(hash) => write!(f, "recur {semver} (rev {hash})"),
        }
    }
}

impl std::error::Error for Version {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Config {
        limit: Option<usize>,
        values: Vec<String>,
    }

    impl Configurable for Config {
        fn configure(
            &mut self,
            p: &mut Parser,
            arg: &mut Arg,
        ) -> anyhow::Result<bool> {
            match *arg {
                Arg::Short('n') | Arg::Long("limit") => {
                    self.limit = Some(parse(p, "-n/--limit")?);
                }
                Arg::Value(ref v) => {
                    self.values.push(v.clone().string()?);
                }
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn usage(&self) -> &[Usage] {
            const LIMIT: Usage = Usage::flag(
                "-n/--limit <number>",
                "Stop early.",
                "Stop early.",
            );
            const VALUE: Usage =
                Usage::arg("<value>", "Any value.", "Any value.");
            &[LIMIT, VALUE]
        }
    }

    fn config(args: &[&str]) -> anyhow::Result<Config> {
        let mut p = Parser::from_args(args.iter().copied());
        let mut config = Config::default();
        configure(&mut p, "USAGE\n%args%\n%flags%", &mut [&mut config])?;
        Ok(config)
    }

    #[test]
    fn flags_and_values() {
        let c = config(&["a", "-n", "5", "b"]).unwrap();
        assert_eq!(c.limit, Some(5));
        assert_eq!(c.values, vec!["a", "b"]);

        let c = config(&["--limit=3"]).unwrap();
        assert_eq!(c.limit, Some(3));
    }

    #[test]
    fn errors() {
        let err = config(&["-x"]).unwrap_err();
        insta::assert_snapshot!(format!("{err:#}"), @"invalid option '-x'");

        let err = config(&["-n", "lots"]).unwrap_err();
        insta::assert_snapshot!(
            format!("{err:#}"),
            @"-n/--limit: invalid digit found in string",
        );
    }

    #[test]
    fn short_help() {
        let err = config(&["-h"]).unwrap_err();
        let help = err.downcast_ref::<Help>().unwrap();
        insta::assert_snapshot!(help.to_string(), @r"
        USAGE
            <value>  Any value.

            -h/--help            Print the help output.
            -n/--limit <number>  Stop early.
            --version            Print the version of recur.
        ");
    }

    #[test]
    fn snips() {
        let usage = "USAGE\n\n%snip-start%\nlong only\n%snip-end%\n%args%";
        let help = |flag: &str| {
            let mut p = Parser::from_args([flag]);
            let mut config = Config::default();
            let err =
                configure(&mut p, usage, &mut [&mut config]).unwrap_err();
            err.downcast_ref::<Help>().unwrap().to_string()
        };
        insta::assert_snapshot!(help("-h"), @r"
        USAGE

            <value>  Any value.
        ");
        insta::assert_snapshot!(help("--help"), @r"
        USAGE

        long only

            <value>
                Any value.
        ");
    }
}

use std::{
    fmt::Display,
    io::IsTerminal,
    sync::{Arc, LazyLock},
};

use anstyle::{AnsiColor, Style};

/// The styles used for `recur`'s output.
///
/// A theme is either fully styled or not styled at all. It's unstyled when
/// the stream isn't a tty, or when colors are disabled via `NO_COLOR` or
/// `TERM=dumb`.
#[derive(Clone, Debug)]
pub struct Theme {
    inner: Option<Arc<ThemeInner>>,
}

impl Theme {
    /// Returns a theme for stdout.
    pub fn stdout() -> &'static Theme {
        static THEME: LazyLock<Theme> =
            LazyLock::new(|| Theme::new(std::io::stdout().is_terminal()));
        &*THEME
    }

    /// Returns a theme for stderr.
    pub fn stderr() -> &'static Theme {
        static THEME: LazyLock<Theme> =
            LazyLock::new(|| Theme::new(std::io::stderr().is_terminal()));
        &*THEME
    }

    fn new(tty: bool) -> Theme {
        if !tty || !can_use_colors() {
            return Theme { inner: None };
        }
        Theme { inner: Some(Arc::new(ThemeInner::default())) }
    }

    /// Used for log timestamps.
    pub fn highlight<T: Display>(&self, data: T) -> Styled<'_, T> {
        Styled { data, style: self.inner.as_deref().map(|i| &i.highlight) }
    }

    /// Used for the problems reported by `recur check`.
    pub fn warning<T: Display>(&self, data: T) -> Styled<'_, T> {
        Styled { data, style: self.inner.as_deref().map(|i| &i.warning) }
    }

    /// Used when `recur check` finds nothing wrong.
    pub fn ok<T: Display>(&self, data: T) -> Styled<'_, T> {
        Styled { data, style: self.inner.as_deref().map(|i| &i.ok) }
    }
}

#[derive(Debug)]
struct ThemeInner {
    highlight: Style,
    warning: Style,
    ok: Style,
}

impl Default for ThemeInner {
    fn default() -> ThemeInner {
        ThemeInner {
            highlight: Style::new()
                .bold()
                .fg_color(Some(AnsiColor::Magenta.into())),
            warning: Style::new()
                .bold()
                .fg_color(Some(AnsiColor::Yellow.into())),
            ok: Style::new().fg_color(Some(AnsiColor::Green.into())),
        }
    }
}

/// A possibly unstyled piece of renderable data.
#[derive(Clone, Debug)]
pub struct Styled<'s, T> {
    data: T,
    style: Option<&'s Style>,
}

impl<'s, T: Display> Display for Styled<'s, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let Some(style) = self.style else {
            return self.data.fmt(f);
        };
        write!(f, "{style}{}{style:#}", self.data)
    }
}

/// Whether colors have been globally disabled or not.
fn can_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    std::env::var_os("TERM").map_or(true, |v| v != "dumb")
}

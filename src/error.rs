/// An error that occurs when a recurrence rule is malformed.
///
/// This error collects every problem found with a rule instead of stopping
/// at the first one. The `Display` implementation joins all of them.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{}", .violations.join("; "))]
pub struct ConfigurationError {
    violations: Vec<String>,
}

impl ConfigurationError {
    pub(crate) fn new(violations: Vec<String>) -> ConfigurationError {
        debug_assert!(!violations.is_empty());
        ConfigurationError { violations }
    }

    /// Returns each individual problem found, in the order they were found.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

/// An error that occurs when parsing the text form of a recurrence rule.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("recurrence rule is missing the required `FREQ` part")]
    MissingFrequency,
    #[error("recurrence rule part `{0}` is not of the form `NAME=VALUE`")]
    Malformed(String),
    #[error("unrecognized recurrence rule part `{0}`")]
    UnknownPart(String),
    #[error("recurrence rule part `{0}` occurs more than once")]
    DuplicatePart(String),
    #[error("invalid value `{value}` for `{part}`: {reason}")]
    InvalidValue { part: &'static str, value: String, reason: String },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

use std::error::Error as StdError;
use std::fmt;

/// Returned when process configuration could not be read.
#[derive(Clone, PartialEq, Eq)]
#[must_use = "error must be handled"]
pub struct ConfigError {
    key: &'static str,
    value: String,
    expected: &'static str,
}

impl ConfigError {
    pub(crate) fn new(key: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            key,
            value: value.into(),
            expected,
        }
    }

    /// The name of the offending setting.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// The value that was rejected.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigError")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("expected", &self.expected)
            .finish()
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value {:?} for {}: expected one of {}",
            self.value, self.key, self.expected
        )
    }
}

impl StdError for ConfigError {}

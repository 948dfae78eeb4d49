use std::error::Error as StdError;
use std::fmt;

/// The error raised by an [`Asserter`] configured to transport failures as
/// errors.
///
/// [`Asserter`]: crate::Asserter
#[derive(Clone, PartialEq, Eq)]
#[must_use = "error must be handled"]
pub struct AssertionError {
    message: String,
}

impl AssertionError {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    /// The full message, including any caller information.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AssertionError").field(&self.message).finish()
    }
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for AssertionError {}

use std::error::Error as StdError;
use std::fmt;

use crate::signal::FaultKind;

/// A fault or foreign signal that a panic handler chose to turn into an
/// ordinary error.
///
/// See [`Signal::to_error()`](crate::Signal::to_error).
#[derive(Clone, PartialEq, Eq)]
#[must_use = "error must be handled"]
pub struct PanicError {
    message: String,
    fault: Option<FaultKind>,
}

impl PanicError {
    pub(crate) fn new(message: String, fault: Option<FaultKind>) -> Self {
        Self { message, fault }
    }

    /// The message carried by the original signal.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The kind of fault, if the signal was a host runtime fault.
    pub fn fault(&self) -> Option<FaultKind> {
        self.fault
    }
}

impl fmt::Debug for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicError")
            .field("message", &self.message)
            .field("fault", &self.fault)
            .finish()
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fault {
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => write!(f, "panic: {}", self.message),
        }
    }
}

impl StdError for PanicError {}

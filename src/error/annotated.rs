use std::error::Error as StdError;
use std::fmt;

use super::BoxError;

/// An error with a message prefixed to an inner error.
///
/// The inner error is kept as the [`source()`](StdError::source) so the
/// original error can still be walked to.
///
/// # Example
///
/// ```
/// use rescue::error::{Annotated, BoxError};
///
/// let error = Annotated::new("copy failed", BoxError::from("file not found"));
///
/// assert_eq!(error.to_string(), "copy failed: file not found");
/// ```
#[must_use = "error must be handled"]
pub struct Annotated {
    context: String,
    source: BoxError,
}

impl Annotated {
    /// Create a new `Annotated` error.
    pub fn new(context: impl Into<String>, source: BoxError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }

    /// The message prefixed to the inner error.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Consumes `self`, returning the inner error.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl fmt::Debug for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotated")
            .field("context", &self.context)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl StdError for Annotated {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

//! The unified signaling channel.
//!
//! Errors are raised by unwinding with a [`Raised`] payload. A recovery
//! point catches whatever unwinds through it and classifies it as a
//! [`Signal`]:
//!
//! - [`Signal::Absent`] when nothing unwound.
//! - [`Signal::Recoverable`] when the payload was produced by [`raise()`].
//! - [`Signal::Fault`] when the payload is a fault detected by the Rust
//!   runtime, such as an out of bounds index or an arithmetic overflow.
//! - [`Signal::Foreign`] for everything else.

use std::any::Any;
use std::fmt;
use std::panic;

use crate::error::{BoxError, PanicError};
use crate::hook;
use crate::trace::Trace;
use crate::tracer::Category;

/// The payload of an unwinding raised by [`raise()`].
pub struct Raised {
    error: BoxError,
    trace: Option<Trace>,
}

impl Raised {
    /// The raised error.
    pub fn error(&self) -> &BoxError {
        &self.error
    }

    /// The trace captured when the error was raised, if any.
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Consumes `self`, returning the error and the captured trace.
    pub fn into_parts(self) -> (BoxError, Option<Trace>) {
        (self.error, self.trace)
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raised")
            .field("error", &self.error)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

///////////////////////////////////////////////////////////////////////////////
// Faults

/// A class of fault detected by the Rust runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FaultKind {
    /// Indexing past the end of a slice or collection.
    IndexOutOfBounds,
    /// An invalid slice range or string byte index.
    SliceRange,
    /// Arithmetic overflow in a checked build.
    Overflow,
    /// Division or remainder by zero.
    DivideByZero,
    /// `Option::unwrap()` on `None`.
    UnwrapNone,
    /// `Result::unwrap()` on `Err`.
    ///
    /// `Result::expect()` panics with the caller's message instead of a
    /// runtime one, so it classifies as [`Signal::Foreign`].
    UnwrapErr,
    /// A conflicting `RefCell` borrow.
    BorrowConflict,
    /// Code marked unreachable was reached.
    Unreachable,
}

impl FaultKind {
    /// Detect the fault a runtime panic message describes.
    pub fn detect(message: &str) -> Option<Self> {
        let kind = if message.starts_with("index out of bounds") {
            Self::IndexOutOfBounds
        } else if message.starts_with("range start index")
            || message.starts_with("range end index")
            || message.starts_with("slice index starts at")
            || message.starts_with("byte index")
        {
            Self::SliceRange
        } else if message.starts_with("attempt to divide by zero")
            || message.starts_with("attempt to calculate the remainder with a divisor of zero")
        {
            Self::DivideByZero
        } else if message.starts_with("attempt to ") && message.ends_with("with overflow") {
            Self::Overflow
        } else if message.starts_with("called `Option::unwrap()` on a `None` value") {
            Self::UnwrapNone
        } else if message.starts_with("called `Result::unwrap()` on an `Err` value") {
            Self::UnwrapErr
        } else if message.starts_with("already borrowed") || message.starts_with("already mutably borrowed") {
            Self::BorrowConflict
        } else if message.starts_with("internal error: entered unreachable code") {
            Self::Unreachable
        } else {
            return None;
        };
        Some(kind)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IndexOutOfBounds => "index out of bounds",
            Self::SliceRange => "invalid slice range",
            Self::Overflow => "arithmetic overflow",
            Self::DivideByZero => "divide by zero",
            Self::UnwrapNone => "unwrap on none",
            Self::UnwrapErr => "unwrap on error",
            Self::BorrowConflict => "borrow conflict",
            Self::Unreachable => "unreachable code",
        })
    }
}

///////////////////////////////////////////////////////////////////////////////
// Signal

/// What a recovery point caught.
pub enum Signal {
    /// Nothing was raised.
    Absent,
    /// An error raised with [`raise()`].
    Recoverable(Raised),
    /// A fault detected by the Rust runtime. Never absorbed unless a panic
    /// handler accepts it.
    Fault {
        /// The class of fault.
        kind: FaultKind,
        /// The original payload, re-raised unchanged if unhandled.
        payload: Box<dyn Any + Send>,
    },
    /// Any other panic payload.
    Foreign(Box<dyn Any + Send>),
}

impl Signal {
    /// Classify a payload caught by `std::panic::catch_unwind`.
    pub fn classify(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Raised>() {
            Ok(raised) => return Self::Recoverable(*raised),
            Err(payload) => payload,
        };
        match payload_message(payload.as_ref()).and_then(FaultKind::detect) {
            Some(kind) => Self::Fault { kind, payload },
            None => Self::Foreign(payload),
        }
    }

    /// Returns `true` if nothing was raised.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` for faults and foreign signals.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Fault { .. } | Self::Foreign(_))
    }

    /// The fault kind, if this is a fault.
    pub fn fault(&self) -> Option<FaultKind> {
        match self {
            Self::Fault { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The string form of what was raised, if it has one.
    ///
    /// Foreign payloads other than `&str` and `String` have no string form.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Recoverable(raised) => Some(raised.error.to_string()),
            Self::Fault { payload, .. } | Self::Foreign(payload) => {
                payload_message(payload.as_ref()).map(str::to_owned)
            }
        }
    }

    /// Convert a fault or foreign signal into an ordinary error.
    ///
    /// Returns `None` for absent and recoverable signals.
    pub fn to_error(&self) -> Option<PanicError> {
        if !self.is_panic() {
            return None;
        }
        let message = self.message().unwrap_or_else(|| String::from("Box<dyn Any>"));
        Some(PanicError::new(message, self.fault()))
    }

    /// Continue unwinding with the original payload.
    ///
    /// Does nothing if the signal is absent.
    pub fn resume(self) {
        if let Some(payload) = self.into_payload() {
            panic::resume_unwind(payload)
        }
    }

    fn into_payload(self) -> Option<Box<dyn Any + Send>> {
        match self {
            Self::Absent => None,
            Self::Recoverable(raised) => Some(Box::new(raised)),
            Self::Fault { payload, .. } | Self::Foreign(payload) => Some(payload),
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Recoverable(raised) => f.debug_tuple("Recoverable").field(raised).finish(),
            Self::Fault { kind, .. } => f
                .debug_struct("Fault")
                .field("kind", kind)
                .field("message", &self.message())
                .finish(),
            Self::Foreign(_) => f.debug_tuple("Foreign").field(&self.message()).finish(),
        }
    }
}

pub(crate) fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some(*message)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

///////////////////////////////////////////////////////////////////////////////
// Raising

/// Raise a recoverable error through the signaling channel.
///
/// The error unwinds to the closest recovery point, where the error handlers
/// decide what it resolves to. A trace is captured first if an error tracer
/// is registered or an enclosing recovery point prints to its own sink.
///
/// # Example
///
/// ```
/// let result: Result<(), _> = rescue::catch(|| rescue::raise("file not found"));
///
/// assert_eq!(result.unwrap_err().to_string(), "file not found");
/// ```
#[inline(never)]
pub fn raise<E>(error: E) -> !
where
    E: Into<BoxError>,
{
    let trace = if hook::wants_trace(Category::Error) {
        Some(Trace::capture())
    } else {
        None
    };
    panic::panic_any(Raised {
        error: error.into(),
        trace,
    })
}

/// Unwraps a value or raises its error through the signaling channel.
pub trait OrRaise<T> {
    /// Returns the contained value or raises the error.
    fn or_raise(self) -> T;

    /// Returns the contained value or raises the error prefixed with the
    /// message returned by `context`.
    fn or_raise_with<F, C>(self, context: F) -> T
    where
        F: FnOnce() -> C,
        C: fmt::Display;
}

impl<T, E> OrRaise<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn or_raise(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => raise(err),
        }
    }

    fn or_raise_with<F, C>(self, context: F) -> T
    where
        F: FnOnce() -> C,
        C: fmt::Display,
    {
        match self {
            Ok(value) => value,
            Err(err) => raise(crate::error::Annotated::new(context().to_string(), err.into())),
        }
    }
}

impl<T> OrRaise<T> for Option<T> {
    fn or_raise(self) -> T {
        match self {
            Some(value) => value,
            None => raise("missing value"),
        }
    }

    fn or_raise_with<F, C>(self, context: F) -> T
    where
        F: FnOnce() -> C,
        C: fmt::Display,
    {
        match self {
            Some(value) => value,
            None => raise(context().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_runtime_faults() {
        let v: Vec<u8> = Vec::new();
        let caught = panic::catch_unwind(|| v[3]).unwrap_err();
        assert!(matches!(
            Signal::classify(caught),
            Signal::Fault {
                kind: FaultKind::IndexOutOfBounds,
                ..
            }
        ));
        assert_eq!(
            FaultKind::detect("attempt to add with overflow"),
            Some(FaultKind::Overflow)
        );
        assert_eq!(
            FaultKind::detect("attempt to divide by zero"),
            Some(FaultKind::DivideByZero)
        );
        assert_eq!(FaultKind::detect("boom"), None);
    }

    #[test]
    fn test_foreign_payloads() {
        let signal = Signal::classify(Box::new(42_u32));
        assert!(matches!(signal, Signal::Foreign(_)));
        assert_eq!(signal.message(), None);

        let signal = Signal::classify(Box::new("boom"));
        assert_eq!(signal.message().as_deref(), Some("boom"));
        assert_eq!(signal.to_error().unwrap().to_string(), "panic: boom");
    }
}

//! Structured error propagation over unwinding.
//!
//! Errors are raised deep inside a call chain with [`raise()`] and
//! intercepted by a recovery point higher up, where a chain of handlers
//! decides what the error finally resolves to.
//!
//! # Basic usage
//!
//! ```rust
//! use rescue::{handler, OrRaise, Recovery};
//!
//! fn read_port(text: &str) -> Result<u16, rescue::BoxError> {
//!     Recovery::new()
//!         .on_error(handler::annotate("invalid port"))
//!         .run(|| Ok(text.trim().parse::<u16>().or_raise()))
//! }
//!
//! assert_eq!(read_port("8080").unwrap(), 8080);
//! assert_eq!(
//!     read_port("http").unwrap_err().to_string(),
//!     "invalid port: invalid digit found in string",
//! );
//! ```
//!
//! # What gets caught
//!
//! A recovery point classifies what unwound through it as a [`Signal`].
//! Raised errors go to the error handlers. Faults detected by the Rust
//! runtime and any other panic go to the panic handler, and when there is
//! none they keep unwinding untouched. Nothing is ever absorbed silently.
//!
//! # Traces
//!
//! When a sink is registered with [`tracer::set_tracer()`], every recovered
//! error or panic is printed with a stack trace cut down to the frames that
//! matter to the caller. See [`trace::filter()`].
//!
//! # Caveats
//!
//! Unwinding is the transport, so builds with `panic = "abort"` terminate
//! on the first raised error.

#![deny(
    unsafe_code,
    unused_qualifications,
    clippy::pedantic
)]
#![forbid(
    anonymous_parameters,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_extern_crates,
    unused_import_braces,
    unused_results,
    warnings
)]
#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value
)]

#[macro_use]
mod macros;

mod assert;
mod dispatch;
mod hook;
mod recover;
mod signal;

pub mod config;
pub mod error;
pub mod handler;
pub mod trace;
pub mod tracer;

pub use self::assert::{Asserter, DEFAULT_MESSAGE};
pub use self::dispatch::{Dispatcher, PanicHandler};
pub use self::error::BoxError;
pub use self::handler::{Handler, Noop, Pipeline, Reset};
pub use self::recover::{catch, Recovery, Scope};
pub use self::signal::{raise, FaultKind, OrRaise, Raised, Signal};
pub use self::trace::{StackInfo, Trace};
pub use self::tracer::{Category, Sink};

pub use self::assert::that;

//! The recovery dispatcher.
//!
//! [`Dispatcher::process()`] takes what a recovery point caught and decides
//! the error the recovery point resolves to:
//!
//! | signal        | handler invoked     | without a handler           |
//! |---------------|---------------------|-----------------------------|
//! | `Absent`      | nil handler         | the current error, as is    |
//! | `Recoverable` | error handler       | the raised error            |
//! | `Fault`       | panic handler       | re-raised with its payload  |
//! | `Foreign`     | panic handler       | re-raised with its payload  |
//!
//! The nil handler only runs when the protected code returned an error
//! without raising one. At most one handler runs per dispatch, and a fault
//! or foreign signal is never absorbed unless a panic handler accepts it.
//!
//! A fault or foreign signal is printed by the dispatch whose panic handler
//! takes it. A dispatch that re-raises hands the captured trace on to the
//! next recovery point instead, so a fault is reported once.

use std::fmt;

use crate::config;
use crate::error::BoxError;
use crate::handler::Handler;
use crate::hook;
use crate::signal::Signal;
use crate::trace::{self, StackInfo, Trace};
use crate::tracer::{self, Category, Sink};

/// Decides what a fault or foreign signal resolves to.
///
/// Returning `None` suppresses the signal.
pub trait PanicHandler {
    /// Handle a fault or foreign signal.
    fn handle(&self, signal: &Signal) -> Option<BoxError>;
}

impl<F> PanicHandler for F
where
    F: Fn(&Signal) -> Option<BoxError>,
{
    fn handle(&self, signal: &Signal) -> Option<BoxError> {
        self(signal)
    }
}

/// Routes a [`Signal`] to the handler supplied for it.
///
/// Trace output goes to the explicit sink if one is set, otherwise to the
/// registered tracer for the signal's category. Traces are filtered with the
/// explicit anchor if one is set, otherwise with the anchor from the
/// process configuration.
///
/// The printed trace is the one captured at the failure site: by
/// [`raise()`](crate::raise) for raised errors, by the panic hook for
/// everything else. Nothing is captured unless a tracer is registered or a
/// [`Recovery`](crate::Recovery) with its own sink is active, in which case
/// only the headline is printed.
#[derive(Default, Clone, Copy)]
pub struct Dispatcher<'a> {
    nil_handler: Option<&'a dyn Handler>,
    error_handler: Option<&'a dyn Handler>,
    panic_handler: Option<&'a dyn PanicHandler>,
    trace_sink: Option<&'a dyn Sink>,
    anchor: Option<&'a StackInfo>,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for errors returned without raising.
    #[must_use]
    pub fn nil_handler(mut self, handler: &'a dyn Handler) -> Self {
        self.nil_handler = Some(handler);
        self
    }

    /// Set the handler for raised errors.
    #[must_use]
    pub fn error_handler(mut self, handler: &'a dyn Handler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Set the handler for faults and foreign signals.
    #[must_use]
    pub fn panic_handler(mut self, handler: &'a dyn PanicHandler) -> Self {
        self.panic_handler = Some(handler);
        self
    }

    /// Set the sink traces are printed to, overriding the registered tracers.
    #[must_use]
    pub fn trace_sink(mut self, sink: &'a dyn Sink) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    /// Set the anchor traces are filtered with.
    #[must_use]
    pub fn anchor(mut self, anchor: &'a StackInfo) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Resolve `signal` against the `current` error of the recovery point.
    ///
    /// # Panics
    ///
    /// Re-raises faults and foreign signals, with their original payload,
    /// when no panic handler is set. Nothing is printed or logged for them
    /// in that case.
    pub fn process(&self, signal: Signal, current: Option<BoxError>) -> Option<BoxError> {
        match signal {
            Signal::Absent => {
                let err = current?;
                tracing::debug!(error = %err, "error returned");
                log(Category::Error, &err.to_string());
                match self.nil_handler {
                    Some(handler) => handler.handle(err),
                    None => Some(err),
                }
            }
            Signal::Recoverable(raised) => {
                let (err, trace) = raised.into_parts();
                let message = err.to_string();
                tracing::debug!(error = %message, "error raised");
                self.print(Category::Error, &message, trace);
                log(Category::Error, &message);
                match self.error_handler {
                    Some(handler) => handler.handle(err),
                    None => Some(err),
                }
            }
            signal => {
                let message = signal.message().unwrap_or_else(|| String::from("Box<dyn Any>"));
                let fault = signal.fault();
                let trace = hook::take_pending();
                match self.panic_handler {
                    Some(handler) => {
                        tracing::debug!(?fault, %message, "panic caught");
                        self.print(Category::Panic, &message, trace);
                        log(Category::Panic, &message);
                        handler.handle(&signal)
                    }
                    None => {
                        tracing::warn!(?fault, %message, "no panic handler, resuming unwind");
                        hook::restore_pending(trace);
                        signal.resume();
                        None
                    }
                }
            }
        }
    }

    fn print(&self, category: Category, message: &str, trace: Option<Trace>) {
        let registered;
        let sink: &dyn Sink = match self.trace_sink {
            Some(sink) => sink,
            None => match tracer::tracer(category) {
                Some(sink) => {
                    registered = sink;
                    registered.as_ref()
                }
                None => return,
            },
        };
        let snapshot;
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                snapshot = config::config();
                match category {
                    Category::Panic => &snapshot.panic_anchor,
                    _ => &snapshot.error_anchor,
                }
            }
        };
        let label = match category {
            Category::Panic => "PANIC",
            _ => "ERROR",
        };
        trace::print(sink, label, message, trace.as_ref(), anchor);
    }
}

impl<'a> fmt::Debug for Dispatcher<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("nil_handler", &self.nil_handler.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .field("panic_handler", &self.panic_handler.is_some())
            .field("trace_sink", &self.trace_sink.is_some())
            .field("anchor", &self.anchor)
            .finish()
    }
}

/// Write the one-line record of a dispatch to the log tracer.
fn log(category: Category, message: &str) {
    if let Some(sink) = tracer::tracer(Category::Log) {
        sink.emit(&format!("{}: {}\n", category, message));
    }
}

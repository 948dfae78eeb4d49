//! Recovery points.
//!
//! A [`Recovery`] runs a closure, catches anything raised inside it and
//! resolves the outcome through a [`Dispatcher`]. Recoveries nest: whatever
//! an inner recovery resolves to is what the outer one sees, so the error is
//! transformed layer by layer from the innermost outwards.
//!
//! ```
//! use rescue::{handler, raise, Recovery};
//!
//! fn copy() -> Result<(), rescue::BoxError> {
//!     Recovery::new()
//!         .on_error(handler::annotate("copy failed"))
//!         .run(|| {
//!             raise("file not found");
//!         })
//! }
//!
//! assert_eq!(copy().unwrap_err().to_string(), "copy failed: file not found");
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::dispatch::{Dispatcher, PanicHandler};
use crate::error::BoxError;
use crate::handler::{Handler, Pipeline};
use crate::hook;
use crate::signal::Signal;
use crate::trace::StackInfo;
use crate::tracer::Sink;

/// A recovery point with its handlers.
///
/// Errors returned from the closure without being raised go through the
/// nil handler. When no nil handler is set they go through the error
/// handlers instead, the same as raised errors.
#[derive(Default)]
pub struct Recovery {
    nil_handler: Option<Box<dyn Handler>>,
    error_handlers: Pipeline,
    panic_handler: Option<Box<dyn PanicHandler>>,
    trace_sink: Option<Arc<dyn Sink>>,
    anchor: Option<StackInfo>,
}

impl Recovery {
    /// Create a recovery point with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for errors.
    ///
    /// Handlers run in the order they were added.
    #[must_use]
    pub fn on_error<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.error_handlers = self.error_handlers.then(handler);
        self
    }

    /// Set the handler for errors returned without raising.
    #[must_use]
    pub fn on_nil<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.nil_handler = Some(Box::new(handler));
        self
    }

    /// Set the handler for faults and foreign signals.
    #[must_use]
    pub fn on_panic<H>(mut self, handler: H) -> Self
    where
        H: PanicHandler + 'static,
    {
        self.panic_handler = Some(Box::new(handler));
        self
    }

    /// Print traces to `sink` instead of the registered tracers.
    ///
    /// Traces are captured at the raise or fault site for any code running
    /// inside this recovery point, nested recovery points included.
    #[must_use]
    pub fn trace_to(mut self, sink: Arc<dyn Sink>) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    /// Filter traces with `anchor` instead of the configured anchors.
    #[must_use]
    pub fn anchor(mut self, anchor: StackInfo) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// The dispatcher this recovery point resolves signals with.
    pub fn dispatcher(&self) -> Dispatcher<'_> {
        let mut dispatcher = Dispatcher::new();
        if !self.error_handlers.is_empty() {
            dispatcher = dispatcher.error_handler(&self.error_handlers);
        }
        match &self.nil_handler {
            Some(handler) => dispatcher = dispatcher.nil_handler(handler.as_ref()),
            None if !self.error_handlers.is_empty() => {
                dispatcher = dispatcher.nil_handler(&self.error_handlers);
            }
            None => {}
        }
        if let Some(handler) = &self.panic_handler {
            dispatcher = dispatcher.panic_handler(handler.as_ref());
        }
        if let Some(sink) = &self.trace_sink {
            dispatcher = dispatcher.trace_sink(sink.as_ref());
        }
        if let Some(anchor) = &self.anchor {
            dispatcher = dispatcher.anchor(anchor);
        }
        dispatcher
    }

    /// Run `f`, resolving anything it returns or raises.
    ///
    /// A signal resolved to no error returns `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns the error the handlers resolved to.
    ///
    /// # Panics
    ///
    /// Resumes unwinding for faults and foreign signals when no panic
    /// handler is set.
    pub fn run<T, F>(&self, f: F) -> Result<T, BoxError>
    where
        T: Default,
        F: FnOnce() -> Result<T, BoxError>,
    {
        let active = hook::enter(self.trace_sink.is_some());
        let (signal, current) = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => (Signal::Absent, Some(err)),
            Err(payload) => (Signal::classify(payload), None),
        };
        drop(active);
        match self.dispatcher().process(signal, current) {
            Some(err) => Err(err),
            None => Ok(T::default()),
        }
    }
}

impl fmt::Debug for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recovery")
            .field("nil_handler", &self.nil_handler.is_some())
            .field("error_handlers", &self.error_handlers)
            .field("panic_handler", &self.panic_handler.is_some())
            .field("trace_sink", &self.trace_sink.is_some())
            .field("anchor", &self.anchor)
            .finish()
    }
}

/// Several recovery points deferred in one function.
///
/// Recoveries fire in reverse order of registration: the last one deferred
/// is the innermost and sees the signal first.
///
/// ```
/// use rescue::{handler, raise, Recovery, Scope};
///
/// let result: Result<(), _> = Scope::new()
///     .defer(Recovery::new().on_error(handler::from_fn(|e| Some(format!("{}:A", e).into()))))
///     .defer(Recovery::new().on_error(handler::from_fn(|e| Some(format!("{}:B", e).into()))))
///     .run(|| raise("x"));
///
/// assert_eq!(result.unwrap_err().to_string(), "x:B:A");
/// ```
#[derive(Debug, Default)]
pub struct Scope {
    recoveries: Vec<Recovery>,
}

impl Scope {
    /// Create a scope with no recoveries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer `recovery`, making it fire before every recovery already
    /// deferred.
    #[must_use]
    pub fn defer(mut self, recovery: Recovery) -> Self {
        self.recoveries.push(recovery);
        self
    }

    /// Run `f` inside every deferred recovery.
    ///
    /// # Errors
    ///
    /// Returns the error the outermost recovery resolved to.
    pub fn run<T, F>(&self, f: F) -> Result<T, BoxError>
    where
        T: Default,
        F: FnOnce() -> Result<T, BoxError>,
    {
        nest(&self.recoveries, Box::new(f))
    }
}

fn nest<'f, T>(
    recoveries: &[Recovery],
    f: Box<dyn FnOnce() -> Result<T, BoxError> + 'f>,
) -> Result<T, BoxError>
where
    T: Default,
{
    match recoveries.split_first() {
        Some((outer, inner)) => outer.run(move || nest(inner, f)),
        None => f(),
    }
}

/// Run `f` in a recovery point with no handlers.
///
/// Raised errors are returned, everything else keeps unwinding.
///
/// # Errors
///
/// Returns the error `f` returned or raised.
pub fn catch<T, F>(f: F) -> Result<T, BoxError>
where
    T: Default,
    F: FnOnce() -> Result<T, BoxError>,
{
    Recovery::new().run(f)
}

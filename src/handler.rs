//! Error handlers and the handler pipeline.
//!
//! A [`Handler`] maps an error to what it resolves to: a (possibly
//! different) error, or `None` when the error is resolved. Any
//! `Fn(BoxError) -> Option<BoxError>` closure is a handler.
//!
//! A [`Pipeline`] chains handlers. Each one operates on the error returned
//! by the one before it, and the first handler to resolve the error ends
//! the evaluation.
//!
//! ```
//! use rescue::handler::{self, Pipeline};
//! use rescue::BoxError;
//!
//! let pipeline = Pipeline::new()
//!     .then(handler::annotate("copy failed"))
//!     .then(handler::err(|err| eprintln!("{}", err)));
//!
//! let resolved = pipeline.eval(Some(BoxError::from("file not found")));
//!
//! assert_eq!(resolved.unwrap().to_string(), "copy failed: file not found");
//! ```

use std::fmt;

use crate::error::{Annotated, BoxError};
use crate::tracer::{self, Category};

/// Maps an error to what it resolves to.
pub trait Handler {
    /// Handle `err`, returning `None` if it is resolved.
    fn handle(&self, err: BoxError) -> Option<BoxError>;
}

impl<F> Handler for F
where
    F: Fn(BoxError) -> Option<BoxError>,
{
    fn handle(&self, err: BoxError) -> Option<BoxError> {
        self(err)
    }
}

/// Turn a closure into a handler.
///
/// Closures already implement [`Handler`], this only spares the argument
/// and return type annotations.
///
/// ```
/// use rescue::handler::{self, Handler};
///
/// let handler = handler::from_fn(|err| Some(format!("{}:B", err).into()));
///
/// assert_eq!(handler.handle("x".into()).unwrap().to_string(), "x:B");
/// ```
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(BoxError) -> Option<BoxError>,
{
    f
}

/// Returns the error unchanged.
#[derive(Debug, Default, Copy, Clone)]
pub struct Noop;

impl Handler for Noop {
    fn handle(&self, err: BoxError) -> Option<BoxError> {
        Some(err)
    }
}

/// Resolves every error.
#[derive(Debug, Default, Copy, Clone)]
pub struct Reset;

impl Handler for Reset {
    fn handle(&self, _err: BoxError) -> Option<BoxError> {
        None
    }
}

/// See [`err()`].
#[derive(Clone)]
pub struct Inspect<F>(F);

impl<F> Handler for Inspect<F>
where
    F: Fn(&BoxError),
{
    fn handle(&self, err: BoxError) -> Option<BoxError> {
        (self.0)(&err);
        Some(err)
    }
}

impl<F> fmt::Debug for Inspect<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inspect").finish()
    }
}

/// A handler that calls `f` with the error and returns it unchanged.
pub fn err<F>(f: F) -> Inspect<F>
where
    F: Fn(&BoxError),
{
    Inspect(f)
}

/// See [`log()`].
#[derive(Debug, Clone)]
pub struct Log {
    prefix: String,
}

impl Handler for Log {
    fn handle(&self, err: BoxError) -> Option<BoxError> {
        tracing::info!(prefix = %self.prefix, error = %err, "handled error");
        if let Some(sink) = tracer::tracer(Category::Log) {
            sink.emit(&format!("{}: {}\n", self.prefix, err));
        }
        Some(err)
    }
}

/// A handler that writes `"<prefix>: <error>"` to the log tracer and
/// returns the error unchanged.
pub fn log(prefix: impl Into<String>) -> Log {
    Log {
        prefix: prefix.into(),
    }
}

/// See [`annotate()`].
#[derive(Debug, Clone)]
pub struct Annotate {
    prefix: String,
}

impl Handler for Annotate {
    fn handle(&self, err: BoxError) -> Option<BoxError> {
        Some(Box::new(Annotated::new(self.prefix.clone(), err)))
    }
}

/// A handler that wraps the error in an [`Annotated`] error with `prefix`.
pub fn annotate(prefix: impl Into<String>) -> Annotate {
    Annotate {
        prefix: prefix.into(),
    }
}

///////////////////////////////////////////////////////////////////////////////
// Pipeline

/// An ordered chain of [`Handler`]s.
///
/// A pipeline is built once and not changed afterwards.
///
/// - Evaluating `None` returns `None` without calling any handler.
/// - Handlers run in order, each on the error the previous one returned.
/// - The first handler returning `None` resolves the error and the
///   handlers after it are not called.
/// - An empty pipeline returns its input unchanged.
#[derive(Default)]
pub struct Pipeline {
    handlers: Vec<Box<dyn Handler>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pipeline with `handler` appended.
    #[must_use]
    pub fn then<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.handlers.push(Box::new(handler));
        self
    }

    /// The number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the pipeline has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handlers against `err`.
    pub fn eval(&self, err: Option<BoxError>) -> Option<BoxError> {
        let mut current = err?;
        for (index, handler) in self.handlers.iter().enumerate() {
            match handler.handle(current) {
                Some(next) => current = next,
                None => {
                    tracing::trace!(index, "error resolved by handler");
                    return None;
                }
            }
        }
        Some(current)
    }
}

impl Handler for Pipeline {
    fn handle(&self, err: BoxError) -> Option<BoxError> {
        self.eval(Some(err))
    }
}

impl FromIterator<Box<dyn Handler>> for Pipeline {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Handler>>,
    {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Compose `handlers` into a single handler.
pub fn pipeline<I>(handlers: I) -> Pipeline
where
    I: IntoIterator<Item = Box<dyn Handler>>,
{
    handlers.into_iter().collect()
}

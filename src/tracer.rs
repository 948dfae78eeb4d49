//! Process-wide trace sinks.
//!
//! There are three independent categories, each holding an optional
//! [`Sink`]. All three start unset. They are stored together in a single
//! immutable snapshot that is swapped atomically, so reads never block and
//! the last writer wins.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;

/// The category a trace sink is registered for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// One-line records of every recovery that saw an error or panic.
    Log,
    /// Stack traces for recoverable errors.
    Error,
    /// Stack traces for faults and foreign signals.
    Panic,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 3] = [Category::Log, Category::Error, Category::Panic];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Log => "log",
            Self::Error => "error",
            Self::Panic => "panic",
        })
    }
}

/// An output for trace text.
///
/// Writes are best effort. Sinks shared between threads may see interleaved
/// output.
pub trait Sink: Send + Sync {
    /// Write `text` to the sink. `text` is one or more whole lines, each
    /// terminated by `\n`.
    fn emit(&self, text: &str);
}

impl<F> Sink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, text: &str) {
        self(text);
    }
}

/// Writes to the process standard error.
#[derive(Debug, Default, Copy, Clone)]
pub struct Stderr;

impl Sink for Stderr {
    fn emit(&self, text: &str) {
        let _ = io::stderr().lock().write_all(text.as_bytes());
    }
}

/// Writes to the process standard output.
#[derive(Debug, Default, Copy, Clone)]
pub struct Stdout;

impl Sink for Stdout {
    fn emit(&self, text: &str) {
        let _ = io::stdout().lock().write_all(text.as_bytes());
    }
}

/// Forwards every line to a `tracing` event with the `rescue::trace` target.
#[derive(Debug, Default, Copy, Clone)]
pub struct Tracing;

impl Sink for Tracing {
    fn emit(&self, text: &str) {
        for line in text.lines() {
            tracing::info!(target: "rescue::trace", "{}", line);
        }
    }
}

/// Collects everything written into an in-memory buffer.
///
/// # Example
///
/// ```
/// use rescue::tracer::{Memory, Sink};
///
/// let sink = Memory::new();
/// sink.emit("hello\n");
///
/// assert_eq!(sink.contents(), "hello\n");
/// ```
#[derive(Debug, Default)]
pub struct Memory {
    buf: Mutex<String>,
}

impl Memory {
    /// Create an empty `Memory` sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty `Memory` sink ready to be registered.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// A copy of everything written so far.
    pub fn contents(&self) -> String {
        self.buf.lock().map(|buf| buf.clone()).unwrap_or_default()
    }

    /// Returns everything written so far and empties the buffer.
    pub fn take(&self) -> String {
        self.buf
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

impl Sink for Memory {
    fn emit(&self, text: &str) {
        if let Ok(mut buf) = self.buf.lock() {
            buf.push_str(text);
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Registry

#[derive(Clone, Default)]
struct Tracers {
    log: Option<Arc<dyn Sink>>,
    error: Option<Arc<dyn Sink>>,
    panic: Option<Arc<dyn Sink>>,
}

impl Tracers {
    fn slot(&self, category: Category) -> &Option<Arc<dyn Sink>> {
        match category {
            Category::Log => &self.log,
            Category::Error => &self.error,
            Category::Panic => &self.panic,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<Arc<dyn Sink>> {
        match category {
            Category::Log => &mut self.log,
            Category::Error => &mut self.error,
            Category::Panic => &mut self.panic,
        }
    }
}

static TRACERS: Lazy<ArcSwap<Tracers>> = Lazy::new(|| ArcSwap::from_pointee(Tracers::default()));

/// Set or clear the sink for a category.
///
/// Takes effect for every dispatch started afterwards, on every thread.
pub fn set_tracer(category: Category, sink: Option<Arc<dyn Sink>>) {
    let _previous = TRACERS.rcu(|current| {
        let mut next = Tracers::clone(current);
        *next.slot_mut(category) = sink.clone();
        next
    });
}

/// Set or clear the same sink for every category.
pub fn set_tracers(sink: Option<Arc<dyn Sink>>) {
    TRACERS.store(Arc::new(Tracers {
        log: sink.clone(),
        error: sink.clone(),
        panic: sink,
    }));
}

/// The sink currently registered for a category.
pub fn tracer(category: Category) -> Option<Arc<dyn Sink>> {
    TRACERS.load().slot(category).clone()
}

/// Returns `true` if a sink is registered for the category.
pub fn is_set(category: Category) -> bool {
    TRACERS.load().slot(category).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_independent() {
        let sink = Memory::shared();
        let mut tracers = Tracers::default();
        *tracers.slot_mut(Category::Error) = Some(sink);
        assert!(tracers.slot(Category::Error).is_some());
        assert!(tracers.slot(Category::Log).is_none());
        assert!(tracers.slot(Category::Panic).is_none());
    }

    #[test]
    fn memory_take_empties() {
        let sink = Memory::new();
        sink.emit("a\n");
        sink.emit("b\n");
        assert_eq!(sink.take(), "a\nb\n");
        assert_eq!(sink.contents(), "");
    }
}

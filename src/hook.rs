//! Panic hook integration.
//!
//! Raised errors are control flow, so the hook keeps the default panic
//! message quiet for them while a recovery point is active on the thread.
//! For every other panic it stashes a trace for the dispatcher when some
//! sink will print it, then defers to the previously installed hook.

use std::cell::{Cell, RefCell};
use std::panic;
use std::sync::Once;

use crate::signal::Raised;
use crate::trace::Trace;
use crate::tracer::{self, Category};

static INSTALL: Once = Once::new();

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
    static SINKS: Cell<usize> = Cell::new(0);
    static PENDING: RefCell<Option<Trace>> = RefCell::new(None);
}

/// Marks the current thread as being inside a recovery point.
pub(crate) struct Active {
    sink: bool,
}

impl Drop for Active {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
        if self.sink {
            SINKS.with(|sinks| sinks.set(sinks.get().saturating_sub(1)));
        }
    }
}

/// Install the hook (once per process) and enter a recovery point.
///
/// `sink` is whether the recovery point prints traces to a sink of its own.
pub(crate) fn enter(sink: bool) -> Active {
    INSTALL.call_once(install);
    DEPTH.with(|depth| depth.set(depth.get() + 1));
    if sink {
        SINKS.with(|sinks| sinks.set(sinks.get() + 1));
    }
    Active { sink }
}

/// Returns `true` if a trace of `category` captured now would be printed,
/// either by an enclosing recovery point's own sink or by the registered
/// tracer.
pub(crate) fn wants_trace(category: Category) -> bool {
    cfg!(feature = "full-backtrace")
        && (SINKS.with(Cell::get) > 0 || tracer::is_set(category))
}

/// Take the trace stashed by the last panic on this thread.
pub(crate) fn take_pending() -> Option<Trace> {
    PENDING.with(|pending| pending.borrow_mut().take())
}

/// Put back a trace for the recovery point the panic unwinds to next.
pub(crate) fn restore_pending(trace: Option<Trace>) {
    PENDING.with(|pending| *pending.borrow_mut() = trace);
}

fn install() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let recovering = DEPTH.with(Cell::get) > 0;
        if info.payload().is::<Raised>() {
            if recovering {
                return;
            }
            tracing::error!("error raised outside of a recovery point");
        } else {
            let trace = if recovering && wants_trace(Category::Panic) {
                Some(Trace::capture())
            } else {
                None
            };
            restore_pending(trace);
        }
        previous(info);
    }));
    tracing::debug!("panic hook installed");
}

//! Stack trace capture and filtering.
//!
//! A captured trace is the rendering of a [`std::backtrace::Backtrace`]
//! preceded by a one-line header naming the thread:
//!
//! ```text
//! thread 'main' raised:
//!    0: std::backtrace::Backtrace::force_capture
//!              at /rustc/.../library/std/src/backtrace.rs:312:9
//!    1: rescue::signal::raise
//!              at ./src/signal.rs:120:17
//!    2: app::copy
//!              at ./src/main.rs:9:5
//! ```
//!
//! Every frame is an entry made of a descriptor line followed by its
//! location line(s). The recovery machinery always shows up at the top, so
//! before a trace is printed it is cut down to the frames at and below an
//! anchor described by a [`StackInfo`].

mod stack;

use std::backtrace::Backtrace;
use std::fmt;
use std::thread;

use crate::tracer::Sink;

pub use self::stack::StackInfo;

const SEPARATOR_WIDTH: usize = 60;
const MAX_HEADLINE_LEN: usize = 1024;

/// A captured stack trace.
#[derive(Clone, PartialEq, Eq)]
pub struct Trace {
    text: String,
}

impl Trace {
    /// Capture the stack of the current thread, regardless of the
    /// `RUST_BACKTRACE` environment variables.
    pub fn capture() -> Self {
        let backtrace = Backtrace::force_capture();
        let current = thread::current();
        let text = format!(
            "thread '{}' raised:\n{}",
            current.name().unwrap_or("<unnamed>"),
            backtrace
        );
        Self { text }
    }

    /// Wrap trace text captured elsewhere.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The trace text in full.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The lines of the trace, header first.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.lines()
    }

    /// The lines of the trace kept by [`filter()`] for an anchor.
    pub fn filtered(&self, anchor: &StackInfo) -> Vec<&str> {
        filter(self.lines(), anchor)
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trace").field(&self.text).finish()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Cut a trace down to the frames at and below the anchor.
///
/// - The first line (the header) is always kept.
/// - The remaining lines are grouped into frame entries.
/// - The first entry matching `anchor` is kept, the `anchor.skip()` entries
///   after it are dropped, and everything after those is kept.
/// - If no entry matches, every line is returned untouched.
///
/// # Example
///
/// ```
/// use rescue::{trace, StackInfo};
///
/// let lines = [
///     "thread 'main' raised:",
///     "   0: rescue::signal::raise",
///     "             at ./src/signal.rs:1:1",
///     "   1: app::inner",
///     "             at ./src/main.rs:2:1",
///     "   2: app::main",
///     "             at ./src/main.rs:3:1",
/// ];
///
/// let filtered = trace::filter(lines, &StackInfo::new("app", "inner"));
///
/// assert_eq!(filtered, [
///     "thread 'main' raised:",
///     "   1: app::inner",
///     "             at ./src/main.rs:2:1",
///     "   2: app::main",
///     "             at ./src/main.rs:3:1",
/// ]);
/// ```
pub fn filter<'a, I>(lines: I, anchor: &StackInfo) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lines = lines.into_iter();
    let header = match lines.next() {
        Some(header) => header,
        None => return Vec::new(),
    };
    let entries = entries(lines);
    let mut out = Vec::with_capacity(1 + entries.iter().map(Vec::len).sum::<usize>());
    out.push(header);
    match entries.iter().position(|entry| anchor.is_anchor(entry[0])) {
        Some(index) => {
            out.extend(&entries[index]);
            for entry in entries.iter().skip(index + 1 + anchor.skip()) {
                out.extend(entry);
            }
        }
        None => {
            for entry in &entries {
                out.extend(entry);
            }
        }
    }
    out
}

/// Write a framed headline followed by the filtered trace to a sink.
///
/// The headline is the string form of whatever was raised. A missing trace
/// prints the frame alone.
pub fn print(sink: &dyn Sink, label: &str, headline: &str, trace: Option<&Trace>, anchor: &StackInfo) {
    let mut out = format!(
        "{:-<width$}\n{}\n{:-<width$}\n",
        format!("-- {} ", label),
        bounded(headline),
        "-",
        width = SEPARATOR_WIDTH
    );
    if let Some(trace) = trace {
        for line in trace.filtered(anchor) {
            out.push_str(line);
            out.push('\n');
        }
    }
    sink.emit(&out);
}

fn bounded(headline: &str) -> &str {
    if headline.len() <= MAX_HEADLINE_LEN {
        return headline;
    }
    let mut end = MAX_HEADLINE_LEN;
    while !headline.is_char_boundary(end) {
        end -= 1;
    }
    &headline[..end]
}

fn entries<'a, I>(lines: I) -> Vec<Vec<&'a str>>
where
    I: Iterator<Item = &'a str>,
{
    let mut entries: Vec<Vec<&'a str>> = Vec::new();
    for line in lines {
        match entries.last_mut() {
            Some(entry) if !is_descriptor(line) => entry.push(line),
            _ => entries.push(vec![line]),
        }
    }
    entries
}

/// Returns `true` for lines of the form `<index>: <symbol>`.
fn is_descriptor(line: &str) -> bool {
    let line = line.trim_start();
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_descriptor() {
        assert!(is_descriptor("   0: std::backtrace::Backtrace::force_capture"));
        assert!(is_descriptor("12: main"));
        assert!(!is_descriptor("             at ./src/lib.rs:1:1"));
        assert!(!is_descriptor("thread 'main' raised:"));
    }

    #[test]
    fn test_entries_group_locations() {
        let lines = ["   0: a", "      at a.rs:1:1", "   1: b", "   2: c", "      at c.rs:1:1", "      at c.rs:2:1"];
        let entries = entries(lines.iter().copied());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], ["   1: b"]);
        assert_eq!(entries[2].len(), 3);
    }

    #[test]
    fn test_empty_trace() {
        assert!(filter(Vec::<&str>::new(), &StackInfo::any()).is_empty());
    }

    #[test]
    fn test_bounded_headline() {
        let long = "é".repeat(MAX_HEADLINE_LEN);
        assert!(bounded(&long).len() <= MAX_HEADLINE_LEN);
        assert_eq!(bounded("short"), "short");
    }
}

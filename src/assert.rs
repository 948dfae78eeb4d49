//! Precondition checks that fail through the signaling channel.

use std::fmt;
use std::panic::{self, Location};
use std::str::FromStr;

use crate::config;
use crate::error::{AssertionError, ConfigError};
use crate::signal::raise;
use crate::trace::{self, StackInfo, Trace};
use crate::tracer::{self, Category, Stderr};

/// The message used when a failed assertion has no message of its own.
pub const DEFAULT_MESSAGE: &str = "assertion fault";

/// Decides what happens when an assertion fails.
///
/// - `to_error`: raise an [`AssertionError`] that a recovery point can
///   handle. Otherwise panic with the message, which only a panic handler
///   will intercept.
/// - `stack_trace`: print a trace before failing, to the error tracer if
///   one is registered, otherwise to standard error.
/// - `caller_info`: prefix the message with the caller's location.
/// - `caller_info_multiline`: append the caller's location on its own line.
///   Takes precedence over `caller_info`.
///
/// The caller's location comes from `#[track_caller]` and is the
/// `file:line:column` of the call. It does not name the calling function,
/// use `stack_trace` when the function matters.
///
/// # Example
///
/// ```
/// use rescue::Asserter;
///
/// let result: Result<(), _> = rescue::catch(|| {
///     Asserter::PLAIN.that(1 + 1 == 3);
///     Ok(())
/// });
///
/// assert_eq!(result.unwrap_err().to_string(), "assertion fault");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Asserter {
    /// Raise failures as recoverable errors.
    pub to_error: bool,
    /// Print a trace before failing.
    pub stack_trace: bool,
    /// Prefix messages with `file:line:column: `.
    pub caller_info: bool,
    /// Append `--> file:line:column` on a new line.
    pub caller_info_multiline: bool,
}

impl Asserter {
    /// Failures are plain recoverable errors.
    pub const PLAIN: Self = Self {
        to_error: true,
        stack_trace: false,
        caller_info: false,
        caller_info_multiline: false,
    };

    /// Failures are recoverable errors carrying the caller's location.
    pub const PRODUCTION: Self = Self {
        caller_info: true,
        ..Self::PLAIN
    };

    /// Failures panic with a multi-line message carrying the caller's
    /// location.
    pub const DEVELOPMENT: Self = Self {
        to_error: false,
        stack_trace: false,
        caller_info: false,
        caller_info_multiline: true,
    };

    /// Like [`Asserter::DEVELOPMENT`], printing a trace before panicking.
    pub const DEBUG: Self = Self {
        stack_trace: true,
        ..Self::DEVELOPMENT
    };

    /// Fails if `condition` is `false`, with the default message.
    #[inline]
    #[track_caller]
    pub fn that(self, condition: bool) {
        if !condition {
            self.fail(None);
        }
    }

    /// Fails if `condition` is `false`, with the provided message.
    #[inline]
    #[track_caller]
    pub fn that_msg(self, condition: bool, args: fmt::Arguments<'_>) {
        if !condition {
            self.fail(Some(args));
        }
    }

    /// Fails unconditionally.
    #[cold]
    #[track_caller]
    pub fn fail(self, args: Option<fmt::Arguments<'_>>) -> ! {
        let message = self.message(args, Location::caller());
        if self.stack_trace {
            let trace = Trace::capture();
            let anchor = StackInfo::new("rescue::assert::Asserter", "fail");
            match tracer::tracer(Category::Error) {
                Some(sink) => trace::print(sink.as_ref(), "ASSERT", &message, Some(&trace), &anchor),
                None => trace::print(&Stderr, "ASSERT", &message, Some(&trace), &anchor),
            }
        }
        tracing::debug!(to_error = self.to_error, %message, "assertion failed");
        if self.to_error {
            raise(AssertionError::new(message))
        } else {
            panic::panic_any(message)
        }
    }

    fn message(self, args: Option<fmt::Arguments<'_>>, location: &Location<'_>) -> String {
        let message = match args {
            Some(args) => args.to_string(),
            None => String::from(DEFAULT_MESSAGE),
        };
        if self.caller_info_multiline {
            format!(
                "{}\n  --> {}:{}:{}",
                message,
                location.file(),
                location.line(),
                location.column()
            )
        } else if self.caller_info {
            format!(
                "{}:{}:{}: {}",
                location.file(),
                location.line(),
                location.column(),
                message
            )
        } else {
            message
        }
    }
}

impl Default for Asserter {
    fn default() -> Self {
        Self::PLAIN
    }
}

impl FromStr for Asserter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::PLAIN),
            "production" => Ok(Self::PRODUCTION),
            "development" => Ok(Self::DEVELOPMENT),
            "debug" => Ok(Self::DEBUG),
            _ => Err(ConfigError::new(
                "asserter",
                s,
                "plain, production, development, debug",
            )),
        }
    }
}

/// Fails through the process-wide default asserter if `condition` is
/// `false`.
///
/// See [`config::set_asserter()`].
#[inline]
#[track_caller]
pub fn that(condition: bool) {
    if !condition {
        config::asserter().fail(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_forms() {
        let location = Location::caller();
        let plain = Asserter::PLAIN.message(None, location);
        assert_eq!(plain, DEFAULT_MESSAGE);

        let short = Asserter::PRODUCTION.message(Some(format_args!("bad {}", 1)), location);
        assert!(short.starts_with(location.file()));
        assert!(short.ends_with(": bad 1"));

        let multi = Asserter::DEVELOPMENT.message(None, location);
        assert!(multi.starts_with("assertion fault\n  --> "));
    }

    #[test]
    fn test_presets_parse() {
        assert_eq!("Debug".parse::<Asserter>(), Ok(Asserter::DEBUG));
        assert!("loud".parse::<Asserter>().is_err());
    }
}

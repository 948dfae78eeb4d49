//! Process-wide configuration.
//!
//! The configuration is an immutable [`Config`] snapshot swapped atomically.
//! Readers always see a whole snapshot and never block.
//!
//! ```
//! use rescue::{config, Asserter};
//!
//! config::set_asserter(Asserter::PRODUCTION);
//!
//! assert_eq!(config::asserter(), Asserter::PRODUCTION);
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;

use crate::assert::Asserter;
use crate::error::ConfigError;
use crate::trace::StackInfo;
use crate::tracer::{self, Sink, Stderr, Stdout, Tracing};

/// Environment variable selecting the default asserter preset.
pub const ASSERTER_VAR: &str = "RESCUE_ASSERTER";
/// Environment variable selecting where traces go.
pub const TRACE_VAR: &str = "RESCUE_TRACE";

/// Where traces are written when configured from the environment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Output {
    /// Standard error.
    Stderr,
    /// Standard output.
    Stdout,
    /// `tracing` events.
    Tracing,
    /// Nowhere.
    Off,
}

impl Output {
    /// The sink for this output, if any.
    pub fn sink(self) -> Option<Arc<dyn Sink>> {
        match self {
            Self::Stderr => Some(Arc::new(Stderr)),
            Self::Stdout => Some(Arc::new(Stdout)),
            Self::Tracing => Some(Arc::new(Tracing)),
            Self::Off => None,
        }
    }
}

impl FromStr for Output {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stderr" => Ok(Self::Stderr),
            "stdout" => Ok(Self::Stdout),
            "tracing" => Ok(Self::Tracing),
            "off" | "" => Ok(Self::Off),
            _ => Err(ConfigError::new("trace", s, "stderr, stdout, tracing, off")),
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// The asserter used by [`assert::that()`](crate::assert::that) and
    /// [`assert_that!`](crate::assert_that).
    pub asserter: Asserter,
    /// The anchor used to filter traces of recoverable errors.
    pub error_anchor: StackInfo,
    /// The anchor used to filter traces of faults and foreign signals.
    pub panic_anchor: StackInfo,
    /// Where traces are written, applied to every tracer category by
    /// [`Config::init()`]. `None` leaves the registered tracers alone.
    pub trace: Option<Output>,
}

impl Config {
    /// Read the configuration from the environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable holds an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(value) = env::var(ASSERTER_VAR) {
            config.asserter = value.parse()?;
        }
        if let Ok(value) = env::var(TRACE_VAR) {
            config.trace = Some(value.parse()?);
        }
        Ok(config)
    }

    /// Make this the process-wide configuration.
    pub fn init(self) {
        if let Some(output) = self.trace {
            tracer::set_tracers(output.sink());
        }
        tracing::debug!(asserter = ?self.asserter, trace = ?self.trace, "configuration replaced");
        CONFIG.store(Arc::new(self));
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asserter: Asserter::default(),
            error_anchor: StackInfo::raised(),
            panic_anchor: StackInfo::panicked(),
            trace: None,
        }
    }
}

static CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// The current configuration snapshot.
pub fn config() -> Arc<Config> {
    CONFIG.load_full()
}

/// The process-wide default asserter.
pub fn asserter() -> Asserter {
    CONFIG.load().asserter
}

/// Replace the process-wide default asserter.
pub fn set_asserter(asserter: Asserter) {
    let _previous = CONFIG.rcu(|current| Config {
        asserter,
        ..Config::clone(current)
    });
}

/// Read the configuration from the environment and apply it.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a variable holds an unknown value, in which
/// case nothing is applied.
pub fn init_from_env() -> Result<(), ConfigError> {
    Config::from_env()?.init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_parse() {
        assert_eq!("STDERR".parse::<Output>(), Ok(Output::Stderr));
        assert_eq!("".parse::<Output>(), Ok(Output::Off));
        assert_eq!(
            "file".parse::<Output>().unwrap_err().to_string(),
            "invalid value \"file\" for trace: expected one of stderr, stdout, tracing, off"
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.asserter, Asserter::PLAIN);
        assert_eq!(config.error_anchor.function_name(), "raise");
        assert!(config.trace.is_none());
    }
}

/// Raise a recoverable error with a formatted message.
///
/// ```
/// let result: Result<(), _> = rescue::catch(|| rescue::raise!("missing {}", "config.toml"));
///
/// assert_eq!(result.unwrap_err().to_string(), "missing config.toml");
/// ```
#[macro_export]
macro_rules! raise {
    ($($arg:tt)+) => {
        $crate::raise(::std::format!($($arg)+))
    };
}

/// Assert a condition with the process-wide default asserter.
///
/// The message arguments are only formatted if the condition fails.
///
/// ```
/// use rescue::assert_that;
///
/// let result: Result<(), _> = rescue::catch(|| {
///     let len = 0;
///     assert_that!(len > 0, "expected items, got {}", len);
///     Ok(())
/// });
///
/// assert!(result.unwrap_err().to_string().contains("expected items, got 0"));
/// ```
#[macro_export]
macro_rules! assert_that {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::config::asserter().fail(::std::option::Option::None)
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::config::asserter().fail(::std::option::Option::Some(::std::format_args!($($arg)+)))
        }
    };
}

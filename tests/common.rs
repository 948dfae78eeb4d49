#![allow(unused_macros, dead_code)]

use std::sync::{Arc, Mutex};

pub use indoc::indoc;
pub use paste::paste;
pub use rescue::{error::*, handler, trace, tracer, *};

macro_rules! assert_str_eq {
    ($actual:expr, $expected:expr) => {{
        let actual = &$actual[..];
        let expected = &$expected[..];
        if actual != expected {
            panic!(
                indoc! {"
                string not expected value:
                ============================EXPECTED==========================
                {}
                =============================ACTUAL===========================
                {}
                ==============================DIFF============================
                {}
                ==============================================================
            "},
                expected,
                actual,
                colored_diff::PrettyDifference { expected, actual },
            );
        }
    }};
}

/// Run an expression expected to unwind, returning the payload.
macro_rules! unwinds {
    ($expr:expr) => {
        ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $expr))
            .err()
            .expect("expression did not unwind")
    };
}

/// Unwrap the message of a `&str` or `String` panic payload.
macro_rules! payload_str {
    ($payload:expr) => {{
        let payload = &$payload;
        payload
            .downcast_ref::<&'static str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .expect("payload is not a string")
    }};
}

/// A handler appending `tag` to the error message.
pub fn suffix(tag: &'static str) -> impl Fn(BoxError) -> Option<BoxError> {
    move |err| Some(format!("{}{}", err, tag).into())
}

/// A log shared between handlers, recording what each one saw.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn list(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// A handler recording `"<name>:<error>"` and passing the error on.
    pub fn handler(&self, name: &'static str) -> impl Fn(BoxError) -> Option<BoxError> {
        let calls = self.clone();
        move |err| {
            calls.record(format!("{}:{}", name, err));
            Some(err)
        }
    }
}

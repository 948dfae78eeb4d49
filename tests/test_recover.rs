#[macro_use]
mod common;

use std::io;

use common::*;

fn open(path: &str) -> Result<String, io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path)))
}

///////////////////////////////////////////////////////////////////////////////
// Recovery

#[test]
fn test_annotated_copy() {
    let result: Result<(), _> = Recovery::new()
        .on_error(handler::annotate("copy failed"))
        .run(|| raise("file not found"));

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "copy failed: file not found");
    let annotated = err.downcast_ref::<Annotated>().unwrap();
    assert_eq!(annotated.context(), "copy failed");
}

#[test]
fn test_ok_passes_through() {
    let calls = Calls::new();
    let result = Recovery::new()
        .on_error(calls.handler("error"))
        .run(|| Ok(42));

    assert_eq!(result.unwrap(), 42);
    assert!(calls.list().is_empty());
}

#[test]
fn test_returned_error_uses_error_handlers() {
    let calls = Calls::new();
    let result: Result<(), _> = Recovery::new()
        .on_error(calls.handler("error"))
        .run(|| Err("returned".into()));

    assert_eq!(result.unwrap_err().to_string(), "returned");
    assert_eq!(calls.list(), ["error:returned"]);
}

#[test]
fn test_returned_error_prefers_nil_handler() {
    let calls = Calls::new();
    let result: Result<(), _> = Recovery::new()
        .on_error(calls.handler("error"))
        .on_nil(calls.handler("nil"))
        .run(|| Err("returned".into()));

    assert_eq!(result.unwrap_err().to_string(), "returned");
    assert_eq!(calls.list(), ["nil:returned"]);
}

#[test]
fn test_reset_returns_default() {
    let result: Result<Vec<u8>, _> = Recovery::new()
        .on_error(Reset)
        .run(|| raise("ignored"));

    assert_eq!(result.unwrap(), Vec::<u8>::new());
}

#[test]
fn test_handlers_run_in_order() {
    let result: Result<(), _> = Recovery::new()
        .on_error(suffix(":1"))
        .on_error(suffix(":2"))
        .run(|| raise("x"));

    assert_eq!(result.unwrap_err().to_string(), "x:1:2");
}

///////////////////////////////////////////////////////////////////////////////
// Nesting

#[test]
fn test_scope_runs_last_deferred_first() {
    let result: Result<(), _> = Scope::new()
        .defer(Recovery::new().on_error(suffix(":A")))
        .defer(Recovery::new().on_error(suffix(":B")))
        .run(|| raise("x"));

    assert_eq!(result.unwrap_err().to_string(), "x:B:A");
}

#[test]
fn test_nested_recoveries() {
    let outer = Recovery::new().on_error(suffix(":A"));
    let inner = Recovery::new().on_error(suffix(":B"));

    let result: Result<(), _> = outer.run(|| inner.run(|| raise("x")));

    assert_eq!(result.unwrap_err().to_string(), "x:B:A");
}

#[test]
fn test_inner_reset_hides_error_from_outer() {
    let calls = Calls::new();
    let outer = Recovery::new().on_error(calls.handler("outer"));
    let inner = Recovery::new().on_error(Reset);

    let result: Result<u32, _> = outer.run(|| inner.run(|| raise("x")));

    assert_eq!(result.unwrap(), 0);
    assert!(calls.list().is_empty());
}

#[test]
fn test_empty_scope() {
    let result = Scope::new().run(|| Ok("value"));
    assert_eq!(result.unwrap(), "value");
}

///////////////////////////////////////////////////////////////////////////////
// Faults

#[test]
fn test_fault_passes_error_only_recovery() {
    let calls = Calls::new();
    let payload = unwinds!({
        let recovery = Recovery::new().on_error(calls.handler("error"));
        let _: Result<u8, _> = recovery.run(|| {
            let v = vec![1_u8, 2, 3];
            let index = v.len() + 2;
            Ok(v[index])
        });
    });

    assert!(payload_str!(payload).starts_with("index out of bounds"));
    assert!(calls.list().is_empty());
}

#[test]
fn test_fault_reaches_outer_panic_handler() {
    let outer = Recovery::new().on_panic(|signal: &Signal| signal.to_error().map(BoxError::from));
    let inner = Recovery::new().on_error(Reset);

    let result: Result<u8, _> = outer.run(|| {
        inner.run(|| {
            let v: Vec<u8> = Vec::new();
            Ok(v[0])
        })
    });

    let err = result.unwrap_err();
    let panic = err.downcast_ref::<PanicError>().unwrap();
    assert_eq!(panic.fault(), Some(FaultKind::IndexOutOfBounds));
}

#[test]
fn test_panic_handler_suppresses() {
    let result: Result<&str, _> = Recovery::new()
        .on_panic(|_: &Signal| -> Option<BoxError> { None })
        .run(|| panic!("unexpected"));

    assert_eq!(result.unwrap(), "");
}

#[test]
fn test_foreign_payload_converted() {
    let result: Result<(), _> = Recovery::new()
        .on_panic(|signal: &Signal| signal.to_error().map(BoxError::from))
        .run(|| std::panic::panic_any(String::from("custom")));

    assert_eq!(result.unwrap_err().to_string(), "panic: custom");
}

///////////////////////////////////////////////////////////////////////////////
// Raising

#[test]
fn test_or_raise() {
    let result: Result<String, _> = catch(|| Ok(open("a.txt").or_raise()));
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "a.txt not found");
    assert!(err.downcast_ref::<io::Error>().is_some());
}

#[test]
fn test_or_raise_with() {
    let result: Result<String, _> = catch(|| Ok(open("a.txt").or_raise_with(|| "loading config")));
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "loading config: a.txt not found");
    assert!(chain_contains::<io::Error>(&*err));
}

#[test]
fn test_option_or_raise() {
    let result: Result<u8, _> = catch(|| Ok(None::<u8>.or_raise()));
    assert_eq!(result.unwrap_err().to_string(), "missing value");

    let result: Result<u8, _> = catch(|| Ok(None::<u8>.or_raise_with(|| "no port")));
    assert_eq!(result.unwrap_err().to_string(), "no port");
}

#[test]
fn test_raise_macro() {
    let result: Result<(), _> = catch(|| raise!("{} of {}", 3, 4));
    assert_eq!(result.unwrap_err().to_string(), "3 of 4");
}

#[test]
fn test_catch_lets_faults_through() {
    let payload = unwinds!(catch(|| -> Result<(), BoxError> { panic!("plain") }));
    assert_eq!(payload_str!(payload), "plain");
}

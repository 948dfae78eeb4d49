#[macro_use]
mod common;

use common::*;
use serial_test::serial;

fn check(asserter: Asserter, condition: bool) -> Result<(), BoxError> {
    Recovery::new()
        .on_error(handler::Noop)
        .run(|| {
            asserter.that(condition);
            Ok(())
        })
}

///////////////////////////////////////////////////////////////////////////////
// Presets

#[test]
fn test_plain_passes() {
    assert!(check(Asserter::PLAIN, true).is_ok());
}

#[test]
fn test_plain_raises_default_message() {
    let err = check(Asserter::PLAIN, false).unwrap_err();
    assert_eq!(err.to_string(), DEFAULT_MESSAGE);
    assert!(err.downcast_ref::<AssertionError>().is_some());
}

#[test]
fn test_production_prefixes_caller() {
    let err = check(Asserter::PRODUCTION, false).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with(file!()), "{}", message);
    assert!(message.ends_with(": assertion fault"), "{}", message);
}

#[test]
fn test_development_is_not_an_error() {
    let calls = Calls::new();
    let payload = unwinds!({
        let _ = Recovery::new().on_error(calls.handler("error")).run(|| {
            Asserter::DEVELOPMENT.that(false);
            Ok(())
        });
    });

    let message = payload_str!(payload);
    assert!(message.starts_with("assertion fault\n  --> "), "{}", message);
    assert!(message.contains(file!()));
    assert!(calls.list().is_empty());
}

#[test]
fn test_development_reaches_panic_handler() {
    let result: Result<(), _> = Recovery::new()
        .on_panic(|signal: &Signal| signal.to_error().map(BoxError::from))
        .run(|| {
            Asserter::DEVELOPMENT.that_msg(false, format_args!("len was {}", 0));
            Ok(())
        });

    let message = result.unwrap_err().to_string();
    assert!(message.starts_with("panic: len was 0\n  --> "), "{}", message);
}

#[test]
fn test_custom_asserter() {
    let asserter = Asserter {
        to_error: true,
        caller_info_multiline: true,
        ..Asserter::PLAIN
    };
    let err = check(asserter, false).unwrap_err();
    let message = err.to_string();
    let mut lines = message.lines();
    assert_eq!(lines.next(), Some("assertion fault"));
    assert!(lines.next().unwrap().starts_with("  --> "));
}

#[test]
fn test_presets_from_str() {
    assert_eq!("plain".parse::<Asserter>(), Ok(Asserter::PLAIN));
    assert_eq!("PRODUCTION".parse::<Asserter>(), Ok(Asserter::PRODUCTION));
    assert_eq!(" development ".parse::<Asserter>(), Ok(Asserter::DEVELOPMENT));
    assert_eq!("debug".parse::<Asserter>(), Ok(Asserter::DEBUG));

    let err = "verbose".parse::<Asserter>().unwrap_err();
    assert_eq!(err.key(), "asserter");
    assert_eq!(err.value(), "verbose");
}

///////////////////////////////////////////////////////////////////////////////
// Process-wide default

#[test]
#[serial]
fn test_assert_that_uses_default() {
    config::set_asserter(Asserter::PLAIN);
    let result: Result<(), _> = catch(|| {
        assert_that!(1 > 2, "expected {} > {}", 1, 2);
        Ok(())
    });
    assert_eq!(result.unwrap_err().to_string(), "expected 1 > 2");

    config::set_asserter(Asserter::PRODUCTION);
    let result: Result<(), _> = catch(|| {
        assert_that!(false);
        Ok(())
    });
    assert!(result.unwrap_err().to_string().ends_with(": assertion fault"));

    config::set_asserter(Asserter::PLAIN);
}

#[test]
#[serial]
fn test_that_function_uses_default() {
    config::set_asserter(Asserter::DEVELOPMENT);
    let payload = unwinds!({
        let _: Result<(), _> = catch(|| {
            rescue::that(false);
            Ok(())
        });
    });
    config::set_asserter(Asserter::PLAIN);

    assert!(payload_str!(payload).starts_with("assertion fault\n"));
}

#[test]
#[serial]
fn test_debug_prints_trace() {
    let sink = tracer::Memory::shared();
    tracer::set_tracer(tracer::Category::Error, Some(sink.clone()));
    let payload = unwinds!(Asserter::DEBUG.that(false));
    tracer::set_tracer(tracer::Category::Error, None);

    assert!(payload_str!(payload).starts_with("assertion fault"));
    let printed = sink.contents();
    assert!(printed.contains("-- ASSERT ---"), "{}", printed);
    assert!(printed.contains("assertion fault\n  --> "));
}

#[test]
fn test_caller_info_is_location_only() {
    let line = line!() + 1;
    let result: Result<(), _> = catch(|| { Asserter::PRODUCTION.that(false); Ok(()) });

    let message = result.unwrap_err().to_string();
    let location = message.strip_suffix(": assertion fault").unwrap();
    let column = location
        .strip_prefix(&format!("{}:{}:", file!(), line))
        .unwrap_or_else(|| panic!("unexpected location in {:?}", message));
    assert!(column.parse::<u32>().is_ok(), "{:?}", message);
}

//! All errors produced by the crate.
//!
//! Errors travelling through the recovery machinery are type-erased into a
//! [`BoxError`]. Any `std::error::Error + Send + Sync + 'static` converts into
//! one with `?` or `.into()`, and a plain `&str` or `String` does as well,
//! which is what most handlers and tests lean on.

mod annotated;
mod assertion;
mod config;
mod panic;

use std::error::Error as StdError;

pub use self::annotated::Annotated;
pub use self::assertion::AssertionError;
pub use self::config::ConfigError;
pub use self::panic::PanicError;

/// A type-erased error carried by the recovery machinery.
///
/// "No error" is represented by `Option::<BoxError>::None` throughout the
/// crate.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Returns `true` if `err` or any error in its `source()` chain is a `T`.
pub fn chain_contains<T>(err: &(dyn StdError + 'static)) -> bool
where
    T: StdError + 'static,
{
    let mut next = Some(err);
    while let Some(err) = next {
        if err.is::<T>() {
            return true;
        }
        next = err.source();
    }
    false
}

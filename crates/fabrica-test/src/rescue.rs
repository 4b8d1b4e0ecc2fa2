//! Panic-on-error adapters for test code.
//!
//! Inside a test the only useful reaction to a factory failure is to stop
//! the test with a readable message. [`rescue`] does exactly that, prefixing
//! the message with `[fabrica] ` so the failing step is easy to spot.

use fabrica::FactoryResult;

/// Prefix of every rescue panic message.
pub const RESCUE_PREFIX: &str = "[fabrica] ";

/// Returns the success value, or panics with `[fabrica] <error>`.
///
/// # Examples
///
/// ```should_panic
/// use fabrica::{FactoryError, FactoryResult};
/// use fabrica_test::rescue;
///
/// let result: FactoryResult<()> = Err(FactoryError::NotFound("a_person".into()));
/// rescue(result); // panics: "[fabrica] Definition not found: a_person"
/// ```
#[track_caller]
pub fn rescue<T>(result: FactoryResult<T>) -> T {
	match result {
		Ok(value) => value,
		Err(err) => panic!("{}{}", RESCUE_PREFIX, err),
	}
}

/// Method form of [`rescue`].
///
/// ```
/// use fabrica::FactoryResult;
/// use fabrica_test::RescueExt;
///
/// let result: FactoryResult<i32> = Ok(7);
/// assert_eq!(result.rescue(), 7);
/// ```
pub trait RescueExt<T> {
	fn rescue(self) -> T;
}

impl<T> RescueExt<T> for FactoryResult<T> {
	#[track_caller]
	fn rescue(self) -> T {
		rescue(self)
	}
}

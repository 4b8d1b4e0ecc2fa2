//! Sequential executor.
//!
//! [`AutoExecutor`] runs many create chains against one store and keeps the
//! first failure. Once a failure is recorded every later `create` is a
//! no-op, so a test can populate related records in a straight line and
//! check [`AutoExecutor::err`] once at the end.
//!
//! ```ignore
//! let mut author = Person::default();
//! let mut post = Post::default();
//!
//! let mut auto = registry.auto(&mut db);
//! auto.create("a_person", None::<Attrs>, &mut author)
//!     .create("a_post", attrs! { "author_id" => author.id }, &mut post);
//! auto.into_result()?;
//! ```
//!
//! Note the second overlay above reads `author.id` before the first create
//! runs; chain separate statements when a later overlay depends on an
//! earlier result.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::attrs::Attrs;
use crate::error::{FactoryError, FactoryResult};
use crate::executor::Output;
use crate::registry::Registry;
use crate::store::Store;

/// Runs create chains in call order and stops at the first failure.
pub struct AutoExecutor<'s> {
	registry: Registry,
	store: &'s mut dyn Store,
	error: Option<FactoryError>,
	created: usize,
}

impl<'s> AutoExecutor<'s> {
	pub fn new(registry: Registry, store: &'s mut dyn Store) -> Self {
		Self {
			registry,
			store,
			error: None,
			created: 0,
		}
	}

	/// Creates the factory bound to `name`, overlays `attrs`, saves it and
	/// copies the result into `output`.
	///
	/// Does nothing if an earlier call failed. A panic raised by the save
	/// routine is recorded as [`FactoryError::Panicked`].
	pub fn create<'a>(
		&mut self,
		name: &str,
		attrs: impl Into<Option<Attrs>>,
		output: impl Into<Output<'a>>,
	) -> &mut Self {
		if self.error.is_some() {
			tracing::trace!(factory = name, "skipping create after earlier failure");
			return self;
		}

		let executor = self.registry.create_with(name, attrs, output);
		let store = &mut *self.store;
		let result = panic::catch_unwind(AssertUnwindSafe(move || executor.exec(store)))
			.unwrap_or_else(|payload| Err(FactoryError::Panicked(panic_message(payload))));

		match result {
			Ok(()) => self.created += 1,
			Err(err) => {
				tracing::warn!(factory = name, error = %err, "factory creation failed");
				self.error = Some(err);
			}
		}
		self
	}

	/// Returns the first recorded failure, if any.
	pub fn err(&self) -> Option<&FactoryError> {
		self.error.as_ref()
	}

	/// Number of successful creations so far.
	pub fn created(&self) -> usize {
		self.created
	}

	/// Consumes the executor and returns the first recorded failure.
	pub fn into_result(self) -> FactoryResult<()> {
		match self.error {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for AutoExecutor<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AutoExecutor")
			.field("store", &self.store.store_name())
			.field("error", &self.error)
			.field("created", &self.created)
			.finish()
	}
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"non-string panic payload".to_string()
	}
}

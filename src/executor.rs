//! Single-factory assembly: create, overlay, save, assign.
//!
//! An [`Executor`] owns a clone of a registered prototype and a pending
//! assignment into the caller's output target. Failures from the lookup
//! or the overlay are carried along the chain and reported by the final
//! [`Executor::exec`] or [`Executor::build`] call, so the chain reads as
//! one expression:
//!
//! ```ignore
//! let mut person = Person::default();
//! registry
//!     .create_into("a_person", &mut person)
//!     .with(attrs! { "name" => "John" })
//!     .exec(&mut db)?;
//! ```

use std::any::Any;
use std::fmt;

use crate::attrs::Attrs;
use crate::capability::{Saved, dispatch};
use crate::error::FactoryResult;
use crate::prototype::Prototype;
use crate::store::Store;

type AssignFn<'a> = Box<dyn FnOnce(Saved) -> FactoryResult<()> + 'a>;

/// Caller-owned location that receives the saved record.
pub struct Output<'a> {
	assign: Option<AssignFn<'a>>,
}

impl<'a> Output<'a> {
	/// No output target: the saved record is dropped.
	pub fn none() -> Self {
		Self { assign: None }
	}

	/// Copies the saved record into `target`.
	pub fn to<T: Any>(target: &'a mut T) -> Self {
		Self {
			assign: Some(Box::new(move |saved: Saved| saved.assign_to(target))),
		}
	}

	pub fn is_none(&self) -> bool {
		self.assign.is_none()
	}

	fn assign(self, saved: Saved) -> FactoryResult<()> {
		match self.assign {
			Some(assign) => assign(saved),
			None => Ok(()),
		}
	}
}

impl Default for Output<'_> {
	fn default() -> Self {
		Self::none()
	}
}

impl<'a, T: Any> From<&'a mut T> for Output<'a> {
	fn from(target: &'a mut T) -> Self {
		Self::to(target)
	}
}

impl<'a, T: Any> From<Option<&'a mut T>> for Output<'a> {
	fn from(target: Option<&'a mut T>) -> Self {
		target.map_or_else(Self::none, Self::to)
	}
}

impl fmt::Debug for Output<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Output")
			.field("bound", &self.assign.is_some())
			.finish()
	}
}

/// One create, overlay, exec chain.
#[must_use = "an executor does nothing until `exec` or `build` is called"]
pub struct Executor<'a> {
	factory: FactoryResult<Box<dyn Prototype>>,
	output: Output<'a>,
}

impl<'a> Executor<'a> {
	pub(crate) fn new(factory: FactoryResult<Box<dyn Prototype>>, output: Output<'a>) -> Self {
		Self { factory, output }
	}

	/// Overwrites fields of the clone by name.
	///
	/// `None` or an empty overlay leaves the clone unchanged. The
	/// registered prototype is never touched.
	pub fn with(mut self, attrs: impl Into<Option<Attrs>>) -> Self {
		let Some(attrs) = attrs.into() else {
			return self;
		};
		let applied = match &mut self.factory {
			Ok(factory) => attrs.apply(factory.as_mut()),
			Err(_) => Ok(()),
		};
		if let Err(err) = applied {
			self.factory = Err(err);
		}
		self
	}

	/// Replaces the output target.
	pub fn assign_to<'b, T: Any>(self, target: &'b mut T) -> Executor<'b> {
		Executor {
			factory: self.factory,
			output: Output::to(target),
		}
	}

	/// Borrows the clone this executor will save.
	pub fn factory(&self) -> Option<&dyn Prototype> {
		self.factory.as_ref().ok().map(|factory| &**factory)
	}

	/// Saves the clone through `store` and copies the result into the
	/// output target.
	pub fn exec(self, store: &mut dyn Store) -> FactoryResult<()> {
		let mut factory = self.factory?;
		let saved = dispatch(factory.as_mut(), store)?;
		tracing::debug!(
			factory = factory.record_type(),
			result = ?saved.type_name(),
			"factory saved"
		);
		self.output.assign(saved)
	}

	/// Returns the overlaid clone without saving it.
	///
	/// Fails with [`FactoryError::AssignmentTypeMismatch`](crate::FactoryError::AssignmentTypeMismatch)
	/// when `T` is not the factory's type.
	pub fn build<T: Any>(self) -> FactoryResult<T> {
		self.factory?.downcast::<T>()
	}
}

impl fmt::Debug for Executor<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Executor")
			.field("factory", &self.factory)
			.field("output", &self.output)
			.finish()
	}
}

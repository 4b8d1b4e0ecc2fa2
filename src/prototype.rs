//! Prototype records and the clone engine.
//!
//! A prototype is any record type implementing [`Factory`]. The registry
//! stores prototypes type-erased behind [`Prototype`], which is
//! implemented for every `Factory` and carries the operations the engine
//! needs on an erased record: cloning, by-name field assignment and
//! capability routing.
//!
//! Cloning is a memberwise [`Clone`]: every field is copied once. A field
//! holding a shared handle (`Arc<T>`, `Rc<T>`) keeps pointing at the same
//! nested data as the prototype.

use std::any::{Any, type_name};
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::capability::Capability;
use crate::error::{FactoryError, FactoryResult};

/// By-name field assignment for a record type.
///
/// Usually derived with `#[derive(Factory)]`; a hand-written implementation
/// matches on the field name and decodes with [`decode_field`]:
///
/// ```
/// use fabrica::{Fields, FactoryError, FactoryResult, decode_field};
/// use serde_json::Value;
///
/// struct Person {
///     name: String,
///     age: i32,
/// }
///
/// impl Fields for Person {
///     const FIELDS: &'static [&'static str] = &["name", "age"];
///
///     fn set_field(&mut self, name: &str, value: Value) -> FactoryResult<()> {
///         match name {
///             "name" => self.name = decode_field(name, value)?,
///             "age" => self.age = decode_field(name, value)?,
///             _ => return Err(FactoryError::unknown_field::<Self>(name)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Fields {
	/// Names accepted by [`Fields::set_field`].
	const FIELDS: &'static [&'static str];

	/// Overwrites the field called `name` with `value`.
	///
	/// Fails with [`FactoryError::UnknownField`] for undeclared names and
	/// [`FactoryError::TypeMismatch`] when `value` does not decode into the
	/// field's type.
	fn set_field(&mut self, name: &str, value: Value) -> FactoryResult<()>;
}

/// A record type that can be registered as a factory prototype.
pub trait Factory: Fields + Clone + fmt::Debug + Send + Sync + 'static {
	/// Persistence capability implemented by this record.
	///
	/// Records that implement no capability can still be registered and
	/// built, but [`Executor::exec`](crate::Executor::exec) rejects them.
	fn capability(&mut self) -> Capability<'_> {
		Capability::Unsupported
	}
}

/// Type-erased view of a registered prototype or one of its clones.
///
/// Method names must not collide with those of [`Fields`] and [`Factory`]:
/// the blanket impl puts all three traits on every record.
pub trait Prototype: fmt::Debug + Send + Sync + 'static {
	/// Type name of the concrete record.
	fn record_type(&self) -> &'static str;

	fn field_names(&self) -> &'static [&'static str];

	/// Returns a freshly allocated memberwise copy.
	fn clone_prototype(&self) -> Box<dyn Prototype>;

	/// Erased form of [`Fields::set_field`].
	fn write_field(&mut self, name: &str, value: Value) -> FactoryResult<()>;

	/// Erased form of [`Factory::capability`].
	fn as_capability(&mut self) -> Capability<'_>;

	fn as_any(&self) -> &dyn Any;

	fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Factory> Prototype for T {
	fn record_type(&self) -> &'static str {
		type_name::<T>()
	}

	fn field_names(&self) -> &'static [&'static str] {
		T::FIELDS
	}

	fn clone_prototype(&self) -> Box<dyn Prototype> {
		Box::new(self.clone())
	}

	fn write_field(&mut self, name: &str, value: Value) -> FactoryResult<()> {
		self.set_field(name, value)
	}

	fn as_capability(&mut self) -> Capability<'_> {
		self.capability()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Box<Self>) -> Box<dyn Any> {
		self
	}
}

impl dyn Prototype {
	/// Returns true if the erased record is a `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.as_any().is::<T>()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.as_any().downcast_ref::<T>()
	}

	/// Unboxes the record as a `T`.
	///
	/// Fails with [`FactoryError::AssignmentTypeMismatch`] when the record is
	/// of another type.
	pub fn downcast<T: Any>(self: Box<Self>) -> FactoryResult<T> {
		let found = self.record_type();
		self.into_any()
			.downcast::<T>()
			.map(|record| *record)
			.map_err(|_| FactoryError::AssignmentTypeMismatch {
				expected: type_name::<T>(),
				found,
			})
	}
}

/// Decodes an overlay value into the declared type of field `field`.
pub fn decode_field<T: DeserializeOwned>(field: &str, value: Value) -> FactoryResult<T> {
	serde_json::from_value(value).map_err(|err| FactoryError::type_mismatch::<T>(field, err))
}

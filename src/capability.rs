//! Persistence capabilities and save dispatch.
//!
//! The set of capabilities is closed: a record either saves through SQL
//! statements, saves as a JSON document, or cannot be persisted at all.
//! Supporting another kind of backend means adding a variant to
//! [`Capability`], a store shape to [`Store`], and an arm to [`dispatch`].

use std::any::{Any, type_name};
use std::fmt;

use crate::error::{BoxError, FactoryError, FactoryResult};
use crate::prototype::Prototype;
use crate::store::{DocumentStore, SqlStore, Store};

/// Persistence protocol implemented by a record, borrowed from the record.
pub enum Capability<'a> {
	/// The record saves itself through prepared SQL statements.
	Sql(&'a mut dyn SqlFactory),
	/// The record saves itself as a document.
	Document(&'a mut dyn DocumentFactory),
	/// The record implements no persistence protocol.
	Unsupported,
}

impl Capability<'_> {
	/// Short name of the capability, used in log events.
	pub fn name(&self) -> &'static str {
		match self {
			Capability::Sql(_) => "sql",
			Capability::Document(_) => "document",
			Capability::Unsupported => "unsupported",
		}
	}
}

impl fmt::Debug for Capability<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Capability").field(&self.name()).finish()
	}
}

/// Records that persist through a SQL store.
///
/// ```ignore
/// impl SqlFactory for Person {
///     fn save(&mut self, db: &mut dyn SqlStore) -> Result<Saved, BoxError> {
///         let mut stmt = db.prepare("INSERT INTO person (name, age) VALUES ($1, $2) RETURNING id")?;
///         let row = stmt.query_row(&[self.name.clone().into(), self.age.into()])?;
///         self.id = row.get("id")?;
///         Ok(Saved::new(self.clone()))
///     }
/// }
/// ```
pub trait SqlFactory {
	fn save(&mut self, db: &mut dyn SqlStore) -> Result<Saved, BoxError>;
}

/// Records that persist through a document store.
pub trait DocumentFactory {
	fn save(&mut self, store: &mut dyn DocumentStore) -> Result<Saved, BoxError>;
}

/// Value produced by a save routine, later copied into the caller's
/// output target.
pub struct Saved {
	value: Option<Box<dyn Any>>,
	type_name: &'static str,
}

impl Saved {
	/// Wraps the persisted record.
	pub fn new<T: Any>(value: T) -> Self {
		Self {
			value: Some(Box::new(value)),
			type_name: type_name::<T>(),
		}
	}

	/// A save that produced nothing to assign.
	pub fn empty() -> Self {
		Self {
			value: None,
			type_name: "()",
		}
	}

	pub fn is_empty(&self) -> bool {
		self.value.is_none()
	}

	/// Type name of the wrapped value, if any.
	pub fn type_name(&self) -> Option<&'static str> {
		self.value.as_ref().map(|_| self.type_name)
	}

	/// Copies the saved value into `target`.
	///
	/// An empty result leaves `target` untouched.
	pub fn assign_to<T: Any>(self, target: &mut T) -> FactoryResult<()> {
		let Some(value) = self.value else {
			return Ok(());
		};
		let value = value
			.downcast::<T>()
			.map_err(|_| FactoryError::AssignmentTypeMismatch {
				expected: type_name::<T>(),
				found: self.type_name,
			})?;
		*target = *value;
		Ok(())
	}
}

impl fmt::Debug for Saved {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Saved")
			.field("type_name", &self.type_name())
			.finish()
	}
}

/// Routes `factory` to the save routine of its capability.
///
/// Fails with [`FactoryError::UnsupportedFactory`] when the record has no
/// capability and [`FactoryError::InvalidStore`] when `store` lacks the
/// shape the capability needs. Errors from the save routine are returned
/// unchanged inside [`FactoryError::Save`].
pub fn dispatch(factory: &mut dyn Prototype, store: &mut dyn Store) -> FactoryResult<Saved> {
	let factory_name = factory.record_type();
	let store_name = store.store_name();
	let capability = factory.as_capability();
	tracing::debug!(
		factory = factory_name,
		store = store_name,
		capability = capability.name(),
		"dispatching save"
	);

	let saved = match capability {
		Capability::Sql(record) => {
			let db = store
				.as_sql()
				.ok_or(FactoryError::InvalidStore(store_name))?;
			record.save(db)
		}
		Capability::Document(record) => {
			let documents = store
				.as_document()
				.ok_or(FactoryError::InvalidStore(store_name))?;
			record.save(documents)
		}
		Capability::Unsupported => return Err(FactoryError::UnsupportedFactory(factory_name)),
	};

	saved.map_err(FactoryError::Save)
}

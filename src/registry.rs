//! Named prototype registry.
//!
//! A [`Registry`] binds factory names to prototypes. Names are insert-once:
//! a second definition under the same name is rejected and the first
//! prototype stays in place. Handles are cheap to clone and share one
//! underlying map.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::attrs::Attrs;
use crate::auto::AutoExecutor;
use crate::error::{FactoryError, FactoryResult};
use crate::executor::{Executor, Output};
use crate::prototype::{Factory, Prototype};
use crate::store::Store;

/// Shared map from factory name to prototype.
#[derive(Clone, Default)]
pub struct Registry {
	definitions: Arc<RwLock<HashMap<String, Arc<dyn Prototype>>>>,
}

impl Registry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `name` to `prototype`.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::Redefinition`] if `name` is already bound.
	///
	/// # Example
	///
	/// ```ignore
	/// registry.define("a_person", Person { name: "Bob".into(), age: 15, ..Default::default() })?;
	/// ```
	pub fn define<F: Factory>(&self, name: impl Into<String>, prototype: F) -> FactoryResult<()> {
		let name = name.into();
		match self.definitions.write().entry(name) {
			Entry::Occupied(entry) => {
				tracing::warn!(factory = %entry.key(), "rejected redefinition");
				Err(FactoryError::Redefinition {
					name: entry.key().clone(),
					value: format!("{:?}", prototype),
				})
			}
			Entry::Vacant(entry) => {
				tracing::debug!(
					factory = %entry.key(),
					record = std::any::type_name::<F>(),
					"defined factory"
				);
				entry.insert(Arc::new(prototype));
				Ok(())
			}
		}
	}

	/// Returns the prototype bound to `name`.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::NotFound`] if `name` is not bound.
	pub fn lookup(&self, name: &str) -> FactoryResult<Arc<dyn Prototype>> {
		self.definitions
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| FactoryError::NotFound(name.to_string()))
	}

	/// Starts an executor on a fresh clone of the prototype bound to `name`.
	///
	/// A missing definition is reported when the executor runs.
	pub fn create(&self, name: &str) -> Executor<'static> {
		self.create_into(name, Output::none())
	}

	/// Like [`Registry::create`], copying the saved record into `output`.
	pub fn create_into<'a>(&self, name: &str, output: impl Into<Output<'a>>) -> Executor<'a> {
		let factory = self.lookup(name).map(|prototype| prototype.clone_prototype());
		if factory.is_ok() {
			tracing::debug!(factory = name, "cloned prototype");
		}
		Executor::new(factory, output.into())
	}

	/// Like [`Registry::create_into`], overlaying `attrs` first.
	///
	/// ```ignore
	/// registry
	///     .create_with("a_person", attrs! { "name" => "John" }, &mut person)
	///     .exec(&mut db)?;
	/// ```
	pub fn create_with<'a>(
		&self,
		name: &str,
		attrs: impl Into<Option<Attrs>>,
		output: impl Into<Output<'a>>,
	) -> Executor<'a> {
		self.create_into(name, output).with(attrs)
	}

	/// Starts a sequential executor that creates factories from this
	/// registry against `store`.
	pub fn auto<'s>(&self, store: &'s mut dyn Store) -> AutoExecutor<'s> {
		AutoExecutor::new(self.clone(), store)
	}

	/// Checks if `name` is bound.
	pub fn contains(&self, name: &str) -> bool {
		self.definitions.read().contains_key(name)
	}

	/// Returns all bound names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.definitions.read().keys().cloned().collect();
		names.sort();
		names
	}

	/// Returns the number of bound names.
	pub fn len(&self) -> usize {
		self.definitions.read().len()
	}

	/// Returns true if no factories are bound.
	pub fn is_empty(&self) -> bool {
		self.definitions.read().is_empty()
	}

	/// Removes every definition.
	///
	/// Other handles to this registry observe the cleared state.
	pub fn clear(&self) {
		self.definitions.write().clear();
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("names", &self.names())
			.finish()
	}
}

//! Process-wide registry.
//!
//! The free functions in this module operate on one global [`Registry`]
//! with an explicit lifecycle: [`init`] creates it, [`reset`] discards it.
//! Using it before `init`, or calling `init` twice, is an error.
//!
//! Tests sharing the global context must not run in parallel; mark them
//! `#[serial]` and call [`reset`] when done.
//!
//! ```ignore
//! fabrica::init()?;
//! fabrica::define("a_person", Person { name: "Bob".into(), age: 15, ..Default::default() })?;
//!
//! let mut person = Person::default();
//! fabrica::create_into("a_person", &mut person).exec(&mut db)?;
//!
//! fabrica::reset();
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::attrs::Attrs;
use crate::auto::AutoExecutor;
use crate::error::{FactoryError, FactoryResult};
use crate::executor::{Executor, Output};
use crate::prototype::{Factory, Prototype};
use crate::registry::Registry;
use crate::store::Store;

static CONTEXT: Lazy<RwLock<Option<Registry>>> = Lazy::new(|| RwLock::new(None));

/// Creates the process-wide registry.
///
/// # Errors
///
/// Returns [`FactoryError::AlreadyInitialized`] if it already exists.
pub fn init() -> FactoryResult<()> {
	init_with(Registry::new())
}

/// Installs `registry` as the process-wide registry.
///
/// # Errors
///
/// Returns [`FactoryError::AlreadyInitialized`] if one already exists.
pub fn init_with(registry: Registry) -> FactoryResult<()> {
	let mut context = CONTEXT.write();
	if context.is_some() {
		return Err(FactoryError::AlreadyInitialized);
	}
	*context = Some(registry);
	tracing::debug!("factory context initialized");
	Ok(())
}

/// Discards the process-wide registry.
pub fn reset() {
	if CONTEXT.write().take().is_some() {
		tracing::debug!("factory context reset");
	}
}

/// Returns true between [`init`] and [`reset`].
pub fn is_initialized() -> bool {
	CONTEXT.read().is_some()
}

/// Returns a handle to the process-wide registry.
///
/// # Errors
///
/// Returns [`FactoryError::NotInitialized`] before [`init`].
pub fn registry() -> FactoryResult<Registry> {
	CONTEXT.read().clone().ok_or(FactoryError::NotInitialized)
}

/// Binds `name` to `prototype` in the process-wide registry.
pub fn define<F: Factory>(name: impl Into<String>, prototype: F) -> FactoryResult<()> {
	registry()?.define(name, prototype)
}

/// Returns the prototype bound to `name` in the process-wide registry.
pub fn lookup(name: &str) -> FactoryResult<Arc<dyn Prototype>> {
	registry()?.lookup(name)
}

/// Starts an executor on a clone of the global prototype bound to `name`.
pub fn create(name: &str) -> Executor<'static> {
	create_into(name, Output::none())
}

/// Like [`create`], copying the saved record into `output`.
pub fn create_into<'a>(name: &str, output: impl Into<Output<'a>>) -> Executor<'a> {
	match registry() {
		Ok(registry) => registry.create_into(name, output),
		Err(err) => Executor::new(Err(err), output.into()),
	}
}

/// Like [`create_into`], overlaying `attrs` first.
pub fn create_with<'a>(
	name: &str,
	attrs: impl Into<Option<Attrs>>,
	output: impl Into<Output<'a>>,
) -> Executor<'a> {
	create_into(name, output).with(attrs)
}

/// Starts a sequential executor over the process-wide registry.
///
/// # Errors
///
/// Returns [`FactoryError::NotInitialized`] before [`init`].
pub fn auto(store: &mut dyn Store) -> FactoryResult<AutoExecutor<'_>> {
	Ok(AutoExecutor::new(registry()?, store))
}

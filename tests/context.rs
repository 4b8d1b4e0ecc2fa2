//! Process-wide registry lifecycle.

mod helpers;

use fabrica::prelude::*;
use fabrica_test::{MemoryDatabase, init_test_logging};
use helpers::{PERSON_TABLE, Person, bob};
use rstest::rstest;
use serial_test::serial;

fn setup() {
	init_test_logging();
	fabrica::reset();
	fabrica::init().unwrap();
}

#[rstest]
#[serial(factory_context)]
fn test_global_define_and_create() -> anyhow::Result<()> {
	// Arrange
	setup();
	fabrica::define("a_person", bob())?;
	let mut db = MemoryDatabase::new().with_schema(PERSON_TABLE);
	let mut out = Person::default();

	// Act
	fabrica::create_with("a_person", attrs! { "age" => 16 }, &mut out).exec(&mut db)?;

	// Assert
	assert_eq!(out.name, "Bob");
	assert_eq!(out.age, 16);
	fabrica::reset();
	Ok(())
}

#[rstest]
#[serial(factory_context)]
fn test_global_auto() -> anyhow::Result<()> {
	setup();
	fabrica::define("a_person", bob())?;
	let mut db = MemoryDatabase::new().with_schema(PERSON_TABLE);

	let mut auto = fabrica::context::auto(&mut db)?;
	auto.create("a_person", None::<Attrs>, Output::none())
		.create("a_person", None::<Attrs>, Output::none());
	auto.into_result()?;

	assert_eq!(db.count("person").unwrap(), 2);
	fabrica::reset();
	Ok(())
}

#[rstest]
#[serial(factory_context)]
fn test_init_with_prepared_registry() {
	// Arrange
	fabrica::reset();
	let registry = Registry::new();
	registry.define("a_person", bob()).unwrap();

	// Act
	fabrica::init_with(registry).unwrap();

	// Assert
	assert!(fabrica::context::is_initialized());
	let person: Person = fabrica::create("a_person").build().unwrap();
	assert_eq!(person, bob());
	fabrica::reset();
}

#[rstest]
#[serial(factory_context)]
fn test_lifecycle_errors() {
	fabrica::reset();

	let err = fabrica::lookup("a_person").unwrap_err();
	assert_eq!(err.to_string(), "Context is nil");
	let mut db = MemoryDatabase::new();
	assert!(matches!(
		fabrica::context::auto(&mut db),
		Err(FactoryError::NotInitialized)
	));

	fabrica::init().unwrap();
	let err = fabrica::init().unwrap_err();
	assert_eq!(err.to_string(), "Context is not nil");
	fabrica::reset();
}

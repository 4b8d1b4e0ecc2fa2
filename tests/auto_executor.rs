//! Sequential creation with first-failure short-circuit.

mod helpers;

use fabrica::prelude::*;
use fabrica_test::{MemoryDatabase, RescueExt};
use helpers::{PERSON_TABLE, PET_TABLE, Person, Pet, bob};
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> Registry {
	let registry = Registry::new();
	registry.define("a_person", bob()).unwrap();
	registry
		.define("a_pet", Pet {
			name: "Rex".to_string(),
			..Default::default()
		})
		.unwrap();
	registry
		.define("another_person", Person {
			name: "Ann".to_string(),
			age: 30,
			..Default::default()
		})
		.unwrap();
	registry
}

#[rstest]
fn test_stops_at_first_failure(registry: Registry) {
	// Arrange
	let mut db = MemoryDatabase::new().with_schema(PERSON_TABLE);
	let mut a = Person::default();
	let mut b = Pet::default();
	let mut c = Person::default();

	// Act
	let mut auto = registry.auto(&mut db);
	auto.create("a_person", None::<Attrs>, &mut a)
		.create("a_pet", None::<Attrs>, &mut b)
		.create("another_person", None::<Attrs>, &mut c);
	let created = auto.created();
	let result = auto.into_result();

	// Assert
	assert_eq!(result.unwrap_err().to_string(), "Table not found: pet");
	assert_eq!(created, 1);
	assert_eq!(a.name, "Bob");
	assert_eq!(a.id, 1);
	assert_eq!(b, Pet::default());
	assert_eq!(c, Person::default());
	assert_eq!(db.count("person").unwrap(), 1);
}

#[rstest]
fn test_runs_every_create_when_all_succeed(registry: Registry) {
	// Arrange
	let mut db = MemoryDatabase::new().with_schema(PERSON_TABLE).with_schema(PET_TABLE);
	let mut owner = Person::default();
	let mut pet = Pet::default();

	// Act
	let mut auto = registry.auto(&mut db);
	auto.create("a_person", None::<Attrs>, &mut owner);
	let owner_id = owner.id;
	auto.create("a_pet", attrs! { "owner_id" => owner_id }, &mut pet);
	auto.into_result().rescue();

	// Assert
	assert_eq!(pet.owner_id, Some(owner.id));
	assert_eq!(pet.id, 1);
	assert_eq!(db.count("pet").unwrap(), 1);
}

#[rstest]
fn test_output_can_be_omitted(registry: Registry) {
	let mut db = MemoryDatabase::new().with_schema(PERSON_TABLE);

	let mut auto = registry.auto(&mut db);
	auto.create("a_person", None::<Attrs>, Output::none())
		.create("another_person", attrs! { "age" => 31 }, Output::none());

	assert!(auto.err().is_none());
	assert_eq!(auto.created(), 2);
}

#[rstest]
#[should_panic(expected = "[fabrica] Table not found: pet")]
fn test_rescue_reports_first_failure(registry: Registry) {
	let mut db = MemoryDatabase::new().with_schema(PERSON_TABLE);

	let mut auto = registry.auto(&mut db);
	auto.create("a_pet", None::<Attrs>, Output::none())
		.create("a_person", None::<Attrs>, Output::none());
	auto.into_result().rescue();
}

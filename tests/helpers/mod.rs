//! Factories shared by the integration tests.

#![allow(dead_code)]

use fabrica::prelude::*;
use serde_json::json;

pub const PERSON_TABLE: &str =
	"CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL)";
pub const PET_TABLE: &str =
	"CREATE TABLE pet (id INTEGER PRIMARY KEY, name TEXT NOT NULL, owner_id INTEGER REFERENCES person (id))";

/// A person persisted through SQL, re-read after insert.
#[derive(Debug, Clone, Default, PartialEq, Factory)]
#[factory(sql)]
pub struct Person {
	pub id: i64,
	pub name: String,
	pub age: i32,
}

impl SqlFactory for Person {
	fn save(&mut self, db: &mut dyn SqlStore) -> Result<Saved, BoxError> {
		let id: i64 = {
			let mut stmt =
				db.prepare("INSERT INTO person (name, age) VALUES ($1, $2) RETURNING id")?;
			stmt.query_row(&[self.name.as_str().into(), self.age.into()])?
				.get("id")?
		};

		let mut stmt = db.prepare("SELECT id, name, age FROM person WHERE id = $1")?;
		let row = stmt.query_row(&[id.into()])?;
		Ok(Saved::new(Person {
			id: row.get("id")?,
			name: row.get("name")?,
			age: row.get("age")?,
		}))
	}
}

/// A pet stored in a table the tests usually do not create.
#[derive(Debug, Clone, Default, PartialEq, Factory)]
#[factory(sql)]
pub struct Pet {
	pub id: i64,
	pub name: String,
	pub owner_id: Option<i64>,
}

impl SqlFactory for Pet {
	fn save(&mut self, db: &mut dyn SqlStore) -> Result<Saved, BoxError> {
		let result = db.execute("INSERT INTO pet (name, owner_id) VALUES ($1, $2)", &[
			self.name.as_str().into(),
			self.owner_id.into(),
		])?;
		self.id = result.last_insert_id.unwrap_or_default();
		Ok(Saved::new(self.clone()))
	}
}

/// A note persisted as a document.
#[derive(Debug, Clone, Default, PartialEq, Factory)]
#[factory(document)]
pub struct Note {
	#[factory(skip)]
	pub id: String,
	pub title: String,
	#[factory(rename = "text")]
	pub body: String,
	pub tags: Vec<String>,
}

impl DocumentFactory for Note {
	fn save(&mut self, store: &mut dyn DocumentStore) -> Result<Saved, BoxError> {
		self.id = store.insert_one(
			"notes",
			json!({
				"title": self.title,
				"text": self.body,
				"tags": self.tags,
			}),
		)?;
		Ok(Saved::new(self.clone()))
	}
}

/// A record with no persistence capability.
#[derive(Debug, Clone, Default, PartialEq, Factory)]
pub struct Draft {
	pub title: String,
}

pub fn bob() -> Person {
	Person {
		id: 0,
		name: "Bob".to_string(),
		age: 15,
	}
}

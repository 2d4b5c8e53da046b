//! In-memory [`GraphStore`] backed by a `BTreeMap`, used by tests and for
//! resolving plans without touching a database.

use std::collections::BTreeMap;

use crate::error::{KingraphError, Result};
use crate::model::{FamilyId, NewPerson, Person, PersonId, PersonUpdate};
use crate::store::GraphStore;

/// Map-backed store with sequential id assignment.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: i64,
    people: BTreeMap<i64, Person>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            next_id: 1,
            people: BTreeMap::new(),
        }
    }

    /// Seed a person with an explicit id, for building fixtures. Later
    /// created ids continue past the highest seeded one.
    pub fn insert(&mut self, person: Person) -> PersonId {
        let id = person.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.people.insert(id.0, person);
        id
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl GraphStore for MemoryStore {
    fn get_person(&self, id: PersonId) -> Result<Person> {
        self.people
            .get(&id.0)
            .cloned()
            .ok_or(KingraphError::NotFound(id))
    }

    fn create_person(&mut self, fields: NewPerson) -> Result<Person> {
        let id = PersonId(self.next_id);
        self.next_id += 1;
        let person = Person::from_new(id, fields);
        self.people.insert(id.0, person.clone());
        Ok(person)
    }

    fn update_person(&mut self, id: PersonId, update: &PersonUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let person = self
            .people
            .get_mut(&id.0)
            .ok_or(KingraphError::NotFound(id))?;
        person.apply(update);
        Ok(())
    }

    fn family_members(&self, family: FamilyId) -> Result<Vec<Person>> {
        // BTreeMap iteration order gives ascending ids for free.
        Ok(self
            .people
            .values()
            .filter(|p| p.family_id == family)
            .cloned()
            .collect())
    }
}

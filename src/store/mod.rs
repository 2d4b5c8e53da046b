//! Storage abstraction for person nodes.
//!
//! The resolver and phantom factory are written against [`GraphStore`] so
//! the same logic runs against the in-memory store (tests, dry runs) and a
//! live SQLite connection. A store instance covers one consistent view;
//! transactional scope is the caller's concern.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{FamilyId, NewPerson, Person, PersonId, PersonUpdate};

/// Synchronous person-node storage.
pub trait GraphStore {
    /// Fetch a person by id, `NotFound` if absent.
    fn get_person(&self, id: PersonId) -> Result<Person>;

    /// Insert a person and return it with its store-assigned id.
    fn create_person(&mut self, fields: NewPerson) -> Result<Person>;

    /// Apply a partial update, `NotFound` if absent. An empty update is a
    /// successful no-op without an existence check.
    fn update_person(&mut self, id: PersonId, update: &PersonUpdate) -> Result<()>;

    /// All members of a family, ordered by ascending id.
    fn family_members(&self, family: FamilyId) -> Result<Vec<Person>>;
}

pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod model;
pub mod roles;
pub mod store;

pub use config::Config;
pub use error::{KingraphError, Result};
pub use graph::{apply_plan, bind_by_role, infer_label, resolve_relationship, MutationPlan};
pub use model::{FamilyId, Gender, NewPerson, ParentSlot, Person, PersonId, PersonUpdate};
pub use roles::RoleId;
pub use store::{GraphStore, MemoryStore, SqliteStore};

//! Kinship graph engine: phantom node factory, edge resolution, label
//! inference, and name-deduplicated member registration.

pub mod infer;
pub mod phantom;
pub mod resolve;

pub use infer::infer_label;
pub use phantom::{ParentPair, PhantomFactory};
pub use resolve::{
    apply_plan, bind_by_role, is_ancestor, resolve_relationship, MutationPlan, RoleCategory,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{FamilyId, NewPerson, Person};
use crate::roles::RoleId;
use crate::store::GraphStore;

/// Input for [`add_person`]: a display name plus optional free-form
/// relationship text and birth date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPersonRequest {
    pub name: String,
    pub relationship: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Outcome of [`add_person`]: the member row, and whether it was an existing
/// record matched by name rather than a fresh insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutcome {
    pub person: Person,
    pub linked: bool,
}

/// Add an unregistered member to a family, deduplicating by exact trimmed
/// name within that family. On a name match the existing record is returned
/// with `linked = true` and nothing is written. The free-form relationship
/// is kept verbatim for display and canonicalized into `standard_role`.
pub fn add_person<S: GraphStore>(
    store: &mut S,
    family: FamilyId,
    request: AddPersonRequest,
) -> Result<AddOutcome> {
    let name = request.name.trim();
    let members = store.family_members(family)?;
    if let Some(existing) = members.into_iter().find(|p| p.name == name) {
        log::debug!(
            "add: name {:?} already present in family {} as person {}",
            name,
            family,
            existing.id
        );
        return Ok(AddOutcome {
            person: existing,
            linked: true,
        });
    }

    let mut fields = NewPerson::new(family, name);
    fields.standard_role = Some(RoleId::canonicalize(
        request.relationship.as_deref().unwrap_or(""),
    ));
    fields.relationship = request.relationship;
    fields.birth_date = request.birth_date;
    let person = store.create_person(fields)?;
    log::debug!("add: created person {} ({})", person.id, person.name);
    Ok(AddOutcome {
        person,
        linked: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(name: &str, relationship: Option<&str>) -> AddPersonRequest {
        AddPersonRequest {
            name: name.to_owned(),
            relationship: relationship.map(str::to_owned),
            birth_date: None,
        }
    }

    #[test]
    fn test_add_creates_unregistered_member_with_role() {
        let mut store = MemoryStore::new();
        let outcome =
            add_person(&mut store, FamilyId(1), request("张舅舅", Some("舅舅"))).unwrap();

        assert!(!outcome.linked);
        assert!(!outcome.person.registered);
        assert_eq!(outcome.person.standard_role, Some(RoleId::UncleMaternal));
        assert_eq!(outcome.person.relationship.as_deref(), Some("舅舅"));
        assert_eq!(outcome.person.family_id, FamilyId(1));
    }

    #[test]
    fn test_add_without_relationship_defaults_to_family() {
        let mut store = MemoryStore::new();
        let outcome = add_person(&mut store, FamilyId(1), request("某人", None)).unwrap();
        assert_eq!(outcome.person.standard_role, Some(RoleId::Family));
        assert_eq!(outcome.person.relationship, None);
    }

    #[test]
    fn test_add_dedupes_by_name_within_family() {
        let mut store = MemoryStore::new();
        let first = add_person(&mut store, FamilyId(1), request("张三", Some("叔叔"))).unwrap();
        let second = add_person(&mut store, FamilyId(1), request("张三", Some("舅舅"))).unwrap();

        assert!(second.linked);
        assert_eq!(second.person.id, first.person.id);
        // The existing record is untouched by the second request.
        assert_eq!(second.person.standard_role, Some(RoleId::UnclePaternal));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_dedupe_is_family_scoped() {
        let mut store = MemoryStore::new();
        let a = add_person(&mut store, FamilyId(1), request("张三", None)).unwrap();
        let b = add_person(&mut store, FamilyId(2), request("张三", None)).unwrap();
        assert!(!b.linked);
        assert_ne!(a.person.id, b.person.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_matches_on_trimmed_name() {
        let mut store = MemoryStore::new();
        add_person(&mut store, FamilyId(1), request("张三", None)).unwrap();
        let outcome = add_person(&mut store, FamilyId(1), request("  张三 ", None)).unwrap();
        assert!(outcome.linked);
        assert_eq!(store.len(), 1);
    }
}

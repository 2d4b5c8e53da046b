//! Phantom node creation.
//!
//! Several role bindings need relatives that were never registered: the
//! shared parents behind a sibling bind, the middle generation behind a
//! grandparent bind. The factory materializes those as unregistered person
//! nodes with synthetic names and records what it created so callers can
//! report it.

use crate::error::Result;
use crate::model::{Gender, NewPerson, ParentSlot, Person, PersonId, PersonUpdate};
use crate::store::GraphStore;

/// Both parents of a node, after ensuring they exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentPair {
    pub father: PersonId,
    pub mother: PersonId,
}

/// Creates phantom relatives against a store, tracking created ids.
pub struct PhantomFactory<'s, S: GraphStore> {
    store: &'s mut S,
    created: Vec<PersonId>,
}

impl<'s, S: GraphStore> PhantomFactory<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        PhantomFactory {
            store,
            created: Vec::new(),
        }
    }

    /// Ids of phantoms created through this factory, in creation order.
    pub fn into_created(self) -> Vec<PersonId> {
        self.created
    }

    /// Get or create the parent of `member_id` in `slot`. A created phantom
    /// gets the slot's gender, the member's family, and the edge written
    /// back onto the member immediately, so repeated calls return the same
    /// id.
    pub fn ensure_parent(&mut self, member_id: PersonId, slot: ParentSlot) -> Result<PersonId> {
        let member = self.store.get_person(member_id)?;
        self.ensure_parent_of(&member, slot)
    }

    /// Same as [`ensure_parent`](Self::ensure_parent), against a caller-held
    /// snapshot of the member.
    pub fn ensure_parent_of(&mut self, member: &Person, slot: ParentSlot) -> Result<PersonId> {
        if let Some(existing) = member.parent(slot) {
            return Ok(existing);
        }

        let mut fields = NewPerson::new(member.family_id, phantom_parent_name(&member.name, slot));
        fields.gender = slot.gender();
        let phantom = self.store.create_person(fields)?;
        log::debug!(
            "created phantom {:?} {} for person {}",
            slot,
            phantom.id,
            member.id
        );

        let mut edge = PersonUpdate::default();
        edge.set_parent(slot, phantom.id);
        self.store.update_person(member.id, &edge)?;

        self.created.push(phantom.id);
        Ok(phantom.id)
    }

    /// Ensure both parents of `member_id` exist, father first. The member is
    /// read once and both slots are resolved against that one snapshot.
    pub fn ensure_sibling_parents(&mut self, member_id: PersonId) -> Result<ParentPair> {
        let member = self.store.get_person(member_id)?;
        self.ensure_sibling_parents_of(&member)
    }

    /// Same as [`ensure_sibling_parents`](Self::ensure_sibling_parents),
    /// against a caller-held snapshot.
    pub fn ensure_sibling_parents_of(&mut self, member: &Person) -> Result<ParentPair> {
        let father = self.ensure_parent_of(member, ParentSlot::Father)?;
        let mother = self.ensure_parent_of(member, ParentSlot::Mother)?;
        Ok(ParentPair { father, mother })
    }

    /// Insert a fresh anchor child under `parent`, linked through the slot
    /// matching the parent's gender (female takes the mother slot, anything
    /// else the father slot). Grandchild binds hang the grandchild off this
    /// node; one anchor per bind, gender left unknown.
    pub fn anchor_child(&mut self, parent: &Person) -> Result<Person> {
        let mut fields = NewPerson::new(parent.family_id, format!("{}的孩子", parent.name));
        if parent.gender == Gender::Female {
            fields.mother_id = Some(parent.id);
        } else {
            fields.father_id = Some(parent.id);
        }
        let child = self.store.create_person(fields)?;
        log::debug!("created anchor child {} under person {}", child.id, parent.id);
        self.created.push(child.id);
        Ok(child)
    }

    /// Insert a phantom sibling of `member` as a child of `parents`.
    /// Gender left unknown.
    pub fn phantom_sibling(&mut self, member: &Person, parents: ParentPair) -> Result<Person> {
        let mut fields = NewPerson::new(member.family_id, format!("{}的兄弟姐妹", member.name));
        fields.father_id = Some(parents.father);
        fields.mother_id = Some(parents.mother);
        let sibling = self.store.create_person(fields)?;
        log::debug!(
            "created phantom sibling {} for person {}",
            sibling.id,
            member.id
        );
        self.created.push(sibling.id);
        Ok(sibling)
    }
}

fn phantom_parent_name(member_name: &str, slot: ParentSlot) -> String {
    let kin_term = match slot {
        ParentSlot::Father => "父亲",
        ParentSlot::Mother => "母亲",
    };
    format!("{}的{}", member_name, kin_term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FamilyId, Gender};
    use crate::store::{GraphStore, MemoryStore};

    fn seed_member(store: &mut MemoryStore, name: &str, gender: Gender) -> Person {
        let mut fields = NewPerson::new(FamilyId(1), name);
        fields.gender = gender;
        fields.registered = true;
        store.create_person(fields).unwrap()
    }

    #[test]
    fn test_ensure_parent_creates_gendered_phantom() {
        let mut store = MemoryStore::new();
        let member = seed_member(&mut store, "陈建国", Gender::Male);

        let father_id = {
            let mut factory = PhantomFactory::new(&mut store);
            factory.ensure_parent(member.id, ParentSlot::Father).unwrap()
        };

        let father = store.get_person(father_id).unwrap();
        assert_eq!(father.name, "陈建国的父亲");
        assert_eq!(father.gender, Gender::Male);
        assert!(!father.registered);
        assert_eq!(father.family_id, member.family_id);

        // Edge written back onto the member.
        let member = store.get_person(member.id).unwrap();
        assert_eq!(member.father_id, Some(father_id));
    }

    #[test]
    fn test_ensure_parent_is_idempotent() {
        let mut store = MemoryStore::new();
        let member = seed_member(&mut store, "某人", Gender::Female);

        let mut factory = PhantomFactory::new(&mut store);
        let first = factory.ensure_parent(member.id, ParentSlot::Mother).unwrap();
        let second = factory.ensure_parent(member.id, ParentSlot::Mother).unwrap();
        assert_eq!(first, second);
        assert_eq!(factory.into_created(), vec![first]);
    }

    #[test]
    fn test_ensure_parent_returns_existing_without_creating() {
        let mut store = MemoryStore::new();
        let mother = seed_member(&mut store, "母亲本人", Gender::Female);
        let mut fields = NewPerson::new(FamilyId(1), "孩子");
        fields.mother_id = Some(mother.id);
        let child = store.create_person(fields).unwrap();

        let mut factory = PhantomFactory::new(&mut store);
        let got = factory.ensure_parent(child.id, ParentSlot::Mother).unwrap();
        assert_eq!(got, mother.id);
        assert!(factory.into_created().is_empty());
    }

    #[test]
    fn test_ensure_sibling_parents_creates_both() {
        let mut store = MemoryStore::new();
        let member = seed_member(&mut store, "独生子", Gender::Male);

        let pair = {
            let mut factory = PhantomFactory::new(&mut store);
            factory.ensure_sibling_parents(member.id).unwrap()
        };

        let father = store.get_person(pair.father).unwrap();
        let mother = store.get_person(pair.mother).unwrap();
        assert_eq!(father.gender, Gender::Male);
        assert_eq!(mother.gender, Gender::Female);
        assert_eq!(mother.name, "独生子的母亲");

        let member = store.get_person(member.id).unwrap();
        assert_eq!(member.father_id, Some(pair.father));
        assert_eq!(member.mother_id, Some(pair.mother));
    }

    #[test]
    fn test_ensure_sibling_parents_reads_member_once() {
        struct CountingStore {
            inner: MemoryStore,
            reads: std::cell::Cell<usize>,
        }

        impl GraphStore for CountingStore {
            fn get_person(&self, id: PersonId) -> Result<Person> {
                self.reads.set(self.reads.get() + 1);
                self.inner.get_person(id)
            }
            fn create_person(&mut self, fields: NewPerson) -> Result<Person> {
                self.inner.create_person(fields)
            }
            fn update_person(&mut self, id: PersonId, update: &PersonUpdate) -> Result<()> {
                self.inner.update_person(id, update)
            }
            fn family_members(&self, family: FamilyId) -> Result<Vec<Person>> {
                self.inner.family_members(family)
            }
        }

        let mut inner = MemoryStore::new();
        let member = seed_member(&mut inner, "独生女", Gender::Female);
        let mut store = CountingStore {
            inner,
            reads: std::cell::Cell::new(0),
        };

        {
            let mut factory = PhantomFactory::new(&mut store);
            factory.ensure_sibling_parents(member.id).unwrap();
        }
        // One snapshot read; both slots resolve against it.
        assert_eq!(store.reads.get(), 1);
    }

    #[test]
    fn test_anchor_child_slot_follows_parent_gender() {
        let mut store = MemoryStore::new();
        let grandmother = seed_member(&mut store, "林月娥", Gender::Female);

        let child = {
            let mut factory = PhantomFactory::new(&mut store);
            factory.anchor_child(&grandmother).unwrap()
        };
        assert_eq!(child.name, "林月娥的孩子");
        assert_eq!(child.mother_id, Some(grandmother.id));
        assert_eq!(child.father_id, None);
        assert_eq!(child.gender, Gender::Unknown);
        assert!(!child.registered);
    }

    #[test]
    fn test_phantom_sibling_links_to_parent_pair() {
        let mut store = MemoryStore::new();
        let member = seed_member(&mut store, "李美芳", Gender::Female);
        let pair = {
            let mut factory = PhantomFactory::new(&mut store);
            factory.ensure_sibling_parents(member.id).unwrap()
        };

        let sibling = {
            let mut factory = PhantomFactory::new(&mut store);
            factory.phantom_sibling(&member, pair).unwrap()
        };
        assert_eq!(sibling.name, "李美芳的兄弟姐妹");
        assert_eq!(sibling.father_id, Some(pair.father));
        assert_eq!(sibling.mother_id, Some(pair.mother));
        assert_eq!(sibling.gender, Gender::Unknown);
    }
}

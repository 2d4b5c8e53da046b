//! Core data model: person nodes and the partial-update type used by
//! mutation plans.
//!
//! `father_id`/`mother_id` are directed edges toward ancestor nodes;
//! `spouse_id` is a symmetric pairing, not a hierarchy edge.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::roles::RoleId;

/// Opaque person identifier, unique within a family. Assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque family identifier. Every graph operation stays inside one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub i64);

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Person gender as recorded on the node. `Unknown` is a valid stored state
/// (phantom anchor children and some imported members have no gender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Database text form; `Unknown` maps to NULL.
    pub fn as_db(self) -> Option<&'static str> {
        match self {
            Gender::Male => Some("male"),
            Gender::Female => Some("female"),
            Gender::Unknown => None,
        }
    }

    /// Parse the database text form. Anything unrecognized is `Unknown`.
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("male") => Gender::Male,
            Some("female") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// Which parent edge of a node is being addressed. Replaces the dynamic
/// field-name selection the schema would otherwise invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentSlot {
    Father,
    Mother,
}

impl ParentSlot {
    /// The gender a parent occupying this slot has.
    pub fn gender(self) -> Gender {
        match self {
            ParentSlot::Father => Gender::Male,
            ParentSlot::Mother => Gender::Female,
        }
    }
}

/// A person node in the kinship graph.
///
/// Phantom nodes (created to stand in for absent ancestors or siblings) are
/// ordinary `Person` values with `registered = false` and a synthetic name;
/// they are reachable through the same edges as real members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub family_id: FamilyId,
    pub name: String,
    pub gender: Gender,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    pub spouse_id: Option<PersonId>,
    /// False for phantom nodes and members who have not claimed their record.
    pub registered: bool,
    /// Descriptive canonical role chosen at creation time; never an edge.
    pub standard_role: Option<RoleId>,
    /// Free-form relationship label (legacy display fallback).
    pub relationship: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl Person {
    /// Materialize a stored person from its insert fields and assigned id.
    pub fn from_new(id: PersonId, fields: NewPerson) -> Self {
        Person {
            id,
            family_id: fields.family_id,
            name: fields.name,
            gender: fields.gender,
            father_id: fields.father_id,
            mother_id: fields.mother_id,
            spouse_id: fields.spouse_id,
            registered: fields.registered,
            standard_role: fields.standard_role,
            relationship: fields.relationship,
            birth_date: fields.birth_date,
        }
    }

    /// The parent edge addressed by `slot`.
    pub fn parent(&self, slot: ParentSlot) -> Option<PersonId> {
        match slot {
            ParentSlot::Father => self.father_id,
            ParentSlot::Mother => self.mother_id,
        }
    }

    /// Apply a partial update in place. `None` fields are left untouched;
    /// updates are set-only and never clear an edge.
    pub fn apply(&mut self, update: &PersonUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(father) = update.father_id {
            self.father_id = Some(father);
        }
        if let Some(mother) = update.mother_id {
            self.mother_id = Some(mother);
        }
        if let Some(spouse) = update.spouse_id {
            self.spouse_id = Some(spouse);
        }
        if let Some(registered) = update.registered {
            self.registered = registered;
        }
        if let Some(role) = update.standard_role {
            self.standard_role = Some(role);
        }
        if let Some(relationship) = &update.relationship {
            self.relationship = Some(relationship.clone());
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = Some(birth_date);
        }
    }
}

/// Insert fields for a new person. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    pub family_id: FamilyId,
    pub name: String,
    pub gender: Gender,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    pub spouse_id: Option<PersonId>,
    pub registered: bool,
    pub standard_role: Option<RoleId>,
    pub relationship: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl NewPerson {
    /// A minimal unregistered person with everything else unset.
    pub fn new(family_id: FamilyId, name: impl Into<String>) -> Self {
        NewPerson {
            family_id,
            name: name.into(),
            gender: Gender::Unknown,
            father_id: None,
            mother_id: None,
            spouse_id: None,
            registered: false,
            standard_role: None,
            relationship: None,
            birth_date: None,
        }
    }
}

/// Partial update for a person node: every field optional, `None` meaning
/// "leave as is". This is the edit unit mutation plans are made of.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonUpdate {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    pub spouse_id: Option<PersonId>,
    pub registered: Option<bool>,
    pub standard_role: Option<RoleId>,
    pub relationship: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl PersonUpdate {
    /// True when the update would touch nothing.
    pub fn is_empty(&self) -> bool {
        self == &PersonUpdate::default()
    }

    /// Set the parent edge addressed by `slot`.
    pub fn set_parent(&mut self, slot: ParentSlot, id: PersonId) {
        match slot {
            ParentSlot::Father => self.father_id = Some(id),
            ParentSlot::Mother => self.mother_id = Some(id),
        }
    }
}

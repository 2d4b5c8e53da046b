//! Edge resolution: turning "target is my \<role\>" into graph mutations.
//!
//! [`resolve_relationship`] dispatches over [`RoleCategory`] and produces a
//! [`MutationPlan`] of partial updates for the inviter, the target, and at
//! most one third node (the middle generation of a grandparent bind).
//! Phantom ancestors and siblings are created through [`PhantomFactory`]
//! during resolution; everything else is deferred to [`apply_plan`] so the
//! caller can scope a transaction around the whole bind.
//!
//! Bindings that would make a node its own ancestor are rejected before any
//! phantom is created.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{KingraphError, Result};
use crate::graph::phantom::PhantomFactory;
use crate::model::{Gender, ParentSlot, Person, PersonId, PersonUpdate};
use crate::roles::RoleId;
use crate::store::GraphStore;

/// The resolver's dispatch alphabet. Coarser than [`RoleId`]: roles that bind
/// identically collapse into one category carrying the parameters that
/// actually matter (which line to walk, which gender to stamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCategory {
    /// Target becomes the inviter's father or mother.
    Parent(ParentSlot),
    /// Target becomes the inviter's child, with this gender.
    Child(Gender),
    /// Target becomes the inviter's sibling, sharing both parents.
    Sibling(Gender),
    /// Symmetric spouse pairing.
    Spouse,
    /// Target becomes a grandparent: `line` selects which of the inviter's
    /// parents to go through, `slot` which of that parent's edges to set.
    Grandparent { line: ParentSlot, slot: ParentSlot },
    /// Target becomes a grandchild, hung off a fresh anchor child.
    Grandchild(Gender),
    /// Target becomes a sibling of the inviter's parent on `line`.
    ParentSibling { line: ParentSlot, gender: Gender },
    /// Target becomes a child of a phantom sibling of the inviter.
    SiblingChild(Gender),
    /// No edges to bind (cousin, family, anything unrecognized).
    Unsupported,
}

impl From<RoleId> for RoleCategory {
    fn from(role: RoleId) -> Self {
        match role {
            RoleId::Father => RoleCategory::Parent(ParentSlot::Father),
            RoleId::Mother => RoleCategory::Parent(ParentSlot::Mother),
            RoleId::Son => RoleCategory::Child(Gender::Male),
            RoleId::Daughter => RoleCategory::Child(Gender::Female),
            RoleId::Brother => RoleCategory::Sibling(Gender::Male),
            RoleId::Sister => RoleCategory::Sibling(Gender::Female),
            RoleId::Husband | RoleId::Wife => RoleCategory::Spouse,
            RoleId::GrandfatherPaternal => RoleCategory::Grandparent {
                line: ParentSlot::Father,
                slot: ParentSlot::Father,
            },
            RoleId::GrandmotherPaternal => RoleCategory::Grandparent {
                line: ParentSlot::Father,
                slot: ParentSlot::Mother,
            },
            RoleId::GrandfatherMaternal => RoleCategory::Grandparent {
                line: ParentSlot::Mother,
                slot: ParentSlot::Father,
            },
            RoleId::GrandmotherMaternal => RoleCategory::Grandparent {
                line: ParentSlot::Mother,
                slot: ParentSlot::Mother,
            },
            RoleId::Grandson => RoleCategory::Grandchild(Gender::Male),
            RoleId::Granddaughter => RoleCategory::Grandchild(Gender::Female),
            RoleId::UnclePaternal => RoleCategory::ParentSibling {
                line: ParentSlot::Father,
                gender: Gender::Male,
            },
            RoleId::AuntPaternal => RoleCategory::ParentSibling {
                line: ParentSlot::Father,
                gender: Gender::Female,
            },
            RoleId::UncleMaternal => RoleCategory::ParentSibling {
                line: ParentSlot::Mother,
                gender: Gender::Male,
            },
            RoleId::AuntMaternal => RoleCategory::ParentSibling {
                line: ParentSlot::Mother,
                gender: Gender::Female,
            },
            RoleId::Nephew => RoleCategory::SiblingChild(Gender::Male),
            RoleId::Niece => RoleCategory::SiblingChild(Gender::Female),
            RoleId::Cousin | RoleId::Family => RoleCategory::Unsupported,
        }
    }
}

impl RoleCategory {
    /// Parse a role string from either vocabulary: the bare category strings
    /// the registration flow sends ("spouse", "grandfather", "uncle", and so
    /// on; ambiguous ones default to the paternal line) or anything
    /// [`RoleId::canonicalize`] accepts. Total; unknown input is
    /// `Unsupported`.
    pub fn parse(input: &str) -> RoleCategory {
        match input.trim() {
            "spouse" => RoleCategory::Spouse,
            "grandfather" => RoleCategory::Grandparent {
                line: ParentSlot::Father,
                slot: ParentSlot::Father,
            },
            "grandmother" => RoleCategory::Grandparent {
                line: ParentSlot::Father,
                slot: ParentSlot::Mother,
            },
            "uncle" => RoleCategory::ParentSibling {
                line: ParentSlot::Father,
                gender: Gender::Male,
            },
            "aunt" => RoleCategory::ParentSibling {
                line: ParentSlot::Father,
                gender: Gender::Female,
            },
            other => RoleId::canonicalize(other).into(),
        }
    }
}

/// Pending edits from one resolution: partial updates for the target, the
/// inviter, and any third node. Phantom creation has already happened by the
/// time a plan exists; applying the plan is the caller's transactional step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationPlan {
    pub inviter_id: PersonId,
    pub target_id: PersonId,
    pub inviter: PersonUpdate,
    pub target: PersonUpdate,
    pub extra: Vec<(PersonId, PersonUpdate)>,
}

impl MutationPlan {
    fn new(inviter_id: PersonId, target_id: PersonId) -> Self {
        MutationPlan {
            inviter_id,
            target_id,
            inviter: PersonUpdate::default(),
            target: PersonUpdate::default(),
            extra: Vec::new(),
        }
    }

    /// True when the plan would change nothing.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty() && self.inviter.is_empty() && self.extra.is_empty()
    }
}

/// True when `candidate` is a proper ancestor of `person` through
/// `father_id`/`mother_id` chains. Dangling edges are skipped; a visited set
/// keeps the walk finite even over an already-corrupt graph.
pub fn is_ancestor<S: GraphStore>(
    store: &S,
    person: PersonId,
    candidate: PersonId,
) -> Result<bool> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(person);
    queue.push_back(person);

    while let Some(current) = queue.pop_front() {
        let node = match store.get_person(current) {
            Ok(node) => node,
            Err(KingraphError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };
        for parent in [node.father_id, node.mother_id].into_iter().flatten() {
            if parent == candidate {
                return Ok(true);
            }
            if visited.insert(parent) {
                queue.push_back(parent);
            }
        }
    }
    Ok(false)
}

/// Resolve a role binding between `inviter` and `target_id` into a
/// [`MutationPlan`]. Accepts a [`RoleId`] or a [`RoleCategory`].
///
/// Missing ancestors and siblings are created through the store as phantom
/// nodes while resolving; the returned plan carries only the remaining
/// edits. Cycle checks run against the pre-existing graph before anything is
/// created, so a rejected binding leaves no residue.
pub fn resolve_relationship<S, R>(
    store: &mut S,
    role: R,
    inviter: &Person,
    target_id: PersonId,
) -> Result<MutationPlan>
where
    S: GraphStore,
    R: Into<RoleCategory>,
{
    let category = role.into();
    let mut plan = MutationPlan::new(inviter.id, target_id);

    if category == RoleCategory::Unsupported {
        return Ok(plan);
    }
    if inviter.id == target_id {
        return Err(KingraphError::SelfRelation(target_id));
    }

    match category {
        RoleCategory::Parent(slot) => {
            // inviter -> target would close a loop if the inviter already
            // sits above the target.
            if is_ancestor(store, target_id, inviter.id)? {
                return Err(KingraphError::AncestryCycle(target_id));
            }
            plan.inviter.set_parent(slot, target_id);
            plan.target.gender = Some(slot.gender());
        }
        RoleCategory::Child(gender) => {
            if is_ancestor(store, inviter.id, target_id)? {
                return Err(KingraphError::AncestryCycle(target_id));
            }
            plan.target.set_parent(child_slot(inviter.gender), inviter.id);
            plan.target.gender = Some(gender);
        }
        RoleCategory::Sibling(gender) => {
            // The target inherits the inviter's (possibly phantom) parents,
            // so an ancestor of the inviter cannot drop down beside them.
            if is_ancestor(store, inviter.id, target_id)? {
                return Err(KingraphError::AncestryCycle(target_id));
            }
            let parents = {
                let mut factory = PhantomFactory::new(store);
                factory.ensure_sibling_parents_of(inviter)?
            };
            plan.target.father_id = Some(parents.father);
            plan.target.mother_id = Some(parents.mother);
            plan.target.gender = Some(gender);
        }
        RoleCategory::Spouse => {
            plan.target.spouse_id = Some(inviter.id);
            plan.inviter.spouse_id = Some(target_id);
            plan.target.gender = Some(spouse_gender(inviter.gender));
        }
        RoleCategory::Grandparent { line, slot } => {
            // The target ends up above the inviter whether the middle
            // parent already exists or is a fresh phantom, so a target
            // sitting below the inviter always closes a loop.
            if is_ancestor(store, target_id, inviter.id)? {
                return Err(KingraphError::AncestryCycle(target_id));
            }
            if let Some(parent_id) = inviter.parent(line) {
                if parent_id == target_id || is_ancestor(store, target_id, parent_id)? {
                    return Err(KingraphError::AncestryCycle(target_id));
                }
                match store.get_person(parent_id) {
                    Ok(parent) => {
                        if parent.parent(slot).is_some() {
                            log::warn!(
                                "person {} already has a {:?} edge, rebinding it to person {}",
                                parent_id,
                                slot,
                                target_id
                            );
                        }
                    }
                    Err(KingraphError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            let parent_id = {
                let mut factory = PhantomFactory::new(store);
                factory.ensure_parent_of(inviter, line)?
            };
            let mut edge = PersonUpdate::default();
            edge.set_parent(slot, target_id);
            plan.extra.push((parent_id, edge));
            plan.target.gender = Some(slot.gender());
        }
        RoleCategory::Grandchild(gender) => {
            if is_ancestor(store, inviter.id, target_id)? {
                return Err(KingraphError::AncestryCycle(target_id));
            }
            let anchor = {
                let mut factory = PhantomFactory::new(store);
                factory.anchor_child(inviter)?
            };
            plan.target.set_parent(child_slot(inviter.gender), anchor.id);
            plan.target.gender = Some(gender);
        }
        RoleCategory::ParentSibling { line, gender } => {
            // The target will become a child of the line parent's parents;
            // if the target already sits above that parent this would fold
            // the chain onto itself.
            if let Some(parent_id) = inviter.parent(line) {
                if is_ancestor(store, parent_id, target_id)? {
                    return Err(KingraphError::AncestryCycle(target_id));
                }
            }
            let parents = {
                let mut factory = PhantomFactory::new(store);
                let parent_id = factory.ensure_parent_of(inviter, line)?;
                factory.ensure_sibling_parents(parent_id)?
            };
            plan.target.father_id = Some(parents.father);
            plan.target.mother_id = Some(parents.mother);
            plan.target.gender = Some(gender);
        }
        RoleCategory::SiblingChild(gender) => {
            if is_ancestor(store, inviter.id, target_id)? {
                return Err(KingraphError::AncestryCycle(target_id));
            }
            let sibling = {
                let mut factory = PhantomFactory::new(store);
                let parents = factory.ensure_sibling_parents_of(inviter)?;
                factory.phantom_sibling(inviter, parents)?
            };
            let slot = if inviter.gender == Gender::Male {
                ParentSlot::Father
            } else {
                ParentSlot::Mother
            };
            plan.target.set_parent(slot, sibling.id);
            plan.target.gender = Some(gender);
        }
        RoleCategory::Unsupported => {}
    }

    log::debug!(
        "resolved {:?}: target {} edits {:?}, inviter {} edits {:?}, {} extra",
        category,
        target_id,
        plan.target,
        inviter.id,
        plan.inviter,
        plan.extra.len()
    );
    Ok(plan)
}

/// String-level entry point shared by every call site: fetch both nodes
/// (`NotFound` if either is missing), parse the role, resolve. The plan is
/// returned unapplied.
pub fn bind_by_role<S: GraphStore>(
    store: &mut S,
    role: &str,
    inviter_id: PersonId,
    target_id: PersonId,
) -> Result<MutationPlan> {
    let inviter = store.get_person(inviter_id)?;
    store.get_person(target_id)?;

    let category = RoleCategory::parse(role);
    log::debug!(
        "binding person {} as {:?} of person {} (input {:?})",
        target_id,
        category,
        inviter_id,
        role
    );
    resolve_relationship(store, category, &inviter, target_id)
}

/// Apply a plan's edits through the store: target, inviter, then extra.
///
/// A failure before anything was written propagates unchanged; a failure
/// after at least one edit maps to [`KingraphError::Inconsistent`], since
/// the graph is now half-mutated and the caller must roll back or retry.
pub fn apply_plan<S: GraphStore>(store: &mut S, plan: &MutationPlan) -> Result<()> {
    let mut steps: Vec<(PersonId, &PersonUpdate)> = vec![
        (plan.target_id, &plan.target),
        (plan.inviter_id, &plan.inviter),
    ];
    for (id, update) in &plan.extra {
        steps.push((*id, update));
    }
    steps.retain(|(_, update)| !update.is_empty());

    let total = steps.len();
    for (applied, (id, update)) in steps.iter().enumerate() {
        if let Err(e) = store.update_person(*id, update) {
            if applied == 0 {
                return Err(e);
            }
            return Err(KingraphError::Inconsistent(format!(
                "{} of {} edits applied before person {} failed: {}",
                applied, total, id, e
            )));
        }
    }
    Ok(())
}

/// Which parent slot a child edge of `parent_gender` occupies.
fn child_slot(parent_gender: Gender) -> ParentSlot {
    if parent_gender == Gender::Female {
        ParentSlot::Mother
    } else {
        ParentSlot::Father
    }
}

/// Gender stamped on a spouse target: the inviter's opposite, defaulting to
/// male when the inviter's gender is unknown.
fn spouse_gender(inviter_gender: Gender) -> Gender {
    match inviter_gender {
        Gender::Male => Gender::Female,
        _ => Gender::Male,
    }
}

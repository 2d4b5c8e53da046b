//! Pure kinship labelling over a family snapshot.
//!
//! [`infer_label`] never touches the store: callers load the family once and
//! every lookup is answered from that slice. Labels come from graph
//! structure first, in a fixed precedence, and only fall back to stored
//! descriptive fields when no edge pattern matches.

use crate::model::{Gender, Person, PersonId};

/// Label a viewer sees on their own card.
const SELF_LABEL: &str = "本人";
/// Catch-all when nothing structural or descriptive applies.
const DEFAULT_LABEL: &str = "家人";

/// The kinship term `viewer_id` uses for `target_id`, computed from the
/// family snapshot in `people`.
///
/// Precedence: self, parents, children, grandparents (split by line),
/// grandchildren (split by line), siblings, spouse, then the target's stored
/// `relationship` text, then its `standard_role` label, then the catch-all.
/// A spouse is recognized from a direct `spouse_id` edge in either direction
/// or from a shared child. Ids missing from the snapshot yield the
/// catch-all.
pub fn infer_label(viewer_id: PersonId, target_id: PersonId, people: &[Person]) -> String {
    if viewer_id == target_id {
        return SELF_LABEL.to_owned();
    }
    let find = |id: PersonId| people.iter().find(|p| p.id == id);
    let (viewer, target) = match (find(viewer_id), find(target_id)) {
        (Some(viewer), Some(target)) => (viewer, target),
        _ => return DEFAULT_LABEL.to_owned(),
    };

    if viewer.father_id == Some(target.id) {
        return "爸爸".to_owned();
    }
    if viewer.mother_id == Some(target.id) {
        return "妈妈".to_owned();
    }

    if target.father_id == Some(viewer.id) || target.mother_id == Some(viewer.id) {
        return by_gender(target.gender, "女儿", "儿子").to_owned();
    }

    // Grandparents, through whichever of the viewer's parents is on file.
    if let Some(father) = viewer.father_id.and_then(find) {
        if father.father_id == Some(target.id) {
            return "爷爷".to_owned();
        }
        if father.mother_id == Some(target.id) {
            return "奶奶".to_owned();
        }
    }
    if let Some(mother) = viewer.mother_id.and_then(find) {
        if mother.father_id == Some(target.id) {
            return "外公".to_owned();
        }
        if mother.mother_id == Some(target.id) {
            return "外婆".to_owned();
        }
    }

    // Grandchildren: the line is read off which of the target's parents
    // descends from the viewer.
    if let Some(father) = target.father_id.and_then(find) {
        if father.father_id == Some(viewer.id) || father.mother_id == Some(viewer.id) {
            return by_gender(target.gender, "孙女", "孙子").to_owned();
        }
    }
    if let Some(mother) = target.mother_id.and_then(find) {
        if mother.father_id == Some(viewer.id) || mother.mother_id == Some(viewer.id) {
            return by_gender(target.gender, "外孙女", "外孙子").to_owned();
        }
    }

    let shared_father = viewer.father_id.is_some() && viewer.father_id == target.father_id;
    let shared_mother = viewer.mother_id.is_some() && viewer.mother_id == target.mother_id;
    if shared_father || shared_mother {
        return by_gender(target.gender, "姐妹", "兄弟").to_owned();
    }

    let direct_spouse = viewer.spouse_id == Some(target.id) || target.spouse_id == Some(viewer.id);
    let shared_child = people.iter().any(|p| {
        (p.father_id == Some(viewer.id) && p.mother_id == Some(target.id))
            || (p.father_id == Some(target.id) && p.mother_id == Some(viewer.id))
    });
    if direct_spouse || shared_child {
        return by_gender(target.gender, "妻子", "丈夫").to_owned();
    }

    if let Some(relationship) = target.relationship.as_deref() {
        if !relationship.trim().is_empty() {
            return relationship.to_owned();
        }
    }
    if let Some(role) = target.standard_role {
        return role.label().to_owned();
    }
    DEFAULT_LABEL.to_owned()
}

fn by_gender(gender: Gender, female: &'static str, other: &'static str) -> &'static str {
    if gender == Gender::Female {
        female
    } else {
        other
    }
}

//! Closed vocabulary of canonical kin roles.
//!
//! Roles arrive as free-form strings (Chinese kin terms typed by users, or
//! ASCII identifiers from API callers) and are canonicalized into
//! [`RoleId`]. Canonicalization is total: anything unrecognized degrades to
//! [`RoleId::Family`], which binds no edges.

use serde::{Deserialize, Serialize};

/// Canonical role identifier. The ASCII serialized form (`as_str`) is what
/// gets persisted in the `standard_role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    Father,
    Mother,
    GrandfatherPaternal,
    GrandmotherPaternal,
    GrandfatherMaternal,
    GrandmotherMaternal,
    Husband,
    Wife,
    Son,
    Daughter,
    Brother,
    Sister,
    UnclePaternal,
    AuntPaternal,
    UncleMaternal,
    AuntMaternal,
    Grandson,
    Granddaughter,
    Nephew,
    Niece,
    Cousin,
    Family,
}

/// Selectable roles in presentation order, with the short labels shown when
/// picking a relationship (these differ from `label()` for sibling roles).
pub const ROLE_OPTIONS: [(RoleId, &str); 22] = [
    (RoleId::GrandfatherPaternal, "爷爷"),
    (RoleId::GrandmotherPaternal, "奶奶"),
    (RoleId::GrandfatherMaternal, "外公"),
    (RoleId::GrandmotherMaternal, "外婆"),
    (RoleId::Father, "父亲"),
    (RoleId::Mother, "母亲"),
    (RoleId::Husband, "丈夫"),
    (RoleId::Wife, "妻子"),
    (RoleId::Brother, "兄弟"),
    (RoleId::Sister, "姐妹"),
    (RoleId::UnclePaternal, "叔叔/伯伯"),
    (RoleId::AuntPaternal, "姑姑"),
    (RoleId::UncleMaternal, "舅舅"),
    (RoleId::AuntMaternal, "阿姨"),
    (RoleId::Son, "儿子"),
    (RoleId::Daughter, "女儿"),
    (RoleId::Grandson, "孙子"),
    (RoleId::Granddaughter, "孙女"),
    (RoleId::Nephew, "侄子/外甥"),
    (RoleId::Niece, "侄女/外甥女"),
    (RoleId::Cousin, "表亲/堂亲"),
    (RoleId::Family, "其他家人"),
];

impl RoleId {
    /// Stable ASCII identifier, also the persisted form.
    pub fn as_str(self) -> &'static str {
        match self {
            RoleId::Father => "father",
            RoleId::Mother => "mother",
            RoleId::GrandfatherPaternal => "grandfather_paternal",
            RoleId::GrandmotherPaternal => "grandmother_paternal",
            RoleId::GrandfatherMaternal => "grandfather_maternal",
            RoleId::GrandmotherMaternal => "grandmother_maternal",
            RoleId::Husband => "husband",
            RoleId::Wife => "wife",
            RoleId::Son => "son",
            RoleId::Daughter => "daughter",
            RoleId::Brother => "brother",
            RoleId::Sister => "sister",
            RoleId::UnclePaternal => "uncle_paternal",
            RoleId::AuntPaternal => "aunt_paternal",
            RoleId::UncleMaternal => "uncle_maternal",
            RoleId::AuntMaternal => "aunt_maternal",
            RoleId::Grandson => "grandson",
            RoleId::Granddaughter => "granddaughter",
            RoleId::Nephew => "nephew",
            RoleId::Niece => "niece",
            RoleId::Cousin => "cousin",
            RoleId::Family => "family",
        }
    }

    /// Parse the ASCII identifier form. Returns `None` for anything else;
    /// use [`RoleId::canonicalize`] for free-form input.
    pub fn parse(s: &str) -> Option<RoleId> {
        let role = match s {
            "father" => RoleId::Father,
            "mother" => RoleId::Mother,
            "grandfather_paternal" => RoleId::GrandfatherPaternal,
            "grandmother_paternal" => RoleId::GrandmotherPaternal,
            "grandfather_maternal" => RoleId::GrandfatherMaternal,
            "grandmother_maternal" => RoleId::GrandmotherMaternal,
            "husband" => RoleId::Husband,
            "wife" => RoleId::Wife,
            "son" => RoleId::Son,
            "daughter" => RoleId::Daughter,
            "brother" => RoleId::Brother,
            "sister" => RoleId::Sister,
            "uncle_paternal" => RoleId::UnclePaternal,
            "aunt_paternal" => RoleId::AuntPaternal,
            "uncle_maternal" => RoleId::UncleMaternal,
            "aunt_maternal" => RoleId::AuntMaternal,
            "grandson" => RoleId::Grandson,
            "granddaughter" => RoleId::Granddaughter,
            "nephew" => RoleId::Nephew,
            "niece" => RoleId::Niece,
            "cousin" => RoleId::Cousin,
            "family" => RoleId::Family,
            _ => return None,
        };
        Some(role)
    }

    /// Full display label for the role.
    pub fn label(self) -> &'static str {
        match self {
            RoleId::Father => "父亲",
            RoleId::Mother => "母亲",
            RoleId::GrandfatherPaternal => "爷爷",
            RoleId::GrandmotherPaternal => "奶奶",
            RoleId::GrandfatherMaternal => "外公",
            RoleId::GrandmotherMaternal => "外婆",
            RoleId::Husband => "丈夫",
            RoleId::Wife => "妻子",
            RoleId::Son => "儿子",
            RoleId::Daughter => "女儿",
            RoleId::Brother => "哥哥/弟弟",
            RoleId::Sister => "姐姐/妹妹",
            RoleId::UnclePaternal => "叔叔/伯伯",
            RoleId::AuntPaternal => "姑姑",
            RoleId::UncleMaternal => "舅舅",
            RoleId::AuntMaternal => "阿姨",
            RoleId::Grandson => "孙子",
            RoleId::Granddaughter => "孙女",
            RoleId::Nephew => "侄子/外甥",
            RoleId::Niece => "侄女/外甥女",
            RoleId::Cousin => "表兄弟/堂兄弟",
            RoleId::Family => "家人",
        }
    }

    /// Canonicalize a free-form relationship string. Recognizes common
    /// Chinese kin terms and the ASCII identifiers; everything else maps to
    /// `Family`.
    pub fn canonicalize(input: &str) -> RoleId {
        let trimmed = input.trim();
        let from_term = match trimmed {
            "爷爷" => Some(RoleId::GrandfatherPaternal),
            "奶奶" => Some(RoleId::GrandmotherPaternal),
            "外公" => Some(RoleId::GrandfatherMaternal),
            "外婆" => Some(RoleId::GrandmotherMaternal),
            "父亲" | "爸爸" => Some(RoleId::Father),
            "母亲" | "妈妈" => Some(RoleId::Mother),
            "丈夫" => Some(RoleId::Husband),
            "妻子" => Some(RoleId::Wife),
            "兄弟" | "哥哥" | "弟弟" => Some(RoleId::Brother),
            "姐姐" | "妹妹" | "姐妹" => Some(RoleId::Sister),
            "叔叔" | "伯伯" => Some(RoleId::UnclePaternal),
            "姑姑" => Some(RoleId::AuntPaternal),
            "舅舅" => Some(RoleId::UncleMaternal),
            "阿姨" => Some(RoleId::AuntMaternal),
            "儿子" => Some(RoleId::Son),
            "女儿" => Some(RoleId::Daughter),
            "孙子" => Some(RoleId::Grandson),
            "孙女" => Some(RoleId::Granddaughter),
            "侄子" | "外甥" => Some(RoleId::Nephew),
            "侄女" | "外甥女" => Some(RoleId::Niece),
            "表亲" | "堂亲" => Some(RoleId::Cousin),
            _ => None,
        };
        from_term
            .or_else(|| RoleId::parse(trimmed))
            .unwrap_or(RoleId::Family)
    }
}

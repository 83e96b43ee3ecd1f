//! `CategoryKey` vocabulary — the structured tags `LookupIndex` buckets
//! catalogue items under.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Simple,
    Martial,
    Exotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponShape {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorShape {
    Light,
    Medium,
    Heavy,
}

/// A structured tag addressing one bucket in `LookupIndex`.
///
/// Each variant corresponds to one `axis`; fields beyond the axis are the
/// axis-specific qualifiers (e.g. `{axis: weapon, proficiency: martial,
/// shape: melee}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "axis")]
pub enum CategoryKey {
    Weapon {
        proficiency: Proficiency,
        shape: WeaponShape,
    },
    Armor {
        proficiency: Proficiency,
        shape: ArmorShape,
    },
    Tool {
        tool_type: String,
    },
    Focus {
        tradition: String,
    },
    Shield,
}

impl CategoryKey {
    /// A stable string used as the secondary bucket-lookup key, so two
    /// `CategoryKey` values that are `PartialEq` always map to the same
    /// bucket even across a `Hash`-map rebuild.
    pub fn bucket_key(&self) -> String {
        match self {
            CategoryKey::Weapon { proficiency, shape } => {
                format!("weapon:{proficiency:?}:{shape:?}")
            }
            CategoryKey::Armor { proficiency, shape } => {
                format!("armor:{proficiency:?}:{shape:?}")
            }
            CategoryKey::Tool { tool_type } => format!("tool:{tool_type}"),
            CategoryKey::Focus { tradition } => format!("focus:{tradition}"),
            CategoryKey::Shield => "shield".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_key_is_stable_for_equal_keys() {
        let a = CategoryKey::Weapon {
            proficiency: Proficiency::Martial,
            shape: WeaponShape::Melee,
        };
        let b = CategoryKey::Weapon {
            proficiency: Proficiency::Martial,
            shape: WeaponShape::Melee,
        };
        assert_eq!(a.bucket_key(), b.bucket_key());
        assert_eq!(a, b);
    }

    #[test]
    fn bucket_key_distinguishes_axes() {
        let weapon = CategoryKey::Weapon {
            proficiency: Proficiency::Simple,
            shape: WeaponShape::Ranged,
        };
        let tool = CategoryKey::Tool {
            tool_type: "artisan".to_string(),
        };
        assert_ne!(weapon.bucket_key(), tool.bucket_key());
    }
}

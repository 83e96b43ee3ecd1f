//! Catalogue vocabulary: the opaque item references and pack metadata the
//! `ItemStore` collaborator deals in.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ItemRefId, PackId};

/// The kind of a catalogue item, used to drive stable ordering
/// (weapon > armor > shield > tool > other) and stackability defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Shield,
    Tool,
    Consumable,
    Container,
    Equipment,
    Loot,
    Focus,
    Other,
    /// A `LINKED`/`CATEGORY` reference that failed to resolve against the
    /// catalogue.
    Unresolved,
}

impl ItemKind {
    /// Kind-priority used by stable-sort ordering; lower sorts first.
    pub fn sort_priority(self) -> u8 {
        match self {
            ItemKind::Weapon => 0,
            ItemKind::Armor => 1,
            ItemKind::Shield => 2,
            ItemKind::Tool => 3,
            ItemKind::Focus => 4,
            ItemKind::Equipment => 5,
            ItemKind::Consumable => 6,
            ItemKind::Container => 7,
            ItemKind::Loot => 8,
            ItemKind::Other => 9,
            ItemKind::Unresolved => 10,
        }
    }

    /// Non-stackable kinds default to weapon, armor, shield.
    pub fn default_non_stackable() -> &'static [ItemKind] {
        &[ItemKind::Weapon, ItemKind::Armor, ItemKind::Shield]
    }
}

/// A dereferenced catalogue item: an opaque id plus the fields the
/// Renderer/Collector need to display and merge it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    id: ItemRefId,
    name: String,
    kind: ItemKind,
    pack_id: Option<PackId>,
    local_id: String,
    /// Opaque system-specific payload (tags, proficiency class, etc.) kept
    /// as JSON-ish key/value pairs rather than a typed blob, matching the
    /// host catalogue's "system" bag.
    system: Vec<(String, String)>,
}

impl ItemRef {
    pub fn new(name: impl Into<String>, kind: ItemKind, local_id: impl Into<String>) -> Self {
        Self {
            id: ItemRefId::new(),
            name: name.into(),
            kind,
            pack_id: None,
            local_id: local_id.into(),
            system: Vec::new(),
        }
    }

    /// Build the sentinel used when a reference could not be resolved
    ///: the node keeps the literal name for display
    /// but is flagged unresolved so the Renderer can hide it when an
    /// alternative sibling exists, and the Collector rejects it (§4.6 step 4).
    pub fn unresolved(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ItemRefId::new(),
            local_id: name.clone(),
            name,
            kind: ItemKind::Unresolved,
            pack_id: None,
            system: Vec::new(),
        }
    }

    pub fn with_pack(mut self, pack_id: PackId) -> Self {
        self.pack_id = Some(pack_id);
        self
    }

    pub fn with_system_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.system.push((key.into(), value.into()));
        self
    }

    pub fn id(&self) -> ItemRefId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn pack_id(&self) -> Option<PackId> {
        self.pack_id
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn system_tag(&self, key: &str) -> Option<&str> {
        self.system
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_unresolved(&self) -> bool {
        self.kind == ItemKind::Unresolved
    }

    pub fn is_stackable(&self, non_stackable: &[ItemKind]) -> bool {
        !non_stackable.contains(&self.kind)
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.kind)
    }
}

/// A content pack in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRef {
    id: PackId,
    name: String,
}

impl PackRef {
    pub fn new(id: PackId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> PackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One entry in a pack's index, as read by `LookupIndex::build`. This is
/// index-only metadata, not the full document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub local_id: String,
    pub name: String,
    pub kind: ItemKind,
    pub tags: Vec<String>,
    /// Opaque key/value system data used for category classification
    /// (proficiency class, weapon/armor shape, tool subtype).
    pub system: Vec<(String, String)>,
}

impl IndexEntry {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.system
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn to_item_ref(&self, pack_id: PackId) -> ItemRef {
        let mut item_ref = ItemRef::new(self.name.clone(), self.kind, self.local_id.clone())
            .with_pack(pack_id);
        for (k, v) in &self.system {
            item_ref = item_ref.with_system_tag(k.clone(), v.clone());
        }
        item_ref
    }
}

//! Descriptors: the raw equipment-tree entries `DocumentCatalogue` hands to
//! the Extractor.
//!
//! A descriptor is one row of the source item's starting-equipment table —
//! not yet an `EquipmentNode`: it still carries a parent-reference by raw
//! string id rather than a resolved `NodeId`, and its content key may
//! reference items that have not been looked up yet.

use equipcore_domain::{CategoryKey, WealthDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    And,
    Or,
    Item,
    Category,
    Focus,
    /// A legacy/free-form description string with no structured shape.
    FreeForm,
}

/// The content key of a descriptor: what it actually refers to, once its
/// `kind` says it is a leaf rather than a structural `And`/`Or`.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorContent {
    /// Structural `And`/`Or` nodes carry no content of their own.
    None,
    /// One or more comma-separated local ids; more than one makes this a
    /// `LINKED` bundle once resolved.
    ItemRefs(Vec<String>),
    Category(CategoryKey),
    Focus { tradition: String },
    FreeForm(String),
}

/// One row of a source item's starting-equipment table.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Raw id as given by the catalogue entry, used only to resolve
    /// parent/child linkage while building the tree.
    pub id: String,
    pub kind: DescriptorKind,
    /// Raw id of the parent group entry, if any.
    pub group: Option<String>,
    pub count: Option<u32>,
    pub content: DescriptorContent,
    pub label: Option<String>,
}

impl Descriptor {
    pub fn structural(id: impl Into<String>, kind: DescriptorKind, group: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            group,
            count: None,
            content: DescriptorContent::None,
            label: None,
        }
    }

    pub fn item(id: impl Into<String>, group: Option<String>, refs: Vec<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            kind: DescriptorKind::Item,
            group,
            count: Some(count),
            content: DescriptorContent::ItemRefs(refs),
            label: None,
        }
    }

    pub fn category(
        id: impl Into<String>,
        group: Option<String>,
        category_key: CategoryKey,
        count: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind: DescriptorKind::Category,
            group,
            count: Some(count),
            content: DescriptorContent::Category(category_key),
            label: None,
        }
    }

    pub fn focus(id: impl Into<String>, group: Option<String>, tradition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: DescriptorKind::Focus,
            group,
            count: Some(1),
            content: DescriptorContent::Focus {
                tradition: tradition.into(),
            },
            label: None,
        }
    }

    pub fn free_form(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: DescriptorKind::FreeForm,
            group: None,
            count: None,
            content: DescriptorContent::FreeForm(text.into()),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

pub type DescriptorList = Vec<Descriptor>;

/// The starting-wealth expression attached to a source item, if it offers
/// one.
pub type WealthEntry = WealthDescriptor;

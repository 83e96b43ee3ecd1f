//! `EquipmentAST` (C2): the normalised in-memory representation of one
//! equipment tree, with parent/child linkage folded into owned children.

use equipcore_domain::{CategoryKey, ItemKind, ItemRef, NodeId, WealthDescriptor};

/// One child of a `LINKED` bundle: a `LINKED` never contains `AND`/`OR`.
/// Modelled as its own type rather than a
/// restricted `EquipmentNode` so the invariant is enforced by the compiler,
/// not a runtime check.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkedChild {
    Item { item_ref: ItemRef, count: u32 },
    Category { category_key: CategoryKey, count: u32 },
}

impl LinkedChild {
    pub fn kind(&self) -> ItemKind {
        match self {
            LinkedChild::Item { item_ref, .. } => item_ref.kind(),
            LinkedChild::Category { category_key, .. } => category_axis_kind(category_key),
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            LinkedChild::Item { count, .. } => *count,
            LinkedChild::Category { count, .. } => *count,
        }
    }
}

fn category_axis_kind(key: &CategoryKey) -> ItemKind {
    match key {
        CategoryKey::Weapon { .. } => ItemKind::Weapon,
        CategoryKey::Armor { .. } => ItemKind::Armor,
        CategoryKey::Tool { .. } => ItemKind::Tool,
        CategoryKey::Focus { .. } => ItemKind::Focus,
        CategoryKey::Shield => ItemKind::Shield,
    }
}

/// A tagged-variant node in an equipment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum EquipmentNode {
    /// All children contribute.
    And {
        id: NodeId,
        children: Vec<EquipmentNode>,
        group_id: Option<String>,
    },
    /// Exactly one child contributes.
    Or {
        id: NodeId,
        children: Vec<EquipmentNode>,
        default_index: Option<usize>,
        label: Option<String>,
    },
    /// A concrete item with multiplicity.
    Item {
        id: NodeId,
        item_ref: ItemRef,
        count: u32,
        label: Option<String>,
    },
    /// Pick `count` items from a `LookupIndex` bucket.
    Category {
        id: NodeId,
        category_key: CategoryKey,
        count: u32,
    },
    /// An opaque bundle shown as one choice.
    Linked {
        id: NodeId,
        children: Vec<LinkedChild>,
        label: String,
    },
    /// Pick one arcane/druidic/holy focus.
    Focus {
        id: NodeId,
        tradition: String,
        count: u32,
    },
    /// Opt-out: replaces the entire ancestor subtree with coin.
    Wealth { id: NodeId, amount: WealthDescriptor },
}

impl EquipmentNode {
    pub fn id(&self) -> NodeId {
        match self {
            EquipmentNode::And { id, .. }
            | EquipmentNode::Or { id, .. }
            | EquipmentNode::Item { id, .. }
            | EquipmentNode::Category { id, .. }
            | EquipmentNode::Linked { id, .. }
            | EquipmentNode::Focus { id, .. }
            | EquipmentNode::Wealth { id, .. } => *id,
        }
    }

    /// The kind used for stable-sort ordering and for the Renderer's
    /// dynamic-dispatch table keyed by `(nodeKind, refKind)`.
    pub fn effective_kind(&self) -> ItemKind {
        match self {
            EquipmentNode::Item { item_ref, .. } => item_ref.kind(),
            EquipmentNode::Category { category_key, .. } => category_axis_kind(category_key),
            EquipmentNode::Linked { children, .. } => {
                children.first().map(LinkedChild::kind).unwrap_or(ItemKind::Other)
            }
            EquipmentNode::Focus { .. } => ItemKind::Focus,
            EquipmentNode::And { .. } | EquipmentNode::Or { .. } | EquipmentNode::Wealth { .. } => {
                ItemKind::Other
            }
        }
    }

    /// Display label used for tie-breaking the stable sort and for rendering.
    pub fn display_label(&self) -> String {
        match self {
            EquipmentNode::Item { item_ref, label, .. } => {
                label.clone().unwrap_or_else(|| item_ref.name().to_string())
            }
            EquipmentNode::Category { category_key, .. } => category_key.bucket_key(),
            EquipmentNode::Linked { label, .. } => label.clone(),
            EquipmentNode::Focus { tradition, .. } => format!("{tradition} focus"),
            EquipmentNode::Or { label, .. } => label.clone().unwrap_or_default(),
            EquipmentNode::And { .. } | EquipmentNode::Wealth { .. } => String::new(),
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self, EquipmentNode::Linked { .. })
    }

    pub fn children(&self) -> &[EquipmentNode] {
        match self {
            EquipmentNode::And { children, .. } | EquipmentNode::Or { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<EquipmentNode> {
        match self {
            EquipmentNode::And { children, .. } | EquipmentNode::Or { children, .. } => children,
            _ => panic!("children_mut called on a leaf EquipmentNode variant"),
        }
    }
}

/// Stable-sort an `AND`'s children by `(is_linked, kind priority, name)`
///. `Vec::sort_by_key` is a stable sort, so ties
/// preserve extraction order, which keeps the result deterministic for a
/// fixed input.
pub fn stable_sort_and_children(children: &mut [EquipmentNode]) {
    children.sort_by_key(|node| {
        (
            node.is_linked(),
            node.effective_kind().sort_priority(),
            node.display_label(),
        )
    });
}

/// Recursively re-sort every `AND` node's children in a tree (used by the
/// Extractor after building, and reusable by callers that mutate a tree in
/// place, e.g. `GroupPlanner`).
pub fn stable_sort_tree(node: &mut EquipmentNode) {
    if let EquipmentNode::And { children, .. } = node {
        for child in children.iter_mut() {
            stable_sort_tree(child);
        }
        stable_sort_and_children(children);
    } else if let EquipmentNode::Or { children, .. } = node {
        for child in children.iter_mut() {
            stable_sort_tree(child);
        }
    }
}

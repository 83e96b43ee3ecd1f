//! `Extractor` (C3): builds one `EquipmentNode` tree from a source item's
//! descriptor list.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use equipcore_domain::{ItemRef, ItemRefId, NodeId};

use crate::ast::{EquipmentNode, LinkedChild};
use crate::descriptor::{Descriptor, DescriptorContent, DescriptorKind, DescriptorList};
use crate::ports::{DocumentCatalogue, ItemStore};

pub struct Extractor;

impl Extractor {
    /// Build the root `EquipmentNode` for one source item. Never fails:
    /// malformed entries and unresolved refs become placeholders instead of
    /// an error.
    pub async fn extract(
        source_ref: ItemRefId,
        catalogue: &dyn DocumentCatalogue,
        item_store: &dyn ItemStore,
        ref_resolve_timeout_ms: u64,
    ) -> EquipmentNode {
        let descriptors = catalogue.get_starting_equipment(source_ref).await;
        if descriptors.is_empty() {
            return EquipmentNode::And {
                id: NodeId::new(),
                children: Vec::new(),
                group_id: None,
            };
        }

        let by_parent = group_by_parent(&descriptors);
        let roots: Vec<&Descriptor> = descriptors.iter().filter(|d| d.group.is_none()).collect();

        let mut children = Vec::with_capacity(roots.len());
        for root in roots {
            if let Some(node) =
                Box::pin(build_node(root, &by_parent, item_store, ref_resolve_timeout_ms)).await
            {
                children.push(node);
            }
        }

        let mut root = if children.len() == 1 {
            children.into_iter().next().expect("length checked above")
        } else {
            EquipmentNode::And {
                id: NodeId::new(),
                children,
                group_id: None,
            }
        };

        crate::ast::stable_sort_tree(&mut root);
        root
    }
}

fn group_by_parent(descriptors: &[Descriptor]) -> HashMap<String, Vec<&Descriptor>> {
    let mut map: HashMap<String, Vec<&Descriptor>> = HashMap::new();
    for descriptor in descriptors {
        if let Some(parent) = &descriptor.group {
            map.entry(parent.clone()).or_default().push(descriptor);
        }
    }
    map
}

async fn build_node(
    descriptor: &Descriptor,
    by_parent: &HashMap<String, Vec<&Descriptor>>,
    item_store: &dyn ItemStore,
    timeout_ms: u64,
) -> Option<EquipmentNode> {
    match descriptor.kind {
        DescriptorKind::And | DescriptorKind::Or => {
            let child_descriptors = by_parent.get(&descriptor.id).cloned().unwrap_or_default();
            let mut children = Vec::with_capacity(child_descriptors.len());
            for child in child_descriptors {
                if let Some(node) = Box::pin(build_node(child, by_parent, item_store, timeout_ms)).await {
                    children.push(node);
                }
            }

            if matches!(descriptor.kind, DescriptorKind::Or) {
                // Invariant 3: a singleton OR collapses to its child.
                if children.len() == 1 {
                    return children.into_iter().next();
                }
                if children.is_empty() {
                    return None;
                }
                return Some(EquipmentNode::Or {
                    id: NodeId::new(),
                    children,
                    default_index: Some(0),
                    label: descriptor.label.clone(),
                });
            }

            Some(EquipmentNode::And {
                id: NodeId::new(),
                children,
                group_id: Some(descriptor.id.clone()),
            })
        }
        DescriptorKind::Item => build_item_node(descriptor, item_store, timeout_ms).await,
        DescriptorKind::Category => match &descriptor.content {
            DescriptorContent::Category(category_key) => Some(EquipmentNode::Category {
                id: NodeId::new(),
                category_key: category_key.clone(),
                count: descriptor.count.unwrap_or(1).max(1),
            }),
            _ => Some(placeholder(descriptor, "category descriptor missing its category key")),
        },
        DescriptorKind::Focus => match &descriptor.content {
            DescriptorContent::Focus { tradition } => Some(EquipmentNode::Focus {
                id: NodeId::new(),
                tradition: tradition.clone(),
                count: descriptor.count.unwrap_or(1).max(1),
            }),
            _ => Some(placeholder(descriptor, "focus descriptor missing its tradition")),
        },
        DescriptorKind::FreeForm => match &descriptor.content {
            DescriptorContent::FreeForm(text) => Some(parse_free_form(text)),
            _ => Some(placeholder(descriptor, "free-form descriptor missing its text")),
        },
    }
}

async fn build_item_node(
    descriptor: &Descriptor,
    item_store: &dyn ItemStore,
    timeout_ms: u64,
) -> Option<EquipmentNode> {
    let local_ids = match &descriptor.content {
        DescriptorContent::ItemRefs(ids) if !ids.is_empty() => ids,
        _ => return Some(placeholder(descriptor, "item descriptor missing its ref list")),
    };
    let count = descriptor.count.unwrap_or(1).max(1);

    if local_ids.len() == 1 {
        let item_ref = resolve_with_timeout(item_store, &local_ids[0], timeout_ms).await;
        return Some(EquipmentNode::Item {
            id: NodeId::new(),
            item_ref,
            count,
            label: descriptor.label.clone(),
        });
    }

    // A comma-separated set of refs becomes a LINKED bundle.
    let mut children = Vec::with_capacity(local_ids.len());
    for local_id in local_ids {
        let item_ref = resolve_with_timeout(item_store, local_id, timeout_ms).await;
        children.push(LinkedChild::Item { item_ref, count });
    }
    let label = descriptor
        .label
        .clone()
        .unwrap_or_else(|| local_ids.join(" + "));
    Some(EquipmentNode::Linked {
        id: NodeId::new(),
        children,
        label,
    })
}

async fn resolve_with_timeout(item_store: &dyn ItemStore, local_id: &str, timeout_ms: u64) -> ItemRef {
    let resolution = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        item_store.resolve_ref(local_id, None),
    )
    .await;

    match resolution {
        Ok(Some(item_ref)) => item_ref,
        Ok(None) => {
            warn!(local_id, "ref did not resolve");
            ItemRef::unresolved(local_id)
        }
        Err(_) => {
            warn!(local_id, timeout_ms, "ref resolution timed out");
            ItemRef::unresolved(local_id)
        }
    }
}

fn placeholder(descriptor: &Descriptor, reason: &str) -> EquipmentNode {
    warn!(descriptor_id = %descriptor.id, reason, "descriptor malformed, using placeholder");
    EquipmentNode::Item {
        id: NodeId::new(),
        item_ref: ItemRef::unresolved(format!("(placeholder: {})", descriptor.id)),
        count: 1,
        label: Some(format!("placeholder: {reason}")),
    }
}

/// Minimal heuristic for the legacy free-form description shape: split on
/// top-level " or " into `OR` alternatives, then each alternative on ","
/// into an `AND` of literal-name `ITEM` placeholders. A single alternative
/// with a single item collapses to that bare `ITEM`, by way of the same
/// `AND`-of-one collapse the Extractor already performs elsewhere.
fn parse_free_form(text: &str) -> EquipmentNode {
    let alternatives: Vec<&str> = split_top_level(text, " or ");

    let mut or_children = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let names = split_top_level(alternative, ",");
        let mut items: Vec<EquipmentNode> = names
            .into_iter()
            .map(|name| EquipmentNode::Item {
                id: NodeId::new(),
                item_ref: ItemRef::unresolved(name.trim()),
                count: 1,
                label: None,
            })
            .collect();

        let and_node = if items.len() == 1 {
            items.pop().expect("length checked above")
        } else {
            EquipmentNode::And {
                id: NodeId::new(),
                children: items,
                group_id: None,
            }
        };
        or_children.push(and_node);
    }

    if or_children.len() == 1 {
        or_children.into_iter().next().expect("length checked above")
    } else {
        EquipmentNode::Or {
            id: NodeId::new(),
            children: or_children,
            default_index: Some(0),
            label: None,
        }
    }
}

fn split_top_level<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    text.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

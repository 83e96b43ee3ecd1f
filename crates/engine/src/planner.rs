//! `GroupPlanner` (C4): detects and rewrites special combinations within an
//! `AND` group. Runs bottom-up and is idempotent on an
//! already-planned tree — each rewrite's precondition is destroyed by its
//! own application, so a second pass finds nothing left to do.

use equipcore_domain::{CategoryKey, ItemKind, ItemRefId};

use crate::ast::{EquipmentNode, LinkedChild};

pub struct GroupPlanner;

impl GroupPlanner {
    /// Walk the tree bottom-up, rewriting every `AND` node's children in
    /// place.
    pub fn plan(node: &mut EquipmentNode) {
        match node {
            EquipmentNode::And { children, .. } => {
                for child in children.iter_mut() {
                    GroupPlanner::plan(child);
                }
                plan_and_children(children);
            }
            EquipmentNode::Or { children, .. } => {
                for child in children.iter_mut() {
                    GroupPlanner::plan(child);
                }
            }
            _ => {}
        }
    }
}

fn plan_and_children(children: &mut Vec<EquipmentNode>) {
    // Priority order: bundle weapon/ammo pairs first, then merge
    // identical weapons, then dedupe focus sets.
    bundle_weapon_ammo(children);
    merge_identical_weapons(children);
    dedupe_focus_set(children);
}

fn is_weapon_atom(node: &EquipmentNode) -> bool {
    match node {
        EquipmentNode::Item { item_ref, .. } => item_ref.kind() == ItemKind::Weapon,
        EquipmentNode::Category { category_key, .. } => matches!(category_key, CategoryKey::Weapon { .. }),
        _ => false,
    }
}

fn is_ammo_item(node: &EquipmentNode) -> bool {
    match node {
        EquipmentNode::Item { item_ref, .. } => item_ref
            .system_tag("ammunition")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
        _ => false,
    }
}

fn to_linked_child(node: &EquipmentNode) -> LinkedChild {
    match node {
        EquipmentNode::Item { item_ref, count, .. } => LinkedChild::Item {
            item_ref: item_ref.clone(),
            count: *count,
        },
        EquipmentNode::Category { category_key, count, .. } => LinkedChild::Category {
            category_key: category_key.clone(),
            count: *count,
        },
        other => unreachable!("to_linked_child called on non-atom node {other:?}"),
    }
}

/// Pattern 1: bundles a weapon and its ammunition into a single linked
/// choice.
fn bundle_weapon_ammo(children: &mut Vec<EquipmentNode>) {
    let weapon_indices: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, node)| is_weapon_atom(node))
        .map(|(i, _)| i)
        .collect();
    if weapon_indices.len() != 1 {
        return;
    }
    let ammo_indices: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, node)| is_ammo_item(node))
        .map(|(i, _)| i)
        .collect();
    if ammo_indices.is_empty() {
        return;
    }

    let weapon_idx = weapon_indices[0];
    let weapon_id = children[weapon_idx].id();
    let label = children[weapon_idx].display_label();

    let mut bundled = vec![to_linked_child(&children[weapon_idx])];
    for &idx in &ammo_indices {
        bundled.push(to_linked_child(&children[idx]));
    }

    let mut remove_indices = ammo_indices;
    remove_indices.push(weapon_idx);
    remove_indices.sort_unstable();
    let insert_at = remove_indices[0];
    for &idx in remove_indices.iter().rev() {
        children.remove(idx);
    }

    children.insert(
        insert_at.min(children.len()),
        EquipmentNode::Linked {
            id: weapon_id,
            children: bundled,
            label,
        },
    );
}

/// Pattern 2: two sibling `ITEM` weapons pointing at the same ref collapse
/// to one with summed count. The node id
/// of the first occurrence survives.
fn merge_identical_weapons(children: &mut Vec<EquipmentNode>) {
    let mut i = 0;
    while i < children.len() {
        let mut j = i + 1;
        while j < children.len() {
            if let (Some((id_i, _)), Some((id_j, count_j))) =
                (weapon_item_key(&children[i]), weapon_item_key(&children[j]))
            {
                if id_i == id_j {
                    if let EquipmentNode::Item { count, .. } = &mut children[i] {
                        *count += count_j;
                    }
                    children.remove(j);
                    continue;
                }
            }
            j += 1;
        }
        i += 1;
    }
}

fn weapon_item_key(node: &EquipmentNode) -> Option<(ItemRefId, u32)> {
    match node {
        EquipmentNode::Item { item_ref, count, .. } if item_ref.kind() == ItemKind::Weapon => {
            Some((item_ref.id(), *count))
        }
        _ => None,
    }
}

/// Pattern 3: a `FOCUS` child co-located with a focus-kind `ITEM` of
/// matching tradition deduplicates the `ITEM`.
fn dedupe_focus_set(children: &mut Vec<EquipmentNode>) {
    let focus_traditions: Vec<String> = children
        .iter()
        .filter_map(|node| match node {
            EquipmentNode::Focus { tradition, .. } => Some(tradition.clone()),
            _ => None,
        })
        .collect();
    if focus_traditions.is_empty() {
        return;
    }

    children.retain(|node| match node {
        EquipmentNode::Item { item_ref, .. } if item_ref.kind() == ItemKind::Focus => {
            let item_tradition = item_ref.system_tag("tradition");
            !focus_traditions.iter().any(|t| Some(t.as_str()) == item_tradition)
        }
        _ => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use equipcore_domain::{ItemRef, NodeId};

    fn weapon_item(name: &str, count: u32) -> EquipmentNode {
        EquipmentNode::Item {
            id: NodeId::new(),
            item_ref: ItemRef::new(name, ItemKind::Weapon, name.to_lowercase()),
            count,
            label: None,
        }
    }

    fn ammo_item(name: &str, count: u32) -> EquipmentNode {
        EquipmentNode::Item {
            id: NodeId::new(),
            item_ref: ItemRef::new(name, ItemKind::Consumable, name.to_lowercase())
                .with_system_tag("ammunition", "true"),
            count,
            label: None,
        }
    }

    fn and_of(children: Vec<EquipmentNode>) -> EquipmentNode {
        EquipmentNode::And {
            id: NodeId::new(),
            children,
            group_id: None,
        }
    }

    #[test]
    fn bundles_weapon_with_ammo() {
        let mut tree = and_of(vec![weapon_item("Longbow", 1), ammo_item("Arrows", 20)]);
        GroupPlanner::plan(&mut tree);
        match tree {
            EquipmentNode::And { children, .. } => {
                assert_eq!(children.len(), 1);
                match &children[0] {
                    EquipmentNode::Linked { children, label, .. } => {
                        assert_eq!(label, "Longbow");
                        assert_eq!(children.len(), 2);
                    }
                    other => panic!("expected LINKED, got {other:?}"),
                }
            }
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn does_not_bundle_with_two_weapons() {
        let mut tree = and_of(vec![weapon_item("Longbow", 1), weapon_item("Axe", 1), ammo_item("Arrows", 20)]);
        GroupPlanner::plan(&mut tree);
        match tree {
            EquipmentNode::And { children, .. } => assert_eq!(children.len(), 3),
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn merges_identical_weapons() {
        let mut tree = and_of(vec![weapon_item("Dagger", 1), weapon_item("Dagger", 1)]);
        GroupPlanner::plan(&mut tree);
        match tree {
            EquipmentNode::And { children, .. } => {
                assert_eq!(children.len(), 1);
                match &children[0] {
                    EquipmentNode::Item { count, .. } => assert_eq!(*count, 2),
                    other => panic!("expected ITEM, got {other:?}"),
                }
            }
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn distinct_weapons_are_not_merged() {
        let mut tree = and_of(vec![weapon_item("Dagger", 1), weapon_item("Axe", 1)]);
        GroupPlanner::plan(&mut tree);
        match tree {
            EquipmentNode::And { children, .. } => assert_eq!(children.len(), 2),
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn dedupes_focus_item_against_focus_node() {
        let focus_item = EquipmentNode::Item {
            id: NodeId::new(),
            item_ref: ItemRef::new("Arcane Focus", ItemKind::Focus, "arcane-focus")
                .with_system_tag("tradition", "arcane"),
            count: 1,
            label: None,
        };
        let focus_node = EquipmentNode::Focus {
            id: NodeId::new(),
            tradition: "arcane".to_string(),
            count: 1,
        };
        let mut tree = and_of(vec![focus_item, focus_node]);
        GroupPlanner::plan(&mut tree);
        match tree {
            EquipmentNode::And { children, .. } => {
                assert_eq!(children.len(), 1);
                assert!(matches!(children[0], EquipmentNode::Focus { .. }));
            }
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn planning_is_idempotent() {
        let mut tree = and_of(vec![
            weapon_item("Longbow", 1),
            ammo_item("Arrows", 20),
            weapon_item("Dagger", 1),
            weapon_item("Dagger", 1),
        ]);
        GroupPlanner::plan(&mut tree);
        let once = tree.clone();
        GroupPlanner::plan(&mut tree);
        assert_eq!(tree, once);
    }
}

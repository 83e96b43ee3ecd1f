//! `Renderer` (C5): the tree-to-widgets transformation.
//! Total over any `EquipmentNode` tree; "pure" in the sense that it never
//! touches state beyond the `SelectorState` and `View` handed to it, and
//! produces the same widget sequence for the same AST every time.

use equipcore_domain::{CategoryKey, ItemRef, NodeId};

use crate::ast::{EquipmentNode, LinkedChild};
use crate::lookup_index::LookupIndex;
use crate::notify::Notifier;
use crate::options::EngineOptions;
use crate::ports::{BundledRef, SelectOption, View};
use crate::state::{ScopeKind, SelectorState, WidgetMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    And,
    Or,
}

/// Declarative description of the selector.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedWidget {
    Select {
        node_id: NodeId,
        options: Vec<SelectOption>,
        default_index: Option<usize>,
    },
    Checkbox {
        node_id: NodeId,
        item_ref: ItemRef,
        quantity: u32,
        pre_checked: bool,
        disabled: bool,
    },
    Linked {
        node_id: NodeId,
        visible_label: String,
        bundled_refs: Vec<BundledRef>,
    },
    Group {
        node_id: NodeId,
        kind: GroupKind,
        children: Vec<RenderedWidget>,
    },
    /// A toggle attached to its sibling choice.
    Favorite { node_id: NodeId },
}

impl RenderedWidget {
    pub fn node_id(&self) -> NodeId {
        match self {
            RenderedWidget::Select { node_id, .. }
            | RenderedWidget::Checkbox { node_id, .. }
            | RenderedWidget::Linked { node_id, .. }
            | RenderedWidget::Group { node_id, .. }
            | RenderedWidget::Favorite { node_id } => *node_id,
        }
    }

    fn is_user_observable_atom(&self) -> bool {
        matches!(
            self,
            RenderedWidget::Select { .. } | RenderedWidget::Checkbox { .. } | RenderedWidget::Linked { .. }
        )
    }
}

pub struct Renderer;

impl Renderer {
    /// `renderScope(scope, root, state) → RenderedWidget`.
    pub fn render_scope(
        scope_kind: ScopeKind,
        root: &EquipmentNode,
        state: &mut SelectorState,
        lookup_index: &LookupIndex,
        view: &dyn View,
        options: &EngineOptions,
        notifier: &Notifier,
    ) -> RenderedWidget {
        render_node(scope_kind, root, state, lookup_index, view, options, false, notifier).unwrap_or_else(|| {
            let node_id = root.id();
            RenderedWidget::Group {
                node_id,
                kind: GroupKind::And,
                children: Vec::new(),
            }
        })
    }
}

/// Renders `children`, inserting a `Favorite` sibling after every
/// user-observable atom when `options.favorites` is set.
fn render_children(
    scope_kind: ScopeKind,
    children: &[EquipmentNode],
    state: &mut SelectorState,
    lookup_index: &LookupIndex,
    view: &dyn View,
    options: &EngineOptions,
    has_or_ancestor: bool,
    notifier: &Notifier,
) -> Vec<RenderedWidget> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        if let Some(widget) = render_node(scope_kind, child, state, lookup_index, view, options, has_or_ancestor, notifier) {
            let atom_node_id = widget.node_id();
            let observable = widget.is_user_observable_atom();
            out.push(widget);
            if observable && options.favorites {
                let favorite_node_id = NodeId::new();
                let handle = view.mount_favorite();
                state.scope_mut(scope_kind).register_widget(
                    favorite_node_id,
                    handle,
                    WidgetMeta::Favorite { atom_node_id },
                );
                out.push(RenderedWidget::Favorite { node_id: favorite_node_id });
            }
        }
    }
    out
}

fn render_node(
    scope_kind: ScopeKind,
    node: &EquipmentNode,
    state: &mut SelectorState,
    lookup_index: &LookupIndex,
    view: &dyn View,
    options: &EngineOptions,
    has_or_ancestor: bool,
    notifier: &Notifier,
) -> Option<RenderedWidget> {
    let node_id = node.id();
    if state.scope(scope_kind).is_rendered(node_id) {
        return None;
    }

    match node {
        EquipmentNode::And { children, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            let rendered =
                render_children(scope_kind, children, state, lookup_index, view, options, has_or_ancestor, notifier);
            let handle = view.mount_container();
            state.scope_mut(scope_kind).register_widget(node_id, handle, WidgetMeta::Group);
            Some(RenderedWidget::Group {
                node_id,
                kind: GroupKind::And,
                children: rendered,
            })
        }
        EquipmentNode::Or { children, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            if children.iter().all(is_select_eligible) {
                let options_list = flatten_select_options(children, lookup_index);
                let default_index = options_list.iter().position(|o| !o.item_ref.is_unresolved());
                let handle = view.mount_select(options_list.clone(), default_index);
                state.scope_mut(scope_kind).register_widget(
                    node_id,
                    handle,
                    WidgetMeta::Select { options: options_list.clone() },
                );
                Some(RenderedWidget::Select {
                    node_id,
                    options: options_list,
                    default_index,
                })
            } else {
                let rendered = render_children(scope_kind, children, state, lookup_index, view, options, true, notifier);
                let handle = view.mount_container();
                state.scope_mut(scope_kind).register_widget(node_id, handle, WidgetMeta::Group);
                Some(RenderedWidget::Group {
                    node_id,
                    kind: GroupKind::Or,
                    children: rendered,
                })
            }
        }
        EquipmentNode::Item { item_ref, count, label, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            let disabled = !options.allow_opt_out_of_mandatory && !has_or_ancestor;
            let claimed_here = state.claim(scope_kind, item_ref.id(), notifier);
            if disabled && !claimed_here {
                return None;
            }
            let display_label = label.clone().unwrap_or_else(|| item_ref.name().to_string());
            let handle = view.mount_checkbox(display_label, *count, true, disabled);
            state.scope_mut(scope_kind).register_widget(
                node_id,
                handle,
                WidgetMeta::Checkbox { item_ref: item_ref.clone(), quantity: *count },
            );
            Some(RenderedWidget::Checkbox {
                node_id,
                item_ref: item_ref.clone(),
                quantity: *count,
                pre_checked: true,
                disabled,
            })
        }
        EquipmentNode::Category { category_key, count, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            let options_list = bucket_options(category_key, *count, lookup_index);
            let handle = view.mount_select(options_list.clone(), None);
            state.scope_mut(scope_kind).register_widget(
                node_id,
                handle,
                WidgetMeta::Select { options: options_list.clone() },
            );
            Some(RenderedWidget::Select {
                node_id,
                options: options_list,
                default_index: None,
            })
        }
        EquipmentNode::Focus { tradition, count, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            let key = CategoryKey::Focus {
                tradition: tradition.clone(),
            };
            let options_list = bucket_options(&key, *count, lookup_index);
            let handle = view.mount_select(options_list.clone(), None);
            state.scope_mut(scope_kind).register_widget(
                node_id,
                handle,
                WidgetMeta::Select { options: options_list.clone() },
            );
            Some(RenderedWidget::Select {
                node_id,
                options: options_list,
                default_index: None,
            })
        }
        EquipmentNode::Linked { children, label, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            let disabled = !has_or_ancestor;
            let bundled_refs: Vec<BundledRef> = children.iter().map(|c| linked_child_to_bundled(c, lookup_index)).collect();
            if disabled {
                if let Some(first) = bundled_refs.first() {
                    let claimed_here = state.claim(scope_kind, first.item_ref.id(), notifier);
                    if !claimed_here {
                        return None;
                    }
                }
                for bundled in bundled_refs.iter().skip(1) {
                    state.claim(scope_kind, bundled.item_ref.id(), notifier);
                }
            }
            let handle = view.mount_linked(label.clone(), bundled_refs.clone());
            state.scope_mut(scope_kind).register_widget(
                node_id,
                handle,
                WidgetMeta::Linked { bundled_refs: bundled_refs.clone() },
            );
            Some(RenderedWidget::Linked {
                node_id,
                visible_label: label.clone(),
                bundled_refs,
            })
        }
        EquipmentNode::Wealth { amount, .. } => {
            state.scope_mut(scope_kind).mark_rendered(node_id);
            let sentinel = ItemRef::unresolved(format!("Take starting wealth ({amount:?}) instead"));
            let handle = view.mount_checkbox(sentinel.name().to_string(), 1, false, false);
            state.scope_mut(scope_kind).register_widget(
                node_id,
                handle,
                WidgetMeta::Checkbox { item_ref: sentinel.clone(), quantity: 1 },
            );
            Some(RenderedWidget::Checkbox {
                node_id,
                item_ref: sentinel,
                quantity: 1,
                pre_checked: false,
                disabled: false,
            })
        }
    }
}

/// `OR` children eligible for a flattened `Select`: concrete items, category
/// or focus buckets, and `LINKED` bundles (each bundle becomes one option
/// that contributes every item it bundles).
fn is_select_eligible(node: &EquipmentNode) -> bool {
    matches!(
        node,
        EquipmentNode::Item { .. }
            | EquipmentNode::Category { .. }
            | EquipmentNode::Focus { .. }
            | EquipmentNode::Linked { .. }
    )
}

fn flatten_select_options(children: &[EquipmentNode], lookup_index: &LookupIndex) -> Vec<SelectOption> {
    let mut options = Vec::new();
    for child in children {
        match child {
            EquipmentNode::Item { item_ref, count, label, .. } => {
                options.push(SelectOption {
                    item_ref: item_ref.clone(),
                    label: label.clone().unwrap_or_else(|| item_ref.name().to_string()),
                    quantity: *count,
                    bundled_refs: Vec::new(),
                });
            }
            EquipmentNode::Category { category_key, count, .. } => {
                options.extend(bucket_options(category_key, *count, lookup_index));
            }
            EquipmentNode::Focus { tradition, count, .. } => {
                let key = CategoryKey::Focus {
                    tradition: tradition.clone(),
                };
                options.extend(bucket_options(&key, *count, lookup_index));
            }
            EquipmentNode::Linked { children, label, .. } => {
                options.push(linked_select_option(children, label, lookup_index));
            }
            _ => {}
        }
    }
    options
}

fn bucket_options(category_key: &CategoryKey, count: u32, lookup_index: &LookupIndex) -> Vec<SelectOption> {
    lookup_index
        .lookup_by_category(category_key)
        .iter()
        .map(|item_ref| SelectOption {
            item_ref: item_ref.clone(),
            label: item_ref.name().to_string(),
            quantity: count,
            bundled_refs: Vec::new(),
        })
        .collect()
}

/// Builds one `Select` option from a `LINKED` bundle's children: choosing
/// it must contribute every bundled ref together, so they all live in
/// `bundled_refs` rather than a single `item_ref`.
fn linked_select_option(children: &[LinkedChild], label: &str, lookup_index: &LookupIndex) -> SelectOption {
    let bundled_refs: Vec<BundledRef> = children.iter().map(|c| linked_child_to_bundled(c, lookup_index)).collect();
    let (item_ref, quantity) = bundled_refs
        .first()
        .map(|first| (first.item_ref.clone(), first.quantity))
        .unwrap_or_else(|| (ItemRef::unresolved(label), 1));
    SelectOption {
        item_ref,
        label: label.to_string(),
        quantity,
        bundled_refs,
    }
}

fn linked_child_to_bundled(child: &LinkedChild, lookup_index: &LookupIndex) -> BundledRef {
    match child {
        LinkedChild::Item { item_ref, count } => BundledRef {
            item_ref: item_ref.clone(),
            quantity: *count,
        },
        LinkedChild::Category { category_key, count } => {
            let item_ref = lookup_index
                .lookup_by_category(category_key)
                .first()
                .cloned()
                .unwrap_or_else(|| ItemRef::unresolved(category_key.bucket_key()));
            BundledRef {
                item_ref,
                quantity: *count,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockView;
    use equipcore_domain::{ItemKind, NodeId};

    fn stub_notifier() -> Notifier {
        Notifier::new()
    }

    fn stub_view() -> MockView {
        let mut view = MockView::new();
        let mut counter = 0u64;
        view.expect_mount_container().returning(move || {
            counter += 1;
            crate::ports::WidgetHandle(counter)
        });
        let mut counter2 = 1000u64;
        view.expect_mount_checkbox().returning(move |_, _, _, _| {
            counter2 += 1;
            crate::ports::WidgetHandle(counter2)
        });
        let mut counter3 = 2000u64;
        view.expect_mount_select().returning(move |_, _| {
            counter3 += 1;
            crate::ports::WidgetHandle(counter3)
        });
        let mut counter4 = 3000u64;
        view.expect_mount_linked().returning(move |_, _| {
            counter4 += 1;
            crate::ports::WidgetHandle(counter4)
        });
        let mut counter5 = 4000u64;
        view.expect_mount_favorite().returning(move || {
            counter5 += 1;
            crate::ports::WidgetHandle(counter5)
        });
        view
    }

    fn item_node(name: &str, kind: ItemKind, count: u32) -> EquipmentNode {
        EquipmentNode::Item {
            id: NodeId::new(),
            item_ref: ItemRef::new(name, kind, name.to_lowercase()),
            count,
            label: None,
        }
    }

    #[test]
    fn trivial_and_renders_two_disabled_checkboxes() {
        let tree = EquipmentNode::And {
            id: NodeId::new(),
            children: vec![item_node("Axe", ItemKind::Weapon, 1), item_node("Shield", ItemKind::Shield, 1)],
            group_id: None,
        };
        let mut state = SelectorState::new();
        let lookup_index = LookupIndex::empty();
        let view = stub_view();
        let notifier = stub_notifier();
        let mut options = EngineOptions::default();
        options.favorites = false;

        let widget = Renderer::render_scope(ScopeKind::Class, &tree, &mut state, &lookup_index, &view, &options, &notifier);
        match widget {
            RenderedWidget::Group { children, .. } => {
                assert_eq!(children.len(), 2);
                for child in &children {
                    match child {
                        RenderedWidget::Checkbox { disabled, pre_checked, .. } => {
                            assert!(*disabled);
                            assert!(*pre_checked);
                        }
                        other => panic!("expected Checkbox, got {other:?}"),
                    }
                }
            }
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn favorites_inserted_alongside_atoms() {
        let tree = EquipmentNode::And {
            id: NodeId::new(),
            children: vec![item_node("Axe", ItemKind::Weapon, 1)],
            group_id: None,
        };
        let mut state = SelectorState::new();
        let lookup_index = LookupIndex::empty();
        let view = stub_view();
        let notifier = stub_notifier();
        let options = EngineOptions::default();

        let widget = Renderer::render_scope(ScopeKind::Class, &tree, &mut state, &lookup_index, &view, &options, &notifier);
        match widget {
            RenderedWidget::Group { children, .. } => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[0], RenderedWidget::Checkbox { .. }));
                assert!(matches!(children[1], RenderedWidget::Favorite { .. }));
                assert_ne!(children[0].node_id(), children[1].node_id());
            }
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn cross_scope_claim_elides_mandatory_duplicate() {
        // Both scopes resolve the *same* catalogue item, so the ItemRef
        // (and its id) must be shared between the two trees.
        let shared_ref = ItemRef::new("Leather Armor", ItemKind::Armor, "leather-armor");
        let armor = |item_ref: ItemRef| EquipmentNode::And {
            id: NodeId::new(),
            children: vec![EquipmentNode::Item {
                id: NodeId::new(),
                item_ref,
                count: 1,
                label: None,
            }],
            group_id: None,
        };
        let mut state = SelectorState::new();
        let lookup_index = LookupIndex::empty();
        let view = stub_view();
        let notifier = stub_notifier();
        let mut options = EngineOptions::default();
        options.favorites = false;

        let class_tree = armor(shared_ref.clone());
        let class_widget = Renderer::render_scope(ScopeKind::Class, &class_tree, &mut state, &lookup_index, &view, &options, &notifier);
        assert!(matches!(class_widget, RenderedWidget::Group { ref children, .. } if children.len() == 1));

        let background_tree = armor(shared_ref);
        let background_widget =
            Renderer::render_scope(ScopeKind::Background, &background_tree, &mut state, &lookup_index, &view, &options, &notifier);
        match background_widget {
            RenderedWidget::Group { children, .. } => assert!(children.is_empty()),
            other => panic!("expected empty Group, got {other:?}"),
        }
    }

    #[test]
    fn or_of_item_and_category_renders_select() {
        let greataxe = item_node("Greataxe", ItemKind::Weapon, 1);
        let category = EquipmentNode::Category {
            id: NodeId::new(),
            category_key: CategoryKey::Weapon {
                proficiency: equipcore_domain::Proficiency::Martial,
                shape: equipcore_domain::WeaponShape::Melee,
            },
            count: 1,
        };
        let tree = EquipmentNode::Or {
            id: NodeId::new(),
            children: vec![greataxe, category],
            default_index: Some(0),
            label: None,
        };
        let mut state = SelectorState::new();
        let lookup_index = LookupIndex::empty();
        let view = stub_view();
        let notifier = stub_notifier();
        let mut options = EngineOptions::default();
        options.favorites = false;

        let widget = Renderer::render_scope(ScopeKind::Class, &tree, &mut state, &lookup_index, &view, &options, &notifier);
        match widget {
            RenderedWidget::Select { options, default_index, .. } => {
                assert_eq!(options.len(), 1); // empty bucket: only the concrete greataxe option
                assert_eq!(default_index, Some(0));
            }
            other => panic!("expected Select, got {other:?}"),
        }
    }

    #[test]
    fn or_of_linked_bundles_renders_exclusive_select() {
        let longbow = ItemRef::new("Longbow", ItemKind::Weapon, "longbow");
        let arrows = ItemRef::new("Arrows", ItemKind::Consumable, "arrows");
        let bundle = EquipmentNode::Linked {
            id: NodeId::new(),
            children: vec![
                LinkedChild::Item { item_ref: longbow, count: 1 },
                LinkedChild::Item { item_ref: arrows, count: 20 },
            ],
            label: "Longbow and 20 Arrows".to_string(),
        };
        let handaxe = item_node("Handaxe", ItemKind::Weapon, 2);
        let tree = EquipmentNode::Or {
            id: NodeId::new(),
            children: vec![bundle, handaxe],
            default_index: Some(0),
            label: None,
        };
        let mut state = SelectorState::new();
        let lookup_index = LookupIndex::empty();
        let view = stub_view();
        let notifier = stub_notifier();
        let mut options = EngineOptions::default();
        options.favorites = false;

        let widget = Renderer::render_scope(ScopeKind::Class, &tree, &mut state, &lookup_index, &view, &options, &notifier);
        match widget {
            RenderedWidget::Select { options, .. } => {
                assert_eq!(options.len(), 2);
                assert_eq!(options[0].bundled_refs.len(), 2);
                assert!(options[1].bundled_refs.len() <= 1);
            }
            other => panic!("expected a single exclusive Select, not {other:?}"),
        }
    }
}

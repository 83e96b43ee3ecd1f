//! `Collector` (C7): walks registered widgets and produces the final item
//! list.

use equipcore_domain::{ItemKind, ItemRef, ItemRefId};

use crate::notify::{CoreEvent, Notifier};
use crate::ports::{View, WidgetValue};
use crate::state::{ScopeKind, SelectorState, WidgetMeta};

/// Which scopes to include: class only, background only, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectFilters {
    pub class: bool,
    pub background: bool,
}

impl CollectFilters {
    pub fn both() -> Self {
        Self {
            class: true,
            background: true,
        }
    }
}

/// One chosen item, after merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub item_ref: ItemRef,
    pub quantity: u32,
    pub favorite: bool,
}

pub struct Collector;

impl Collector {
    /// `collect(prepared, filters) → CollectedItem[]`.
    ///
    /// Walks each included scope's `registration_order` — the insertion
    /// order widgets were mounted in, which is also the stable-sort order
    /// from `EquipmentNode` — reads back
    /// the user's value for every atom, and merges duplicates whose kind is
    /// not in `non_stackable_kinds`. An unresolved ref is dropped rather
    /// than collected and reported to `notifier` as `CollectionWarning`.
    pub fn collect(
        state: &SelectorState,
        view: &dyn View,
        filters: CollectFilters,
        non_stackable_kinds: &[ItemKind],
        notifier: &Notifier,
    ) -> Vec<ItemRecord> {
        let mut favorites: std::collections::HashSet<ItemRefId> = std::collections::HashSet::new();
        let mut raw: Vec<(ItemRef, u32)> = Vec::new();

        if filters.class {
            collect_scope(state, ScopeKind::Class, view, &mut raw, &mut favorites, notifier);
        }
        if filters.background {
            collect_scope(state, ScopeKind::Background, view, &mut raw, &mut favorites, notifier);
        }

        merge(raw, &favorites, non_stackable_kinds)
    }
}

fn push_if_resolved(raw: &mut Vec<(ItemRef, u32)>, item_ref: &ItemRef, quantity: u32, notifier: &Notifier) {
    if item_ref.is_unresolved() {
        notifier.emit(CoreEvent::CollectionWarning {
            item_ref_id: item_ref.id(),
            reason: format!("'{}' did not resolve, dropping from collection", item_ref.name()),
        });
    } else {
        raw.push((item_ref.clone(), quantity));
    }
}

fn collect_scope(
    state: &SelectorState,
    kind: ScopeKind,
    view: &dyn View,
    raw: &mut Vec<(ItemRef, u32)>,
    favorites: &mut std::collections::HashSet<ItemRefId>,
    notifier: &Notifier,
) {
    let scope = state.scope(kind);
    for node_id in scope.registration_order() {
        let Some(meta) = scope.widget_meta(*node_id) else {
            continue;
        };
        let Some(handle) = scope.widget_for(*node_id) else {
            continue;
        };
        match meta {
            WidgetMeta::Select { options } => {
                if let WidgetValue::Select { chosen_index: Some(index) } = view.read_value(handle) {
                    if let Some(option) = options.get(index) {
                        if option.bundled_refs.is_empty() {
                            push_if_resolved(raw, &option.item_ref, option.quantity, notifier);
                        } else {
                            for bundled in &option.bundled_refs {
                                push_if_resolved(raw, &bundled.item_ref, bundled.quantity, notifier);
                            }
                        }
                    }
                }
            }
            WidgetMeta::Checkbox { item_ref, quantity } => {
                if let WidgetValue::Checkbox { checked: true } = view.read_value(handle) {
                    push_if_resolved(raw, item_ref, *quantity, notifier);
                }
            }
            WidgetMeta::Linked { bundled_refs } => {
                // LINKED atoms have no independent toggle; once mounted
                // every bundled ref contributes.
                let _ = view.read_value(handle);
                for bundled in bundled_refs {
                    push_if_resolved(raw, &bundled.item_ref, bundled.quantity, notifier);
                }
            }
            WidgetMeta::Favorite { atom_node_id } => {
                if let WidgetValue::Favorite { active: true } = view.read_value(handle) {
                    if let Some(WidgetMeta::Checkbox { item_ref, .. }) = scope.widget_meta(*atom_node_id) {
                        favorites.insert(item_ref.id());
                    } else if let Some(WidgetMeta::Linked { bundled_refs }) = scope.widget_meta(*atom_node_id) {
                        if let Some(first) = bundled_refs.first() {
                            favorites.insert(first.item_ref.id());
                        }
                    }
                }
            }
            WidgetMeta::Group => {}
        }
    }
}

/// Merge stackable duplicates by summing quantity; non-stackable kinds keep
/// every occurrence distinct. The merged set is then sorted favorites
/// first, then by kind priority, then by name.
fn merge(
    raw: Vec<(ItemRef, u32)>,
    favorites: &std::collections::HashSet<ItemRefId>,
    non_stackable_kinds: &[ItemKind],
) -> Vec<ItemRecord> {
    let mut merged: Vec<ItemRecord> = Vec::new();
    for (item_ref, quantity) in raw {
        let stackable = item_ref.is_stackable(non_stackable_kinds);
        if stackable {
            if let Some(existing) = merged.iter_mut().find(|r| r.item_ref.id() == item_ref.id()) {
                existing.quantity += quantity;
                continue;
            }
        }
        let favorite = favorites.contains(&item_ref.id());
        merged.push(ItemRecord {
            item_ref,
            quantity,
            favorite,
        });
    }
    merged.sort_by_key(|record| {
        (
            !record.favorite,
            record.item_ref.kind().sort_priority(),
            record.item_ref.name().to_lowercase(),
        )
    });
    merged
}

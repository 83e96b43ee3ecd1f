//! `SelectorState` (C6): tracks rendered nodes, cross-scope claims, and
//! widget handles for one `initialize()`→`collect()` cycle.
//! Single-threaded; no concurrent mutation is permitted, matching §5's
//! shared-resource policy.

use std::collections::{HashMap, HashSet};

use equipcore_domain::{ItemRef, ItemRefId, NodeId};

use crate::notify::{CoreEvent, Notifier};
use crate::ports::{BundledRef, SelectOption, View, WidgetHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Class,
    Background,
}

/// What kind of widget a registered `NodeId` maps to, and the data
/// `Collector` needs to read a value back out of it.
/// `SelectorScope` keeps this alongside the opaque `WidgetHandle` because
/// the handle itself carries no structure the core can inspect.
#[derive(Debug, Clone)]
pub enum WidgetMeta {
    Select { options: Vec<SelectOption> },
    Checkbox { item_ref: ItemRef, quantity: u32 },
    Linked { bundled_refs: Vec<BundledRef> },
    Group,
    /// Toggles the favorite flag on the atom registered under
    /// `atom_node_id`.
    Favorite { atom_node_id: NodeId },
}

/// Per-scope bookkeeping.
#[derive(Debug, Default)]
pub struct SelectorScope {
    rendered_node_ids: HashSet<NodeId>,
    claimed_item_refs: HashSet<ItemRefId>,
    widget_registry: HashMap<NodeId, WidgetHandle>,
    widget_meta: HashMap<NodeId, WidgetMeta>,
    registration_order: Vec<NodeId>,
}

impl SelectorScope {
    pub fn is_rendered(&self, node_id: NodeId) -> bool {
        self.rendered_node_ids.contains(&node_id)
    }

    pub fn mark_rendered(&mut self, node_id: NodeId) {
        self.rendered_node_ids.insert(node_id);
    }

    pub fn register_widget(&mut self, node_id: NodeId, handle: WidgetHandle, meta: WidgetMeta) {
        if !self.widget_registry.contains_key(&node_id) {
            self.registration_order.push(node_id);
        }
        self.widget_registry.insert(node_id, handle);
        self.widget_meta.insert(node_id, meta);
    }

    pub fn widget_for(&self, node_id: NodeId) -> Option<&WidgetHandle> {
        self.widget_registry.get(&node_id)
    }

    pub fn widget_meta(&self, node_id: NodeId) -> Option<&WidgetMeta> {
        self.widget_meta.get(&node_id)
    }

    /// Insertion order, for `Collector`'s "walk `widgetRegistry` in
    /// insertion order".
    pub fn registration_order(&self) -> &[NodeId] {
        &self.registration_order
    }

    pub fn has_claimed(&self, item_ref_id: ItemRefId) -> bool {
        self.claimed_item_refs.contains(&item_ref_id)
    }
}

/// Lifecycle tied to one `initialize()`→`collect()` cycle.
#[derive(Debug, Default)]
pub struct SelectorState {
    class: SelectorScope,
    background: SelectorScope,
}

impl SelectorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_scope(&mut self, kind: ScopeKind) {
        *self.scope_mut(kind) = SelectorScope::default();
    }

    /// No-op marker pairing with `begin_scope`; scope data persists
    /// until `reset()`.
    pub fn end_scope(&mut self, _kind: ScopeKind) {}

    pub fn scope(&self, kind: ScopeKind) -> &SelectorScope {
        match kind {
            ScopeKind::Class => &self.class,
            ScopeKind::Background => &self.background,
        }
    }

    pub fn scope_mut(&mut self, kind: ScopeKind) -> &mut SelectorScope {
        match kind {
            ScopeKind::Class => &mut self.class,
            ScopeKind::Background => &mut self.background,
        }
    }

    fn other_scope(&self, kind: ScopeKind) -> &SelectorScope {
        match kind {
            ScopeKind::Class => &self.background,
            ScopeKind::Background => &self.class,
        }
    }

    /// Claim a ref for `kind`. Returns `true` if `kind` now holds the claim
    /// (either it already did, or it just acquired it); `false` if the
    /// *other* scope already holds it — the only cross-scope coupling in
    /// this state. Emits `Claimed` on the elided path, since that is the
    /// one case the host cannot otherwise observe.
    pub fn claim(&mut self, kind: ScopeKind, item_ref_id: ItemRefId, notifier: &Notifier) -> bool {
        if self.other_scope(kind).has_claimed(item_ref_id) {
            notifier.emit(CoreEvent::Claimed { item_ref_id });
            return false;
        }
        self.scope_mut(kind).claimed_item_refs.insert(item_ref_id);
        true
    }

    /// Disposes every registered widget handle through `view` and clears
    /// all scope state. Called on every re-initialization and when the
    /// user changes class or background.
    pub fn reset(&mut self, view: &dyn View) {
        for handle in self.class.widget_registry.values() {
            view.dispose(handle);
        }
        for handle in self.background.widget_registry.values() {
            view.dispose(handle);
        }
        self.class = SelectorScope::default();
        self.background = SelectorScope::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive_across_scopes() {
        let mut state = SelectorState::new();
        let notifier = Notifier::new();
        let item_id = ItemRefId::new();
        assert!(state.claim(ScopeKind::Class, item_id, &notifier));
        assert!(!state.claim(ScopeKind::Background, item_id, &notifier));
    }

    #[test]
    fn reclaiming_in_the_same_scope_succeeds() {
        let mut state = SelectorState::new();
        let notifier = Notifier::new();
        let item_id = ItemRefId::new();
        assert!(state.claim(ScopeKind::Class, item_id, &notifier));
        assert!(state.claim(ScopeKind::Class, item_id, &notifier));
    }

    #[test]
    fn claim_collision_emits_claimed_event() {
        let mut state = SelectorState::new();
        let mut notifier = Notifier::new();
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen_in_listener = seen.clone();
        notifier.subscribe(Box::new(move |event| {
            if matches!(event, CoreEvent::Claimed { .. }) {
                seen_in_listener.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        }));
        let item_id = ItemRefId::new();
        assert!(state.claim(ScopeKind::Class, item_id, &notifier));
        assert!(!state.claim(ScopeKind::Background, item_id, &notifier));
        assert!(seen.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn mark_rendered_is_idempotent() {
        let mut scope = SelectorScope::default();
        let node_id = NodeId::new();
        assert!(!scope.is_rendered(node_id));
        scope.mark_rendered(node_id);
        scope.mark_rendered(node_id);
        assert!(scope.is_rendered(node_id));
    }

    #[test]
    fn registration_order_tracks_first_insertion() {
        let mut scope = SelectorScope::default();
        let a = NodeId::new();
        let b = NodeId::new();
        scope.register_widget(a, WidgetHandle(1), WidgetMeta::Group);
        scope.register_widget(b, WidgetHandle(2), WidgetMeta::Group);
        scope.register_widget(a, WidgetHandle(3), WidgetMeta::Group);
        assert_eq!(scope.registration_order(), &[a, b]);
    }
}

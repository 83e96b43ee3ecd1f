//! `Notifier` — the concrete mechanism behind the core's rendered /
//! selection-changed / claimed notifications (an Open Question resolution,
//! recorded in DESIGN.md). This picks a plain synchronous observer list
//! scoped to one `Prepared` handle: no cross-cycle delivery, no queueing,
//! matching the single-threaded cooperative model the rest of this core
//! uses.

use equipcore_domain::ItemRefId;

/// One event the core reports to subscribers during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// `render` completed. `SourceItemMissing` also reports this with an
    /// empty payload.
    Rendered { widget_count: usize },
    /// A widget's user-visible value changed.
    SelectionChanged { node_id: equipcore_domain::NodeId },
    /// A ref was claimed by one scope, eliding it from a later one.
    Claimed { item_ref_id: ItemRefId },
    /// `PackUnavailable`.
    PackUnavailable { pack_name: String, reason: String },
    /// `SourceItemMissing`.
    SourceItemMissing,
    /// `WealthConverter` fell back to zero coin.
    WealthFallback { reason: String },
    /// `CollectorInconsistent`.
    CollectionWarning { item_ref_id: ItemRefId, reason: String },
}

/// A synchronous subscriber callback, boxed so `Prepared` can hold a
/// heterogeneous list without generic parameters leaking into the public
/// API.
pub type Listener = Box<dyn Fn(&CoreEvent) + Send + Sync>;

/// Scoped to one `initialize()`→`collect()` cycle, exactly like
/// `SelectorState`: created per `initialize()` call and discarded on the
/// next.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<Listener>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: CoreEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

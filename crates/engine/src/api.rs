//! Public API (C9): wires every module into the `initialize` → `render` →
//! `collect` / `convert_wealth` cycle.
//!
//! `EngineCore` owns a generation counter. Every `initialize()` bumps it and
//! stamps the returned `Prepared` with the new value; `render`/`collect`
//! compare `prepared.generation` against the core's current generation and
//! no-op (`None` / empty) when a later `initialize()` has superseded it —
//! a cooperative-cancellation policy expressed without threads since the
//! whole core is single-threaded.

use equipcore_domain::{CoinMap, ItemRefId, NodeId, PackRef, WealthDescriptor};

use crate::ast::EquipmentNode;
use crate::collector::{CollectFilters, Collector, ItemRecord};
use crate::error::CoreError;
use crate::extractor::Extractor;
use crate::lookup_index::LookupIndex;
use crate::notify::{CoreEvent, Notifier};
use crate::options::EngineOptions;
use crate::planner::GroupPlanner;
use crate::ports::{Dice, DocumentCatalogue, ItemStore, View};
use crate::renderer::{RenderedWidget, Renderer};
use crate::state::{ScopeKind, SelectorState};
use crate::wealth::WealthConverter;

fn empty_and() -> EquipmentNode {
    EquipmentNode::And {
        id: equipcore_domain::NodeId::new(),
        children: Vec::new(),
        group_id: None,
    }
}

fn is_empty_and(node: &EquipmentNode) -> bool {
    matches!(node, EquipmentNode::And { children, .. } if children.is_empty())
}

/// The result of one `initialize()` call: two planned trees plus the
/// per-cycle state `render`/`collect` mutate. Created per `initialize()`
/// call and discarded on the next.
pub struct Prepared {
    class_tree: EquipmentNode,
    background_tree: EquipmentNode,
    state: SelectorState,
    pub notifier: Notifier,
    lookup_index: LookupIndex,
    generation: u64,
}

impl Prepared {
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

/// Owns the generation counter backing this core's cooperative
/// cancellation. One `EngineCore` is meant to live for the whole
/// character-creation session; `Prepared` handles come and go underneath it.
#[derive(Debug, Default)]
pub struct EngineCore {
    generation: u64,
}

impl EngineCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh `Prepared` cycle from a class and background ref.
    /// Rebuilds `LookupIndex` only when the active pack set changed,
    /// extracts and plans both trees, and reports `SourceItemMissing`
    /// when either source resolves to an empty tree.
    pub async fn initialize(
        &mut self,
        class_ref: ItemRefId,
        background_ref: ItemRefId,
        catalogue: &dyn DocumentCatalogue,
        item_store: &dyn ItemStore,
        packs: &[PackRef],
        existing_index: Option<LookupIndex>,
        options: &EngineOptions,
    ) -> Result<Prepared, CoreError> {
        self.generation += 1;
        let generation = self.generation;

        let notifier = Notifier::new();

        let lookup_index = match existing_index {
            Some(index) if index.is_current_for(packs) => index,
            _ => LookupIndex::build(item_store, packs, &notifier).await,
        };

        let mut class_tree = if options.skip_class_equipment {
            empty_and()
        } else {
            Extractor::extract(class_ref, catalogue, item_store, options.ref_resolve_timeout_ms).await
        };
        GroupPlanner::plan(&mut class_tree);
        if is_empty_and(&class_tree) {
            notifier.emit(CoreEvent::SourceItemMissing);
        }

        let mut background_tree = if options.skip_background_equipment {
            empty_and()
        } else {
            Extractor::extract(background_ref, catalogue, item_store, options.ref_resolve_timeout_ms).await
        };
        GroupPlanner::plan(&mut background_tree);
        if is_empty_and(&background_tree) {
            notifier.emit(CoreEvent::SourceItemMissing);
        }

        Ok(Prepared {
            class_tree,
            background_tree,
            state: SelectorState::new(),
            notifier,
            lookup_index,
            generation,
        })
    }

    /// `render(scope, prepared) → RenderedWidget`.
    /// Returns `None` when `prepared` is from a superseded generation.
    pub fn render(
        &self,
        scope_kind: ScopeKind,
        prepared: &mut Prepared,
        view: &dyn View,
        options: &EngineOptions,
    ) -> Option<RenderedWidget> {
        if prepared.generation != self.generation {
            return None;
        }
        let root = match scope_kind {
            ScopeKind::Class => &prepared.class_tree,
            ScopeKind::Background => &prepared.background_tree,
        };
        let widget = Renderer::render_scope(
            scope_kind,
            root,
            &mut prepared.state,
            &prepared.lookup_index,
            view,
            options,
            &prepared.notifier,
        );
        prepared.notifier.emit(CoreEvent::Rendered {
            widget_count: count_widgets(&widget),
        });
        Some(widget)
    }

    /// Reports that the host observed a mounted widget's value change
    /// outside the render/collect cycle (the user picked a different
    /// `Select` option, toggled a `Checkbox`, ...). `View` is read-back
    /// only — the core has no way to learn this on its own, so the host
    /// calls this itself after applying the change through its own `View`.
    pub fn notify_selection_changed(&self, prepared: &Prepared, node_id: NodeId) {
        if prepared.generation != self.generation {
            return;
        }
        prepared.notifier.emit(CoreEvent::SelectionChanged { node_id });
    }

    /// `collect(prepared, filters) → CollectedItem[]`.
    /// Empty (rather than stale data) when `prepared`'s generation has been
    /// superseded.
    pub fn collect(
        &self,
        prepared: &Prepared,
        view: &dyn View,
        filters: CollectFilters,
        options: &EngineOptions,
    ) -> Vec<ItemRecord> {
        if prepared.generation != self.generation {
            return Vec::new();
        }
        Collector::collect(&prepared.state, view, filters, &options.non_stackable_kinds, &prepared.notifier)
    }

    /// Converts a wealth descriptor to coin. Pure with respect to
    /// `Prepared`/generation — wealth conversion has no AST dependency, so
    /// it is never cancelled.
    pub async fn convert_wealth(&self, descriptor: &WealthDescriptor, dice: &dyn Dice, notifier: &Notifier) -> CoinMap {
        WealthConverter::convert(descriptor, dice, notifier).await
    }

    /// Disposes every mounted widget through `view` and clears `prepared`'s
    /// scope state in place, without bumping the generation — a reset
    /// reuses the same `Prepared` cycle, unlike `initialize`.
    pub fn reset(&self, prepared: &mut Prepared, view: &dyn View) {
        prepared.state.reset(view);
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }
}

fn count_widgets(widget: &RenderedWidget) -> usize {
    match widget {
        RenderedWidget::Group { children, .. } => 1 + children.iter().map(count_widgets).sum::<usize>(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockDocumentCatalogue, MockItemStore, MockView};

    fn empty_catalogue() -> MockDocumentCatalogue {
        let mut catalogue = MockDocumentCatalogue::new();
        catalogue.expect_get_starting_equipment().returning(|_| Vec::new());
        catalogue.expect_get_starting_wealth().returning(|_| None);
        catalogue
    }

    #[tokio::test]
    async fn initialize_bumps_generation_each_call() {
        let mut core = EngineCore::new();
        let catalogue = empty_catalogue();
        let store = MockItemStore::new();
        let options = EngineOptions::default();

        let first = core
            .initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();
        assert_eq!(first.generation, 1);

        let second = core
            .initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(core.current_generation(), 2);
    }

    #[tokio::test]
    async fn stale_prepared_cannot_render_or_collect() {
        let mut core = EngineCore::new();
        let catalogue = empty_catalogue();
        let store = MockItemStore::new();
        let options = EngineOptions::default();

        let mut stale = core
            .initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();
        core.initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();

        let view = MockView::new();
        assert!(core.render(ScopeKind::Class, &mut stale, &view, &options).is_none());
        assert!(core
            .collect(&stale, &view, CollectFilters::both(), &options)
            .is_empty());
    }

    #[tokio::test]
    async fn skipped_scope_renders_as_empty_group() {
        let mut core = EngineCore::new();
        let catalogue = empty_catalogue();
        let store = MockItemStore::new();
        let mut options = EngineOptions::default();
        options.skip_class_equipment = true;

        let mut prepared = core
            .initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();

        let mut view = MockView::new();
        view.expect_mount_container()
            .returning(|| crate::ports::WidgetHandle(1));
        let widget = core
            .render(ScopeKind::Class, &mut prepared, &view, &options)
            .expect("current generation should render");
        match widget {
            RenderedWidget::Group { children, .. } => assert!(children.is_empty()),
            other => panic!("expected empty Group, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn notify_selection_changed_reaches_subscribers_for_current_generation() {
        let mut core = EngineCore::new();
        let catalogue = empty_catalogue();
        let store = MockItemStore::new();
        let options = EngineOptions::default();

        let mut prepared = core
            .initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen_in_listener = seen.clone();
        prepared.notifier_mut().subscribe(Box::new(move |event| {
            if matches!(event, CoreEvent::SelectionChanged { .. }) {
                seen_in_listener.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        }));

        core.notify_selection_changed(&prepared, equipcore_domain::NodeId::new());
        assert!(seen.load(std::sync::atomic::Ordering::SeqCst));

        let stale = prepared;
        core.initialize(ItemRefId::new(), ItemRefId::new(), &catalogue, &store, &[], None, &options)
            .await
            .unwrap();
        seen.store(false, std::sync::atomic::Ordering::SeqCst);
        core.notify_selection_changed(&stale, equipcore_domain::NodeId::new());
        assert!(!seen.load(std::sync::atomic::Ordering::SeqCst));
    }
}

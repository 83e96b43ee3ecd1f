//! External collaborator traits.
//!
//! The core depends only on these, never on a concrete host implementation:
//! `ItemStore` and `DocumentCatalogue` are the host's compendium, `Dice` is
//! the host's roller, `View` is the host's widget toolkit. Each is
//! `#[async_trait]` + `#[cfg_attr(test, mockall::automock)]`, the pattern
//! used for every outbound repo port in this codebase's lineage.

use async_trait::async_trait;

use equipcore_domain::{DiceFormula, ItemRef, ItemRefId, PackId, PackRef};

use crate::descriptor::{DescriptorList, WealthEntry};
use crate::error::CoreError;

/// The host's compendium of catalogue items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Locate an item by its local id, preferring `pack_hint` when given.
    async fn resolve_ref(&self, local_id: &str, pack_hint: Option<PackId>) -> Option<ItemRef>;

    /// Read one pack's index (not its full documents). Modelled as a
    /// finite `Vec` rather than an async stream: the core consumes the
    /// whole index to build `LookupIndex` in one pass, so a stream offers
    /// no benefit here and a `Vec` keeps the trait mockable with plain
    /// data.
    async fn pack_index(&self, pack_id: PackId) -> Result<Vec<equipcore_domain::IndexEntry>, CoreError>;

    /// List the packs active in the current session.
    fn pack_list(&self) -> Vec<PackRef>;
}

/// Supplies the *source* items — class, background — Extractor reads
/// equipment descriptors from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentCatalogue: Send + Sync {
    async fn get_starting_equipment(&self, source_ref: ItemRefId) -> DescriptorList;

    /// The starting-wealth expression attached to a source item, if it
    /// offers one. `DocumentCatalogue` is the natural home for this: it is
    /// the same collaborator that already supplies the source item's other
    /// starting-equipment data.
    async fn get_starting_wealth(&self, source_ref: ItemRefId) -> Option<WealthEntry>;
}

/// The outcome of one `Dice::roll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRollOutcome {
    pub total: i32,
}

/// The host's dice roller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dice: Send + Sync {
    /// Suspending: evaluate a formula, e.g. by awaiting a physical-dice
    /// bridge or an RNG call outside the core.
    async fn roll(&self, formula: DiceFormula) -> Result<DiceRollOutcome, CoreError>;

    /// A synchronous expected-value estimate the host may expose
    /// separately from the core's own `DiceFormula::average_floor`
    /// fallback.
    fn average(&self, formula: DiceFormula) -> i32;
}

/// One option offered by a rendered `Select` widget.
///
/// `bundled_refs` is empty for a plain item/category/focus option, whose
/// single contribution is `item_ref`/`quantity`. An option built from an
/// `OR` child that is itself a `LINKED` bundle carries every item the
/// bundle contributes here instead — choosing that option must contribute
/// all of them together, never just one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub item_ref: ItemRef,
    pub label: String,
    pub quantity: u32,
    pub bundled_refs: Vec<BundledRef>,
}

/// One bundled atom inside a rendered `Linked` widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledRef {
    pub item_ref: ItemRef,
    pub quantity: u32,
}

/// The user-visible value read back from a mounted widget. The Renderer
/// only describes *what to show*; the host reports *what the user did*
/// through this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetValue {
    Select { chosen_index: Option<usize> },
    Checkbox { checked: bool },
    /// `LINKED` atoms always contribute once mounted; there is no toggle.
    Linked,
    Group,
    Favorite { active: bool },
}

/// An opaque handle to a live widget, owned by the host's `View`
/// implementation. The core never inspects its contents — only passes it
/// back to `View::read_value` and `View::dispose`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetHandle(pub u64);

/// The host's declarative widget builder for Select, Checkbox, Label,
/// Container. The core never emits raw DOM strings; all HTML production
/// goes through `View`.
///
/// `mount_*` is the builder half; `read_value`/`dispose` close the loop so
/// `Collector` can read user input back out and `SelectorState::reset` can
/// tear widgets down. Both halves are an elaboration beyond a pure builder
/// interface, recorded in DESIGN.md.
#[cfg_attr(test, mockall::automock)]
pub trait View: Send + Sync {
    fn mount_container(&self) -> WidgetHandle;
    fn mount_select(&self, options: Vec<SelectOption>, default_index: Option<usize>) -> WidgetHandle;
    fn mount_checkbox(&self, label: String, quantity: u32, pre_checked: bool, disabled: bool) -> WidgetHandle;
    fn mount_linked(&self, visible_label: String, bundled_refs: Vec<BundledRef>) -> WidgetHandle;
    fn mount_favorite(&self) -> WidgetHandle;
    fn read_value(&self, handle: &WidgetHandle) -> WidgetValue;
    fn dispose(&self, handle: &WidgetHandle);
}

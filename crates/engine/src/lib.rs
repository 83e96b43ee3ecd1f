//! Equipment Resolution Core — extracts, plans, renders, and collects
//! starting-equipment choices for class/background character creation.
//! Consumes its host only through the `ports` traits; never touches a UI
//! framework, storage, or randomness directly.

pub mod api;
pub mod ast;
pub mod collector;
pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod lookup_index;
pub mod notify;
pub mod options;
pub mod planner;
pub mod ports;
pub mod renderer;
pub mod state;
pub mod wealth;

pub use api::{EngineCore, Prepared};
pub use ast::{EquipmentNode, LinkedChild};
pub use collector::{CollectFilters, Collector, ItemRecord};
pub use error::CoreError;
pub use extractor::Extractor;
pub use lookup_index::LookupIndex;
pub use notify::{CoreEvent, Notifier};
pub use options::{ClaimOrder, EngineOptions};
pub use planner::GroupPlanner;
pub use ports::{
    BundledRef, Dice, DiceRollOutcome, DocumentCatalogue, ItemStore, SelectOption, View, WidgetHandle, WidgetValue,
};
pub use renderer::{GroupKind, RenderedWidget, Renderer};
pub use state::{ScopeKind, SelectorState, WidgetMeta};
pub use wealth::WealthConverter;

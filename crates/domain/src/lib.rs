//! Equipment Core Domain — vocabulary types shared by the resolution engine.
//!
//! Deliberately has no dependency on the engine crate's algorithms
//! (`LookupIndex`, `EquipmentNode`, `Renderer`, ...): this crate only
//! defines the nouns (`ItemRef`, `CategoryKey`, `DiceFormula`, `CoinMap`)
//! and the unified `DomainError`, kept one-directional so the engine
//! depends on this crate and never the reverse.

pub mod catalogue;
pub mod category;
pub mod coin;
pub mod dice;
pub mod error;
pub mod ids;

pub use catalogue::{IndexEntry, ItemKind, ItemRef, PackRef};
pub use category::{ArmorShape, CategoryKey, Proficiency, WeaponShape};
pub use coin::{CoinMap, Denomination, WealthDescriptor};
pub use dice::{DiceFormula, DiceParseError};
pub use error::DomainError;
pub use ids::{ItemRefId, NodeId, PackId};

//! `EngineOptions` — the configuration surface this core exposes.
//! A plain struct with a `Default` impl; no file format, no persisted
//! state of its own.

use equipcore_domain::ItemKind;

/// Resolves which scope claims a shared ref first. Defaults to
/// `ClassFirst` (DESIGN.md Open Question 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimOrder {
    #[default]
    ClassFirst,
    BackgroundFirst,
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub skip_class_equipment: bool,
    pub skip_background_equipment: bool,
    pub favorites: bool,
    pub non_stackable_kinds: Vec<ItemKind>,
    pub ref_resolve_timeout_ms: u64,
    pub allow_opt_out_of_mandatory: bool,
    pub claim_order: ClaimOrder,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            skip_class_equipment: false,
            skip_background_equipment: false,
            favorites: true,
            non_stackable_kinds: ItemKind::default_non_stackable().to_vec(),
            ref_resolve_timeout_ms: 3000,
            allow_opt_out_of_mandatory: false,
            claim_order: ClaimOrder::default(),
        }
    }
}

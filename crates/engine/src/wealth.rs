//! `WealthConverter` (C8): turns a starting-wealth descriptor into coin.
//! Falls back to the formula's deterministic average when the `Dice`
//! collaborator cannot produce a roll.

use equipcore_domain::{CoinMap, WealthDescriptor};
use tracing::warn;

use crate::notify::{CoreEvent, Notifier};
use crate::ports::Dice;

pub struct WealthConverter;

impl WealthConverter {
    /// Converts a wealth descriptor to coin. Never fails: a `Dice::roll`
    /// error degrades to `DiceFormula::average_floor` and is reported
    /// through `notifier` rather than propagated.
    pub async fn convert(descriptor: &WealthDescriptor, dice: &dyn Dice, notifier: &Notifier) -> CoinMap {
        match descriptor {
            WealthDescriptor::Literal { denomination, amount } => CoinMap::single(*denomination, *amount),
            WealthDescriptor::Roll {
                formula,
                multiplier,
                denomination,
            } => {
                let total = match dice.roll(*formula).await {
                    Ok(outcome) => outcome.total,
                    Err(err) => {
                        warn!(formula = %formula, error = %err, "dice roll failed, falling back to average");
                        notifier.emit(CoreEvent::WealthFallback {
                            reason: err.to_string(),
                        });
                        formula.average_floor()
                    }
                };
                let amount = (total.max(0) as u32).saturating_mul(*multiplier);
                CoinMap::single(*denomination, amount)
            }
        }
    }
}

//! Coin/denomination vocabulary for `WealthConverter` output.

use serde::{Deserialize, Serialize};

use crate::dice::DiceFormula;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denomination {
    Platinum,
    Gold,
    Electrum,
    Silver,
    Copper,
}

/// Non-negative per-denomination coin counts.
///
/// `WealthConverter` never splits a result across denominations: exactly
/// one field is non-zero unless the input was zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinMap {
    pub platinum: u32,
    pub gold: u32,
    pub electrum: u32,
    pub silver: u32,
    pub copper: u32,
}

impl CoinMap {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Deposit a non-negative amount into a single denomination, leaving
    /// the rest at zero.
    pub fn single(denomination: Denomination, amount: u32) -> Self {
        let mut map = Self::zero();
        match denomination {
            Denomination::Platinum => map.platinum = amount,
            Denomination::Gold => map.gold = amount,
            Denomination::Electrum => map.electrum = amount,
            Denomination::Silver => map.silver = amount,
            Denomination::Copper => map.copper = amount,
        }
        map
    }

    pub fn total_in(&self, denomination: Denomination) -> u32 {
        match denomination {
            Denomination::Platinum => self.platinum,
            Denomination::Gold => self.gold,
            Denomination::Electrum => self.electrum,
            Denomination::Silver => self.silver,
            Denomination::Copper => self.copper,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// The raw wealth expression pulled from a selected class/background, as
/// extracted from the source item's starting-wealth descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum WealthDescriptor {
    /// A literal amount in a single denomination, e.g. "50 gp".
    Literal {
        denomination: Denomination,
        amount: u32,
    },
    /// A roll formula plus multiplier, e.g. "5d4" with multiplier 10 meaning
    /// "5d4 x 10 gp".
    Roll {
        formula: DiceFormula,
        multiplier: u32,
        denomination: Denomination,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaves_other_denominations_zero() {
        let coins = CoinMap::single(Denomination::Gold, 50);
        assert_eq!(coins.gold, 50);
        assert_eq!(coins.platinum, 0);
        assert_eq!(coins.silver, 0);
    }

    #[test]
    fn zero_is_zero() {
        assert!(CoinMap::zero().is_zero());
        assert!(!CoinMap::single(Denomination::Copper, 1).is_zero());
    }
}

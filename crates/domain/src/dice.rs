//! Dice formula parsing — pure value objects, no randomness.
//!
//! Supports formulas like "1d20", "5d4+3", "2d6-1". Actually rolling the
//! dice is a suspending operation that belongs to the engine's `Dice` port
//! (a real roll needs an RNG or a network round-trip to a physical-dice
//! collaborator); this module only parses formulas and computes their
//! deterministic bounds, which is everything `WealthConverter`'s fallback
//! path needs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    #[error("Empty dice formula")]
    Empty,
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    #[error("Die size must be at least 2")]
    InvalidDieSize,
}

/// A parsed dice formula like "5d4+3", optionally scaled by a multiplier
/// (e.g. the "x 10 gp" in "5d4 x 10 gp").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    pub dice_count: u8,
    pub die_size: u8,
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(dice_count: u8, die_size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Parse "XdY", "XdY+Z", "XdY-Z", or the shorthand "dY" (meaning 1dY).
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = input
            .find('d')
            .ok_or_else(|| DiceParseError::InvalidFormat(format!("missing 'd' in '{input}'")))?;

        let dice_count_str = &input[..d_pos];
        let dice_count: u8 = if dice_count_str.is_empty() {
            1
        } else {
            dice_count_str
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("invalid dice count: '{dice_count_str}'")))?
        };
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }

        let after_d = &input[d_pos + 1..];
        let (die_size_str, modifier) = if let Some(plus_pos) = after_d.find('+') {
            let die_str = &after_d[..plus_pos];
            let mod_str = &after_d[plus_pos + 1..];
            let modifier: i32 = mod_str
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("invalid modifier: '+{mod_str}'")))?;
            (die_str, modifier)
        } else if let Some(minus_pos) = after_d.rfind('-') {
            if minus_pos == 0 {
                return Err(DiceParseError::InvalidFormat(format!(
                    "invalid die size: '{after_d}'"
                )));
            }
            let die_str = &after_d[..minus_pos];
            let mod_str = &after_d[minus_pos + 1..];
            let modifier: i32 = mod_str
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("invalid modifier: '-{mod_str}'")))?;
            (die_str, -modifier)
        } else {
            (after_d, 0)
        };

        let die_size: u8 = die_size_str
            .parse()
            .map_err(|_| DiceParseError::InvalidFormat(format!("invalid die size: '{die_size_str}'")))?;
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }

        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    pub fn min_roll(&self) -> i32 {
        self.dice_count as i32 + self.modifier
    }

    pub fn max_roll(&self) -> i32 {
        (self.dice_count as i32 * self.die_size as i32) + self.modifier
    }

    /// Average total, rounded down — used as `WealthConverter`'s fallback
    /// when the `Dice` collaborator fails to evaluate a roll.
    pub fn average_floor(&self) -> i32 {
        let per_die_avg = (self.die_size as f64 + 1.0) / 2.0;
        ((self.dice_count as f64 * per_die_avg) + self.modifier as f64).floor() as i32
    }

    pub fn display(&self) -> String {
        match self.modifier {
            0 => format!("{}d{}", self.dice_count, self.die_size),
            m if m > 0 => format!("{}d{}+{}", self.dice_count, self.die_size, m),
            m => format!("{}d{}{}", self.dice_count, self.die_size, m),
        }
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

//! Unified error type for the domain layer.
//!
//! Gives vocabulary-level failures (parsing a dice formula, building an
//! `ItemRef`, validating a `CategoryKey`) one shape so the engine crate can
//! wrap them with `#[from]` instead of stringly-typed errors.

use thiserror::Error;

use crate::dice::DiceParseError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid id format: {0}")]
    InvalidId(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

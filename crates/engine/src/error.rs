//! `CoreError` — the engine-layer error taxonomy.
//!
//! Only `initialize` ever returns `Err`, and only for invariant breaks that
//! indicate a programming error. Every
//! other failure kind here is informational: it is attached to a
//! notification or logged, never bubbled up as a `Result::Err`, so most of
//! these variants are constructed and then immediately turned into a log
//! line or an `onRendered`/`onCollectionWarning`-style event rather than
//! propagated with `?`.

use equipcore_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A pack's index could not be read; the pack is skipped and
    /// `LookupIndex::build` proceeds with the rest.
    #[error("pack {0} unavailable: {1}")]
    PackUnavailable(String, String),

    /// A ref could not be found in the catalogue; the caller should
    /// represent this in the AST as `ItemRef::unresolved`, never raise it
    /// here.
    #[error("ref '{0}' did not resolve")]
    RefUnresolved(String),

    /// A descriptor entry could not be parsed into an `EquipmentNode`; the
    /// caller substitutes a placeholder.
    #[error("descriptor '{0}' malformed: {1}")]
    DescriptorMalformed(String, String),

    /// `initialize` was given a non-null ref of the wrong kind — the one
    /// case the public API actually raises rather than degrading quietly.
    #[error("source item ref invalid: {0}")]
    SourceItemInvalid(String),

    /// The wealth descriptor was malformed beyond recovery; `WealthConverter`
    /// falls back to zero coin and the caller should surface
    /// `onWealthFallback`.
    #[error("wealth expression invalid: {0}")]
    WealthExpressionInvalid(String),

    /// A widget's reported ref was not found in the catalogue mid-cycle;
    /// the record is dropped and the caller should surface a collection
    /// warning.
    #[error("collector inconsistency: {0}")]
    CollectorInconsistent(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_domain_error() {
        let domain_err = DomainError::validation("bad id");
        let core_err: CoreError = domain_err.into();
        assert!(matches!(core_err, CoreError::Domain(_)));
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = CoreError::RefUnresolved("longbow".to_string());
        assert_eq!(err.to_string(), "ref 'longbow' did not resolve");
    }
}

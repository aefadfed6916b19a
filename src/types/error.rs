//! Error taxonomy for the matching engine.
//!
//! These are programming-contract violations, not expected runtime
//! conditions. They surface synchronously as `Err` instead of being
//! collapsed into a boolean "no match" result, which keeps "legitimate
//! no-op" and "broken precondition" distinguishable at every call site.

use thiserror::Error;

/// Contract-violation errors raised by participants, the roster builder,
/// and the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A rank query was invoked on a provider whose registry does not
    /// contain the entries the query requires (no tentative placements;
    /// preference list exhausted), or an engine operation found state it
    /// was entitled to assume absent.
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),

    /// `discount` named a provider not present in the candidate's
    /// remaining options queue.
    #[error("provider is not among the candidate's remaining options")]
    NotInOptions,

    /// `displace`/`unmatch` named a pairing that does not currently exist.
    #[error("no current placement exists for this pairing")]
    NotPlaced,

    /// Mutual-acceptability assumptions were violated at the point a match
    /// was attempted. Checked, not assumed: construction does not validate
    /// reciprocity.
    #[error("preference lists are inconsistent: {0}")]
    InvalidPreferenceState(&'static str),

    /// A preference list named an identifier that resolves to no
    /// constructed participant.
    #[error("unknown participant identifier: {0}")]
    UnknownParticipant(String),

    /// Two participants on the same side were registered under one
    /// identifier.
    #[error("duplicate participant identifier: {0}")]
    DuplicateIdentifier(String),

    /// A preference list contained the same counterpart twice. Duplicate
    /// entries are undefined behavior for the core, so the boundary
    /// refuses them.
    #[error("duplicate preference entry: {0}")]
    DuplicatePreference(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MatchError::PreconditionViolation("no tentative placements");
        assert_eq!(
            err.to_string(),
            "precondition violated: no tentative placements"
        );

        let err = MatchError::UnknownParticipant("Mercy".to_string());
        assert_eq!(err.to_string(), "unknown participant identifier: Mercy");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(MatchError::NotInOptions, MatchError::NotInOptions);
        assert_ne!(MatchError::NotInOptions, MatchError::NotPlaced);
    }
}

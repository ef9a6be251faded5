//! Typed search errors.
//!
//! Pre-flight failures (`InvalidConfig`, `UnknownVariable`,
//! `KnowledgeConflict`) are returned before any score is computed.
//! `StructuralInconsistency` aborts a run mid-search; interruption is not an
//! error and is reported through
//! [`crate::report::TerminationReasonV1::Interrupted`].

use causal_kernel::knowledge::KnowledgeError;
use causal_kernel::proof::canon::CanonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A policy value is out of range.
    #[error("invalid search configuration: {detail}")]
    InvalidConfig { detail: String },

    /// Knowledge names a variable the score provider does not know.
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    /// Knowledge contradicts itself.
    #[error("knowledge conflict: {detail}")]
    KnowledgeConflict { detail: String },

    /// A re-derived order does not exist for the edge-reduced graph.
    #[error("structural inconsistency in tier {tier} at variable {variable}: {detail}")]
    StructuralInconsistency {
        tier: usize,
        variable: String,
        detail: String,
    },

    /// A restart worker thread panicked.
    #[error("restart {restart} of tier {tier} panicked")]
    RestartPanicked { tier: usize, restart: usize },

    /// Report serialization failed.
    #[error("report serialization failed: {detail}")]
    Canon { detail: String },
}

impl From<KnowledgeError> for SearchError {
    fn from(err: KnowledgeError) -> Self {
        match err {
            KnowledgeError::UnknownVariable { name } => Self::UnknownVariable { name },
            other => Self::KnowledgeConflict {
                detail: other.to_string(),
            },
        }
    }
}

impl From<CanonError> for SearchError {
    fn from(err: CanonError) -> Self {
        Self::Canon {
            detail: err.to_string(),
        }
    }
}

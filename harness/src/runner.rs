//! Search runner: runs the orchestrator and binds the result to a digest.
//!
//! # Pipeline
//!
//! ```text
//! knowledge.digest() + policy.digest()
//!   → PermutationSearch::new()  (pre-flight validation)
//!   → search()                  (tiers × restarts)
//!   → to_canonical_json_bytes() → canonical_hash(SearchReport)
//! ```
//!
//! # Report directory layout
//!
//! ```text
//! <dir>/
//!   search_report.json   — canonical JSON report
//!   report_digest.txt    — ASCII digest string ("sha256:...")
//! ```
//!
//! Reading is fail-closed: a missing file, non-canonical report bytes, or a
//! digest mismatch is an error.

use std::path::Path;
use std::sync::Arc;

use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::proof::canon::canonical_json_bytes;
use causal_kernel::proof::hash::{canonical_hash, ContentHash};
use causal_kernel::proof::hash_domain::HashDomain;
use causal_kernel::score::ScoreProvider;
use causal_search::cancel::CancelToken;
use causal_search::error::SearchError;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::PermutationPolicyV1;
use causal_search::report::SearchReportV1;
use thiserror::Error;

pub const REPORT_FILENAME: &str = "search_report.json";
pub const DIGEST_FILENAME: &str = "report_digest.txt";

/// Error during a search run or report persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("missing report file: {filename}")]
    MissingFile { filename: String },
    #[error("report bytes are not canonical JSON: {detail}")]
    NotCanonical { detail: String },
    #[error("digest mismatch: stored {stored}, recomputed {recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            detail: err.to_string(),
        }
    }
}

/// A finished run: the report and everything that binds it.
#[derive(Debug, Clone)]
pub struct RunOutputV1 {
    pub report: SearchReportV1,
    /// Canonical JSON of `report`.
    pub canonical_bytes: Vec<u8>,
    /// `canonical_hash(SearchReport, canonical_bytes)`.
    pub digest: ContentHash,
    pub knowledge_digest: ContentHash,
    pub policy_digest: ContentHash,
}

/// Run one search and serialize its report.
///
/// # Errors
///
/// Returns [`RunError::Search`] for pre-flight or search failures.
pub fn run_search(
    score: Arc<dyn ScoreProvider>,
    knowledge: KnowledgeV1,
    policy: PermutationPolicyV1,
    cancel: &CancelToken,
) -> Result<RunOutputV1, RunError> {
    let knowledge_digest = knowledge.digest().map_err(SearchError::from)?;
    let policy_digest = policy.digest()?;
    let search = PermutationSearch::new(score, knowledge, policy)?;
    let report = search.search(cancel)?;
    let canonical_bytes = report.to_canonical_json_bytes()?;
    let digest = canonical_hash(HashDomain::SearchReport, &canonical_bytes);
    tracing::info!(digest = %digest, knowledge = %knowledge_digest, policy = %policy_digest, "run complete");
    Ok(RunOutputV1 {
        report,
        canonical_bytes,
        digest,
        knowledge_digest,
        policy_digest,
    })
}

/// Check that `bytes` are canonical report JSON hashing to `expected`.
///
/// # Errors
///
/// Returns [`RunError::NotCanonical`] or [`RunError::DigestMismatch`].
pub fn verify_report_bytes(bytes: &[u8], expected: &ContentHash) -> Result<(), RunError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| RunError::NotCanonical {
            detail: e.to_string(),
        })?;
    let recanonical = canonical_json_bytes(&value).map_err(|e| RunError::NotCanonical {
        detail: e.to_string(),
    })?;
    if recanonical != bytes {
        return Err(RunError::NotCanonical {
            detail: "re-serialization differs from stored bytes".into(),
        });
    }
    let recomputed = canonical_hash(HashDomain::SearchReport, bytes);
    if &recomputed != expected {
        return Err(RunError::DigestMismatch {
            stored: expected.as_str().to_string(),
            recomputed: recomputed.as_str().to_string(),
        });
    }
    Ok(())
}

/// Write the report and its digest into `dir` (created if missing).
///
/// # Errors
///
/// Returns [`RunError::Io`] on write failure.
pub fn write_report_dir(dir: &Path, output: &RunOutputV1) -> Result<(), RunError> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(REPORT_FILENAME), &output.canonical_bytes)?;
    std::fs::write(dir.join(DIGEST_FILENAME), output.digest.as_str())?;
    Ok(())
}

/// Read and verify a report directory. Returns the report bytes and digest.
///
/// # Errors
///
/// Returns [`RunError`] for missing files, unparsable digests, non-canonical
/// bytes, or a digest mismatch.
pub fn read_report_dir(dir: &Path) -> Result<(Vec<u8>, ContentHash), RunError> {
    let read = |name: &str| -> Result<Vec<u8>, RunError> {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(RunError::MissingFile {
                filename: name.to_string(),
            });
        }
        Ok(std::fs::read(path)?)
    };
    let bytes = read(REPORT_FILENAME)?;
    let digest_text = String::from_utf8_lossy(&read(DIGEST_FILENAME)?).trim().to_string();
    let stored = ContentHash::parse(&digest_text).ok_or_else(|| RunError::DigestMismatch {
        stored: digest_text.clone(),
        recomputed: canonical_hash(HashDomain::SearchReport, &bytes).as_str().to_string(),
    })?;
    verify_report_bytes(&bytes, &stored)?;
    Ok((bytes, stored))
}

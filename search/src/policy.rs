//! Permutation search policy.

use causal_kernel::proof::canon::canonical_json_bytes;
use causal_kernel::proof::hash::{canonical_hash, ContentHash};
use causal_kernel::proof::hash_domain::HashDomain;

use crate::error::SearchError;

/// Which local-move strategy drives each suborder search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyV1 {
    /// Single-variable relocation ("better mutation") interleaved with BES.
    Boss,
    /// GRaSP-style tuck search interleaved with BES.
    Tuck,
}

impl StrategyV1 {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boss => "boss",
            Self::Tuck => "tuck",
        }
    }
}

/// Search configuration for one orchestrator run.
///
/// Override fields with struct-update syntax on [`Default`] and call
/// [`PermutationPolicyV1::validate`] (the orchestrator does this before any
/// search work).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationPolicyV1 {
    pub strategy: StrategyV1,
    /// Number of independent restarts per tier (≥ 1).
    pub num_starts: usize,
    /// Restart 0 keeps the input order instead of shuffling.
    pub use_data_order: bool,
    /// Interleave backward equivalence search with local moves.
    pub use_bes: bool,
    /// Cap on the size of the `H` subsets BES evaluates; `None` is unbounded.
    pub bes_depth: Option<usize>,
    /// Root seed for restart shuffles.
    pub seed: u64,
    /// Run restarts of a tier on scoped threads.
    pub parallel_restarts: bool,
    /// Close the output graph under Meek rules (CPDAG) instead of a DAG.
    pub cpdag: bool,
    /// Safety cap on outer local-move/BES rounds per restart (≥ 1).
    pub max_rounds: usize,
    /// Tuck: maximum depth of the equal-score walk (≥ 1; 1 is a plain
    /// hill-climb).
    pub tuck_depth: usize,
    /// Tuck: deepest walk level at which uncovered tucks are tried.
    pub uncovered_depth: usize,
    /// Tuck: deepest walk level at which non-singular tucks (a carried
    /// ancestor is a child of the tucked-over variable) are tried.
    pub non_singular_depth: usize,
    /// Tuck: climb with covered singular tucks first, then singular tucks,
    /// then the full configuration.
    pub tuck_ordered: bool,
}

impl Default for PermutationPolicyV1 {
    fn default() -> Self {
        Self {
            strategy: StrategyV1::Boss,
            num_starts: 1,
            use_data_order: true,
            use_bes: true,
            bes_depth: None,
            seed: 0,
            parallel_restarts: false,
            cpdag: true,
            max_rounds: 50,
            tuck_depth: 3,
            uncovered_depth: 1,
            non_singular_depth: 1,
            tuck_ordered: false,
        }
    }
}

impl PermutationPolicyV1 {
    /// Reject out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for `num_starts == 0`,
    /// `max_rounds == 0` or `tuck_depth == 0`.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_starts == 0 {
            return Err(SearchError::InvalidConfig {
                detail: "num_starts must be at least 1".into(),
            });
        }
        if self.max_rounds == 0 {
            return Err(SearchError::InvalidConfig {
                detail: "max_rounds must be at least 1".into(),
            });
        }
        if self.tuck_depth == 0 {
            return Err(SearchError::InvalidConfig {
                detail: "tuck_depth must be at least 1".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "bes_depth": self.bes_depth,
            "cpdag": self.cpdag,
            "max_rounds": self.max_rounds,
            "non_singular_depth": self.non_singular_depth,
            "num_starts": self.num_starts,
            "parallel_restarts": self.parallel_restarts,
            "seed": self.seed,
            "strategy": self.strategy.as_str(),
            "tuck_depth": self.tuck_depth,
            "tuck_ordered": self.tuck_ordered,
            "uncovered_depth": self.uncovered_depth,
            "use_bes": self.use_bes,
            "use_data_order": self.use_data_order,
        })
    }

    /// Content digest of the policy snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Canon`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, SearchError> {
        let bytes = canonical_json_bytes(&self.to_json_value())?;
        Ok(canonical_hash(HashDomain::PermutationPolicy, &bytes))
    }
}

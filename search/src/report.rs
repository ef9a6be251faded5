//! Search report: the auditable result of one orchestrator run.
//!
//! [`SearchReportV1::to_canonical_json_bytes`] is the normative serialization
//! and [`SearchReportV1::digest`] binds it under
//! [`HashDomain::SearchReport`]. Scores are written as the hex of their
//! IEEE-754 bits, so two reports hash equal only if every score is
//! bit-identical.

use causal_kernel::graph::EdgeV1;
use causal_kernel::proof::canon::{canonical_json_bytes, f64_bits_hex};
use causal_kernel::proof::hash::{canonical_hash, ContentHash};
use causal_kernel::proof::hash_domain::HashDomain;

use crate::error::SearchError;
use crate::gst::GstStatsV1;
use crate::policy::PermutationPolicyV1;

/// One tuck: `variable` landed at suborder index `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuckStepV1 {
    pub variable: usize,
    pub to: usize,
}

/// What an accepted transition changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKindV1 {
    /// `variable` relocated from suborder index `from` to `to`.
    Mutation {
        variable: usize,
        from: usize,
        to: usize,
    },
    /// A tuck walk: zero or more equal-score tucks followed by the
    /// improving one, in the order applied. Never empty.
    Tuck { steps: Vec<TuckStepV1> },
    /// A BES round removed `deletions` edges and the re-derived order was kept.
    Bes { deletions: usize },
}

impl TransitionKindV1 {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mutation { .. } => "mutation",
            Self::Tuck { .. } => "tuck",
            Self::Bes { .. } => "bes",
        }
    }
}

/// One accepted change to a suborder.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionV1 {
    pub tier: usize,
    pub restart: usize,
    pub kind: TransitionKindV1,
    pub score_before: f64,
    pub score_after: f64,
}

/// Why the orchestrator stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReasonV1 {
    /// Every tier was searched to a local optimum.
    Converged,
    /// Cancelled; tiers not yet searched were appended unsearched.
    Interrupted,
}

impl TerminationReasonV1 {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Per-tier record.
#[derive(Debug, Clone, PartialEq)]
pub struct TierSummaryV1 {
    pub tier: usize,
    /// Variables of the tier in final order.
    pub variables: Vec<usize>,
    /// `false` for forbidden-within tiers and tiers skipped by cancellation.
    pub searched: bool,
    pub forbidden_within: bool,
    /// Suborder total of each completed restart, by restart index.
    pub restart_scores: Vec<f64>,
    /// Winning restart, if any restart completed.
    pub best_restart: Option<usize>,
    /// Suborder total of the tier in the final order.
    pub score: f64,
}

/// Result of [`crate::permutation::PermutationSearch::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReportV1 {
    /// Variable names by index.
    pub variables: Vec<String>,
    /// Final causal order (variable indices).
    pub order: Vec<usize>,
    /// Parent set of each variable, by variable index.
    pub parents: Vec<Vec<usize>>,
    /// Local score of each variable given its parents, by variable index.
    pub local_scores: Vec<f64>,
    pub total_score: f64,
    /// Output graph edges (DAG, or CPDAG when the policy asks for one).
    pub edges: Vec<EdgeV1>,
    pub tiers: Vec<TierSummaryV1>,
    /// Accepted transitions, ordered by tier then restart.
    pub transitions: Vec<TransitionV1>,
    pub gst_stats: GstStatsV1,
    pub termination: TerminationReasonV1,
    pub policy: PermutationPolicyV1,
    pub score_id: String,
    pub sample_size: Option<usize>,
}

impl SearchReportV1 {
    /// Parent names of the variable called `name`, or `None` if unknown.
    #[must_use]
    pub fn parents_of(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.variables.iter().position(|v| v == name)?;
        Some(
            self.parents[index]
                .iter()
                .map(|&p| self.variables[p].as_str())
                .collect(),
        )
    }

    /// Number of directed edges in the output graph.
    #[must_use]
    pub fn num_directed(&self) -> usize {
        self.edges
            .iter()
            .filter(|e| matches!(e, EdgeV1::Directed { .. }))
            .count()
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "edges": self.edges.iter().map(edge_to_json).collect::<Vec<_>>(),
            "gst_stats": gst_stats_to_json(&self.gst_stats),
            "local_scores": self.local_scores.iter().map(|&s| f64_bits_hex(s)).collect::<Vec<_>>(),
            "order": self.order,
            "parents": self.parents,
            "policy": self.policy.to_json_value(),
            "sample_size": self.sample_size,
            "schema_version": "search_report.v1",
            "score_id": self.score_id,
            "termination": self.termination.as_str(),
            "tiers": self.tiers.iter().map(tier_to_json).collect::<Vec<_>>(),
            "total_score": f64_bits_hex(self.total_score),
            "transitions": self.transitions.iter().map(transition_to_json).collect::<Vec<_>>(),
            "variables": self.variables,
        })
    }

    /// Canonical JSON bytes of the report.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Canon`] if canonicalization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, SearchError> {
        Ok(canonical_json_bytes(&self.to_json_value())?)
    }

    /// Content digest over [`Self::to_canonical_json_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Canon`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, SearchError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::SearchReport, &bytes))
    }
}

fn edge_to_json(e: &EdgeV1) -> serde_json::Value {
    match *e {
        EdgeV1::Directed { from, to } => serde_json::json!({
            "from": from,
            "kind": "directed",
            "to": to,
        }),
        EdgeV1::Undirected { a, b } => serde_json::json!({
            "a": a,
            "b": b,
            "kind": "undirected",
        }),
    }
}

fn gst_stats_to_json(s: &GstStatsV1) -> serde_json::Value {
    serde_json::json!({
        "cache_hits": s.cache_hits,
        "nodes_materialized": s.nodes_materialized,
        "score_calls": s.score_calls,
        "unscorable_skipped": s.unscorable_skipped,
    })
}

fn tier_to_json(t: &TierSummaryV1) -> serde_json::Value {
    serde_json::json!({
        "best_restart": t.best_restart,
        "forbidden_within": t.forbidden_within,
        "restart_scores": t.restart_scores.iter().map(|&s| f64_bits_hex(s)).collect::<Vec<_>>(),
        "score": f64_bits_hex(t.score),
        "searched": t.searched,
        "tier": t.tier,
        "variables": t.variables,
    })
}

fn transition_to_json(t: &TransitionV1) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "kind": t.kind.as_str(),
        "restart": t.restart,
        "score_after": f64_bits_hex(t.score_after),
        "score_before": f64_bits_hex(t.score_before),
        "tier": t.tier,
    });
    match &t.kind {
        TransitionKindV1::Mutation { variable, from, to } => {
            obj["variable"] = (*variable).into();
            obj["from"] = (*from).into();
            obj["to"] = (*to).into();
        }
        TransitionKindV1::Tuck { steps } => {
            obj["steps"] = steps
                .iter()
                .map(|s| serde_json::json!({ "to": s.to, "variable": s.variable }))
                .collect::<Vec<_>>()
                .into();
        }
        TransitionKindV1::Bes { deletions } => {
            obj["deletions"] = (*deletions).into();
        }
    }
    obj
}

//! Causal Search: permutation-based structure search over a Grow-Shrink Tree.
//!
//! This crate provides the search layer. It depends only on `causal_kernel`;
//! it does NOT depend on `causal_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! causal_kernel  ←  causal_search  ←  causal_harness
//! (graph, score,     (GST, BOSS,        (scores, simulator,
//!  knowledge, hash)   tuck, BES)          runner, metrics)
//! ```
//!
//! # Key types
//!
//! - [`GrowShrinkTree`] / [`GstSet`] — per-target memo of greedy parent-set
//!   searches, shared by concurrent restarts
//! - [`SuborderSearch`] — strategy seam; [`BossSuborder`] and
//!   [`TuckSuborder`] implement it
//! - [`PermutationSearch`] — tiered, restarted orchestrator
//! - [`PermutationPolicyV1`] — search configuration
//! - [`SearchReportV1`] — auditable result with canonical JSON and digest
//! - [`CancelToken`] — cooperative cancellation

#![forbid(unsafe_code)]

pub mod bes;
pub mod boss;
pub mod cancel;
pub mod error;
pub mod gst;
pub mod mask;
pub mod order;
pub mod permutation;
pub mod policy;
pub mod report;
pub mod suborder;
pub mod tuck;

pub use boss::BossSuborder;
pub use cancel::CancelToken;
pub use error::SearchError;
pub use gst::{GrowShrinkTree, GstSet, GstStatsV1};
pub use permutation::PermutationSearch;
pub use policy::{PermutationPolicyV1, StrategyV1};
pub use report::{
    SearchReportV1, TerminationReasonV1, TierSummaryV1, TransitionKindV1, TransitionV1, TuckStepV1,
};
pub use suborder::SuborderSearch;
pub use tuck::TuckSuborder;

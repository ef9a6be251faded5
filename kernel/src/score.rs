//! Score Provider contract.
//!
//! A score provider evaluates one variable given a candidate parent set.
//! Higher is better. Implementations must be deterministic for the lifetime
//! of a search; the grow-shrink trees cache results keyed by the provider
//! instance they were built against.

use std::sync::Arc;

use crate::variable::VariableSetV1;

/// Trait for local (decomposable) structure scores.
///
/// # Contract
///
/// - `local_score(node, parents)` must return the same value for the same
///   `(node, parent set)` regardless of the order of `parents`.
/// - `parents` never contains `node`.
/// - `f64::NAN` signals an unscorable parent set (e.g. a singular design
///   matrix). Callers exclude such candidates; they never abort a search.
pub trait ScoreProvider: Send + Sync {
    /// The variable universe this score is defined over.
    fn variables(&self) -> &VariableSetV1;

    /// Score `node` given exactly `parents`.
    fn local_score(&self, node: usize, parents: &[usize]) -> f64;

    /// Score change for `y` when `x` is added to parent set `z`.
    ///
    /// `local_score(y, z ∪ {x}) − local_score(y, z)`.
    fn local_score_diff(&self, x: usize, y: usize, z: &[usize]) -> f64 {
        let mut with_x = Vec::with_capacity(z.len() + 1);
        with_x.extend_from_slice(z);
        with_x.push(x);
        self.local_score(y, &with_x) - self.local_score(y, z)
    }

    /// Number of observations behind the score, when the score is data-backed.
    fn sample_size(&self) -> Option<usize> {
        None
    }

    /// Short identifier used in reports.
    fn score_id(&self) -> &str {
        "unnamed"
    }
}

impl<T: ScoreProvider + ?Sized> ScoreProvider for Arc<T> {
    fn variables(&self) -> &VariableSetV1 {
        (**self).variables()
    }

    fn local_score(&self, node: usize, parents: &[usize]) -> f64 {
        (**self).local_score(node, parents)
    }

    fn local_score_diff(&self, x: usize, y: usize, z: &[usize]) -> f64 {
        (**self).local_score_diff(x, y, z)
    }

    fn sample_size(&self) -> Option<usize> {
        (**self).sample_size()
    }

    fn score_id(&self) -> &str {
        (**self).score_id()
    }
}

/// `true` when a score value marks its parent set as unscorable.
#[must_use]
pub fn is_unscorable(score: f64) -> bool {
    score.is_nan()
}

//! Shared fixtures for the acceptance tests and the `search_fixture` binary.
//!
//! Every fixture is deterministic: table scores are fixed, and simulated
//! data is drawn from a seeded generator.

use std::sync::Arc;

use causal_harness::scores::{SemBicScore, TableScore};
use causal_harness::simulate::{simulate_linear_sem, LinearSemConfigV1, SimulationV1};
use causal_kernel::score::ScoreProvider;

/// Ground-truth chain `A → B → C`.
///
/// Parentless scores are low, `B | A` and `C | B` are high, and
/// `C | {A, B}` is no better than `C | B`.
///
/// # Panics
///
/// Never in practice; the names are fixed and distinct.
#[must_use]
pub fn chain_table() -> Arc<dyn ScoreProvider> {
    let mut t = TableScore::new(["A", "B", "C"], -10.0, 1.0).unwrap();
    t.set(1, &[0], -2.0)
        .set(0, &[1], -2.0)
        .set(2, &[1], -2.0)
        .set(1, &[2], -2.0)
        .set(2, &[0, 1], -2.5)
        .set(0, &[1, 2], -2.5)
        .set(2, &[0], -8.0)
        .set(0, &[2], -8.0);
    Arc::new(t)
}

/// Collider `A → C ← B` with independent `A` and `B`.
///
/// # Panics
///
/// Never in practice; the names are fixed and distinct.
#[must_use]
pub fn collider_table() -> Arc<dyn ScoreProvider> {
    let mut t = TableScore::new(["A", "B", "C"], -10.0, 1.0).unwrap();
    t.set(2, &[0, 1], -2.0)
        .set(2, &[0], -6.0)
        .set(2, &[1], -6.0)
        .set(0, &[2], -8.0)
        .set(1, &[2], -8.0)
        .set(0, &[1, 2], -7.0)
        .set(1, &[0, 2], -7.0);
    Arc::new(t)
}

/// Seeded linear-Gaussian data and a BIC score over it.
///
/// # Panics
///
/// Panics if the config is invalid (fixture bug).
#[must_use]
pub fn sem_fixture(
    num_variables: usize,
    sample_size: usize,
    seed: u64,
) -> (SimulationV1, Arc<dyn ScoreProvider>) {
    let sim = simulate_linear_sem(&LinearSemConfigV1 {
        num_variables,
        avg_degree: 2.0,
        sample_size,
        seed,
    })
    .unwrap();
    let score: Arc<dyn ScoreProvider> = Arc::new(SemBicScore::new(&sim.data, 1.0));
    (sim, score)
}

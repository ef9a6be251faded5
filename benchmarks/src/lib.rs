//! Shared regimes for the causal search benchmark suites.

use std::sync::Arc;

use causal_harness::scores::SemBicScore;
use causal_harness::simulate::{simulate_linear_sem, LinearSemConfigV1};
use causal_kernel::proof::canon::{canonical_json_bytes, f64_bits_hex};
use causal_kernel::proof::hash::{canonical_hash, ContentHash};
use causal_kernel::proof::hash_domain::HashDomain;
use causal_kernel::score::ScoreProvider;
use causal_search::policy::PermutationPolicyV1;

/// One benchmark workload: simulated data plus a search policy.
#[derive(Debug, Clone)]
pub struct Regime {
    pub name: &'static str,
    pub config: LinearSemConfigV1,
    pub policy: PermutationPolicyV1,
}

/// A regime with its score built and its inputs bound to a digest.
pub struct PreparedRegime {
    pub regime: Regime,
    pub score: Arc<dyn ScoreProvider>,
    /// Guards against silently benchmarking different inputs across runs.
    pub input_digest: ContentHash,
}

/// The fixed regime ladder, smallest first.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    let regime = |name, num_variables, avg_degree, num_starts| Regime {
        name,
        config: LinearSemConfigV1 {
            num_variables,
            avg_degree,
            sample_size: 1000,
            seed: 7,
        },
        policy: PermutationPolicyV1 {
            num_starts,
            use_data_order: false,
            seed: 11,
            ..PermutationPolicyV1::default()
        },
    };
    vec![
        regime("sparse_10", 10, 2.0, 1),
        regime("dense_10", 10, 4.0, 1),
        regime("sparse_20", 20, 2.0, 1),
        regime("restarts_20", 20, 2.0, 4),
    ]
}

/// Simulate the regime's data and build its BIC score.
///
/// # Panics
///
/// Panics if simulation or canonicalization fails. Benchmark setup failures
/// are fatal.
#[must_use]
pub fn prepare(regime: &Regime) -> PreparedRegime {
    let sim = simulate_linear_sem(&regime.config).expect("simulate");
    let score: Arc<dyn ScoreProvider> = Arc::new(SemBicScore::new(&sim.data, 1.0));
    let input = serde_json::json!({
        "avg_degree": f64_bits_hex(regime.config.avg_degree),
        "dataset": sim.data.digest().expect("dataset digest").as_str(),
        "name": regime.name,
        "policy": regime.policy.to_json_value(),
    });
    let bytes = canonical_json_bytes(&input).expect("canon");
    PreparedRegime {
        regime: regime.clone(),
        score,
        input_digest: canonical_hash(HashDomain::BenchInput, &bytes),
    }
}

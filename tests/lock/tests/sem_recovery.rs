//! On plentiful linear-Gaussian data the search recovers the skeleton.

use causal_harness::compare::compare_graphs;
use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_search::cancel::CancelToken;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::{PermutationPolicyV1, StrategyV1};
use lock_tests::sem_fixture;

fn estimate(seed: u64, strategy: StrategyV1) -> (MixedGraphV1, MixedGraphV1) {
    let (sim, score) = sem_fixture(6, 5000, seed);
    let policy = PermutationPolicyV1 {
        strategy,
        num_starts: 4,
        seed,
        ..PermutationPolicyV1::default()
    };
    let report = PermutationSearch::new(score, KnowledgeV1::new(), policy)
        .unwrap()
        .search(&CancelToken::new())
        .unwrap();
    (sim.truth, MixedGraphV1::from_parents(&report.parents))
}

#[test]
fn adjacency_recovery_on_large_samples() {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for seed in [61, 62, 63, 64] {
        for strategy in [StrategyV1::Boss, StrategyV1::Tuck] {
            let (truth, est) = estimate(seed, strategy);
            let cmp = compare_graphs(&truth, &est);
            tp += cmp.adjacency_tp;
            fp += cmp.adjacency_fp;
            fn_ += cmp.adjacency_fn;
        }
    }
    let precision = tp as f64 / (tp + fp).max(1) as f64;
    let recall = tp as f64 / (tp + fn_).max(1) as f64;
    assert!(precision >= 0.7, "adjacency precision {precision}");
    assert!(recall >= 0.7, "adjacency recall {recall}");
}

//! Every accepted transition raises the suborder score, and every output
//! parent map is acyclic.

use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_search::cancel::CancelToken;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::{PermutationPolicyV1, StrategyV1};
use causal_search::report::TransitionKindV1;
use lock_tests::sem_fixture;

fn policies() -> Vec<PermutationPolicyV1> {
    let mut out = Vec::new();
    for strategy in [StrategyV1::Boss, StrategyV1::Tuck] {
        for use_bes in [true, false] {
            out.push(PermutationPolicyV1 {
                strategy,
                use_bes,
                num_starts: 3,
                use_data_order: false,
                seed: 42,
                ..PermutationPolicyV1::default()
            });
        }
    }
    out
}

#[test]
fn accepted_transitions_never_decrease_score() {
    for seed in [1, 2, 3] {
        let (_, score) = sem_fixture(7, 400, seed);
        for policy in policies() {
            let report = PermutationSearch::new(score.clone(), KnowledgeV1::new(), policy.clone())
                .unwrap()
                .search(&CancelToken::new())
                .unwrap();
            for t in &report.transitions {
                assert!(
                    t.score_after >= t.score_before,
                    "seed {seed}, {:?}: {t:?}",
                    policy.strategy
                );
            }
            if !policy.use_bes {
                assert!(report
                    .transitions
                    .iter()
                    .all(|t| !matches!(t.kind, TransitionKindV1::Bes { .. })));
            }
        }
    }
}

#[test]
fn output_parent_maps_are_acyclic() {
    for seed in [4, 5, 6] {
        let (_, score) = sem_fixture(8, 300, seed);
        for policy in policies() {
            let report = PermutationSearch::new(score.clone(), KnowledgeV1::new(), policy)
                .unwrap()
                .search(&CancelToken::new())
                .unwrap();
            let dag = MixedGraphV1::from_parents(&report.parents);
            assert!(dag.is_acyclic(), "seed {seed}");
            // Parents always precede their child in the final order.
            let pos: Vec<usize> = {
                let mut p = vec![0; report.order.len()];
                for (i, &v) in report.order.iter().enumerate() {
                    p[v] = i;
                }
                p
            };
            for (child, parents) in report.parents.iter().enumerate() {
                assert!(parents.iter().all(|&p| pos[p] < pos[child]));
            }
        }
    }
}

#[test]
fn transitions_are_grouped_by_tier_then_restart() {
    let (_, score) = sem_fixture(6, 300, 12);
    let policy = PermutationPolicyV1 {
        num_starts: 4,
        use_data_order: false,
        parallel_restarts: true,
        ..PermutationPolicyV1::default()
    };
    let report = PermutationSearch::new(score, KnowledgeV1::new(), policy)
        .unwrap()
        .search(&CancelToken::new())
        .unwrap();
    let keys: Vec<(usize, usize)> = report.transitions.iter().map(|t| (t.tier, t.restart)).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}

//! Required and forbidden edges and tiers hold in every output.

use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::score::ScoreProvider;
use causal_search::cancel::CancelToken;
use causal_search::error::SearchError;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::{PermutationPolicyV1, StrategyV1};
use causal_search::SearchReportV1;
use lock_tests::{chain_table, sem_fixture};

fn run(
    score: std::sync::Arc<dyn ScoreProvider>,
    knowledge: KnowledgeV1,
    strategy: StrategyV1,
) -> SearchReportV1 {
    let policy = PermutationPolicyV1 {
        strategy,
        num_starts: 2,
        use_data_order: false,
        seed: 8,
        ..PermutationPolicyV1::default()
    };
    PermutationSearch::new(score, knowledge, policy)
        .unwrap()
        .search(&CancelToken::new())
        .unwrap()
}

fn position(report: &SearchReportV1, v: usize) -> usize {
    report.order.iter().position(|&x| x == v).unwrap()
}

#[test]
fn forbidden_edge_never_appears() {
    let (sim, score) = sem_fixture(6, 500, 31);
    // Forbid every true edge in its true direction.
    let mut k = KnowledgeV1::new();
    for &(from, to, _) in &sim.weights {
        k.set_forbidden(&format!("X{}", from + 1), &format!("X{}", to + 1))
            .unwrap();
    }
    for strategy in [StrategyV1::Boss, StrategyV1::Tuck] {
        let report = run(score.clone(), k.clone(), strategy);
        for &(from, to, _) in &sim.weights {
            assert!(!report.parents[to].contains(&from), "{from} -> {to} forbidden");
        }
    }
}

#[test]
fn required_edge_always_appears_with_precedence() {
    let (_, score) = sem_fixture(6, 500, 32);
    let mut k = KnowledgeV1::new();
    k.set_required("X6", "X1").unwrap();
    for strategy in [StrategyV1::Boss, StrategyV1::Tuck] {
        let report = run(score.clone(), k.clone(), strategy);
        assert!(report.parents[0].contains(&5));
        assert!(position(&report, 5) < position(&report, 0));
    }
}

#[test]
fn tiers_order_the_output() {
    let (_, score) = sem_fixture(6, 500, 33);
    let mut k = KnowledgeV1::new();
    k.set_tiers(&[vec!["X4", "X5", "X6"], vec!["X1", "X2", "X3"]])
        .unwrap();
    let report = run(score, k, StrategyV1::Boss);
    for late in 0..3 {
        for early in 3..6 {
            assert!(position(&report, early) < position(&report, late));
            assert!(!report.parents[early].contains(&late));
        }
    }
    assert_eq!(report.tiers.len(), 2);
}

#[test]
fn forbidden_within_tier_has_no_internal_edges() {
    let (_, score) = sem_fixture(5, 400, 34);
    let mut k = KnowledgeV1::new();
    k.set_tiers(&[vec!["X1", "X2"], vec!["X3", "X4", "X5"]])
        .unwrap();
    k.set_tier_forbidden_within(1, true).unwrap();
    let report = run(score, k, StrategyV1::Boss);
    for v in 2..5 {
        assert!(report.parents[v].iter().all(|&p| p < 2));
    }
    assert!(report.tiers[0].searched);
    assert!(!report.tiers[1].searched);
}

#[test]
fn contradictory_knowledge_rejected_before_search() {
    let mut k = KnowledgeV1::new();
    k.set_required("C", "A").unwrap();
    k.set_tiers(&[vec!["A"], vec!["C"]]).unwrap();
    let err = PermutationSearch::new(chain_table(), k, PermutationPolicyV1::default()).unwrap_err();
    assert!(matches!(err, SearchError::KnowledgeConflict { .. }));
}

//! Three-variable chain `A → B → C`: convergence, parent sets and
//! re-entry idempotence through the public API.

use causal_kernel::knowledge::KnowledgeV1;
use causal_search::cancel::CancelToken;
use causal_search::gst::GstSet;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::{PermutationPolicyV1, StrategyV1};
use causal_search::report::TerminationReasonV1;
use causal_search::suborder::{update, Precedence, SuborderContext, SuborderSearch};
use causal_search::{BossSuborder, TuckSuborder};
use lock_tests::chain_table;

fn parents_by_name(report: &causal_search::SearchReportV1, name: &str) -> Vec<String> {
    report
        .parents_of(name)
        .unwrap()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn chain_converges_to_true_parent_sets() {
    for strategy in [StrategyV1::Boss, StrategyV1::Tuck] {
        let policy = PermutationPolicyV1 {
            strategy,
            ..PermutationPolicyV1::default()
        };
        let report = PermutationSearch::new(chain_table(), KnowledgeV1::new(), policy)
            .unwrap()
            .search(&CancelToken::new())
            .unwrap();
        assert_eq!(report.termination, TerminationReasonV1::Converged);
        assert_eq!(report.order, vec![0, 1, 2], "{strategy:?}");
        assert!(parents_by_name(&report, "A").is_empty());
        assert_eq!(parents_by_name(&report, "B"), vec!["A"]);
        assert_eq!(parents_by_name(&report, "C"), vec!["B"]);
        assert!((report.total_score + 14.0).abs() < 1e-9);
    }
}

#[test]
fn bad_start_reaches_an_equivalent_order() {
    let policy = PermutationPolicyV1 {
        num_starts: 3,
        use_data_order: false,
        seed: 5,
        ..PermutationPolicyV1::default()
    };
    let report = PermutationSearch::new(chain_table(), KnowledgeV1::new(), policy)
        .unwrap()
        .search(&CancelToken::new())
        .unwrap();
    assert!((report.total_score + 14.0).abs() < 1e-9);
    // Any order of the chain's equivalence class has exactly two edges.
    let edges: usize = report.parents.iter().map(Vec::len).sum();
    assert_eq!(edges, 2);
    assert!(!report.parents[0].contains(&2) && !report.parents[2].contains(&0));
}

#[test]
fn re_entry_after_convergence_makes_no_moves() {
    let score = chain_table();
    let knowledge = KnowledgeV1::new();
    let policy = PermutationPolicyV1::default();
    let precedence = Precedence::new(&knowledge, score.variables());
    let gsts = GstSet::new(&score, &knowledge);

    let strategies: [Box<dyn SuborderSearch>; 2] =
        [Box::new(BossSuborder), Box::new(TuckSuborder::default())];
    for strategy in strategies {
        let mut ctx = SuborderContext {
            score: score.as_ref(),
            knowledge: &knowledge,
            variables: score.variables(),
            policy: &policy,
            precedence: &precedence,
            tier: 0,
            restart: 0,
            transitions: Vec::new(),
        };
        let mut suborder = vec![2, 0, 1];
        strategy
            .search_suborder(&[], &mut suborder, &gsts, &mut ctx)
            .unwrap();
        let settled = suborder.clone();
        let before = ctx.transitions.len();

        let again = strategy
            .search_suborder(&[], &mut suborder, &gsts, &mut ctx)
            .unwrap();
        assert_eq!(again.moves, 0, "{}", strategy.name());
        assert_eq!(again.bes_deletions, 0, "{}", strategy.name());
        assert_eq!(suborder, settled);
        assert_eq!(ctx.transitions.len(), before);
        assert!((update(&[], &suborder, &gsts).total + 14.0).abs() < 1e-9);
    }
}

//! A constant data column is unscorable under SEM BIC for every parent set.
//! It must stay isolated without stalling the search over the other columns.

use std::sync::Arc;

use causal_harness::compare::compare_graphs;
use causal_harness::data::DataSetV1;
use causal_harness::scores::SemBicScore;
use causal_harness::simulate::{simulate_linear_sem, LinearSemConfigV1};
use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::score::ScoreProvider;
use causal_search::cancel::CancelToken;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::{PermutationPolicyV1, StrategyV1};

#[test]
fn constant_column_is_isolated_and_search_still_moves() {
    let sim = simulate_linear_sem(&LinearSemConfigV1 {
        num_variables: 5,
        avg_degree: 2.0,
        sample_size: 3000,
        seed: 71,
    })
    .unwrap();
    let p = sim.data.num_columns();
    let mut names = sim.data.variables().names_of(&(0..p).collect::<Vec<_>>());
    names.push("K".to_owned());
    let rows: Vec<Vec<f64>> = (0..sim.data.num_rows())
        .map(|r| {
            let mut row: Vec<f64> = (0..p).map(|c| sim.data.column(c)[r]).collect();
            row.push(1.0);
            row
        })
        .collect();
    let data = DataSetV1::from_rows(&names, &rows).unwrap();
    let score: Arc<dyn ScoreProvider> = Arc::new(SemBicScore::new(&data, 1.0));
    assert!(score.local_score(p, &[]).is_nan());

    let mut accepted = 0;
    for strategy in [StrategyV1::Boss, StrategyV1::Tuck] {
        let policy = PermutationPolicyV1 {
            strategy,
            num_starts: 3,
            use_data_order: false,
            seed: 71,
            ..PermutationPolicyV1::default()
        };
        let report = PermutationSearch::new(Arc::clone(&score), KnowledgeV1::new(), policy)
            .unwrap()
            .search(&CancelToken::new())
            .unwrap();

        assert!(report.total_score.is_finite(), "{strategy:?}: {}", report.total_score);
        assert!(report.parents[p].is_empty());
        assert!(report.parents.iter().all(|ps| !ps.contains(&p)));
        assert_eq!(report.local_scores[p].to_bits(), 0.0f64.to_bits());
        assert!(report.gst_stats.unscorable_skipped > 0);
        accepted += report
            .transitions
            .iter()
            .filter(|t| t.score_after > t.score_before)
            .count();

        // The remaining columns are still recovered.
        let parents: Vec<Vec<usize>> = report.parents[..p].to_vec();
        let cmp = compare_graphs(&sim.truth, &MixedGraphV1::from_parents(&parents));
        assert!(cmp.adjacency_tp > 0, "{strategy:?}: {cmp:?}");
    }
    assert!(accepted > 0, "no restart accepted a transition");
}

//! Grow-Shrink Tree caching: repeated queries are pure.

use std::sync::Arc;

use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::score::ScoreProvider;
use causal_search::gst::GstSet;
use causal_search::mask::VarMask;
use lock_tests::{chain_table, sem_fixture};

fn query_all(gsts: &GstSet, n: usize) -> Vec<(f64, Vec<usize>)> {
    let mut out = Vec::new();
    for target in 0..n {
        for bits in 0u32..(1 << n) {
            let avail: Vec<usize> = (0..n).filter(|i| bits & (1 << i) != 0).collect();
            let mut parents = Vec::new();
            let s = gsts
                .get(target)
                .trace(&VarMask::from_indices(n, &avail), &mut parents);
            out.push((s, parents));
        }
    }
    out
}

#[test]
fn identical_queries_return_identical_results() {
    let score = chain_table();
    let gsts = GstSet::new(&score, &KnowledgeV1::new());
    let first = query_all(&gsts, 3);
    let calls_after_first = gsts.stats().score_calls;
    let second = query_all(&gsts, 3);
    assert_eq!(
        first.iter().map(|(s, p)| (s.to_bits(), p.clone())).collect::<Vec<_>>(),
        second.iter().map(|(s, p)| (s.to_bits(), p.clone())).collect::<Vec<_>>()
    );
    assert_eq!(gsts.stats().score_calls, calls_after_first);
    assert!(gsts.stats().cache_hits > 0);
}

#[test]
fn fresh_trees_agree_with_warm_trees() {
    let (_, score) = sem_fixture(6, 200, 3);
    let warm = GstSet::new(&score, &KnowledgeV1::new());
    let _ = query_all(&warm, 6);
    let warm_results = query_all(&warm, 6);
    let cold_results = query_all(&GstSet::new(&score, &KnowledgeV1::new()), 6);
    for ((a, pa), (b, pb)) in warm_results.iter().zip(&cold_results) {
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(pa, pb);
    }
}

#[test]
fn parents_come_from_the_available_set() {
    let (_, score) = sem_fixture(6, 200, 8);
    let gsts = GstSet::new(&score, &KnowledgeV1::new());
    let avail = [0, 2, 4];
    for target in 0..6 {
        let mut parents = Vec::new();
        let s = gsts
            .get(target)
            .trace(&VarMask::from_indices(6, &avail), &mut parents);
        assert!(parents.iter().all(|p| avail.contains(p) && *p != target));
        let direct = score.local_score(target, &parents);
        assert_eq!(s.to_bits(), direct.to_bits());
    }
}

#[test]
fn concurrent_queries_share_one_cache() {
    let (_, score) = sem_fixture(7, 300, 21);
    let gsts = Arc::new(GstSet::new(&score, &KnowledgeV1::new()));
    let results: Vec<Vec<(f64, Vec<usize>)>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gsts = Arc::clone(&gsts);
                s.spawn(move || query_all(&gsts, 7))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for other in &results[1..] {
        for ((a, pa), (b, pb)) in results[0].iter().zip(other) {
            assert_eq!(a.to_bits(), b.to_bits());
            assert_eq!(pa, pb);
        }
    }
}

//! Adjacency and arrowhead agreement between a true and an estimated graph.
//!
//! An adjacency is an unordered pair joined by any edge. An arrowhead is an
//! ordered pair `(a, b)` for a directed edge `a → b`; undirected edges carry
//! none. Compare against the true DAG or its CPDAG depending on which the
//! estimate is meant to recover.

use std::collections::BTreeSet;

use causal_kernel::graph::{EdgeV1, MixedGraphV1};

/// Confusion counts for adjacencies and arrowheads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphComparisonV1 {
    pub adjacency_tp: usize,
    pub adjacency_fp: usize,
    pub adjacency_fn: usize,
    pub arrowhead_tp: usize,
    pub arrowhead_fp: usize,
    pub arrowhead_fn: usize,
}

impl GraphComparisonV1 {
    /// `None` when the estimate has no adjacencies.
    #[must_use]
    pub fn adjacency_precision(&self) -> Option<f64> {
        ratio(self.adjacency_tp, self.adjacency_tp + self.adjacency_fp)
    }

    /// `None` when the truth has no adjacencies.
    #[must_use]
    pub fn adjacency_recall(&self) -> Option<f64> {
        ratio(self.adjacency_tp, self.adjacency_tp + self.adjacency_fn)
    }

    #[must_use]
    pub fn arrowhead_precision(&self) -> Option<f64> {
        ratio(self.arrowhead_tp, self.arrowhead_tp + self.arrowhead_fp)
    }

    #[must_use]
    pub fn arrowhead_recall(&self) -> Option<f64> {
        ratio(self.arrowhead_tp, self.arrowhead_tp + self.arrowhead_fn)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Count agreements of `estimate` against `truth` (same node count).
#[must_use]
pub fn compare_graphs(truth: &MixedGraphV1, estimate: &MixedGraphV1) -> GraphComparisonV1 {
    let (true_adj, true_arrows) = summarize(truth);
    let (est_adj, est_arrows) = summarize(estimate);
    GraphComparisonV1 {
        adjacency_tp: est_adj.intersection(&true_adj).count(),
        adjacency_fp: est_adj.difference(&true_adj).count(),
        adjacency_fn: true_adj.difference(&est_adj).count(),
        arrowhead_tp: est_arrows.intersection(&true_arrows).count(),
        arrowhead_fp: est_arrows.difference(&true_arrows).count(),
        arrowhead_fn: true_arrows.difference(&est_arrows).count(),
    }
}

type PairSet = BTreeSet<(usize, usize)>;

fn summarize(graph: &MixedGraphV1) -> (PairSet, PairSet) {
    let mut adjacencies = BTreeSet::new();
    let mut arrowheads = BTreeSet::new();
    for edge in graph.edges() {
        adjacencies.insert(edge.endpoints());
        if let EdgeV1::Directed { from, to } = edge {
            arrowheads.insert((from, to));
        }
    }
    (adjacencies, arrowheads)
}

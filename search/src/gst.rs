//! Grow-Shrink Tree: per-target memo of greedy parent-set searches.
//!
//! One [`GrowShrinkTree`] exists per target variable. A tree node stands for
//! the parent set accumulated along the path from the root. Each node holds:
//!
//! - its grow score: `local_score(target, path parents)`,
//! - a lazily built branch list: one child per candidate whose score with
//!   the path parents is strictly greater than the node's grow score,
//!   sorted by score descending (ties by lower variable index),
//! - a lazily built forced-child list for required parents,
//! - a lazily computed shrink outcome.
//!
//! Every lazy field is a [`OnceLock`], so concurrent restarts share one
//! tree and each node is filled exactly once without a tree-wide lock.
//!
//! # Query
//!
//! [`GrowShrinkTree::trace`] walks from the root with an explicit loop:
//!
//! 1. Required parents present in the available set are forced, in index
//!    order.
//! 2. Grow: at each node take the first branch (best score first) whose
//!    variable is still available, consume it, and descend.
//! 3. Shrink at the node where grow stops: repeatedly drop the non-required
//!    parent whose removal strictly raises the score the most.
//!
//! NaN scores are treated as unscorable: such candidates never become
//! branches and such removals are never chosen. A query that ends on a NaN
//! score (the target has no scorable parent set among those reached)
//! reports [`UNSCORABLE_TARGET`] instead, so one such target cannot turn
//! every permutation total into NaN.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::score::ScoreProvider;

use crate::mask::VarMask;

/// Score reported for a target whose traced parent set is unscorable.
pub const UNSCORABLE_TARGET: f64 = 0.0;

/// Counters for one tree (or, summed, for a whole [`GstSet`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GstStatsV1 {
    /// Tree nodes created (root included).
    pub nodes_materialized: u64,
    /// Calls into the score provider.
    pub score_calls: u64,
    /// Candidate additions or removals skipped for a NaN score.
    pub unscorable_skipped: u64,
    /// Lazy fields found already filled.
    pub cache_hits: u64,
}

impl GstStatsV1 {
    fn add(&mut self, other: &Self) {
        self.nodes_materialized += other.nodes_materialized;
        self.score_calls += other.score_calls;
        self.unscorable_skipped += other.unscorable_skipped;
        self.cache_hits += other.cache_hits;
    }
}

#[derive(Debug, Default)]
struct Counters {
    nodes: AtomicU64,
    score_calls: AtomicU64,
    unscorable: AtomicU64,
    cache_hits: AtomicU64,
}

#[derive(Debug)]
struct Shrunk {
    score: f64,
    removed: Vec<usize>,
}

#[derive(Debug)]
struct GstNode {
    /// Variable added on the edge into this node (`usize::MAX` at the root).
    add: usize,
    grow_score: f64,
    branches: OnceLock<Vec<GstNode>>,
    forced: OnceLock<Vec<GstNode>>,
    shrunk: OnceLock<Shrunk>,
}

impl GstNode {
    fn new(add: usize, grow_score: f64) -> Self {
        Self {
            add,
            grow_score,
            branches: OnceLock::new(),
            forced: OnceLock::new(),
            shrunk: OnceLock::new(),
        }
    }

    /// Grow score with NaN lifted to −∞, for pruning comparisons.
    fn baseline(&self) -> f64 {
        if self.grow_score.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.grow_score
        }
    }
}

/// Memoized grow-shrink search for one target variable.
pub struct GrowShrinkTree {
    score: Arc<dyn ScoreProvider>,
    target: usize,
    num_vars: usize,
    /// Non-forbidden candidate parents, ascending.
    candidates: Vec<usize>,
    /// Required parents, ascending.
    required: Vec<usize>,
    root: GstNode,
    counters: Counters,
}

impl std::fmt::Debug for GrowShrinkTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowShrinkTree")
            .field("target", &self.target)
            .field("candidates", &self.candidates)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl GrowShrinkTree {
    /// Build the tree for `target`. Knowledge fixes which variables may ever
    /// be parents (forbidden ones are dropped) and which are forced.
    #[must_use]
    pub fn new(score: Arc<dyn ScoreProvider>, target: usize, knowledge: &KnowledgeV1) -> Self {
        let variables = score.variables();
        let num_vars = variables.len();
        let target_name = variables.name(target);
        let mut candidates = Vec::with_capacity(num_vars.saturating_sub(1));
        let mut required = Vec::new();
        for v in (0..num_vars).filter(|&v| v != target) {
            let name = variables.name(v);
            if knowledge.is_forbidden(name, target_name) {
                continue;
            }
            candidates.push(v);
            if knowledge.is_required(name, target_name) {
                required.push(v);
            }
        }

        let counters = Counters::default();
        let root_score = score.local_score(target, &[]);
        counters.score_calls.fetch_add(1, Ordering::Relaxed);
        counters.nodes.fetch_add(1, Ordering::Relaxed);

        Self {
            score,
            target,
            num_vars,
            candidates,
            required,
            root: GstNode::new(usize::MAX, root_score),
            counters,
        }
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Best local score for the target using parents drawn from `available`.
    ///
    /// `out_parents` is cleared and filled with the chosen parent set in
    /// ascending order. `available` may contain the target or forbidden
    /// variables; both are ignored.
    pub fn trace(&self, available: &VarMask, out_parents: &mut Vec<usize>) -> f64 {
        let mut pool = available.clone();
        if self.target < pool.capacity() {
            pool.remove(self.target);
        }
        let mut parents: Vec<usize> = Vec::new();
        let mut node = &self.root;

        for &r in &self.required {
            if !pool.contains(r) {
                continue;
            }
            if let Some(child) = self.forced_child(node, &parents, r) {
                pool.remove(r);
                parents.push(r);
                node = child;
            }
        }

        loop {
            let branches = self.branches(node, &parents);
            match branches.iter().find(|b| pool.contains(b.add)) {
                Some(next) => {
                    pool.remove(next.add);
                    parents.push(next.add);
                    node = next;
                }
                None => break,
            }
        }

        let shrunk = self.shrink(node, &parents);
        parents.retain(|p| !shrunk.removed.contains(p));
        parents.sort_unstable();
        out_parents.clear();
        out_parents.extend_from_slice(&parents);
        shrunk.score
    }

    /// Current counter values.
    #[must_use]
    pub fn stats(&self) -> GstStatsV1 {
        GstStatsV1 {
            nodes_materialized: self.counters.nodes.load(Ordering::Relaxed),
            score_calls: self.counters.score_calls.load(Ordering::Relaxed),
            unscorable_skipped: self.counters.unscorable.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
        }
    }

    fn local_score(&self, parents: &[usize]) -> f64 {
        self.counters.score_calls.fetch_add(1, Ordering::Relaxed);
        let mut sorted = parents.to_vec();
        sorted.sort_unstable();
        self.score.local_score(self.target, &sorted)
    }

    fn with(parents: &[usize], extra: usize) -> Vec<usize> {
        let mut next = Vec::with_capacity(parents.len() + 1);
        next.extend_from_slice(parents);
        next.push(extra);
        next
    }

    fn branches<'a>(&self, node: &'a GstNode, parents: &[usize]) -> &'a [GstNode] {
        let mut filled = false;
        let built = node.branches.get_or_init(|| {
            filled = true;
            let baseline = node.baseline();
            let mut in_path = VarMask::from_indices(self.num_vars, parents);
            in_path.insert(self.target);
            let mut grown: Vec<GstNode> = Vec::new();
            for &c in self.candidates.iter().filter(|&&c| !in_path.contains(c)) {
                let s = self.local_score(&Self::with(parents, c));
                if s.is_nan() {
                    self.counters.unscorable.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
                if s > baseline {
                    grown.push(GstNode::new(c, s));
                }
            }
            grown.sort_by(|a, b| match b.grow_score.total_cmp(&a.grow_score) {
                CmpOrdering::Equal => a.add.cmp(&b.add),
                other => other,
            });
            self.counters
                .nodes
                .fetch_add(grown.len() as u64, Ordering::Relaxed);
            grown
        });
        self.note_lookup(filled);
        built
    }

    fn forced_child<'a>(
        &self,
        node: &'a GstNode,
        parents: &[usize],
        required: usize,
    ) -> Option<&'a GstNode> {
        let mut filled = false;
        let forced = node.forced.get_or_init(|| {
            filled = true;
            let mut built = Vec::new();
            for &r in self.required.iter().filter(|r| !parents.contains(r)) {
                let s = self.local_score(&Self::with(parents, r));
                if s.is_nan() {
                    self.counters.unscorable.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
                built.push(GstNode::new(r, s));
            }
            self.counters
                .nodes
                .fetch_add(built.len() as u64, Ordering::Relaxed);
            built
        });
        self.note_lookup(filled);
        forced.iter().find(|child| child.add == required)
    }

    fn shrink<'a>(&self, node: &'a GstNode, parents: &[usize]) -> &'a Shrunk {
        let mut filled = false;
        let done = node.shrunk.get_or_init(|| {
            filled = true;
            let mut current: Vec<usize> = parents.to_vec();
            let mut best = node.grow_score;
            let mut removed = Vec::new();
            loop {
                let floor = if best.is_nan() { f64::NEG_INFINITY } else { best };
                let mut pick: Option<(usize, f64)> = None;
                let mut removable: Vec<usize> = current
                    .iter()
                    .copied()
                    .filter(|p| !self.required.contains(p))
                    .collect();
                removable.sort_unstable();
                for p in removable {
                    let without: Vec<usize> = current.iter().copied().filter(|&q| q != p).collect();
                    let s = self.local_score(&without);
                    if s.is_nan() {
                        self.counters.unscorable.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                    let to_beat = pick.map_or(floor, |(_, ps)| ps);
                    if s > to_beat {
                        pick = Some((p, s));
                    }
                }
                match pick {
                    Some((p, s)) => {
                        current.retain(|&q| q != p);
                        removed.push(p);
                        best = s;
                    }
                    None => break,
                }
            }
            removed.sort_unstable();
            if best.is_nan() {
                // No scorable parent set was reached: contribute a constant.
                self.counters.unscorable.fetch_add(1, Ordering::Relaxed);
                best = UNSCORABLE_TARGET;
            }
            Shrunk {
                score: best,
                removed,
            }
        });
        self.note_lookup(filled);
        done
    }

    /// Every lookup that did not run the fill is a hit, including one that
    /// waited on another thread's fill.
    fn note_lookup(&self, filled: bool) {
        if !filled {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// One tree per variable, indexed by variable index.
#[derive(Debug)]
pub struct GstSet {
    trees: Vec<GrowShrinkTree>,
}

impl GstSet {
    /// Build a tree for every variable of `score`.
    #[must_use]
    pub fn new(score: &Arc<dyn ScoreProvider>, knowledge: &KnowledgeV1) -> Self {
        let n = score.variables().len();
        let trees = (0..n)
            .map(|v| GrowShrinkTree::new(Arc::clone(score), v, knowledge))
            .collect();
        Self { trees }
    }

    #[must_use]
    pub fn get(&self, variable: usize) -> &GrowShrinkTree {
        &self.trees[variable]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Counters summed over every tree.
    #[must_use]
    pub fn stats(&self) -> GstStatsV1 {
        let mut total = GstStatsV1::default();
        for tree in &self.trees {
            total.add(&tree.stats());
        }
        total
    }
}

//! Backward equivalence search over a CPDAG.
//!
//! Starting from the CPDAG of the current suborder's DAG, repeatedly delete
//! the edge `x → y` (or `x — y`) whose best deletion (over subsets `H` of
//! `NaYX`, the undirected neighbours of `y` adjacent to `x`) raises the score
//! the most, re-close the graph under Meek rules and re-evaluate the
//! affected neighbourhood. Stops when no deletion has a positive bump.
//!
//! Candidate deletions ("arrows") live in a max-heap keyed by bump, ties
//! broken by creation index, so the sweep is deterministic. A popped arrow
//! is discarded if the graph around it changed since it was scored.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::meek::revert_to_unshielded_colliders;
use causal_kernel::score::ScoreProvider;
use causal_kernel::variable::VariableSetV1;

/// Read-only inputs for one BES run.
pub struct BesContext<'a> {
    pub score: &'a dyn ScoreProvider,
    pub knowledge: &'a KnowledgeV1,
    pub variables: &'a VariableSetV1,
    /// Maximum `|complement|` subset size evaluated; `None` is unbounded.
    pub depth: Option<usize>,
}

#[derive(Debug)]
struct Arrow {
    bump: f64,
    x: usize,
    y: usize,
    h: Vec<usize>,
    na_yx: Vec<usize>,
    parents: Vec<usize>,
    index: u64,
}

impl PartialEq for Arrow {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Arrow {}

impl PartialOrd for Arrow {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Arrow {
    /// Larger bump first; on equal bumps the earlier arrow first.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.bump
            .total_cmp(&other.bump)
            .then_with(|| other.index.cmp(&self.index))
    }
}

struct Sweep<'a, 'g> {
    ctx: &'a BesContext<'a>,
    graph: &'g mut MixedGraphV1,
    suborder: &'a [usize],
    heap: BinaryHeap<Arrow>,
    configs: BTreeMap<(usize, usize), (Vec<usize>, Vec<usize>)>,
    next_index: u64,
}

/// Run BES on `graph` in place. `scope` lists the variables whose edges may
/// be deleted (prefix then suborder); `suborder` is used for the sink check
/// under knowledge. Returns the number of deleted edges with at least one
/// endpoint in `suborder`; prefix-only deletions are applied but not
/// counted.
pub fn bes(
    graph: &mut MixedGraphV1,
    scope: &[usize],
    suborder: &[usize],
    ctx: &BesContext<'_>,
) -> usize {
    let mut sweep = Sweep {
        ctx,
        graph,
        suborder,
        heap: BinaryHeap::new(),
        configs: BTreeMap::new(),
        next_index: 0,
    };
    let all: BTreeSet<usize> = scope.iter().copied().collect();
    sweep.reevaluate(&all);

    let mut deletions = 0;
    while let Some(arrow) = sweep.heap.pop() {
        let (x, y) = (arrow.x, arrow.y);
        if !sweep.graph.is_adjacent(x, y) || sweep.graph.is_parent_of(y, x) {
            continue;
        }
        if na_yx(sweep.graph, x, y) != arrow.na_yx || sweep.graph.parents(y) != arrow.parents {
            continue;
        }
        if !sweep.valid_delete(x, y, &arrow.h, &arrow.na_yx) {
            continue;
        }

        delete(sweep.graph, x, y, &arrow.h);
        let counted = suborder.contains(&x) || suborder.contains(&y);
        if counted {
            deletions += 1;
        }
        tracing::trace!(x, y, bump = arrow.bump, h = ?arrow.h, counted, "bes delete");

        let mut process =
            revert_to_unshielded_colliders(sweep.graph, ctx.knowledge, ctx.variables);
        process.insert(x);
        process.insert(y);
        process.extend(sweep.graph.adjacent_nodes(x));
        process.extend(sweep.graph.adjacent_nodes(y));
        sweep.reevaluate(&process);
    }
    deletions
}

impl Sweep<'_, '_> {
    fn reevaluate(&mut self, to_process: &BTreeSet<usize>) {
        for &r in to_process {
            for &w in to_process {
                if !self.graph.is_adjacent(w, r) {
                    continue;
                }
                if self.graph.is_parent_of(w, r) {
                    self.calculate(w, r);
                } else if self.graph.is_parent_of(r, w) {
                    self.calculate(r, w);
                } else {
                    self.calculate(w, r);
                    self.calculate(r, w);
                }
            }
        }
    }

    fn calculate(&mut self, a: usize, b: usize) {
        let ctx = self.ctx;
        if !ctx.knowledge.is_empty()
            && !ctx
                .knowledge
                .no_edge_required(ctx.variables.name(a), ctx.variables.name(b))
        {
            return;
        }

        let na_yx = na_yx(self.graph, a, b);
        let parents = self.graph.parents(b);
        let config = (na_yx.clone(), parents.clone());
        if self.configs.get(&(a, b)) == Some(&config) {
            return;
        }
        self.configs.insert((a, b), config);

        let max_size = ctx.depth.map_or(na_yx.len(), |d| d.min(na_yx.len()));
        let mut max_bump = f64::NEG_INFINITY;
        let mut max_complement: Vec<usize> = Vec::new();
        for complement in subsets_up_to(&na_yx, max_size) {
            let bump = delete_eval(ctx.score, a, b, &complement, &parents);
            if bump > max_bump {
                max_bump = bump;
                max_complement = complement;
            }
        }

        if max_bump > 0.0 {
            let h: Vec<usize> = na_yx
                .iter()
                .copied()
                .filter(|v| !max_complement.contains(v))
                .collect();
            self.heap.push(Arrow {
                bump: max_bump,
                x: a,
                y: b,
                h,
                na_yx,
                parents,
                index: self.next_index,
            });
            self.next_index += 1;
        }
    }

    fn valid_delete(&self, x: usize, y: usize, h: &[usize], na_yx: &[usize]) -> bool {
        let ctx = self.ctx;
        let knowledge_on = !ctx.knowledge.is_empty();
        if knowledge_on {
            let (nx, ny) = (ctx.variables.name(x), ctx.variables.name(y));
            for &v in h {
                let nv = ctx.variables.name(v);
                if ctx.knowledge.is_forbidden(nx, nv) || ctx.knowledge.is_forbidden(ny, nv) {
                    return false;
                }
            }
        }

        let diff: Vec<usize> = na_yx.iter().copied().filter(|v| !h.contains(v)).collect();
        if !is_clique(self.graph, &diff) {
            return false;
        }

        if knowledge_on {
            let mut trial = self.graph.clone();
            delete(&mut trial, x, y, h);
            revert_to_unshielded_colliders(&mut trial, ctx.knowledge, ctx.variables);
            let mut remaining: Vec<usize> = self.suborder.iter().rev().copied().collect();
            while !remaining.is_empty() {
                let Some(pos) = remaining.iter().position(|&b| !invalid_sink(&trial, b)) else {
                    return false;
                };
                let b = remaining.remove(pos);
                trial.isolate(b);
            }
        }
        true
    }
}

/// Undirected neighbours of `y` that are also adjacent to `x`, ascending.
fn na_yx(graph: &MixedGraphV1, x: usize, y: usize) -> Vec<usize> {
    graph
        .undirected_neighbors(y)
        .into_iter()
        .filter(|&z| z != x && graph.is_adjacent(z, x))
        .collect()
}

fn is_clique(graph: &MixedGraphV1, nodes: &[usize]) -> bool {
    nodes.iter().enumerate().all(|(i, &a)| {
        nodes[i + 1..].iter().all(|&b| graph.is_adjacent(a, b))
    })
}

/// `true` if `x` cannot be removed as a sink: it has an outgoing edge, or
/// two of its undirected neighbours are non-adjacent.
fn invalid_sink(graph: &MixedGraphV1, x: usize) -> bool {
    if !graph.children(x).is_empty() {
        return true;
    }
    let neighbours = graph.undirected_neighbors(x);
    !is_clique(graph, &neighbours)
}

/// Remove `x — y` and orient `y → h` (and `x → h` where undirected) for
/// every `h` not already a parent of `x` or `y`.
fn delete(graph: &mut MixedGraphV1, x: usize, y: usize, h: &[usize]) {
    graph.remove_edge(x, y);
    for &v in h {
        if graph.is_parent_of(v, y) || graph.is_parent_of(v, x) {
            continue;
        }
        graph.add_directed(y, v);
        if graph.is_undirected(x, v) {
            graph.add_directed(x, v);
        }
    }
}

/// Score gain from deleting `x → y` given `complement ∪ parents(y) \ {x}`.
fn delete_eval(
    score: &dyn ScoreProvider,
    x: usize,
    y: usize,
    complement: &[usize],
    parents: &[usize],
) -> f64 {
    let mut z: Vec<usize> = complement
        .iter()
        .chain(parents)
        .copied()
        .filter(|&v| v != x)
        .collect();
    z.sort_unstable();
    z.dedup();
    let diff = score.local_score_diff(x, y, &z);
    if diff.is_nan() {
        f64::NEG_INFINITY
    } else {
        -diff
    }
}

/// All subsets of `items` with at most `max_size` elements: by size, then
/// lexicographically by position.
fn subsets_up_to(items: &[usize], max_size: usize) -> Vec<Vec<usize>> {
    let n = items.len();
    let mut out = Vec::new();
    for size in 0..=max_size.min(n) {
        let mut idx: Vec<usize> = (0..size).collect();
        loop {
            out.push(idx.iter().map(|&i| items[i]).collect());
            let Some(i) = (0..size).rev().find(|&i| idx[i] < n - size + i) else {
                break;
            };
            idx[i] += 1;
            for j in i + 1..size {
                idx[j] = idx[j - 1] + 1;
            }
        }
    }
    out
}

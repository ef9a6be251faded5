//! `MixedGraphV1`: directed / undirected edge container over variable indices.
//!
//! Holds DAGs (all edges directed) and CPDAGs (some edges undirected). At
//! most one edge exists per unordered pair; adding an edge replaces any
//! existing edge between the same endpoints. Adjacency is stored per node in
//! `BTreeMap`s so every enumeration is in ascending index order.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// How node `a` sees its link to a neighbour `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Link {
    /// `a → b`
    Out,
    /// `b → a`
    In,
    /// `a — b`
    Undirected,
}

/// An edge as enumerated from the graph.
///
/// Undirected edges are normalised so that `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeV1 {
    Directed { from: usize, to: usize },
    Undirected { a: usize, b: usize },
}

impl EdgeV1 {
    /// The two endpoints, smaller index first.
    #[must_use]
    pub fn endpoints(&self) -> (usize, usize) {
        match *self {
            Self::Directed { from, to } => (from.min(to), from.max(to)),
            Self::Undirected { a, b } => (a, b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedGraphV1 {
    adjacency: Vec<BTreeMap<usize, Link>>,
}

impl MixedGraphV1 {
    /// An edgeless graph over `num_nodes` nodes.
    #[must_use]
    pub fn new(num_nodes: usize) -> Self {
        Self {
            adjacency: vec![BTreeMap::new(); num_nodes],
        }
    }

    /// Build a DAG with an edge `p → v` for every `p` in `parents[v]`.
    #[must_use]
    pub fn from_parents(parents: &[Vec<usize>]) -> Self {
        let mut graph = Self::new(parents.len());
        for (child, ps) in parents.iter().enumerate() {
            for &p in ps {
                graph.add_directed(p, child);
            }
        }
        graph
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Add `from → to`, replacing any edge between the pair. Self loops are ignored.
    pub fn add_directed(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        self.adjacency[from].insert(to, Link::Out);
        self.adjacency[to].insert(from, Link::In);
    }

    /// Add `a — b`, replacing any edge between the pair. Self loops are ignored.
    pub fn add_undirected(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.adjacency[a].insert(b, Link::Undirected);
        self.adjacency[b].insert(a, Link::Undirected);
    }

    /// Remove the edge between `a` and `b`. Returns `true` if one existed.
    pub fn remove_edge(&mut self, a: usize, b: usize) -> bool {
        let removed = self.adjacency[a].remove(&b).is_some();
        self.adjacency[b].remove(&a);
        removed
    }

    /// Remove every edge incident to `node`; the node itself stays.
    pub fn isolate(&mut self, node: usize) {
        let neighbours: Vec<usize> = self.adjacency[node].keys().copied().collect();
        for other in neighbours {
            self.adjacency[other].remove(&node);
        }
        self.adjacency[node].clear();
    }

    #[must_use]
    pub fn edge(&self, a: usize, b: usize) -> Option<EdgeV1> {
        self.adjacency[a].get(&b).map(|link| match link {
            Link::Out => EdgeV1::Directed { from: a, to: b },
            Link::In => EdgeV1::Directed { from: b, to: a },
            Link::Undirected => EdgeV1::Undirected {
                a: a.min(b),
                b: a.max(b),
            },
        })
    }

    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].contains_key(&b)
    }

    /// `true` for `a → b`.
    #[must_use]
    pub fn is_parent_of(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].get(&b) == Some(&Link::Out)
    }

    /// `true` for `a — b`.
    #[must_use]
    pub fn is_undirected(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].get(&b) == Some(&Link::Undirected)
    }

    /// Directed parents of `node`, ascending.
    #[must_use]
    pub fn parents(&self, node: usize) -> Vec<usize> {
        self.linked(node, Link::In)
    }

    /// Directed children of `node`, ascending.
    #[must_use]
    pub fn children(&self, node: usize) -> Vec<usize> {
        self.linked(node, Link::Out)
    }

    /// Nodes joined to `node` by an undirected edge, ascending.
    #[must_use]
    pub fn undirected_neighbors(&self, node: usize) -> Vec<usize> {
        self.linked(node, Link::Undirected)
    }

    /// Every node adjacent to `node`, ascending.
    #[must_use]
    pub fn adjacent_nodes(&self, node: usize) -> Vec<usize> {
        self.adjacency[node].keys().copied().collect()
    }

    /// All edges, each once, in ascending endpoint order.
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeV1> {
        let mut edges = Vec::with_capacity(self.num_edges());
        for (a, links) in self.adjacency.iter().enumerate() {
            for (&b, _) in links.range(a + 1..) {
                if let Some(edge) = self.edge(a, b) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Directed parent sets for every node (undirected edges ignored).
    #[must_use]
    pub fn parent_sets(&self) -> Vec<Vec<usize>> {
        (0..self.num_nodes()).map(|v| self.parents(v)).collect()
    }

    /// `true` if some directed path `from ⇝ to` exists (length ≥ 1).
    #[must_use]
    pub fn has_directed_path(&self, from: usize, to: usize) -> bool {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<usize> = self.children(from).into();
        while let Some(v) = queue.pop_front() {
            if v == to {
                return true;
            }
            if seen.insert(v) {
                queue.extend(self.children(v));
            }
        }
        false
    }

    /// `true` if the directed part of the graph has no cycle.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        let n = self.num_nodes();
        let mut in_degree: Vec<usize> = (0..n).map(|v| self.parents(v).len()).collect();
        let mut ready: VecDeque<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
        let mut visited = 0usize;
        while let Some(v) = ready.pop_front() {
            visited += 1;
            for child in self.children(v) {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.push_back(child);
                }
            }
        }
        visited == n
    }

    fn linked(&self, node: usize, wanted: Link) -> Vec<usize> {
        self.adjacency[node]
            .iter()
            .filter(|(_, &link)| link == wanted)
            .map(|(&other, _)| other)
            .collect()
    }
}

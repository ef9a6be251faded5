//! Meek-rule closure and DAG → CPDAG reversion.
//!
//! [`orient_implied`] applies background knowledge and then Meek rules
//! R1–R4 until no rule fires. [`revert_to_unshielded_colliders`] first un-orients every
//! directed edge that is not the arm of an unshielded collider (or required
//! by knowledge) and then runs the closure, which turns a DAG into the
//! CPDAG of its Markov equivalence class.
//!
//! Both functions are deterministic: nodes are visited in ascending index
//! order and neighbours in ascending order.

use std::collections::BTreeSet;

use crate::graph::MixedGraphV1;
use crate::knowledge::KnowledgeV1;
use crate::variable::VariableSetV1;

/// Knowledge view over indices, so rules can ask "may `a → b` exist?".
struct Constraints<'a> {
    knowledge: &'a KnowledgeV1,
    variables: &'a VariableSetV1,
}

impl Constraints<'_> {
    fn arrowhead_allowed(&self, from: usize, to: usize) -> bool {
        self.knowledge.is_empty()
            || !self
                .knowledge
                .is_forbidden(self.variables.name(from), self.variables.name(to))
    }

    fn required(&self, from: usize, to: usize) -> bool {
        !self.knowledge.is_empty()
            && self
                .knowledge
                .is_required(self.variables.name(from), self.variables.name(to))
    }
}

/// Orient undirected edges implied by knowledge and Meek rules R1–R4.
///
/// Returns the nodes incident to an edge whose orientation changed.
/// Orientations that would close a directed cycle are skipped.
pub fn orient_implied(
    graph: &mut MixedGraphV1,
    knowledge: &KnowledgeV1,
    variables: &VariableSetV1,
) -> BTreeSet<usize> {
    let constraints = Constraints {
        knowledge,
        variables,
    };
    let mut changed = BTreeSet::new();
    orient_by_knowledge(graph, &constraints, &mut changed);

    loop {
        let mut fired = false;
        for b in 0..graph.num_nodes() {
            for c in graph.undirected_neighbors(b) {
                // Each rule proposes b → c for the undirected edge b — c.
                if (rule1(graph, b, c) || rule2(graph, b, c) || rule3(graph, b, c) || rule4(graph, b, c))
                    && try_orient(graph, &constraints, b, c)
                {
                    changed.insert(b);
                    changed.insert(c);
                    fired = true;
                }
            }
        }
        if !fired {
            break;
        }
    }
    changed
}

/// Turn a DAG (or partially oriented graph) into its CPDAG.
///
/// Returns every node incident to an edge that was un-oriented or
/// re-oriented.
pub fn revert_to_unshielded_colliders(
    graph: &mut MixedGraphV1,
    knowledge: &KnowledgeV1,
    variables: &VariableSetV1,
) -> BTreeSet<usize> {
    let constraints = Constraints {
        knowledge,
        variables,
    };
    let before = graph.clone();
    let mut keep = BTreeSet::new();

    for b in 0..graph.num_nodes() {
        let parents = graph.parents(b);
        for (i, &a) in parents.iter().enumerate() {
            for &c in &parents[i + 1..] {
                if !graph.is_adjacent(a, c) {
                    keep.insert((a, b));
                    keep.insert((c, b));
                }
            }
        }
    }

    for b in 0..graph.num_nodes() {
        for a in graph.parents(b) {
            if !keep.contains(&(a, b)) && !constraints.required(a, b) {
                graph.add_undirected(a, b);
            }
        }
    }

    orient_implied(graph, knowledge, variables);

    let mut changed = BTreeSet::new();
    for a in 0..graph.num_nodes() {
        for b in graph.adjacent_nodes(a) {
            if a < b && graph.edge(a, b) != before.edge(a, b) {
                changed.insert(a);
                changed.insert(b);
            }
        }
    }
    changed
}

fn orient_by_knowledge(
    graph: &mut MixedGraphV1,
    constraints: &Constraints<'_>,
    changed: &mut BTreeSet<usize>,
) {
    if constraints.knowledge.is_empty() {
        return;
    }
    for a in 0..graph.num_nodes() {
        for b in graph.undirected_neighbors(a) {
            let orient = if constraints.required(a, b) || !constraints.arrowhead_allowed(b, a) {
                Some((a, b))
            } else {
                None
            };
            if let Some((from, to)) = orient {
                if graph.is_undirected(from, to) {
                    graph.add_directed(from, to);
                    changed.insert(from);
                    changed.insert(to);
                }
            }
        }
    }
}

fn try_orient(graph: &mut MixedGraphV1, constraints: &Constraints<'_>, from: usize, to: usize) -> bool {
    if !graph.is_undirected(from, to)
        || !constraints.arrowhead_allowed(from, to)
        || graph.has_directed_path(to, from)
    {
        return false;
    }
    graph.add_directed(from, to);
    true
}

/// R1: a → b — c with a, c non-adjacent ⇒ b → c.
fn rule1(graph: &MixedGraphV1, b: usize, c: usize) -> bool {
    graph
        .parents(b)
        .into_iter()
        .any(|a| a != c && !graph.is_adjacent(a, c))
}

/// R2: b → a → c with b — c ⇒ b → c.
fn rule2(graph: &MixedGraphV1, b: usize, c: usize) -> bool {
    graph
        .children(b)
        .into_iter()
        .any(|a| graph.is_parent_of(a, c))
}

/// R3: b — a1 → c, b — a2 → c, a1, a2 non-adjacent, b — c ⇒ b → c.
fn rule3(graph: &MixedGraphV1, b: usize, c: usize) -> bool {
    let arms: Vec<usize> = graph
        .undirected_neighbors(b)
        .into_iter()
        .filter(|&a| a != c && graph.is_parent_of(a, c))
        .collect();
    arms.iter().enumerate().any(|(i, &a1)| {
        arms[i + 1..]
            .iter()
            .any(|&a2| !graph.is_adjacent(a1, a2))
    })
}

/// R4: b — d → e → c with b adjacent to e, d and c non-adjacent, b — c ⇒ b → c.
fn rule4(graph: &MixedGraphV1, b: usize, c: usize) -> bool {
    graph
        .parents(c)
        .into_iter()
        .filter(|&e| e != b && graph.is_adjacent(b, e))
        .any(|e| {
            graph
                .parents(e)
                .into_iter()
                .any(|d| d != c && graph.is_undirected(b, d) && !graph.is_adjacent(d, c))
        })
}

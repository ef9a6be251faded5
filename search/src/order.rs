//! Order utilities: knowledge-consistent sorting and order re-derivation.

use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::variable::VariableSetV1;

use crate::mask::VarMask;

/// Stable reorder of `vars` so that knowledge-implied precedences hold.
///
/// `a` must precede `b` when `a → b` is required, or when `b → a` is
/// forbidden but `a → b` is not. Among unconstrained variables the input
/// order is kept. If the constraints are cyclic the remaining variables keep
/// their input order.
#[must_use]
pub fn knowledge_sorted(
    vars: &[usize],
    knowledge: &KnowledgeV1,
    variables: &VariableSetV1,
) -> Vec<usize> {
    if knowledge.is_empty() || vars.len() < 2 {
        return vars.to_vec();
    }
    let must_precede = |a: usize, b: usize| {
        let (na, nb) = (variables.name(a), variables.name(b));
        knowledge.is_required(na, nb)
            || (knowledge.is_forbidden(nb, na) && !knowledge.is_forbidden(na, nb))
    };

    let n = vars.len();
    let mut blockers = vec![0usize; n];
    for (i, &b) in vars.iter().enumerate() {
        blockers[i] = vars
            .iter()
            .enumerate()
            .filter(|&(j, &a)| j != i && must_precede(a, b))
            .count();
    }

    let mut placed = vec![false; n];
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let next = (0..n).find(|&i| !placed[i] && blockers[i] == 0);
        let Some(i) = next else {
            out.extend((0..n).filter(|&i| !placed[i]).map(|i| vars[i]));
            break;
        };
        placed[i] = true;
        out.push(vars[i]);
        for j in (0..n).filter(|&j| !placed[j]) {
            if must_precede(vars[i], vars[j]) {
                blockers[j] -= 1;
            }
        }
    }
    out
}

/// Re-derive a suborder consistent with `graph`.
///
/// Variables of `prefix` count as already placed. Repeatedly scans
/// `suborder` left to right, appending each unplaced variable whose directed
/// parents are all placed, so the original relative order wins ties.
///
/// # Errors
///
/// Returns the first unplaceable variable (in `suborder` order) when a
/// directed cycle or an edge from outside `prefix ∪ suborder` blocks
/// progress.
pub fn causal_order(
    prefix: &[usize],
    suborder: &[usize],
    graph: &MixedGraphV1,
) -> Result<Vec<usize>, usize> {
    let mut placed = VarMask::from_indices(graph.num_nodes(), prefix);
    let mut out = Vec::with_capacity(suborder.len());
    while out.len() < suborder.len() {
        let mut progressed = false;
        for &v in suborder {
            if placed.contains(v) {
                continue;
            }
            if graph.parents(v).iter().all(|&p| placed.contains(p)) {
                placed.insert(v);
                out.push(v);
                progressed = true;
            }
        }
        if !progressed {
            let stuck = suborder
                .iter()
                .copied()
                .find(|&v| !placed.contains(v))
                .unwrap_or(usize::MAX);
            return Err(stuck);
        }
    }
    Ok(out)
}

/// Position of every variable of `order`, indexed by variable.
#[must_use]
pub fn positions(order: &[usize], num_vars: usize) -> Vec<usize> {
    let mut pos = vec![usize::MAX; num_vars];
    for (i, &v) in order.iter().enumerate() {
        pos[v] = i;
    }
    pos
}

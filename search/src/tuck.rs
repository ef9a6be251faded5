//! GRaSP-style tuck search.
//!
//! A tuck of the edge `x → y` moves `y` directly in front of `x`, carrying
//! along the ancestors of `y` that sat between them (their relative order
//! kept). Equal-score tucks open a bounded depth-first walk looking for an
//! order from which a tuck strictly improves. Past level
//! [`TuckSuborder::uncovered_depth`] only covered tucks are tried, and past
//! [`TuckSuborder::non_singular_depth`] only singular ones (no carried
//! ancestor is a child of `x`).
//!
//! With [`TuckSuborder::ordered`] the climb runs in stages: covered singular
//! tucks only, then singular tucks, then the full configuration. Each stage
//! climbs to its own fixed point before the next begins.

use std::collections::BTreeSet;

use crate::gst::GstSet;
use crate::mask::VarMask;
use crate::policy::PermutationPolicyV1;
use crate::report::{TransitionKindV1, TuckStepV1};
use crate::suborder::{suborder_score, update, SuborderContext, SuborderSearch};

/// Tuck hill-climb with a bounded equal-score walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuckSuborder {
    /// Maximum depth of the equal-score walk (1 = plain hill-climb).
    pub depth: usize,
    /// Deepest level at which uncovered tucks may be tried.
    pub uncovered_depth: usize,
    /// Deepest level at which non-singular tucks may be tried.
    pub non_singular_depth: usize,
    /// Climb through the restricted stages before the full configuration.
    pub ordered: bool,
}

impl Default for TuckSuborder {
    fn default() -> Self {
        Self {
            depth: 3,
            uncovered_depth: 1,
            non_singular_depth: 1,
            ordered: false,
        }
    }
}

impl TuckSuborder {
    #[must_use]
    pub fn from_policy(policy: &PermutationPolicyV1) -> Self {
        Self {
            depth: policy.tuck_depth,
            uncovered_depth: policy.uncovered_depth,
            non_singular_depth: policy.non_singular_depth,
            ordered: policy.tuck_ordered,
        }
    }

    /// Depth limits in the order they are climbed.
    fn stages(&self) -> Vec<Stage> {
        let full = Stage {
            depth: self.depth,
            uncovered: self.uncovered_depth,
            non_singular: self.non_singular_depth,
        };
        let mut stages = Vec::with_capacity(3);
        if self.ordered && self.uncovered_depth != 0 && self.non_singular_depth != 0 {
            stages.push(Stage {
                uncovered: 0,
                non_singular: 0,
                ..full
            });
        }
        if self.ordered && self.non_singular_depth != 0 {
            stages.push(Stage {
                non_singular: 0,
                ..full
            });
        }
        stages.push(full);
        stages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stage {
    depth: usize,
    uncovered: usize,
    non_singular: usize,
}

/// Bookkeeping for one walk from a fixed starting order.
#[derive(Debug, Default)]
struct Walk {
    /// Tucks on the current path, as `(min, max)` pairs.
    tucks: Vec<(usize, usize)>,
    /// Tuck sets already expanded past the uncovered depth.
    history: BTreeSet<Vec<(usize, usize)>>,
    /// Tucks applied along the current path.
    path: Vec<TuckStepV1>,
}

impl SuborderSearch for TuckSuborder {
    fn name(&self) -> &'static str {
        "tuck"
    }

    fn local_search(
        &self,
        prefix: &[usize],
        suborder: &mut Vec<usize>,
        gsts: &GstSet,
        ctx: &mut SuborderContext<'_>,
    ) -> usize {
        let mut moves = 0;
        let mut current = suborder_score(prefix, suborder, gsts);
        for stage in self.stages() {
            loop {
                let mut walk = Walk::default();
                let Some(score) = walk_from(stage, prefix, suborder, gsts, ctx, current, 1, &mut walk)
                else {
                    break;
                };
                ctx.record(TransitionKindV1::Tuck { steps: walk.path }, current, score);
                current = score;
                moves += 1;
            }
        }
        tracing::debug!(tier = ctx.tier, restart = ctx.restart, moves, current, "tuck fixed point");
        moves
    }
}

/// Depth-first over tucks from the current order. On a strict improvement
/// the suborder is left at the improved order and `walk.path` holds every
/// tuck that led there; otherwise the suborder is restored.
#[allow(clippy::too_many_arguments)]
fn walk_from(
    stage: Stage,
    prefix: &[usize],
    suborder: &mut Vec<usize>,
    gsts: &GstSet,
    ctx: &SuborderContext<'_>,
    baseline: f64,
    level: usize,
    walk: &mut Walk,
) -> Option<f64> {
    let parents = parents_by_variable(prefix, suborder, gsts);
    let members = VarMask::from_indices(gsts.len(), suborder);

    for y in suborder.clone() {
        let ancestors = ancestors_of(y, &parents, &members);
        for &x in parents[y].iter().filter(|&&x| members.contains(x)) {
            let covered = is_covered(x, y, &parents);
            let pair = (x.min(y), x.max(y));
            if covered && walk.tucks.contains(&pair) {
                continue;
            }
            if level > stage.uncovered && !covered {
                continue;
            }
            if level > stage.non_singular && !is_singular(suborder, x, y, &ancestors, &parents) {
                continue;
            }

            let snapshot = suborder.clone();
            let to = tuck(suborder, x, y, &ancestors);
            if !ctx.precedence.respects(suborder) {
                *suborder = snapshot;
                continue;
            }
            walk.path.push(TuckStepV1 { variable: y, to });

            let score = suborder_score(prefix, suborder, gsts);
            if score > baseline {
                return Some(score);
            }
            if level < stage.depth && same_score(score, baseline) {
                walk.tucks.push(pair);
                let expand = level <= stage.uncovered || {
                    let mut key = walk.tucks.clone();
                    key.sort_unstable();
                    key.dedup();
                    walk.history.insert(key)
                };
                if expand {
                    if let Some(found) =
                        walk_from(stage, prefix, suborder, gsts, ctx, baseline, level + 1, walk)
                    {
                        return Some(found);
                    }
                }
                walk.tucks.pop();
            }
            walk.path.pop();
            *suborder = snapshot;
        }
    }
    None
}

/// Parent sets from the current order, indexed by variable.
fn parents_by_variable(prefix: &[usize], suborder: &[usize], gsts: &GstSet) -> Vec<Vec<usize>> {
    let scored = update(prefix, suborder, gsts);
    let mut parents = vec![Vec::new(); gsts.len()];
    for (&v, ps) in suborder.iter().zip(scored.parents) {
        parents[v] = ps;
    }
    parents
}

/// Ancestors of `y` (excluding `y`) among `members`.
fn ancestors_of(y: usize, parents: &[Vec<usize>], members: &VarMask) -> VarMask {
    let mut seen = VarMask::new(parents.len());
    let mut stack = vec![y];
    while let Some(v) = stack.pop() {
        for &p in &parents[v] {
            if members.contains(p) && !seen.contains(p) {
                seen.insert(p);
                stack.push(p);
            }
        }
    }
    seen
}

/// A tuck of `x → y` is singular when no ancestor of `y` carried across
/// (strictly between `x` and `y`) has `x` as a parent.
fn is_singular(
    suborder: &[usize],
    x: usize,
    y: usize,
    ancestors: &VarMask,
    parents: &[Vec<usize>],
) -> bool {
    let (Some(i), Some(j)) = (
        suborder.iter().position(|&v| v == x),
        suborder.iter().position(|&v| v == y),
    ) else {
        return true;
    };
    if i >= j {
        return true;
    }
    suborder[i + 1..j]
        .iter()
        .filter(|&&z| ancestors.contains(z))
        .all(|&z| !parents[z].contains(&x))
}

/// `x → y` is covered when `parents(y) \ {x} == parents(x)`.
fn is_covered(x: usize, y: usize, parents: &[Vec<usize>]) -> bool {
    let mut py: Vec<usize> = parents[y].iter().copied().filter(|&p| p != x).collect();
    let mut px = parents[x].clone();
    py.sort_unstable();
    px.sort_unstable();
    px == py
}

fn same_score(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + b.abs())
}

/// Move `y` (and its ancestors between `x` and `y`) in front of `x`.
/// Returns the new position of `y`.
fn tuck(suborder: &mut Vec<usize>, x: usize, y: usize, ancestors: &VarMask) -> usize {
    let (Some(i), Some(j)) = (
        suborder.iter().position(|&v| v == x),
        suborder.iter().position(|&v| v == y),
    ) else {
        return 0;
    };
    if i >= j {
        return j;
    }
    let between = &suborder[i + 1..j];
    let mut moved: Vec<usize> = between.iter().copied().filter(|&v| ancestors.contains(v)).collect();
    let to = i + moved.len();
    moved.push(y);
    moved.push(x);
    moved.extend(between.iter().copied().filter(|&v| !ancestors.contains(v)));
    suborder.splice(i..=j, moved);
    to
}

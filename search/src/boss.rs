//! BOSS local moves: single-variable relocation ("better mutation").
//!
//! For a variable `x`, every insertion position of the suborder is scored
//! in two passes over the suborder with `x` removed:
//!
//! - forward: the score of `x` at position `k` given everything before it,
//!   plus the running total of the variables before `k` (without `x`);
//! - backward: the running total of the variables from `k` on, each scored
//!   with `x` among its available parents.
//!
//! `x` moves to the leftmost position whose total strictly beats its current
//! position. A pass visits every variable once, left to right as the pass
//! began; passes repeat until one makes no move.

use crate::gst::GstSet;
use crate::mask::VarMask;
use crate::report::TransitionKindV1;
use crate::suborder::{suborder_score, Precedence, SuborderContext, SuborderSearch};

/// BOSS: better mutation to a fixed point, interleaved with BES.
#[derive(Debug, Clone, Copy, Default)]
pub struct BossSuborder;

impl SuborderSearch for BossSuborder {
    fn name(&self) -> &'static str {
        "boss"
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
        loop {
            let mut changed = false;
            for x in suborder.clone() {
                let Some(planned) = best_position(prefix, suborder, x, gsts, ctx.precedence) else {
                    continue;
                };
                relocate(suborder, planned.from, planned.to);
                let after = suborder_score(prefix, suborder, gsts);
                if after > current {
                    ctx.record(
                        TransitionKindV1::Mutation {
                            variable: x,
                            from: planned.from,
                            to: planned.to,
                        },
                        current,
                        after,
                    );
                    current = after;
                    moves += 1;
                    changed = true;
                } else {
                    relocate(suborder, planned.to, planned.from);
                }
            }
            if !changed {
                break;
            }
        }
        tracing::debug!(tier = ctx.tier, restart = ctx.restart, moves, current, "mutation fixed point");
        moves
    }
}

/// A proposed relocation with its predicted totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMove {
    pub from: usize,
    pub to: usize,
    pub score_before: f64,
    pub score_after: f64,
}

/// Score every insertion position of `x` and return the best strict
/// improvement over its current position, if any.
#[must_use]
pub fn best_position(
    prefix: &[usize],
    suborder: &[usize],
    x: usize,
    gsts: &GstSet,
    precedence: &Precedence,
) -> Option<PlannedMove> {
    let from = suborder.iter().position(|&v| v == x)?;
    let rest: Vec<usize> = suborder.iter().copied().filter(|&v| v != x).collect();
    let totals = position_totals(prefix, &rest, x, gsts);

    let mut best = from;
    for (k, &total) in totals.iter().enumerate() {
        if total > totals[best] && precedence.allows_insert(&rest, x, k) {
            best = k;
        }
    }
    (best != from).then(|| PlannedMove {
        from,
        to: best,
        score_before: totals[from],
        score_after: totals[best],
    })
}

/// `totals[k]` is the suborder total with `x` inserted at index `k` of `rest`.
#[must_use]
pub fn position_totals(prefix: &[usize], rest: &[usize], x: usize, gsts: &GstSet) -> Vec<f64> {
    let mut available = VarMask::from_indices(gsts.len(), prefix);
    let mut scratch = Vec::new();
    let mut totals = vec![0.0; rest.len() + 1];

    let mut before = 0.0;
    for (k, slot) in totals.iter_mut().enumerate() {
        *slot = gsts.get(x).trace(&available, &mut scratch) + before;
        if let Some(&v) = rest.get(k) {
            before += gsts.get(v).trace(&available, &mut scratch);
            available.insert(v);
        }
    }

    available.insert(x);
    let mut after = 0.0;
    for (k, &v) in rest.iter().enumerate().rev() {
        available.remove(v);
        after += gsts.get(v).trace(&available, &mut scratch);
        totals[k] += after;
    }
    totals
}

fn relocate(order: &mut Vec<usize>, from: usize, to: usize) {
    let v = order.remove(from);
    order.insert(to, v);
}

//! Suborder search: the strategy seam plus the shared round loop.
//!
//! A strategy supplies one local-move phase (run to its own fixed point).
//! [`SuborderSearch::search_suborder`] alternates that phase with a BES
//! round until a round no longer raises the suborder score:
//!
//! ```text
//! INIT → LOCAL (fixed point) → BES → re-derive order → UPDATE
//!      → [improved? → LOCAL : DONE]
//! ```
//!
//! Every accepted change strictly raises the suborder total; a BES round
//! that does not is discarded.

use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::meek::revert_to_unshielded_colliders;
use causal_kernel::score::ScoreProvider;
use causal_kernel::variable::VariableSetV1;

use crate::bes::{bes, BesContext};
use crate::error::SearchError;
use crate::gst::GstSet;
use crate::mask::VarMask;
use crate::order::causal_order;
use crate::policy::PermutationPolicyV1;
use crate::report::{TransitionKindV1, TransitionV1};

/// Shared, per-restart state handed to a strategy.
pub struct SuborderContext<'a> {
    pub score: &'a dyn ScoreProvider,
    pub knowledge: &'a KnowledgeV1,
    pub variables: &'a VariableSetV1,
    pub policy: &'a PermutationPolicyV1,
    pub precedence: &'a Precedence,
    pub tier: usize,
    pub restart: usize,
    /// Accepted transitions, in the order they happened.
    pub transitions: Vec<TransitionV1>,
}

impl SuborderContext<'_> {
    pub fn record(&mut self, kind: TransitionKindV1, score_before: f64, score_after: f64) {
        self.transitions.push(TransitionV1 {
            tier: self.tier,
            restart: self.restart,
            kind,
            score_before,
            score_after,
        });
    }
}

/// What one `search_suborder` call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuborderOutcome {
    /// Final suborder total score.
    pub score: f64,
    /// Accepted local moves (relocations or tucks).
    pub moves: usize,
    /// Edges removed by accepted BES rounds.
    pub bes_deletions: usize,
    /// Outer rounds run.
    pub rounds: usize,
}

/// A suborder optimisation strategy.
pub trait SuborderSearch: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Improve `suborder` in place with this strategy's local moves until a
    /// full sweep changes nothing. Returns the number of accepted moves.
    fn local_search(
        &self,
        prefix: &[usize],
        suborder: &mut Vec<usize>,
        gsts: &GstSet,
        ctx: &mut SuborderContext<'_>,
    ) -> usize;

    /// Drive `suborder` to a local optimum of local moves and BES.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::StructuralInconsistency`] if the BES-reduced
    /// graph admits no order consistent with the prefix.
    fn search_suborder(
        &self,
        prefix: &[usize],
        suborder: &mut Vec<usize>,
        gsts: &GstSet,
        ctx: &mut SuborderContext<'_>,
    ) -> Result<SuborderOutcome, SearchError> {
        let mut outcome = SuborderOutcome {
            score: suborder_score(prefix, suborder, gsts),
            moves: 0,
            bes_deletions: 0,
            rounds: 0,
        };

        while outcome.rounds < ctx.policy.max_rounds {
            outcome.rounds += 1;
            outcome.moves += self.local_search(prefix, suborder, gsts, ctx);
            let current = suborder_score(prefix, suborder, gsts);
            outcome.score = current;
            if !ctx.policy.use_bes {
                break;
            }

            let (reordered, deletions) = bes_reorder(prefix, suborder, gsts, ctx)?;
            let candidate = suborder_score(prefix, &reordered, gsts);
            tracing::debug!(
                strategy = self.name(),
                tier = ctx.tier,
                restart = ctx.restart,
                round = outcome.rounds,
                deletions,
                current,
                candidate,
                "bes round"
            );
            if candidate > current && ctx.precedence.respects(&reordered) {
                ctx.record(TransitionKindV1::Bes { deletions }, current, candidate);
                *suborder = reordered;
                outcome.score = candidate;
                outcome.bes_deletions += deletions;
            } else {
                break;
            }
        }
        Ok(outcome)
    }
}

/// Parent sets and local scores for a scored order segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSegment {
    /// Sum of `scores`.
    pub total: f64,
    /// `parents[i]` belongs to the i-th variable of the segment.
    pub parents: Vec<Vec<usize>>,
    pub scores: Vec<f64>,
}

/// Re-query every variable of `segment` with everything before it available.
#[must_use]
pub fn update(prefix: &[usize], segment: &[usize], gsts: &GstSet) -> ScoredSegment {
    let mut available = VarMask::from_indices(gsts.len(), prefix);
    let mut parents = Vec::with_capacity(segment.len());
    let mut scores = Vec::with_capacity(segment.len());
    let mut total = 0.0;
    for &v in segment {
        let mut ps = Vec::new();
        let s = gsts.get(v).trace(&available, &mut ps);
        total += s;
        scores.push(s);
        parents.push(ps);
        available.insert(v);
    }
    ScoredSegment {
        total,
        parents,
        scores,
    }
}

/// Total score of `suborder` given `prefix`, without keeping parent sets.
#[must_use]
pub fn suborder_score(prefix: &[usize], suborder: &[usize], gsts: &GstSet) -> f64 {
    let mut available = VarMask::from_indices(gsts.len(), prefix);
    let mut scratch = Vec::new();
    let mut total = 0.0;
    for &v in suborder {
        total += gsts.get(v).trace(&available, &mut scratch);
        available.insert(v);
    }
    total
}

/// Build the CPDAG of `prefix ++ suborder`, run BES over it and re-derive a
/// suborder consistent with the reduced graph.
fn bes_reorder(
    prefix: &[usize],
    suborder: &[usize],
    gsts: &GstSet,
    ctx: &SuborderContext<'_>,
) -> Result<(Vec<usize>, usize), SearchError> {
    let full: Vec<usize> = prefix.iter().chain(suborder).copied().collect();
    let scored = update(&[], &full, gsts);
    let mut parent_sets = vec![Vec::new(); gsts.len()];
    for (&v, ps) in full.iter().zip(scored.parents) {
        parent_sets[v] = ps;
    }
    let mut graph = MixedGraphV1::from_parents(&parent_sets);
    revert_to_unshielded_colliders(&mut graph, ctx.knowledge, ctx.variables);

    let bes_ctx = BesContext {
        score: ctx.score,
        knowledge: ctx.knowledge,
        variables: ctx.variables,
        depth: ctx.policy.bes_depth,
    };
    let deletions = bes(&mut graph, &full, suborder, &bes_ctx);
    let reordered = reorder_from_graph(prefix, suborder, &graph, ctx)?;
    Ok((reordered, deletions))
}

/// [`causal_order`] with a blocked variable reported against this tier.
fn reorder_from_graph(
    prefix: &[usize],
    suborder: &[usize],
    graph: &MixedGraphV1,
    ctx: &SuborderContext<'_>,
) -> Result<Vec<usize>, SearchError> {
    causal_order(prefix, suborder, graph).map_err(|stuck| SearchError::StructuralInconsistency {
        tier: ctx.tier,
        variable: ctx
            .variables
            .get(stuck)
            .map_or_else(|| format!("#{stuck}"), |v| v.name.clone()),
        detail: "no variable of the remaining suborder has all parents placed".into(),
    })
}

/// Required-edge precedences over variable indices.
///
/// Local moves consult this so a required parent is never placed after its
/// child within a suborder.
#[derive(Debug, Clone, Default)]
pub struct Precedence {
    required_parents: Vec<Vec<usize>>,
    required_children: Vec<Vec<usize>>,
}

impl Precedence {
    #[must_use]
    pub fn new(knowledge: &KnowledgeV1, variables: &VariableSetV1) -> Self {
        let n = variables.len();
        let mut required_parents = vec![Vec::new(); n];
        let mut required_children = vec![Vec::new(); n];
        for (from, to) in knowledge.required_edges() {
            if let (Some(a), Some(b)) = (variables.index_of(from), variables.index_of(to)) {
                required_parents[b].push(a);
                required_children[a].push(b);
            }
        }
        Self {
            required_parents,
            required_children,
        }
    }

    /// May `x` be inserted at index `k` of `rest` (the suborder without `x`)?
    #[must_use]
    pub fn allows_insert(&self, rest: &[usize], x: usize, k: usize) -> bool {
        let Some(parents) = self.required_parents.get(x) else {
            return true;
        };
        let children = &self.required_children[x];
        rest[k..].iter().all(|v| !parents.contains(v))
            && rest[..k].iter().all(|v| !children.contains(v))
    }

    /// `true` if no required parent appears after its child in `order`.
    #[must_use]
    pub fn respects(&self, order: &[usize]) -> bool {
        order.iter().enumerate().all(|(i, &v)| {
            !self
                .required_parents
                .get(v)
                .is_some_and(|ps| order[i + 1..].iter().any(|w| ps.contains(w)))
        })
    }
}

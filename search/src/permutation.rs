//! Permutation search orchestrator.
//!
//! Splits the variables into tiers (when knowledge tiers cover every
//! variable) or one tier, searches each tier's suborder with all earlier
//! tiers as a fixed prefix, then assembles the output graph from the
//! parent sets of the final order.
//!
//! # Restarts
//!
//! Restart `r` of tier `t` starts from the tier's variables shuffled by a
//! `ChaCha8Rng` seeded with the policy seed on stream `(t << 32) | r`,
//! then knowledge-sorted. Restart 0 skips the shuffle when
//! `use_data_order` is set. Restarts share the [`GstSet`]; each owns its
//! suborder. The best total wins, ties to the lowest restart index, so a
//! parallel run reports exactly what a sequential run does.
//!
//! # Cancellation
//!
//! The [`CancelToken`] is polled before each tier and each restart. Once it
//! is set the best completed restart of the current tier is kept and every
//! remaining tier is appended in knowledge-sorted order without search.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use causal_kernel::graph::MixedGraphV1;
use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::meek::revert_to_unshielded_colliders;
use causal_kernel::score::ScoreProvider;
use causal_kernel::variable::VariableSetV1;

use crate::boss::BossSuborder;
use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::gst::GstSet;
use crate::order::knowledge_sorted;
use crate::policy::{PermutationPolicyV1, StrategyV1};
use crate::report::{SearchReportV1, TerminationReasonV1, TierSummaryV1, TransitionV1};
use crate::suborder::{suborder_score, update, Precedence, SuborderContext, SuborderSearch};
use crate::tuck::TuckSuborder;

/// One tier as the orchestrator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TierPlan {
    index: usize,
    variables: Vec<usize>,
    forbidden_within: bool,
}

/// A completed restart.
#[derive(Debug)]
struct RestartRun {
    restart: usize,
    suborder: Vec<usize>,
    score: f64,
    transitions: Vec<TransitionV1>,
}

/// Restarts of one tier that ran before cancellation (all of them if none).
#[derive(Debug)]
struct TierRun {
    runs: Vec<RestartRun>,
    interrupted: bool,
}

/// Configured search over one score provider and knowledge set.
pub struct PermutationSearch {
    score: Arc<dyn ScoreProvider>,
    knowledge: KnowledgeV1,
    policy: PermutationPolicyV1,
    precedence: Precedence,
    strategy: Box<dyn SuborderSearch>,
}

impl std::fmt::Debug for PermutationSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationSearch")
            .field("score_id", &self.score.score_id())
            .field("policy", &self.policy)
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}

impl PermutationSearch {
    /// Validate the policy and knowledge against the score's variables.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidConfig`] for an out-of-range policy value or an
    ///   empty variable set.
    /// - [`SearchError::UnknownVariable`] if knowledge names a variable the
    ///   score does not have.
    /// - [`SearchError::KnowledgeConflict`] for contradictory knowledge.
    pub fn new(
        score: Arc<dyn ScoreProvider>,
        knowledge: KnowledgeV1,
        policy: PermutationPolicyV1,
    ) -> Result<Self, SearchError> {
        policy.validate()?;
        if score.variables().is_empty() {
            return Err(SearchError::InvalidConfig {
                detail: "score provider has no variables".into(),
            });
        }
        knowledge.validate(score.variables())?;

        let precedence = Precedence::new(&knowledge, score.variables());
        let strategy: Box<dyn SuborderSearch> = match policy.strategy {
            StrategyV1::Boss => Box::new(BossSuborder),
            StrategyV1::Tuck => Box::new(TuckSuborder::from_policy(&policy)),
        };
        Ok(Self {
            score,
            knowledge,
            policy,
            precedence,
            strategy,
        })
    }

    /// Replace the suborder strategy chosen from the policy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn SuborderSearch>) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &PermutationPolicyV1 {
        &self.policy
    }

    fn variables(&self) -> &VariableSetV1 {
        self.score.variables()
    }

    /// Run the search.
    ///
    /// # Errors
    ///
    /// - [`SearchError::StructuralInconsistency`] if a BES-reduced graph admits
    ///   no order consistent with its prefix.
    /// - [`SearchError::RestartPanicked`] if a parallel restart panicked.
    pub fn search(&self, cancel: &CancelToken) -> Result<SearchReportV1, SearchError> {
        let gsts = GstSet::new(&self.score, &self.knowledge);
        let plans = self.tier_plans();
        tracing::info!(
            strategy = self.strategy.name(),
            variables = self.variables().len(),
            tiers = plans.len(),
            num_starts = self.policy.num_starts,
            "permutation search started"
        );

        let mut order: Vec<usize> = Vec::with_capacity(self.variables().len());
        let mut summaries = Vec::with_capacity(plans.len());
        let mut transitions = Vec::new();
        let mut termination = TerminationReasonV1::Converged;

        for plan in &plans {
            let start = order.len();
            let mut summary = TierSummaryV1 {
                tier: plan.index,
                variables: Vec::new(),
                searched: false,
                forbidden_within: plan.forbidden_within,
                restart_scores: Vec::new(),
                best_restart: None,
                score: 0.0,
            };

            if termination == TerminationReasonV1::Converged && cancel.is_cancelled() {
                tracing::warn!(tier = plan.index, "search interrupted before tier");
                termination = TerminationReasonV1::Interrupted;
            }

            if termination == TerminationReasonV1::Interrupted || plan.forbidden_within {
                order.extend(knowledge_sorted(&plan.variables, &self.knowledge, self.variables()));
            } else {
                let tier_run = self.search_tier(plan, &order, &gsts, cancel)?;
                if tier_run.interrupted {
                    tracing::warn!(
                        tier = plan.index,
                        completed = tier_run.runs.len(),
                        "search interrupted during tier"
                    );
                    termination = TerminationReasonV1::Interrupted;
                }
                summary.restart_scores = tier_run.runs.iter().map(|r| r.score).collect();
                let best = best_run(&tier_run.runs);
                match best {
                    Some(best) => {
                        summary.searched = true;
                        summary.best_restart = Some(best.restart);
                        order.extend_from_slice(&best.suborder);
                    }
                    None => {
                        order.extend(knowledge_sorted(&plan.variables, &self.knowledge, self.variables()));
                    }
                }
                for run in tier_run.runs {
                    transitions.extend(run.transitions);
                }
            }

            summary.variables = order[start..].to_vec();
            summary.score = suborder_score(&order[..start], &order[start..], &gsts);
            tracing::info!(
                tier = plan.index,
                searched = summary.searched,
                score = summary.score,
                "tier complete"
            );
            summaries.push(summary);
        }

        let report = self.assemble(order, summaries, transitions, termination, &gsts);
        tracing::info!(
            total_score = report.total_score,
            edges = report.edges.len(),
            termination = report.termination.as_str(),
            "permutation search finished"
        );
        Ok(report)
    }

    /// Tiers from knowledge when they cover every variable, else one tier.
    /// Empty tiers are dropped.
    fn tier_plans(&self) -> Vec<TierPlan> {
        let variables = self.variables();
        let tiered = self.knowledge.num_tiers() > 0
            && self.knowledge.variables_not_in_tiers(variables).is_empty();
        if !tiered {
            return vec![TierPlan {
                index: 0,
                variables: (0..variables.len()).collect(),
                forbidden_within: false,
            }];
        }
        (0..self.knowledge.num_tiers())
            .map(|t| TierPlan {
                index: t,
                variables: self
                    .knowledge
                    .tier(t)
                    .iter()
                    .filter_map(|name| variables.index_of(name))
                    .collect(),
                forbidden_within: self.knowledge.is_tier_forbidden_within(t),
            })
            .filter(|plan| !plan.variables.is_empty())
            .collect()
    }

    fn search_tier(
        &self,
        plan: &TierPlan,
        prefix: &[usize],
        gsts: &GstSet,
        cancel: &CancelToken,
    ) -> Result<TierRun, SearchError> {
        if self.policy.parallel_restarts && self.policy.num_starts > 1 {
            return self.search_tier_parallel(plan, prefix, gsts, cancel);
        }
        let mut runs = Vec::with_capacity(self.policy.num_starts);
        for restart in 0..self.policy.num_starts {
            if cancel.is_cancelled() {
                return Ok(TierRun {
                    runs,
                    interrupted: true,
                });
            }
            runs.push(self.run_restart(plan, restart, prefix, gsts)?);
        }
        Ok(TierRun {
            runs,
            interrupted: false,
        })
    }

    /// Restarts in waves of at most `available_parallelism` scoped threads.
    fn search_tier_parallel(
        &self,
        plan: &TierPlan,
        prefix: &[usize],
        gsts: &GstSet,
        cancel: &CancelToken,
    ) -> Result<TierRun, SearchError> {
        let width = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        let restarts: Vec<usize> = (0..self.policy.num_starts).collect();
        let mut runs = Vec::with_capacity(restarts.len());
        let mut interrupted = false;

        for wave in restarts.chunks(width) {
            let results: Vec<Result<Option<RestartRun>, SearchError>> = std::thread::scope(|s| {
                let handles: Vec<_> = wave
                    .iter()
                    .map(|&restart| {
                        let handle = s.spawn(move || {
                            if cancel.is_cancelled() {
                                return Ok(None);
                            }
                            self.run_restart(plan, restart, prefix, gsts).map(Some)
                        });
                        (restart, handle)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(restart, handle)| {
                        handle.join().unwrap_or(Err(SearchError::RestartPanicked {
                            tier: plan.index,
                            restart,
                        }))
                    })
                    .collect()
            });
            for result in results {
                match result? {
                    Some(run) => runs.push(run),
                    None => interrupted = true,
                }
            }
            if interrupted {
                break;
            }
        }
        Ok(TierRun { runs, interrupted })
    }

    fn run_restart(
        &self,
        plan: &TierPlan,
        restart: usize,
        prefix: &[usize],
        gsts: &GstSet,
    ) -> Result<RestartRun, SearchError> {
        let mut suborder = self.initial_suborder(plan, restart);
        let mut ctx = SuborderContext {
            score: self.score.as_ref(),
            knowledge: &self.knowledge,
            variables: self.variables(),
            policy: &self.policy,
            precedence: &self.precedence,
            tier: plan.index,
            restart,
            transitions: Vec::new(),
        };
        let outcome = self
            .strategy
            .search_suborder(prefix, &mut suborder, gsts, &mut ctx)?;
        tracing::debug!(
            tier = plan.index,
            restart,
            score = outcome.score,
            moves = outcome.moves,
            bes_deletions = outcome.bes_deletions,
            rounds = outcome.rounds,
            "restart complete"
        );
        Ok(RestartRun {
            restart,
            suborder,
            score: outcome.score,
            transitions: ctx.transitions,
        })
    }

    fn initial_suborder(&self, plan: &TierPlan, restart: usize) -> Vec<usize> {
        let mut start = plan.variables.clone();
        if restart > 0 || !self.policy.use_data_order {
            let mut rng = ChaCha8Rng::seed_from_u64(self.policy.seed);
            rng.set_stream(restart_stream(plan.index, restart));
            start.shuffle(&mut rng);
        }
        knowledge_sorted(&start, &self.knowledge, self.variables())
    }

    fn assemble(
        &self,
        order: Vec<usize>,
        tiers: Vec<TierSummaryV1>,
        transitions: Vec<TransitionV1>,
        termination: TerminationReasonV1,
        gsts: &GstSet,
    ) -> SearchReportV1 {
        let n = self.variables().len();
        let scored = update(&[], &order, gsts);
        let mut parents = vec![Vec::new(); n];
        let mut local_scores = vec![0.0; n];
        for ((&v, ps), s) in order.iter().zip(scored.parents).zip(scored.scores) {
            parents[v] = ps;
            local_scores[v] = s;
        }

        let mut graph = MixedGraphV1::from_parents(&parents);
        if self.policy.cpdag {
            revert_to_unshielded_colliders(&mut graph, &self.knowledge, self.variables());
        }

        SearchReportV1 {
            variables: self.variables().iter().map(|v| v.name.clone()).collect(),
            order,
            parents,
            local_scores,
            total_score: scored.total,
            edges: graph.edges(),
            tiers,
            transitions,
            gst_stats: gsts.stats(),
            termination,
            policy: self.policy.clone(),
            score_id: self.score.score_id().to_string(),
            sample_size: self.score.sample_size(),
        }
    }
}

/// ChaCha stream id for restart `restart` of tier `tier`.
#[must_use]
pub fn restart_stream(tier: usize, restart: usize) -> u64 {
    ((tier as u64) << 32) | (restart as u64 & 0xFFFF_FFFF)
}

/// Highest score, first restart on ties.
fn best_run(runs: &[RestartRun]) -> Option<&RestartRun> {
    let mut best: Option<&RestartRun> = None;
    for run in runs {
        let better = match best {
            None => true,
            Some(b) => run.score > b.score,
        };
        if better {
            best = Some(run);
        }
    }
    best
}

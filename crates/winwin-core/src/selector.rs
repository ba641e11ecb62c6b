// Optimal assignment selection with a staged relaxation ladder.
//
// The strict validated set is tried first. When it admits no perfect
// matching, the gates are loosened cumulatively and the full candidate set
// is re-validated at each step. Scores always use the configured policy.
//   1..k. wider fairness thresholds
//   k+1.  lower minimum starter gain
//   k+2.  uneven (2-for-1 / 1-for-2) trades admitted
//   last. partial matching over the loosest set

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{RelaxationConfig, TradePolicy};
use crate::graph::AssignmentGraph;
use crate::trade::validate::sort_by_score;
use crate::trade::{CandidateTrade, TradeValidator, ValidatedTrade};

/// Which rung of the ladder produced the selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SelectionStage {
    Perfect,
    RelaxedFairness { threshold: f64 },
    RelaxedMinGain { min_gain: f64 },
    UnevenTrades,
    Partial,
    Exhausted,
}

impl fmt::Display for SelectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStage::Perfect => write!(f, "perfect matching"),
            SelectionStage::RelaxedFairness { threshold } => {
                write!(f, "fairness relaxed to {:.0}%", threshold * 100.0)
            }
            SelectionStage::RelaxedMinGain { min_gain } => {
                write!(f, "minimum gain relaxed to {:.1}", min_gain)
            }
            SelectionStage::UnevenTrades => write!(f, "uneven trades admitted"),
            SelectionStage::Partial => write!(f, "partial matching"),
            SelectionStage::Exhausted => write!(f, "no solution"),
        }
    }
}

/// The chosen trades, no team appearing twice, best score first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub trades: Vec<ValidatedTrade>,
    pub stage: SelectionStage,
}

impl Selection {
    pub fn empty() -> Self {
        Selection {
            trades: Vec::new(),
            stage: SelectionStage::Exhausted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// Every team covered by the selection.
    pub fn teams(&self) -> BTreeSet<&str> {
        self.trades
            .iter()
            .flat_map(|t| [t.team_a(), t.team_b()])
            .collect()
    }
}

/// Check the one-trade-per-team invariant. A duplicate discards the whole
/// selection; a short count or incomplete coverage only warns.
pub fn validate_selection(trades: Vec<ValidatedTrade>, policy: &TradePolicy) -> Vec<ValidatedTrade> {
    let mut seen = BTreeSet::new();
    for trade in &trades {
        for team in [trade.team_a(), trade.team_b()] {
            if !seen.insert(team.to_string()) {
                warn!("team {} appears in more than one selected trade; discarding selection", team);
                return Vec::new();
            }
        }
    }

    if trades.len() != policy.target_trades {
        warn!(
            "selected {} trades, expected {}",
            trades.len(),
            policy.target_trades
        );
    }
    if seen.len() != policy.total_teams {
        warn!(
            "selection covers {} of {} teams",
            seen.len(),
            policy.total_teams
        );
    }

    let mut trades = trades;
    sort_by_score(&mut trades);
    trades
}

/// Runs the ladder against one league state.
pub struct AssignmentSelector<'a> {
    validator: &'a TradeValidator<'a>,
    policy: &'a TradePolicy,
    relaxation: &'a RelaxationConfig,
}

impl<'a> AssignmentSelector<'a> {
    pub fn new(
        validator: &'a TradeValidator<'a>,
        policy: &'a TradePolicy,
        relaxation: &'a RelaxationConfig,
    ) -> Self {
        AssignmentSelector {
            validator,
            policy,
            relaxation,
        }
    }

    fn finish(&self, trades: Vec<ValidatedTrade>, stage: SelectionStage) -> Selection {
        let trades = validate_selection(trades, self.policy);
        if trades.is_empty() {
            return Selection::empty();
        }
        Selection { trades, stage }
    }

    fn attempt(&self, validated: &[ValidatedTrade]) -> Option<Vec<ValidatedTrade>> {
        AssignmentGraph::build(validated).perfect_matching(self.policy.total_teams)
    }

    /// Choose the final trades.
    ///
    /// `initial` is `candidates` validated under the base policy.
    /// `uneven` holds 2-for-1 / 1-for-2 candidates that are only considered
    /// once the ladder reaches that step.
    pub fn select(
        &self,
        initial: &[ValidatedTrade],
        candidates: &[CandidateTrade],
        uneven: &[CandidateTrade],
    ) -> Selection {
        if let Some(trades) = self.attempt(initial) {
            return self.finish(trades, SelectionStage::Perfect);
        }
        info!(
            "no perfect matching from {} validated trades, relaxing constraints",
            initial.len()
        );

        let mut policy = self.policy.clone();
        let mut loosest: Vec<ValidatedTrade> = initial.to_vec();

        for &threshold in &self.relaxation.fairness_steps {
            policy.fairness_threshold = policy.fairness_threshold.max(threshold);
            loosest = self.validator.validate_all_against(candidates, &policy, self.policy);
            info!(
                "relaxation: fairness threshold {:.0}% leaves {} valid trades",
                policy.fairness_threshold * 100.0,
                loosest.len()
            );
            if let Some(trades) = self.attempt(&loosest) {
                return self.finish(
                    trades,
                    SelectionStage::RelaxedFairness {
                        threshold: policy.fairness_threshold,
                    },
                );
            }
        }

        policy.min_starter_gain = policy
            .min_starter_gain
            .min(self.relaxation.relaxed_min_starter_gain);
        loosest = self.validator.validate_all_against(candidates, &policy, self.policy);
        info!(
            "relaxation: minimum starter gain {:.1} leaves {} valid trades",
            policy.min_starter_gain,
            loosest.len()
        );
        if let Some(trades) = self.attempt(&loosest) {
            return self.finish(
                trades,
                SelectionStage::RelaxedMinGain {
                    min_gain: policy.min_starter_gain,
                },
            );
        }

        if self.relaxation.allow_uneven {
            let mut all: Vec<CandidateTrade> = candidates.to_vec();
            all.extend(uneven.iter().cloned());
            loosest = self.validator.validate_all_against(&all, &policy, self.policy);
            info!(
                "relaxation: {} uneven candidates admitted, {} valid trades",
                uneven.len(),
                loosest.len()
            );
            if let Some(trades) = self.attempt(&loosest) {
                return self.finish(trades, SelectionStage::UnevenTrades);
            }
        }

        if self.relaxation.allow_partial {
            let trades = AssignmentGraph::build(&loosest).max_matching();
            info!(
                "relaxation: partial matching selected {} trades from {} valid",
                trades.len(),
                loosest.len()
            );
            if !trades.is_empty() {
                return self.finish(trades, SelectionStage::Partial);
            }
        }

        warn!("relaxation ladder exhausted, no trades selected");
        Selection::empty()
    }
}

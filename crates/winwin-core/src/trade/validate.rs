// Trade validation gates and scoring.
//
// A candidate must pass fairness, roster viability and meaningful impact, in
// that order. Survivors are scored and returned best first.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::{LineupConfig, TradePolicy};
use crate::lineup::evaluate_lineup;
use crate::position::Position;
use crate::roster::TeamRoster;
use crate::stats::round_tenth;
use crate::trade::{CandidateTrade, TradeKind, ValidatedTrade};
use crate::valuation::{PlayerValue, ValuationIndex};

/// Bonus for a balanced 2-for-2 swap.
pub const TWO_FOR_TWO_BONUS: f64 = 5.0;
/// Penalty per value-gap percentage point while within the threshold.
pub const FAIR_PENALTY_PER_PCT: f64 = 10.0;
/// Penalty per percentage point beyond the threshold.
pub const UNFAIR_PENALTY_PER_PCT: f64 = 50.0;
/// Applied when either side gains less than the minimum.
pub const LOW_GAIN_PENALTY: f64 = 20.0;
/// Applied per player beyond `COMPLEXITY_FREE_PLAYERS`.
pub const PER_EXTRA_PLAYER_PENALTY: f64 = 5.0;
pub const COMPLEXITY_FREE_PLAYERS: usize = 4;

// Absorbs representation error in `threshold * 100`.
const PCT_EPSILON: f64 = 1e-9;

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    Unfair,
    RosterShortfall,
    InsufficientGain,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Desirability score for a trade that already has its gains and fairness
/// computed. Never negative.
pub fn score_trade(
    trade: &CandidateTrade,
    team_a_gain: f64,
    team_b_gain: f64,
    value_delta_pct: f64,
    policy: &TradePolicy,
) -> f64 {
    let mut score = team_a_gain + team_b_gain;

    if trade.kind == TradeKind::TwoForTwo {
        score += TWO_FOR_TWO_BONUS;
    }

    let threshold_pct = policy.fairness_threshold_pct();
    if value_delta_pct <= threshold_pct + PCT_EPSILON {
        score -= FAIR_PENALTY_PER_PCT * value_delta_pct;
    } else {
        score -= UNFAIR_PENALTY_PER_PCT * (value_delta_pct - threshold_pct);
    }

    if team_a_gain < policy.min_starter_gain || team_b_gain < policy.min_starter_gain {
        score -= LOW_GAIN_PENALTY;
    }
    let extra_players = trade.player_count().saturating_sub(COMPLEXITY_FREE_PLAYERS);
    score -= PER_EXTRA_PLAYER_PENALTY * extra_players as f64;

    score.max(0.0)
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Applies the three gates against a fixed league state.
///
/// Baseline starter totals are computed once per team at construction; every
/// simulated trade works on roster copies.
pub struct TradeValidator<'a> {
    index: &'a ValuationIndex,
    rosters: &'a BTreeMap<String, TeamRoster>,
    lineup: &'a LineupConfig,
    baseline: HashMap<String, f64>,
}

impl<'a> TradeValidator<'a> {
    pub fn new(
        index: &'a ValuationIndex,
        rosters: &'a BTreeMap<String, TeamRoster>,
        lineup: &'a LineupConfig,
    ) -> Self {
        let baseline = rosters
            .iter()
            .map(|(team, roster)| {
                let total = evaluate_lineup(&roster.players, index, lineup).total();
                (team.clone(), total)
            })
            .collect();
        TradeValidator {
            index,
            rosters,
            lineup,
            baseline,
        }
    }

    /// Summed value of one side, preferring the index over the embedded value.
    pub fn side_value(&self, players: &[PlayerValue]) -> f64 {
        players
            .iter()
            .map(|p| self.index.value_of(&p.id).unwrap_or(p.value))
            .sum()
    }

    /// Returns `(is_fair, value_delta_pct)`. A side worth nothing is unfair
    /// with a gap of 100%. The gate compares the rounded percentage, so a
    /// 12.04% gap passes a 12% threshold.
    pub fn check_fairness(&self, trade: &CandidateTrade, threshold_pct: f64) -> (bool, f64) {
        let a_value = self.side_value(&trade.team_a_sends);
        let b_value = self.side_value(&trade.team_b_sends);
        if a_value <= 0.0 || b_value <= 0.0 {
            return (false, 100.0);
        }
        let pct = round_tenth((a_value - b_value).abs() / a_value.max(b_value) * 100.0);
        (pct <= threshold_pct + PCT_EPSILON, pct)
    }

    /// Both rosters still meet every positional starter minimum after the
    /// swap. Teams without a roster are not checked.
    pub fn check_roster_viability(&self, trade: &CandidateTrade) -> bool {
        let sides = [
            (&trade.team_a, &trade.team_a_sends, &trade.team_b_sends),
            (&trade.team_b, &trade.team_b_sends, &trade.team_a_sends),
        ];
        sides.iter().all(|(team, sends, receives)| {
            let Some(roster) = self.rosters.get(team.as_str()) else {
                return true;
            };
            let mut counts: HashMap<Position, isize> = roster
                .position_counts(self.index)
                .into_iter()
                .map(|(pos, n)| (pos, n as isize))
                .collect();
            for p in sends.iter() {
                *counts.entry(p.position).or_insert(0) -= 1;
            }
            for p in receives.iter() {
                *counts.entry(p.position).or_insert(0) += 1;
            }
            Position::ALL.iter().all(|pos| {
                counts.get(pos).copied().unwrap_or(0) >= self.lineup.required(*pos) as isize
            })
        })
    }

    /// Starter TOTAL improvement for each side, rounded to one decimal.
    /// `(0.0, 0.0)` when either roster is unknown.
    pub fn starter_impact(&self, trade: &CandidateTrade) -> (f64, f64) {
        let (Some(roster_a), Some(roster_b)) = (
            self.rosters.get(&trade.team_a),
            self.rosters.get(&trade.team_b),
        ) else {
            return (0.0, 0.0);
        };
        let gain = |roster: &TeamRoster, sends: &[PlayerValue], receives: &[PlayerValue]| {
            let before = match self.baseline.get(&roster.team) {
                Some(total) => *total,
                None => evaluate_lineup(&roster.players, self.index, self.lineup).total(),
            };
            let after_roster = roster.after_trade(sends, receives);
            let after = evaluate_lineup(&after_roster.players, self.index, self.lineup).total();
            round_tenth(after - before)
        };
        (
            gain(roster_a, &trade.team_a_sends, &trade.team_b_sends),
            gain(roster_b, &trade.team_b_sends, &trade.team_a_sends),
        )
    }

    /// Run every gate; on success the trade is scored.
    pub fn check(
        &self,
        trade: &CandidateTrade,
        policy: &TradePolicy,
    ) -> Result<ValidatedTrade, Rejection> {
        self.check_against(trade, policy, policy)
    }

    /// Gate with `gates` but score with `scoring`. The relaxation ladder
    /// loosens only the gates, so a trade admitted below the configured
    /// minimums still pays the configured penalties.
    pub fn check_against(
        &self,
        trade: &CandidateTrade,
        gates: &TradePolicy,
        scoring: &TradePolicy,
    ) -> Result<ValidatedTrade, Rejection> {
        let (is_fair, value_delta_pct) =
            self.check_fairness(trade, gates.fairness_threshold_pct());
        if !is_fair {
            return Err(Rejection::Unfair);
        }
        if !self.check_roster_viability(trade) {
            return Err(Rejection::RosterShortfall);
        }
        let (team_a_gain, team_b_gain) = self.starter_impact(trade);
        if team_a_gain < gates.min_starter_gain || team_b_gain < gates.min_starter_gain {
            return Err(Rejection::InsufficientGain);
        }

        let trade_score = score_trade(trade, team_a_gain, team_b_gain, value_delta_pct, scoring);
        Ok(ValidatedTrade {
            trade: trade.clone(),
            team_a_gain,
            team_b_gain,
            value_delta_pct,
            trade_score,
            is_fair,
        })
    }

    pub fn validate(&self, trade: &CandidateTrade, policy: &TradePolicy) -> Option<ValidatedTrade> {
        self.check(trade, policy).ok()
    }

    /// Validate every candidate and sort the survivors by score descending.
    /// Equal scores keep candidate order.
    pub fn validate_all(
        &self,
        candidates: &[CandidateTrade],
        policy: &TradePolicy,
    ) -> Vec<ValidatedTrade> {
        self.validate_all_against(candidates, policy, policy)
    }

    /// `validate_all` with separate gating and scoring policies.
    pub fn validate_all_against(
        &self,
        candidates: &[CandidateTrade],
        gates: &TradePolicy,
        scoring: &TradePolicy,
    ) -> Vec<ValidatedTrade> {
        let mut rejected: HashMap<Rejection, usize> = HashMap::new();
        let mut valid = Vec::new();
        for trade in candidates {
            match self.check_against(trade, gates, scoring) {
                Ok(v) => valid.push(v),
                Err(reason) => *rejected.entry(reason).or_insert(0) += 1,
            }
        }

        debug!(
            "validated {} of {} candidates (unfair: {}, roster: {}, impact: {})",
            valid.len(),
            candidates.len(),
            rejected.get(&Rejection::Unfair).copied().unwrap_or(0),
            rejected.get(&Rejection::RosterShortfall).copied().unwrap_or(0),
            rejected.get(&Rejection::InsufficientGain).copied().unwrap_or(0),
        );

        sort_by_score(&mut valid);
        valid
    }
}

/// Stable sort, highest score first.
pub fn sort_by_score(trades: &mut [ValidatedTrade]) {
    trades.sort_by(|a, b| {
        b.trade_score
            .partial_cmp(&a.trade_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

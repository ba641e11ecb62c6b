// Trade candidates: generation, validation and scoring.

pub mod generate;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::position::LineupSlot;
use crate::valuation::PlayerValue;

pub use generate::generate_candidates;
pub use validate::{score_trade, TradeValidator};

/// Shape of a trade: how many players each side sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeKind {
    OneForOne,
    TwoForTwo,
    /// Team A sends two players, team B sends one.
    TwoForOne,
    /// Team A sends one player, team B sends two.
    OneForTwo,
}

impl TradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TradeKind::OneForOne => "1-for-1",
            TradeKind::TwoForTwo => "2-for-2",
            TradeKind::TwoForOne => "2-for-1",
            TradeKind::OneForTwo => "1-for-2",
        }
    }

    pub fn is_uneven(&self) -> bool {
        matches!(self, TradeKind::TwoForOne | TradeKind::OneForTwo)
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A proposed two-team trade. `team_a` always sorts before `team_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTrade {
    pub kind: TradeKind,
    pub team_a: String,
    pub team_b: String,
    pub team_a_sends: Vec<PlayerValue>,
    pub team_b_sends: Vec<PlayerValue>,
    /// Slots team A's incoming players are meant to shore up.
    pub team_a_addresses: Vec<LineupSlot>,
    /// Slots team B's incoming players are meant to shore up.
    pub team_b_addresses: Vec<LineupSlot>,
}

impl CandidateTrade {
    pub fn player_count(&self) -> usize {
        self.team_a_sends.len() + self.team_b_sends.len()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team_a == team || self.team_b == team
    }
}

/// A candidate that passed every gate, with its projected impact and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedTrade {
    pub trade: CandidateTrade,
    /// Starter-value improvement for team A, in points.
    pub team_a_gain: f64,
    pub team_b_gain: f64,
    /// |value A - value B| / max(value A, value B) * 100, one decimal.
    pub value_delta_pct: f64,
    pub trade_score: f64,
    pub is_fair: bool,
}

impl ValidatedTrade {
    pub fn team_a(&self) -> &str {
        &self.trade.team_a
    }

    pub fn team_b(&self) -> &str {
        &self.trade.team_b
    }
}

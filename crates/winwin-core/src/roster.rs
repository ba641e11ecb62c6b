// Team rosters and trade simulation on private copies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::valuation::{PlayerValue, ValuationIndex};

/// The players a fantasy team currently owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team: String,
    pub players: Vec<String>,
}

impl TeamRoster {
    pub fn new(team: &str, players: &[&str]) -> Self {
        TeamRoster {
            team: team.to_string(),
            players: players.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Return a copy of this roster with `sends` removed and `receives` added.
    /// `self` is left untouched.
    pub fn after_trade(&self, sends: &[PlayerValue], receives: &[PlayerValue]) -> TeamRoster {
        let mut players: Vec<String> = self
            .players
            .iter()
            .filter(|id| !sends.iter().any(|p| &p.id == *id))
            .cloned()
            .collect();
        for p in receives {
            if !players.contains(&p.id) {
                players.push(p.id.clone());
            }
        }
        TeamRoster {
            team: self.team.clone(),
            players,
        }
    }

    /// Number of valued players at each position. Ids missing from the index
    /// are not counted.
    pub fn position_counts(&self, index: &ValuationIndex) -> HashMap<Position, usize> {
        let mut counts: HashMap<Position, usize> =
            Position::ALL.iter().map(|&pos| (pos, 0)).collect();
        for player in index.resolve(&self.players) {
            *counts.entry(player.position).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> ValuationIndex {
        ValuationIndex::new(vec![
            PlayerValue::new("qb1", "QB One", Position::Quarterback, 30.0),
            PlayerValue::new("rb1", "RB One", Position::RunningBack, 25.0),
            PlayerValue::new("rb2", "RB Two", Position::RunningBack, 20.0),
            PlayerValue::new("wr9", "WR Nine", Position::WideReceiver, 12.0),
        ])
    }

    #[test]
    fn after_trade_does_not_mutate_original() {
        let idx = index();
        let roster = TeamRoster::new("A", &["qb1", "rb1", "rb2"]);
        let sends = vec![idx.get("rb1").unwrap().clone()];
        let receives = vec![idx.get("wr9").unwrap().clone()];

        let traded = roster.after_trade(&sends, &receives);

        assert_eq!(roster.players, vec!["qb1", "rb1", "rb2"]);
        assert_eq!(traded.players, vec!["qb1", "rb2", "wr9"]);
        assert_eq!(traded.team, "A");
    }

    #[test]
    fn position_counts_ignore_unknown_ids() {
        let roster = TeamRoster::new("A", &["qb1", "rb1", "rb2", "ghost"]);
        let counts = roster.position_counts(&index());
        assert_eq!(counts[&Position::Quarterback], 1);
        assert_eq!(counts[&Position::RunningBack], 2);
        assert_eq!(counts[&Position::WideReceiver], 0);
        assert_eq!(counts[&Position::TightEnd], 0);
    }
}

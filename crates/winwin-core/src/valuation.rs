// Valuation index: read-only lookup from player identifier to market value
// and position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::position::Position;

/// Market valuation for a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerValue {
    /// Platform player identifier (Sleeper id). Unique key.
    pub id: String,
    pub name: String,
    pub position: Position,
    pub value: f64,
    /// NFL team abbreviation, when the source provides one.
    #[serde(default)]
    pub nfl_team: Option<String>,
}

impl PlayerValue {
    pub fn new(id: &str, name: &str, position: Position, value: f64) -> Self {
        PlayerValue {
            id: id.to_string(),
            name: name.to_string(),
            position,
            value,
            nfl_team: None,
        }
    }
}

/// Immutable index of player valuations keyed by player id.
#[derive(Debug, Clone, Default)]
pub struct ValuationIndex {
    players: HashMap<String, PlayerValue>,
}

impl ValuationIndex {
    /// Build the index. Entries with an empty id or name, or a value that is
    /// not a positive finite number, are dropped. A repeated id keeps the
    /// latest entry.
    pub fn new(values: impl IntoIterator<Item = PlayerValue>) -> Self {
        let mut players = HashMap::new();
        for player in values {
            if player.id.trim().is_empty() || player.name.trim().is_empty() {
                warn!("dropping valuation with empty id or name: {:?}", player);
                continue;
            }
            if !player.value.is_finite() || player.value <= 0.0 {
                warn!(
                    "dropping valuation for '{}' ({}): non-positive value {}",
                    player.name, player.id, player.value
                );
                continue;
            }
            if players.contains_key(&player.id) {
                warn!("duplicate valuation for id {}, using latest value", player.id);
            }
            players.insert(player.id.clone(), player);
        }
        ValuationIndex { players }
    }

    pub fn get(&self, id: &str) -> Option<&PlayerValue> {
        self.players.get(id)
    }

    pub fn value_of(&self, id: &str) -> Option<f64> {
        self.players.get(id).map(|p| p.value)
    }

    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.players.get(id).map(|p| p.position)
    }

    /// Resolve roster ids to valued players, silently skipping unknown ids.
    pub fn resolve<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a PlayerValue> + 'a {
        ids.iter().filter_map(move |id| self.players.get(id))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_invalid_entries() {
        let index = ValuationIndex::new(vec![
            PlayerValue::new("1", "Josh Allen", Position::Quarterback, 9000.0),
            PlayerValue::new("", "No Id", Position::Quarterback, 100.0),
            PlayerValue::new("3", "  ", Position::RunningBack, 100.0),
            PlayerValue::new("4", "Zero Value", Position::WideReceiver, 0.0),
            PlayerValue::new("5", "Negative", Position::TightEnd, -3.0),
            PlayerValue::new("6", "NaN", Position::TightEnd, f64::NAN),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.value_of("1"), Some(9000.0));
        assert_eq!(index.value_of("4"), None);
    }

    #[test]
    fn duplicate_id_keeps_latest() {
        let index = ValuationIndex::new(vec![
            PlayerValue::new("1", "Old", Position::WideReceiver, 10.0),
            PlayerValue::new("1", "New", Position::WideReceiver, 20.0),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1").unwrap().name, "New");
    }

    #[test]
    fn resolve_skips_unknown_ids() {
        let index = ValuationIndex::new(vec![
            PlayerValue::new("1", "A", Position::RunningBack, 10.0),
            PlayerValue::new("2", "B", Position::TightEnd, 5.0),
        ]);
        let ids = vec!["2".to_string(), "999".to_string(), "1".to_string()];
        let names: Vec<&str> = index.resolve(&ids).map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(index.position_of("2"), Some(Position::TightEnd));
        assert_eq!(index.position_of("999"), None);
    }
}

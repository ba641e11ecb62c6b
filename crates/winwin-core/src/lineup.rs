// Lineup evaluator: optimal starting-lineup value split by slot.
//
// For each position the top N rostered players (by value) start. Every
// FLEX-eligible player left over joins a shared pool, and the best of that
// pool fill the FLEX slot(s).

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::LineupConfig;
use crate::position::{LineupSlot, Position};
use crate::valuation::{PlayerValue, ValuationIndex};

// ---------------------------------------------------------------------------
// Starter values
// ---------------------------------------------------------------------------

/// Starting-lineup value per slot. TOTAL is always derived from the other
/// five, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StarterValues {
    pub qb: f64,
    pub rb: f64,
    pub wr: f64,
    pub te: f64,
    pub flex: f64,
}

impl StarterValues {
    pub fn total(&self) -> f64 {
        self.qb + self.rb + self.wr + self.te + self.flex
    }

    pub fn get(&self, slot: LineupSlot) -> f64 {
        match slot {
            LineupSlot::Qb => self.qb,
            LineupSlot::Rb => self.rb,
            LineupSlot::Wr => self.wr,
            LineupSlot::Te => self.te,
            LineupSlot::Flex => self.flex,
            LineupSlot::Total => self.total(),
        }
    }

    fn slot_mut(&mut self, pos: Position) -> &mut f64 {
        match pos {
            Position::Quarterback => &mut self.qb,
            Position::RunningBack => &mut self.rb,
            Position::WideReceiver => &mut self.wr,
            Position::TightEnd => &mut self.te,
        }
    }
}

fn by_value_desc(a: &PlayerValue, b: &PlayerValue) -> Ordering {
    b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Compute the best starting lineup for a roster of player ids.
///
/// Ids absent from the index contribute nothing. An empty roster, or one with
/// no valued players, yields all zeros.
pub fn evaluate_lineup(
    player_ids: &[String],
    index: &ValuationIndex,
    lineup: &LineupConfig,
) -> StarterValues {
    let pools = PositionPools::from_ids(player_ids, index);
    let mut values = StarterValues::default();
    let mut flex_pool: Vec<&PlayerValue> = Vec::new();

    for pos in Position::ALL {
        let players = pools.players(pos);
        let required = lineup.required(pos).min(players.len());
        let (starters, bench) = players.split_at(required);

        *values.slot_mut(pos) = starters.iter().map(|p| p.value).sum();

        if lineup.is_flex_eligible(pos) {
            flex_pool.extend(bench.iter());
        }
    }

    flex_pool.sort_by(|a, b| by_value_desc(a, b));
    values.flex = flex_pool.iter().take(lineup.flex).map(|p| p.value).sum();

    values
}

// ---------------------------------------------------------------------------
// Position pools
// ---------------------------------------------------------------------------

/// A team's valued players bucketed by position, each bucket sorted by value
/// descending. Ties keep roster order.
#[derive(Debug, Clone, Default)]
pub struct PositionPools {
    by_position: HashMap<Position, Vec<PlayerValue>>,
}

impl PositionPools {
    pub fn from_ids(player_ids: &[String], index: &ValuationIndex) -> Self {
        let mut by_position: HashMap<Position, Vec<PlayerValue>> = HashMap::new();
        for player in index.resolve(player_ids) {
            by_position
                .entry(player.position)
                .or_default()
                .push(player.clone());
        }
        for players in by_position.values_mut() {
            players.sort_by(by_value_desc);
        }
        PositionPools { by_position }
    }

    pub fn players(&self, pos: Position) -> &[PlayerValue] {
        self.by_position.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Players in rank range `[start, end)` for the position behind `slot`.
    /// FLEX and TOTAL have no dedicated pool and always return empty.
    pub fn ranked(&self, slot: LineupSlot, start: usize, end: usize) -> &[PlayerValue] {
        let Some(pos) = slot.position() else {
            return &[];
        };
        let players = self.players(pos);
        let end = end.min(players.len());
        let start = start.min(end);
        &players[start..end]
    }
}

// Needs/surplus classification.
//
// Each team's starter value per slot is compared with the league median for
// that slot. Slots far enough below the median are needs, far enough above
// are surplus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lineup::StarterValues;
use crate::position::LineupSlot;
use crate::stats::{median, round_tenth};

/// A value per lineup slot (QB..FLEX plus TOTAL).
pub type SlotValues = BTreeMap<LineupSlot, f64>;

/// Per-team needs and surplus, each ordered most significant first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsSurplus {
    pub needs: Vec<LineupSlot>,
    pub surplus: Vec<LineupSlot>,
    /// The deltas the classification was derived from.
    pub deltas: SlotValues,
}

impl NeedsSurplus {
    pub fn delta(&self, slot: LineupSlot) -> f64 {
        self.deltas.get(&slot).copied().unwrap_or(0.0)
    }
}

/// League median per slot, rounded to one decimal.
pub fn league_medians(starters: &BTreeMap<String, StarterValues>) -> SlotValues {
    LineupSlot::ALL
        .iter()
        .map(|&slot| {
            let values: Vec<f64> = starters.values().map(|s| s.get(slot)).collect();
            (slot, round_tenth(median(&values)))
        })
        .collect()
}

/// Team value minus league median, per team and slot, rounded to one decimal.
pub fn positional_deltas(
    starters: &BTreeMap<String, StarterValues>,
    medians: &SlotValues,
) -> BTreeMap<String, SlotValues> {
    starters
        .iter()
        .map(|(team, values)| {
            let deltas = LineupSlot::ALL
                .iter()
                .map(|&slot| {
                    let median = medians.get(&slot).copied().unwrap_or(0.0);
                    (slot, round_tenth(values.get(slot) - median))
                })
                .collect();
            (team.clone(), deltas)
        })
        .collect()
}

/// Label needs (delta < -threshold) and surplus (delta > threshold) among the
/// tradeable slots. Deltas exactly at the threshold are neutral.
pub fn classify(deltas: &SlotValues, threshold: f64) -> NeedsSurplus {
    let delta = |slot: &LineupSlot| deltas.get(slot).copied().unwrap_or(0.0);

    let mut needs: Vec<LineupSlot> = LineupSlot::TRADEABLE
        .iter()
        .copied()
        .filter(|s| delta(s) < -threshold)
        .collect();
    let mut surplus: Vec<LineupSlot> = LineupSlot::TRADEABLE
        .iter()
        .copied()
        .filter(|s| delta(s) > threshold)
        .collect();

    needs.sort_by(|a, b| {
        delta(a)
            .partial_cmp(&delta(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    surplus.sort_by(|a, b| {
        delta(b)
            .partial_cmp(&delta(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    NeedsSurplus {
        needs,
        surplus,
        deltas: deltas.clone(),
    }
}

/// Classify every team.
pub fn identify_needs_surplus(
    team_deltas: &BTreeMap<String, SlotValues>,
    threshold: f64,
) -> BTreeMap<String, NeedsSurplus> {
    team_deltas
        .iter()
        .map(|(team, deltas)| (team.clone(), classify(deltas, threshold)))
        .collect()
}

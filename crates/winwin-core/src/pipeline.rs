// End-to-end weekly analysis: rosters + valuations in, selected trades out.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{LineupConfig, RelaxationConfig, TradePolicy};
use crate::lineup::{evaluate_lineup, PositionPools, StarterValues};
use crate::needs::{identify_needs_surplus, league_medians, positional_deltas, NeedsSurplus, SlotValues};
use crate::roster::TeamRoster;
use crate::selector::{AssignmentSelector, Selection};
use crate::trade::{generate_candidates, TradeValidator, ValidatedTrade};
use crate::valuation::ValuationIndex;

/// Everything the analysis derived, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueAnalysis {
    pub starters: BTreeMap<String, StarterValues>,
    pub medians: SlotValues,
    pub deltas: BTreeMap<String, SlotValues>,
    pub needs: BTreeMap<String, NeedsSurplus>,
    /// Candidates considered under the base policy.
    pub candidate_count: usize,
    /// Candidates that passed the base policy, best first.
    pub validated: Vec<ValidatedTrade>,
    pub selection: Selection,
}

/// Key rosters by team; a repeated team keeps its last roster.
fn roster_map(rosters: &[TeamRoster]) -> BTreeMap<String, TeamRoster> {
    let mut map = BTreeMap::new();
    for roster in rosters {
        if map.insert(roster.team.clone(), roster.clone()).is_some() {
            warn!("duplicate roster for team {}, keeping the last one", roster.team);
        }
    }
    map
}

/// Run every stage for one week.
pub fn analyze_league(
    index: &ValuationIndex,
    rosters: &[TeamRoster],
    lineup: &LineupConfig,
    policy: &TradePolicy,
    relaxation: &RelaxationConfig,
) -> LeagueAnalysis {
    let rosters = roster_map(rosters);

    let starters: BTreeMap<String, StarterValues> = rosters
        .iter()
        .map(|(team, roster)| (team.clone(), evaluate_lineup(&roster.players, index, lineup)))
        .collect();
    let medians = league_medians(&starters);
    let deltas = positional_deltas(&starters, &medians);
    let needs = identify_needs_surplus(&deltas, policy.needs_threshold);
    debug!(
        "evaluated {} teams; {} with needs, {} with surplus",
        starters.len(),
        needs.values().filter(|n| !n.needs.is_empty()).count(),
        needs.values().filter(|n| !n.surplus.is_empty()).count(),
    );

    let pools: BTreeMap<String, PositionPools> = rosters
        .iter()
        .map(|(team, roster)| (team.clone(), PositionPools::from_ids(&roster.players, index)))
        .collect();

    // Uneven trades are held back for the ladder.
    let (candidates, uneven): (Vec<_>, Vec<_>) = generate_candidates(&needs, &pools, true)
        .into_iter()
        .partition(|t| !t.kind.is_uneven());

    let validator = TradeValidator::new(index, &rosters, lineup);
    let validated = validator.validate_all(&candidates, policy);
    info!(
        "{} candidate trades ({} uneven held back), {} pass validation",
        candidates.len(),
        uneven.len(),
        validated.len()
    );

    let selection =
        AssignmentSelector::new(&validator, policy, relaxation).select(&validated, &candidates, &uneven);
    info!(
        "selected {} trades covering {} teams ({})",
        selection.len(),
        selection.teams().len(),
        selection.stage
    );

    LeagueAnalysis {
        starters,
        medians,
        deltas,
        needs,
        candidate_count: candidates.len(),
        validated,
        selection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::selector::SelectionStage;
    use crate::valuation::PlayerValue;

    #[test]
    fn empty_league_selects_nothing() {
        let index = ValuationIndex::new(Vec::new());
        let analysis = analyze_league(
            &index,
            &[],
            &LineupConfig::default(),
            &TradePolicy::default(),
            &RelaxationConfig::default(),
        );
        assert!(analysis.starters.is_empty());
        assert_eq!(analysis.candidate_count, 0);
        assert_eq!(analysis.selection.stage, SelectionStage::Exhausted);
    }

    #[test]
    fn teams_without_valued_players_score_zero() {
        let index = ValuationIndex::new(vec![PlayerValue::new(
            "qb1",
            "Only QB",
            Position::Quarterback,
            20.0,
        )]);
        let rosters = vec![
            TeamRoster::new("A", &["qb1"]),
            TeamRoster::new("B", &[]),
            TeamRoster::new("C", &["unknown"]),
        ];
        let analysis = analyze_league(
            &index,
            &rosters,
            &LineupConfig::default(),
            &TradePolicy::default(),
            &RelaxationConfig::default(),
        );
        assert_eq!(analysis.starters["B"].total(), 0.0);
        assert_eq!(analysis.starters["C"].total(), 0.0);
        assert_eq!(analysis.starters["A"].qb, 20.0);
        assert!(analysis.selection.is_empty());
    }

    #[test]
    fn duplicate_team_keeps_last_roster() {
        let rosters = vec![TeamRoster::new("A", &["x"]), TeamRoster::new("A", &["y"])];
        let map = roster_map(&rosters);
        assert_eq!(map.len(), 1);
        assert_eq!(map["A"].players, vec!["y"]);
    }
}

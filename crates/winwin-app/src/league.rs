// Joins Sleeper rosters with their owners to produce named team rosters.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};
use winwin_core::roster::TeamRoster;

use crate::fetch::{SleeperRoster, SleeperUser};

/// Map each user id to the name their team is listed under.
pub fn user_names(users: &[SleeperUser]) -> HashMap<String, String> {
    users
        .iter()
        .filter(|u| !u.user_id.is_empty())
        .map(|u| (u.user_id.clone(), u.team_name()))
        .collect()
}

/// Build one `TeamRoster` per Sleeper roster, sorted by team name.
///
/// A roster without a known owner is called `Team {roster_id}`. When two
/// rosters would share a name, each is suffixed with ` ({roster_id})`.
pub fn join_league(rosters: &[SleeperRoster], users: &[SleeperUser]) -> Vec<TeamRoster> {
    let names = user_names(users);

    let base_names: Vec<String> = rosters
        .iter()
        .map(|r| {
            r.owner_id
                .as_ref()
                .and_then(|owner| names.get(owner))
                .cloned()
                .unwrap_or_else(|| format!("Team {}", r.roster_id))
        })
        .collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for name in &base_names {
        *occurrences.entry(name.as_str()).or_default() += 1;
    }

    let mut teams: BTreeMap<String, TeamRoster> = BTreeMap::new();
    for (roster, name) in rosters.iter().zip(&base_names) {
        let team = if occurrences[name.as_str()] > 1 {
            warn!("team name '{}' is shared; using roster id to tell them apart", name);
            format!("{} ({})", name, roster.roster_id)
        } else {
            name.clone()
        };

        let mut seen = HashSet::new();
        let players: Vec<String> = roster
            .players
            .iter()
            .flatten()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        if teams.contains_key(&team) {
            warn!("roster {} duplicates team '{}', skipping", roster.roster_id, team);
            continue;
        }
        teams.insert(team.clone(), TeamRoster { team, players });
    }

    debug!("joined {} rosters with {} users", teams.len(), users.len());
    teams.into_values().collect()
}

// One weekly run: gather values and rosters, analyze the league, render the
// report.

use std::path::Path;

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use tracing::{info, warn};
use winwin_core::config::Config;
use winwin_core::roster::TeamRoster;
use winwin_core::valuation::{PlayerValue, ValuationIndex};
use winwin_core::{analyze_league, LeagueAnalysis};

use crate::fetch::{LeagueSource, ValueSource};
use crate::league::join_league;
use crate::report::{complete_report, starter_snapshot, trade_rationales, trade_recommendations};

/// Characters shown by a dry run.
pub const PREVIEW_CHARS: usize = 1000;

/// Fetch player values and the league's named rosters.
pub async fn gather(
    values: &dyn ValueSource,
    league: &dyn LeagueSource,
    league_id: &str,
) -> anyhow::Result<(Vec<PlayerValue>, Vec<TeamRoster>)> {
    let player_values = values
        .player_values()
        .await
        .context("failed to load player values")?;

    let (rosters, users) = tokio::try_join!(league.rosters(league_id), league.users(league_id))
        .with_context(|| format!("failed to load league {league_id}"))?;
    if rosters.is_empty() {
        bail!("league {league_id} has no rosters");
    }
    if users.is_empty() {
        warn!("league {} returned no users; teams will be named by roster id", league_id);
    }

    let teams = join_league(&rosters, &users);
    info!(
        "loaded {} player values and {} teams",
        player_values.len(),
        teams.len()
    );
    Ok((player_values, teams))
}

/// Render every report section for an analysis.
pub fn render(analysis: &LeagueAnalysis, generated_at: NaiveDateTime, ascii_only: bool) -> String {
    let sections = [
        starter_snapshot(&analysis.deltas),
        trade_recommendations(&analysis.selection, &analysis.needs),
        trade_rationales(&analysis.selection, &analysis.needs),
    ];
    complete_report(generated_at, &sections, ascii_only)
}

/// Gather inputs, analyze, and render. Returns the analysis alongside the
/// report text.
pub async fn build_report(
    config: &Config,
    values: &dyn ValueSource,
    league: &dyn LeagueSource,
    league_id: &str,
    generated_at: NaiveDateTime,
) -> anyhow::Result<(LeagueAnalysis, String)> {
    let (player_values, teams) = gather(values, league, league_id).await?;
    let index = ValuationIndex::new(player_values);

    let mut policy = config.policy.clone();
    if policy.total_teams != teams.len() {
        warn!(
            "config expects {} teams but league {} has {}; using the league's count",
            policy.total_teams,
            league_id,
            teams.len()
        );
        policy.total_teams = teams.len();
        policy.target_trades = teams.len() / 2;
    }

    let analysis = analyze_league(&index, &teams, &config.lineup, &policy, &config.relaxation);
    let report = render(&analysis, generated_at, config.output.ascii_only);
    Ok((analysis, report))
}

/// The first `PREVIEW_CHARS` characters of a report.
pub fn preview(report: &str) -> String {
    let mut text: String = report.chars().take(PREVIEW_CHARS).collect();
    if report.chars().count() > PREVIEW_CHARS {
        text.push_str("\n...");
    }
    text
}

/// Write the report, creating the parent directory if needed.
pub fn write_report(path: &Path, report: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, report).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_reports_whole() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn preview_cuts_long_reports() {
        let long = "é".repeat(PREVIEW_CHARS + 5);
        let text = preview(&long);
        assert!(text.ends_with("\n..."));
        assert_eq!(text.chars().count(), PREVIEW_CHARS + 4);
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let dir = std::env::temp_dir().join("winwin_write_report");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("week7.txt");

        write_report(&path, "report body").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "report body");

        let _ = std::fs::remove_dir_all(&dir);
    }
}

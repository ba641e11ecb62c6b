// Plain-text weekly report.
//
// Short lines and narrow columns so the report reads well when pasted into a
// group chat. Every function formats analysis output as-is.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use winwin_core::needs::{NeedsSurplus, SlotValues};
use winwin_core::position::LineupSlot;
use winwin_core::selector::{Selection, SelectionStage};
use winwin_core::valuation::PlayerValue;

/// Deltas beyond this many value points are called out in the snapshot.
pub const SNAPSHOT_THRESHOLD: f64 = 500.0;

const SNAPSHOT_NAME_WIDTH: usize = 15;
const TRADE_NAME_WIDTH: usize = 12;
const PLAYER_NAME_WIDTH: usize = 20;
const MAX_HIGHLIGHTS: usize = 2;
const MAX_NEEDS_LISTED: usize = 3;

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn slot_list(slots: &[LineupSlot], limit: usize) -> String {
    slots
        .iter()
        .take(limit)
        .map(|s| s.display_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn team_needs<'a>(needs: &'a BTreeMap<String, NeedsSurplus>, team: &str) -> &'a [LineupSlot] {
    needs.get(team).map(|n| n.needs.as_slice()).unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Each team's notable strengths and weaknesses against the league median.
pub fn starter_snapshot(deltas: &BTreeMap<String, SlotValues>) -> String {
    if deltas.is_empty() {
        return "No team data available.".to_string();
    }

    let mut lines = vec!["📊 TEAM STRENGTHS".to_string(), String::new()];
    for (team, slots) in deltas {
        lines.push(format!("{}:", truncate(team, SNAPSHOT_NAME_WIDTH)));

        let mut strong: Vec<(LineupSlot, f64)> = Vec::new();
        let mut weak: Vec<(LineupSlot, f64)> = Vec::new();
        for &slot in &LineupSlot::TRADEABLE {
            let delta = slots.get(&slot).copied().unwrap_or(0.0);
            if delta > SNAPSHOT_THRESHOLD {
                strong.push((slot, delta));
            } else if delta < -SNAPSHOT_THRESHOLD {
                weak.push((slot, delta));
            }
        }
        strong.sort_by(|a, b| b.1.total_cmp(&a.1));
        weak.sort_by(|a, b| a.1.total_cmp(&b.1));

        if !strong.is_empty() {
            let items: Vec<String> = strong
                .iter()
                .take(MAX_HIGHLIGHTS)
                .map(|(slot, d)| format!("{} +{:.0}", slot.display_str(), d))
                .collect();
            lines.push(format!("Strong: {}", items.join(", ")));
        }
        if !weak.is_empty() {
            let items: Vec<String> = weak
                .iter()
                .take(MAX_HIGHLIGHTS)
                .map(|(slot, d)| format!("{} {:.0}", slot.display_str(), d))
                .collect();
            lines.push(format!("Weak: {}", items.join(", ")));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn player_lines(lines: &mut Vec<String>, arrow: &str, players: &[PlayerValue]) {
    for p in players {
        lines.push(format!(
            "{} {} ({})",
            arrow,
            truncate(&p.name, PLAYER_NAME_WIDTH),
            p.position
        ));
        lines.push(format!("   Value: {:.0}", p.value));
    }
}

/// The selected trades, numbered, best first.
pub fn trade_recommendations(selection: &Selection, needs: &BTreeMap<String, NeedsSurplus>) -> String {
    if selection.is_empty() {
        return "No trades available.".to_string();
    }

    let mut lines = vec!["📈 TRADE SUGGESTIONS".to_string()];
    if selection.stage != SelectionStage::Perfect {
        lines.push(format!("({})", selection.stage));
    }
    lines.push(String::new());

    let count = selection.trades.len();
    for (i, vt) in selection.trades.iter().enumerate() {
        let a = truncate(vt.team_a(), TRADE_NAME_WIDTH);
        let b = truncate(vt.team_b(), TRADE_NAME_WIDTH);

        lines.push(format!("Trade #{} ({})", i + 1, vt.trade.kind));
        lines.push(format!("{a} <-> {b}"));
        lines.push(String::new());
        player_lines(&mut lines, "->", &vt.trade.team_a_sends);
        lines.push(String::new());
        lines.push("for".to_string());
        lines.push(String::new());
        player_lines(&mut lines, "<-", &vt.trade.team_b_sends);
        lines.push(String::new());

        let a_needs = team_needs(needs, vt.team_a());
        let b_needs = team_needs(needs, vt.team_b());
        if !a_needs.is_empty() || !b_needs.is_empty() {
            lines.push("Why it works:".to_string());
            if !a_needs.is_empty() {
                lines.push(format!("- {} needs {}", a, slot_list(a_needs, MAX_NEEDS_LISTED)));
            }
            if !b_needs.is_empty() {
                lines.push(format!("- {} needs {}", b, slot_list(b_needs, MAX_NEEDS_LISTED)));
            }
            lines.push(String::new());
        }

        lines.push(format!(
            "Gains: {} {:+.1}, {} {:+.1}",
            a, vt.team_a_gain, b, vt.team_b_gain
        ));
        lines.push(format!("Fairness: {:.1}%", vt.value_delta_pct));
        lines.push(format!("Score: {:.1}", vt.trade_score));

        if i + 1 < count {
            lines.push(String::new());
            lines.push("-".repeat(20));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

/// One short paragraph per selected trade: what each side needs and how
/// close the values are.
pub fn trade_rationales(selection: &Selection, needs: &BTreeMap<String, NeedsSurplus>) -> String {
    if selection.is_empty() {
        return "No trade rationales available.".to_string();
    }

    let mut lines = vec!["TRADE RATIONALES".to_string(), "=".repeat(20), String::new()];
    for (i, vt) in selection.trades.iter().enumerate() {
        let describe = |team: &str| {
            let slots = team_needs(needs, team);
            if slots.is_empty() {
                "None".to_string()
            } else {
                slot_list(slots, slots.len())
            }
        };

        lines.push(format!("Trade #{} Rationale:", i + 1));
        lines.push(format!("{} <-> {}", vt.team_a(), vt.team_b()));
        lines.push("-".repeat(30));
        lines.push(format!(
            "{} needs: {} | {} needs: {}",
            vt.team_a(),
            describe(vt.team_a()),
            vt.team_b(),
            describe(vt.team_b())
        ));
        lines.push(format!(
            "Fair value exchange ({:.1}% difference)",
            vt.value_delta_pct
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn strip_non_ascii(line: &str) -> String {
    let kept: String = line.chars().filter(char::is_ascii).collect();
    if kept.len() == line.len() {
        kept
    } else {
        kept.trim_start().to_string()
    }
}

/// Header plus the non-empty sections, separated by blank lines.
pub fn complete_report(generated_at: NaiveDateTime, sections: &[String], ascii_only: bool) -> String {
    let mut parts = vec![format!(
        "WEEKLY TRADE SUGGESTIONS\nGenerated: {}",
        generated_at.format("%Y-%m-%d %H:%M")
    )];
    parts.extend(sections.iter().filter(|s| !s.trim().is_empty()).cloned());
    let report = parts.join("\n\n");

    if !ascii_only {
        return report;
    }
    report
        .lines()
        .map(strip_non_ascii)
        .collect::<Vec<_>>()
        .join("\n")
}

// Assignment graph: teams as nodes, the best validated trade per pair as the
// weighted edge.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::matching::max_weight_matching;
use crate::trade::validate::sort_by_score;
use crate::trade::ValidatedTrade;

/// Trade scores are scaled to integer milli-points for the matcher.
pub const SCORE_SCALE: f64 = 1000.0;

fn scaled(score: f64) -> i64 {
    (score * SCORE_SCALE).round() as i64
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Undirected graph over the teams that appear in any validated trade.
#[derive(Debug, Clone, Default)]
pub struct AssignmentGraph {
    teams: Vec<String>,
    edges: BTreeMap<(String, String), ValidatedTrade>,
}

impl AssignmentGraph {
    /// Build the graph. When a pair has several trades the highest score is
    /// kept; on equal scores the earlier trade stays.
    pub fn build(trades: &[ValidatedTrade]) -> Self {
        let mut teams = BTreeSet::new();
        let mut edges: BTreeMap<(String, String), ValidatedTrade> = BTreeMap::new();

        for trade in trades {
            teams.insert(trade.team_a().to_string());
            teams.insert(trade.team_b().to_string());
            let key = pair_key(trade.team_a(), trade.team_b());
            match edges.get(&key) {
                Some(existing) if existing.trade_score >= trade.trade_score => {}
                _ => {
                    edges.insert(key, trade.clone());
                }
            }
        }

        AssignmentGraph {
            teams: teams.into_iter().collect(),
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.teams.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&ValidatedTrade> {
        self.edges.get(&pair_key(a, b))
    }

    /// Maximum-weight matching that covers all `total_teams` teams, or `None`
    /// when the node count is wrong, odd, or no such matching exists.
    pub fn perfect_matching(&self, total_teams: usize) -> Option<Vec<ValidatedTrade>> {
        let n = self.node_count();
        if n == 0 || n != total_teams || n % 2 != 0 {
            debug!(
                "no perfect matching: {} teams in graph, {} expected",
                n, total_teams
            );
            return None;
        }

        let trades = self.solve();
        if trades.len() * 2 != n {
            debug!(
                "no perfect matching: best matching covers {} of {} teams",
                trades.len() * 2,
                n
            );
            return None;
        }
        Some(trades)
    }

    /// Maximum-weight matching among those covering as many teams as
    /// possible. Never fails; may be empty.
    pub fn max_matching(&self) -> Vec<ValidatedTrade> {
        self.solve()
    }

    fn solve(&self) -> Vec<ValidatedTrade> {
        let position: BTreeMap<&str, usize> = self
            .teams
            .iter()
            .enumerate()
            .map(|(i, team)| (team.as_str(), i))
            .collect();

        let mut weighted = Vec::with_capacity(self.edges.len());
        let mut by_index = BTreeMap::new();
        for ((a, b), trade) in &self.edges {
            let (Some(&i), Some(&j)) = (position.get(a.as_str()), position.get(b.as_str())) else {
                continue;
            };
            weighted.push((i, j, scaled(trade.trade_score)));
            by_index.insert((i.min(j), i.max(j)), trade);
        }

        let mates = max_weight_matching(self.teams.len(), &weighted, true);

        let mut chosen: Vec<ValidatedTrade> = mates
            .iter()
            .enumerate()
            .filter_map(|(i, mate)| {
                let j = (*mate)?;
                if i < j {
                    by_index.get(&(i, j)).map(|t| (*t).clone())
                } else {
                    None
                }
            })
            .collect();
        sort_by_score(&mut chosen);
        chosen
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::position::{LineupSlot, Position};
    use crate::trade::{CandidateTrade, TradeKind};
    use crate::valuation::PlayerValue;

    /// A validated 1-for-1 between `a` and `b` with the given score.
    pub(crate) fn scored(a: &str, b: &str, score: f64) -> ValidatedTrade {
        ValidatedTrade {
            trade: CandidateTrade {
                kind: TradeKind::OneForOne,
                team_a: a.to_string(),
                team_b: b.to_string(),
                team_a_sends: vec![PlayerValue::new(
                    &format!("{a}-{b}-qb"),
                    "QB",
                    Position::Quarterback,
                    10.0,
                )],
                team_b_sends: vec![PlayerValue::new(
                    &format!("{a}-{b}-rb"),
                    "RB",
                    Position::RunningBack,
                    10.0,
                )],
                team_a_addresses: vec![LineupSlot::Rb],
                team_b_addresses: vec![LineupSlot::Qb],
            },
            team_a_gain: score / 2.0,
            team_b_gain: score / 2.0,
            value_delta_pct: 0.0,
            trade_score: score,
            is_fair: true,
        }
    }

    fn total(trades: &[ValidatedTrade]) -> f64 {
        trades.iter().map(|t| t.trade_score).sum()
    }

    fn team_name(i: usize) -> String {
        format!("Team{i:02}")
    }

    /// Best total over every perfect matching of `n` teams.
    fn brute_force_perfect(n: usize, score: &dyn Fn(usize, usize) -> f64) -> f64 {
        fn go(used: &mut Vec<bool>, score: &dyn Fn(usize, usize) -> f64) -> f64 {
            let Some(first) = used.iter().position(|u| !u) else {
                return 0.0;
            };
            used[first] = true;
            let mut best = f64::NEG_INFINITY;
            for other in first + 1..used.len() {
                if used[other] {
                    continue;
                }
                used[other] = true;
                best = best.max(score(first, other) + go(used, score));
                used[other] = false;
            }
            used[first] = false;
            best
        }
        go(&mut vec![false; n], score)
    }

    // -- construction --

    #[test]
    fn nodes_are_teams_in_any_trade() {
        let graph = AssignmentGraph::build(&[scored("B", "C", 4.0), scored("A", "B", 2.0)]);
        assert_eq!(graph.teams(), &["A", "B", "C"]);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edge("C", "B").is_some());
        assert!(graph.edge("A", "C").is_none());
    }

    #[test]
    fn keeps_highest_scoring_edge_per_pair() {
        let graph = AssignmentGraph::build(&[
            scored("A", "B", 3.0),
            scored("A", "B", 9.0),
            scored("A", "B", 5.0),
        ]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge("A", "B").unwrap().trade_score, 9.0);
    }

    #[test]
    fn equal_scores_keep_first_trade() {
        let mut first = scored("A", "B", 6.0);
        first.value_delta_pct = 1.0;
        let mut second = scored("A", "B", 6.0);
        second.value_delta_pct = 2.0;
        let graph = AssignmentGraph::build(&[first, second]);
        assert_eq!(graph.edge("A", "B").unwrap().value_delta_pct, 1.0);
    }

    // -- perfect matching --

    #[test]
    fn odd_team_count_has_no_solution() {
        let graph = AssignmentGraph::build(&[
            scored("A", "B", 3.0),
            scored("B", "C", 3.0),
            scored("A", "C", 3.0),
        ]);
        assert_eq!(graph.perfect_matching(3), None);
    }

    #[test]
    fn node_count_must_equal_team_count() {
        let graph = AssignmentGraph::build(&[scored("A", "B", 3.0)]);
        assert!(graph.perfect_matching(4).is_none());
        assert_eq!(graph.perfect_matching(2).unwrap().len(), 1);
    }

    #[test]
    fn empty_graph_has_no_solution() {
        assert!(AssignmentGraph::build(&[]).perfect_matching(0).is_none());
        assert!(AssignmentGraph::build(&[]).max_matching().is_empty());
    }

    #[test]
    fn structurally_impossible_cover_fails() {
        // A star: B, C and D can only trade with A.
        let graph = AssignmentGraph::build(&[
            scored("A", "B", 3.0),
            scored("A", "C", 4.0),
            scored("A", "D", 5.0),
        ]);
        assert!(graph.perfect_matching(4).is_none());
        let partial = graph.max_matching();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].team_b(), "D");
    }

    #[test]
    fn zero_scores_still_match_perfectly() {
        let graph = AssignmentGraph::build(&[scored("A", "B", 0.0), scored("C", "D", 0.0)]);
        assert_eq!(graph.perfect_matching(4).unwrap().len(), 2);
    }

    #[test]
    fn twelve_teams_pick_six_disjoint_trades_with_best_total() {
        let n = 12;
        // Distinct scores for every pair.
        let score = |i: usize, j: usize| ((i * 31 + j * 17) % 97) as f64 + (i * n + j) as f64 / 1000.0;
        let mut trades = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                trades.push(scored(&team_name(i), &team_name(j), score(i, j)));
            }
        }

        let graph = AssignmentGraph::build(&trades);
        let chosen = graph.perfect_matching(n).expect("complete graph has a cover");
        assert_eq!(chosen.len(), 6);

        let mut seen = BTreeSet::new();
        for t in &chosen {
            assert!(seen.insert(t.team_a().to_string()));
            assert!(seen.insert(t.team_b().to_string()));
        }
        assert_eq!(seen.len(), 12);

        let best = brute_force_perfect(n, &score);
        assert!((total(&chosen) - best).abs() < 1e-6);
    }

    #[test]
    fn selection_is_sorted_by_score() {
        let graph = AssignmentGraph::build(&[
            scored("A", "B", 2.0),
            scored("C", "D", 8.0),
            scored("E", "F", 5.0),
        ]);
        let chosen = graph.perfect_matching(6).unwrap();
        let scores: Vec<f64> = chosen.iter().map(|t| t.trade_score).collect();
        assert_eq!(scores, vec![8.0, 5.0, 2.0]);
    }
}

// Candidate trade generation.
//
// Two teams are paired only when each has a surplus at a slot where the other
// has a need. Candidates draw from the top of each team's position pool, so
// the output stays polynomial in roster size.

use std::collections::BTreeMap;

use crate::lineup::PositionPools;
use crate::needs::NeedsSurplus;
use crate::position::LineupSlot;
use crate::trade::{CandidateTrade, TradeKind};
use crate::valuation::PlayerValue;

/// Single-player offers come from a team's top three at the position.
pub const SINGLE_DEPTH: usize = 3;
/// Each player of a pair comes from the top two at its position.
pub const PAIR_DEPTH: usize = 2;

/// One side's contribution to a trade.
#[derive(Debug, Clone)]
struct Offer {
    players: Vec<PlayerValue>,
    slots: Vec<LineupSlot>,
}

/// Every single-player offer at the given slots.
fn single_offers(pools: &PositionPools, slots: &[LineupSlot]) -> Vec<Offer> {
    let mut offers = Vec::new();
    for &slot in slots {
        for player in pools.ranked(slot, 0, SINGLE_DEPTH) {
            offers.push(Offer {
                players: vec![player.clone()],
                slots: vec![slot],
            });
        }
    }
    offers
}

/// Every two-player offer over slot pairs (repeats allowed). A repeated slot
/// pairs ranks 1-2 with ranks 2-3 so the same player is never sent twice.
fn pair_offers(pools: &PositionPools, slots: &[LineupSlot]) -> Vec<Offer> {
    let mut offers = Vec::new();
    for (i, &first_slot) in slots.iter().enumerate() {
        for &second_slot in &slots[i..] {
            let firsts = pools.ranked(first_slot, 0, PAIR_DEPTH);
            let seconds = if first_slot == second_slot {
                pools.ranked(second_slot, 1, PAIR_DEPTH + 1)
            } else {
                pools.ranked(second_slot, 0, PAIR_DEPTH)
            };
            for p1 in firsts {
                for p2 in seconds {
                    if p1.id == p2.id {
                        continue;
                    }
                    offers.push(Offer {
                        players: vec![p1.clone(), p2.clone()],
                        slots: vec![first_slot, second_slot],
                    });
                }
            }
        }
    }
    offers
}

/// Slots in `surplus` (kept in surplus order) that also appear in `needs`.
fn complementary(surplus: &[LineupSlot], needs: &[LineupSlot]) -> Vec<LineupSlot> {
    surplus
        .iter()
        .copied()
        .filter(|slot| needs.contains(slot))
        .collect()
}

fn cross(
    kind: TradeKind,
    team_a: &str,
    team_b: &str,
    a_offers: &[Offer],
    b_offers: &[Offer],
    out: &mut Vec<CandidateTrade>,
) {
    for a in a_offers {
        for b in b_offers {
            out.push(CandidateTrade {
                kind,
                team_a: team_a.to_string(),
                team_b: team_b.to_string(),
                team_a_sends: a.players.clone(),
                team_b_sends: b.players.clone(),
                team_a_addresses: b.slots.clone(),
                team_b_addresses: a.slots.clone(),
            });
        }
    }
}

/// Candidates between one pair of teams. Empty unless the needs/surplus
/// match runs both ways.
pub fn pair_candidates(
    team_a: &str,
    a_profile: &NeedsSurplus,
    a_pools: &PositionPools,
    team_b: &str,
    b_profile: &NeedsSurplus,
    b_pools: &PositionPools,
    include_uneven: bool,
) -> Vec<CandidateTrade> {
    let a_to_b = complementary(&a_profile.surplus, &b_profile.needs);
    let b_to_a = complementary(&b_profile.surplus, &a_profile.needs);
    if a_to_b.is_empty() || b_to_a.is_empty() {
        return Vec::new();
    }

    let a_singles = single_offers(a_pools, &a_to_b);
    let b_singles = single_offers(b_pools, &b_to_a);
    let a_pairs = pair_offers(a_pools, &a_to_b);
    let b_pairs = pair_offers(b_pools, &b_to_a);

    let mut trades = Vec::new();
    cross(TradeKind::OneForOne, team_a, team_b, &a_singles, &b_singles, &mut trades);
    cross(TradeKind::TwoForTwo, team_a, team_b, &a_pairs, &b_pairs, &mut trades);
    if include_uneven {
        cross(TradeKind::TwoForOne, team_a, team_b, &a_pairs, &b_singles, &mut trades);
        cross(TradeKind::OneForTwo, team_a, team_b, &a_singles, &b_pairs, &mut trades);
    }
    trades
}

/// Generate candidates for every unordered pair of teams, in team order.
///
/// A team without an entry in `pools` is treated as having no players.
pub fn generate_candidates(
    profiles: &BTreeMap<String, NeedsSurplus>,
    pools: &BTreeMap<String, PositionPools>,
    include_uneven: bool,
) -> Vec<CandidateTrade> {
    let empty = PositionPools::default();
    let teams: Vec<(&String, &NeedsSurplus)> = profiles.iter().collect();
    let mut candidates = Vec::new();

    for (i, (team_a, a_profile)) in teams.iter().enumerate() {
        for (team_b, b_profile) in &teams[i + 1..] {
            let a_pools = pools.get(*team_a).unwrap_or(&empty);
            let b_pools = pools.get(*team_b).unwrap_or(&empty);
            candidates.extend(pair_candidates(
                team_a,
                a_profile,
                a_pools,
                team_b,
                b_profile,
                b_pools,
                include_uneven,
            ));
        }
    }

    candidates
}

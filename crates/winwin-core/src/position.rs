// Player positions and lineup slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions a valued player can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
}

impl Position {
    /// All player positions in lineup order.
    pub const ALL: [Position; 4] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];

    /// Parse a position abbreviation ("QB", "rb", ...). Anything outside
    /// QB/RB/WR/TE (kickers, defenses, IDP) returns `None`.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
        }
    }

    /// The dedicated lineup slot for this position.
    pub fn slot(&self) -> LineupSlot {
        match self {
            Position::Quarterback => LineupSlot::Qb,
            Position::RunningBack => LineupSlot::Rb,
            Position::WideReceiver => LineupSlot::Wr,
            Position::TightEnd => LineupSlot::Te,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// A starting-lineup bucket. `Total` is the aggregate of the other five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineupSlot {
    Qb,
    Rb,
    Wr,
    Te,
    Flex,
    Total,
}

impl LineupSlot {
    /// Every slot, including `Total`.
    pub const ALL: [LineupSlot; 6] = [
        LineupSlot::Qb,
        LineupSlot::Rb,
        LineupSlot::Wr,
        LineupSlot::Te,
        LineupSlot::Flex,
        LineupSlot::Total,
    ];

    /// Slots that can be labelled a need or surplus.
    pub const TRADEABLE: [LineupSlot; 5] = [
        LineupSlot::Qb,
        LineupSlot::Rb,
        LineupSlot::Wr,
        LineupSlot::Te,
        LineupSlot::Flex,
    ];

    /// The player position backing this slot, if it has one.
    /// FLEX and TOTAL have no dedicated player pool.
    pub fn position(&self) -> Option<Position> {
        match self {
            LineupSlot::Qb => Some(Position::Quarterback),
            LineupSlot::Rb => Some(Position::RunningBack),
            LineupSlot::Wr => Some(Position::WideReceiver),
            LineupSlot::Te => Some(Position::TightEnd),
            LineupSlot::Flex | LineupSlot::Total => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            LineupSlot::Qb => "QB",
            LineupSlot::Rb => "RB",
            LineupSlot::Wr => "WR",
            LineupSlot::Te => "TE",
            LineupSlot::Flex => "FLEX",
            LineupSlot::Total => "TOTAL",
        }
    }
}

impl fmt::Display for LineupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

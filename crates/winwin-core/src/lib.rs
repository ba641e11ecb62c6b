// Library root: the weekly trade engine. Pure and synchronous; callers
// supply valuations, rosters and configuration.

pub mod config;
pub mod graph;
pub mod lineup;
pub mod matching;
pub mod needs;
pub mod pipeline;
pub mod position;
pub mod roster;
pub mod selector;
pub mod stats;
pub mod trade;
pub mod valuation;

pub use pipeline::{analyze_league, LeagueAnalysis};

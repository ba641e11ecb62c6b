// FantasyCalc current-values endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};
use winwin_core::config::{FantasyCalcParams, SourcesConfig};
use winwin_core::valuation::PlayerValue;

use super::{get_json, with_retry, FetchError, RetryPolicy, ValueSource};
use crate::values::checked_value;

// ---------------------------------------------------------------------------
// Wire format (private)
// ---------------------------------------------------------------------------

/// The endpoint returns a bare array; older deployments wrapped it in
/// `{ "players": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResponse {
    List(Vec<serde_json::Value>),
    Wrapped { players: Vec<serde_json::Value> },
}

/// One entry. `value` is the dynasty value; `redraftValue` is the one the
/// weekly analysis uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    player: RawPlayer,
    #[serde(default)]
    redraft_value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    #[serde(default)]
    sleeper_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    maybe_team: Option<String>,
}

/// Turn raw entries into player values, skipping the ones we cannot use.
fn parse_entries(entries: Vec<serde_json::Value>) -> Vec<PlayerValue> {
    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        let raw: RawEntry = match serde_json::from_value(entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed FantasyCalc entry: {}", e);
                continue;
            }
        };
        match checked_value(
            raw.player.sleeper_id.as_deref().unwrap_or_default(),
            &raw.player.name,
            &raw.player.position,
            raw.redraft_value,
            raw.player.maybe_team.as_deref(),
        ) {
            Ok(player) => values.push(player),
            Err(reason) => warn!("skipping FantasyCalc entry: {}", reason),
        }
    }
    values
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct FantasyCalcClient {
    http: reqwest::Client,
    url: String,
    params: FantasyCalcParams,
    retry: RetryPolicy,
}

impl FantasyCalcClient {
    pub fn new(http: reqwest::Client, sources: &SourcesConfig) -> Self {
        FantasyCalcClient {
            http,
            url: sources.fantasycalc_url.clone(),
            params: sources.fantasycalc.clone(),
            retry: RetryPolicy::from_config(sources),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("isDynasty", self.params.is_dynasty.to_string()),
            ("numQbs", self.params.num_qbs.to_string()),
            ("numTeams", self.params.num_teams.to_string()),
            ("ppr", self.params.ppr.to_string()),
        ]
    }

    /// Fetch current redraft values. An answer with no usable players is an
    /// error.
    pub async fn fetch_values(&self) -> Result<Vec<PlayerValue>, FetchError> {
        let query = self.query();
        let response: RawResponse = with_retry("FantasyCalc values", &self.retry, || {
            get_json(&self.http, &self.url, &query)
        })
        .await?;

        let entries = match response {
            RawResponse::List(entries) | RawResponse::Wrapped { players: entries } => entries,
        };
        let values = parse_entries(entries);
        if values.is_empty() {
            return Err(FetchError::Decode {
                url: self.url.clone(),
                message: "no usable player values".into(),
            });
        }
        info!("fetched {} player values from FantasyCalc", values.len());
        Ok(values)
    }
}

#[async_trait]
impl ValueSource for FantasyCalcClient {
    async fn player_values(&self) -> anyhow::Result<Vec<PlayerValue>> {
        Ok(self.fetch_values().await?)
    }
}

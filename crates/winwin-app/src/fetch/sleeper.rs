// Sleeper league endpoints: rosters and users.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use winwin_core::config::SourcesConfig;

use super::{get_json, with_retry, FetchError, LeagueSource, RetryPolicy};

/// One team's roster as Sleeper reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SleeperRoster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    /// `null` for a roster nobody has filled yet.
    #[serde(default)]
    pub players: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SleeperUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl SleeperUser {
    /// Display name, then username, then a placeholder built from the id.
    pub fn team_name(&self) -> String {
        [&self.display_name, &self.username]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("User_{}", self.user_id))
    }
}

pub struct SleeperClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SleeperClient {
    pub fn new(http: reqwest::Client, sources: &SourcesConfig) -> Self {
        SleeperClient {
            http,
            base_url: sources.sleeper_base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(sources),
        }
    }

    fn league_url(&self, league_id: &str, resource: &str) -> String {
        format!("{}/league/{}/{}", self.base_url, league_id, resource)
    }

    pub async fn fetch_rosters(&self, league_id: &str) -> Result<Vec<SleeperRoster>, FetchError> {
        let url = self.league_url(league_id, "rosters");
        let rosters: Vec<SleeperRoster> =
            with_retry("Sleeper rosters", &self.retry, || get_json(&self.http, &url, &[])).await?;
        info!("fetched {} rosters for league {}", rosters.len(), league_id);
        Ok(rosters)
    }

    pub async fn fetch_users(&self, league_id: &str) -> Result<Vec<SleeperUser>, FetchError> {
        let url = self.league_url(league_id, "users");
        let users: Vec<SleeperUser> =
            with_retry("Sleeper users", &self.retry, || get_json(&self.http, &url, &[])).await?;
        info!("fetched {} users for league {}", users.len(), league_id);
        Ok(users)
    }
}

#[async_trait]
impl LeagueSource for SleeperClient {
    async fn rosters(&self, league_id: &str) -> anyhow::Result<Vec<SleeperRoster>> {
        Ok(self.fetch_rosters(league_id).await?)
    }

    async fn users(&self, league_id: &str) -> anyhow::Result<Vec<SleeperUser>> {
        Ok(self.fetch_users(league_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_players_deserialize_as_none() {
        let rosters: Vec<SleeperRoster> = serde_json::from_value(json!([
            { "roster_id": 1, "owner_id": "u1", "players": ["4046", "9509"], "settings": { "wins": 3 } },
            { "roster_id": 2, "owner_id": null, "players": null }
        ]))
        .unwrap();
        assert_eq!(rosters[0].players.as_deref(), Some(&["4046".to_string(), "9509".to_string()][..]));
        assert_eq!(rosters[1].owner_id, None);
        assert_eq!(rosters[1].players, None);
    }

    #[test]
    fn team_name_fallbacks() {
        let user = |display: Option<&str>, username: Option<&str>| SleeperUser {
            user_id: "77".into(),
            display_name: display.map(str::to_string),
            username: username.map(str::to_string),
        };
        assert_eq!(user(Some("Gridiron Gurus"), Some("gg")).team_name(), "Gridiron Gurus");
        assert_eq!(user(Some(""), Some("gg")).team_name(), "gg");
        assert_eq!(user(None, Some("gg")).team_name(), "gg");
        assert_eq!(user(None, None).team_name(), "User_77");
    }

    #[test]
    fn league_urls_tolerate_trailing_slash() {
        let sources = SourcesConfig {
            sleeper_base_url: "https://api.sleeper.app/v1/".into(),
            ..SourcesConfig::default()
        };
        let client = SleeperClient::new(reqwest::Client::new(), &sources);
        assert_eq!(
            client.league_url("123", "rosters"),
            "https://api.sleeper.app/v1/league/123/rosters"
        );
    }
}

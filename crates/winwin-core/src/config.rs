// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::position::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league_id: String,
    pub lineup: LineupConfig,
    pub policy: TradePolicy,
    pub relaxation: RelaxationConfig,
    pub sources: SourcesConfig,
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSection,
}

#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    league_id: String,
    #[serde(default = "default_total_teams")]
    total_teams: usize,
    #[serde(default = "default_target_trades")]
    target_trades: usize,
    #[serde(default)]
    lineup: LineupConfig,
}

/// Starting lineup shape: starters required per position plus the FLEX slot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineupConfig {
    pub qb: usize,
    pub rb: usize,
    pub wr: usize,
    pub te: usize,
    pub flex: usize,
    pub flex_eligible: Vec<Position>,
}

impl LineupConfig {
    /// Dedicated starters required at `pos` (FLEX not included).
    pub fn required(&self, pos: Position) -> usize {
        match pos {
            Position::Quarterback => self.qb,
            Position::RunningBack => self.rb,
            Position::WideReceiver => self.wr,
            Position::TightEnd => self.te,
        }
    }

    pub fn is_flex_eligible(&self, pos: Position) -> bool {
        self.flex_eligible.contains(&pos)
    }
}

impl Default for LineupConfig {
    fn default() -> Self {
        LineupConfig {
            qb: 1,
            rb: 2,
            wr: 2,
            te: 1,
            flex: 1,
            flex_eligible: vec![
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    trade: TradeSection,
    #[serde(default)]
    relaxation: RelaxationConfig,
    sources: SourcesConfig,
    output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct TradeSection {
    fairness_threshold: f64,
    min_starter_gain: f64,
    #[serde(default = "default_needs_threshold")]
    needs_threshold: f64,
}

/// Constraints a trade must satisfy, plus the size of a full weekly matching.
///
/// Assembled from `[trade]` in strategy.toml and the team counts in
/// league.toml.
#[derive(Debug, Clone, PartialEq)]
pub struct TradePolicy {
    /// Maximum allowed value gap between the two sides, as a fraction (0.12 = 12%).
    pub fairness_threshold: f64,
    /// Both teams' starting lineups must improve by at least this many points.
    pub min_starter_gain: f64,
    /// Deltas strictly beyond +/- this value are a surplus/need.
    pub needs_threshold: f64,
    pub target_trades: usize,
    pub total_teams: usize,
}

impl TradePolicy {
    /// The fairness threshold expressed in the same unit as `value_delta_pct`.
    pub fn fairness_threshold_pct(&self) -> f64 {
        self.fairness_threshold * 100.0
    }
}

impl Default for TradePolicy {
    fn default() -> Self {
        TradePolicy {
            fairness_threshold: 0.12,
            min_starter_gain: 3.0,
            needs_threshold: default_needs_threshold(),
            target_trades: default_target_trades(),
            total_teams: default_total_teams(),
        }
    }
}

/// Settings for the ladder tried when no perfect matching exists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelaxationConfig {
    #[serde(default = "default_fairness_steps")]
    pub fairness_steps: Vec<f64>,
    #[serde(default = "default_relaxed_min_starter_gain")]
    pub relaxed_min_starter_gain: f64,
    #[serde(default = "default_true")]
    pub allow_uneven: bool,
    #[serde(default = "default_true")]
    pub allow_partial: bool,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        RelaxationConfig {
            fairness_steps: default_fairness_steps(),
            relaxed_min_starter_gain: default_relaxed_min_starter_gain(),
            allow_uneven: true,
            allow_partial: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub fantasycalc_url: String,
    pub sleeper_base_url: String,
    pub fantasycalc: FantasyCalcParams,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Query parameters sent to the FantasyCalc values endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FantasyCalcParams {
    pub is_dynasty: bool,
    pub num_qbs: u32,
    pub num_teams: u32,
    pub ppr: f64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            fantasycalc_url: "https://api.fantasycalc.com/values/current".into(),
            sleeper_base_url: "https://api.sleeper.app/v1".into(),
            fantasycalc: FantasyCalcParams::default(),
            request_timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for FantasyCalcParams {
    fn default() -> Self {
        FantasyCalcParams {
            is_dynasty: false,
            num_qbs: 1,
            num_teams: 12,
            ppr: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub default_path: String,
    #[serde(default = "default_true")]
    pub ascii_only: bool,
}

fn default_total_teams() -> usize {
    12
}

fn default_target_trades() -> usize {
    6
}

fn default_needs_threshold() -> f64 {
    2.0
}

fn default_fairness_steps() -> Vec<f64> {
    vec![0.15, 0.20]
}

fn default_relaxed_min_starter_gain() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, both relative to the given `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let policy = TradePolicy {
        fairness_threshold: strategy_file.trade.fairness_threshold,
        min_starter_gain: strategy_file.trade.min_starter_gain,
        needs_threshold: strategy_file.trade.needs_threshold,
        target_trades: league.target_trades,
        total_teams: league.total_teams,
    };

    let config = Config {
        league_id: league.league_id,
        lineup: league.lineup,
        policy,
        relaxation: strategy_file.relaxation,
        sources: strategy_file.sources,
        output: strategy_file.output,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --config-dir",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy missing defaults into `base_dir/config/`, then load from it.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let policy = &config.policy;

    if config.league_id.trim().is_empty() {
        return Err(invalid("league.league_id", "must not be empty"));
    }

    if policy.total_teams == 0 {
        return Err(invalid("league.total_teams", "must be greater than 0"));
    }

    if policy.target_trades == 0 {
        return Err(invalid("league.target_trades", "must be greater than 0"));
    }

    if policy.target_trades * 2 > policy.total_teams {
        return Err(invalid(
            "league.target_trades",
            format!(
                "{} trades need {} teams but the league has {}",
                policy.target_trades,
                policy.target_trades * 2,
                policy.total_teams
            ),
        ));
    }

    let lineup = &config.lineup;
    if lineup.qb + lineup.rb + lineup.wr + lineup.te + lineup.flex == 0 {
        return Err(invalid("league.lineup", "must require at least one starter"));
    }
    if lineup.flex_eligible.contains(&Position::Quarterback) {
        return Err(invalid(
            "league.lineup.flex_eligible",
            "QB is not FLEX-eligible",
        ));
    }

    let fairness = policy.fairness_threshold;
    if !(fairness > 0.0 && fairness <= 1.0) {
        return Err(invalid(
            "trade.fairness_threshold",
            format!("must be in (0.0, 1.0], got {fairness}"),
        ));
    }

    let non_negative: &[(&str, f64)] = &[
        ("trade.min_starter_gain", policy.min_starter_gain),
        ("trade.needs_threshold", policy.needs_threshold),
        (
            "relaxation.relaxed_min_starter_gain",
            config.relaxation.relaxed_min_starter_gain,
        ),
    ];
    for (name, val) in non_negative {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be finite and >= 0, got {val}")));
        }
    }

    for step in &config.relaxation.fairness_steps {
        if !(*step > 0.0 && *step <= 1.0) {
            return Err(invalid(
                "relaxation.fairness_steps",
                format!("each step must be in (0.0, 1.0], got {step}"),
            ));
        }
        if *step < fairness {
            return Err(invalid(
                "relaxation.fairness_steps",
                format!("step {step} is tighter than trade.fairness_threshold {fairness}"),
            ));
        }
    }

    if config.sources.max_retries == 0 {
        return Err(invalid("sources.max_retries", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root holding `defaults/` (cargo runs unit tests from the
    /// crate directory).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("../../defaults").exists() {
            cwd.join("../..")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh temp dir with config/ populated from defaults/.
    fn temp_config_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), config_dir.join("league.toml")).unwrap();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();
        tmp
    }

    fn rewrite(tmp: &Path, file: &str, from: &str, to: &str) {
        let path = tmp.join("config").join(file);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(from), "{file} does not contain {from:?}");
        fs::write(&path, text.replace(from, to)).unwrap();
    }

    fn expect_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_config() {
        let tmp = temp_config_dir("winwin_config_defaults");
        let config = load_config_from(&tmp).expect("should load defaults");

        assert_eq!(config.league_id, "1240782642371104768");
        assert_eq!(config.lineup, LineupConfig::default());
        assert_eq!(config.policy, TradePolicy::default());
        assert_eq!(config.relaxation, RelaxationConfig::default());

        assert_eq!(
            config.sources.fantasycalc_url,
            "https://api.fantasycalc.com/values/current"
        );
        assert_eq!(config.sources.sleeper_base_url, "https://api.sleeper.app/v1");
        assert_eq!(config.sources.max_retries, 3);
        assert_eq!(config.sources.request_timeout_secs, 30);
        assert!(!config.sources.fantasycalc.is_dynasty);
        assert_eq!(config.sources.fantasycalc.num_teams, 12);
        assert_eq!(config.output.default_path, "weekly_trades_output.txt");
        assert!(config.output.ascii_only);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn relaxation_section_is_optional() {
        let tmp = temp_config_dir("winwin_config_no_relaxation");
        rewrite(
            &tmp,
            "strategy.toml",
            "[relaxation]\nfairness_steps = [0.15, 0.20]\nrelaxed_min_starter_gain = 1.0\nallow_uneven = true\nallow_partial = true\n",
            "",
        );
        let config = load_config_from(&tmp).expect("should load without [relaxation]");
        assert_eq!(config.relaxation, RelaxationConfig::default());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_fairness_threshold() {
        let tmp = temp_config_dir("winwin_config_zero_fairness");
        rewrite(
            &tmp,
            "strategy.toml",
            "fairness_threshold = 0.12",
            "fairness_threshold = 0.0",
        );
        expect_field(&tmp, "trade.fairness_threshold");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_negative_min_starter_gain() {
        let tmp = temp_config_dir("winwin_config_negative_gain");
        rewrite(
            &tmp,
            "strategy.toml",
            "min_starter_gain = 3.0",
            "min_starter_gain = -1.0",
        );
        expect_field(&tmp, "trade.min_starter_gain");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_relaxation_step_tighter_than_base() {
        let tmp = temp_config_dir("winwin_config_tight_step");
        rewrite(
            &tmp,
            "strategy.toml",
            "fairness_steps = [0.15, 0.20]",
            "fairness_steps = [0.10, 0.20]",
        );
        expect_field(&tmp, "relaxation.fairness_steps");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_too_many_target_trades() {
        let tmp = temp_config_dir("winwin_config_target_trades");
        rewrite(&tmp, "league.toml", "target_trades = 6", "target_trades = 7");
        expect_field(&tmp, "league.target_trades");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_total_teams() {
        let tmp = temp_config_dir("winwin_config_zero_teams");
        rewrite(&tmp, "league.toml", "total_teams = 12", "total_teams = 0");
        expect_field(&tmp, "league.total_teams");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_qb_in_flex() {
        let tmp = temp_config_dir("winwin_config_qb_flex");
        rewrite(
            &tmp,
            "league.toml",
            "flex_eligible = [\"RB\", \"WR\", \"TE\"]",
            "flex_eligible = [\"QB\", \"RB\"]",
        );
        expect_field(&tmp, "league.lineup.flex_eligible");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_retries() {
        let tmp = temp_config_dir("winwin_config_zero_retries");
        rewrite(&tmp, "strategy.toml", "max_retries = 3", "max_retries = 0");
        expect_field(&tmp, "sources.max_retries");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = temp_config_dir("winwin_config_missing_league");
        fs::remove_file(tmp.join("config/league.toml")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config_dir("winwin_config_invalid_toml");
        fs::write(tmp.join("config/strategy.toml"), "this is not valid [[[ toml").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("strategy.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_examples() {
        let tmp = std::env::temp_dir().join("winwin_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/league.toml"), defaults_dir.join("league.toml")).unwrap();
        fs::copy(root.join("defaults/strategy.toml"), defaults_dir.join("strategy.toml")).unwrap();
        fs::write(defaults_dir.join("strategy.toml.example"), "# sample\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 2);
        assert!(tmp.join("config/league.toml").exists());
        assert!(tmp.join("config/strategy.toml").exists());
        assert!(!tmp.join("config/strategy.toml.example").exists());

        // Second run copies nothing and keeps local edits.
        fs::write(tmp.join("config/league.toml"), "# custom\n").unwrap();
        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config/league.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("winwin_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn lineup_required_counts() {
        let lineup = LineupConfig::default();
        assert_eq!(lineup.required(Position::Quarterback), 1);
        assert_eq!(lineup.required(Position::RunningBack), 2);
        assert_eq!(lineup.required(Position::WideReceiver), 2);
        assert_eq!(lineup.required(Position::TightEnd), 1);
        assert!(lineup.is_flex_eligible(Position::TightEnd));
        assert!(!lineup.is_flex_eligible(Position::Quarterback));
    }
}

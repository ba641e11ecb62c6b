// weekly-trades entry point.
//
// Run sequence:
// 1. Parse arguments, initialize tracing (stderr)
// 2. Load config (copying defaults on first run)
// 3. Pick the value source (CSV or FantasyCalc) and the Sleeper client
// 4. Gather inputs, analyze the league, render the report
// 5. Write the report, or print a preview on --dry-run

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::info;
use winwin_app::fetch::{self, CsvValues, FantasyCalcClient, SleeperClient, ValueSource};
use winwin_app::weekly;
use winwin_core::config;

#[derive(Parser, Debug)]
#[command(name = "weekly-trades")]
#[command(about = "Suggest mutually beneficial trades for every team in a Sleeper league")]
struct Args {
    /// Player values CSV (default: fetch current values from FantasyCalc)
    #[arg(long)]
    values: Option<PathBuf>,

    /// Sleeper league id (default: from config/league.toml)
    #[arg(long)]
    league: Option<String>,

    /// Report output path (default: from config/strategy.toml)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory holding config/ and defaults/
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Debug-level logging
    #[arg(long, short)]
    verbose: bool,

    /// Print a preview instead of writing the report
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Parse arguments, initialize tracing
    let args = Args::parse();
    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("warning: {e:#}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // 2. Load config
    let config = config::load_config_in(&args.config_dir).context("failed to load configuration")?;
    let league_id = args.league.unwrap_or_else(|| config.league_id.clone());
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&config.output.default_path));
    info!(
        "config loaded: league={}, {} teams, {} target trades",
        league_id, config.policy.total_teams, config.policy.target_trades
    );

    // 3. Sources
    let http = fetch::http_client(&config.sources).context("failed to build HTTP client")?;
    let values: Box<dyn ValueSource> = match args.values {
        Some(path) => {
            info!("reading player values from {}", path.display());
            Box::new(CsvValues::new(path))
        }
        None => Box::new(FantasyCalcClient::new(http.clone(), &config.sources)),
    };
    let league = SleeperClient::new(http, &config.sources);

    // 4. Analyze and render
    let (analysis, report) = weekly::build_report(
        &config,
        &*values,
        &league,
        &league_id,
        Local::now().naive_local(),
    )
    .await?;
    info!(
        "{} trades selected ({})",
        analysis.selection.len(),
        analysis.selection.stage
    );

    // 5. Output
    if args.dry_run {
        println!("{}", weekly::preview(&report));
        println!();
        println!("Report length: {} characters", report.chars().count());
    } else {
        weekly::write_report(&out, &report)?;
        info!("wrote {} characters to {}", report.chars().count(), out.display());
    }
    Ok(())
}

/// Filter used when `RUST_LOG` is unset. Covers the library crates and this
/// binary's own target.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "winwin=debug,weekly_trades=debug,info"
    } else {
        "winwin=info,weekly_trades=info,warn"
    }
}

/// Log to stderr so stdout stays free for the dry-run preview.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

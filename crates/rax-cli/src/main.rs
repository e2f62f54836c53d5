// rax entry point.
//
// 1. Initialize tracing (stderr, so reports on stdout stay clean)
// 2. Load config
// 3. Load the roster snapshot (or build it from raw inputs)
// 4. Run the engine and print the requested report

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use rax_cli::picks::{build_selection, find_fighter, parse_pick, resolve_multiplier, Pick};
use rax_cli::report;
use rax_core::config::{self, Config};
use rax_core::roster::{self, Roster};
use rax_core::selection::MultiplierChoices;
use rax_core::valuation::{self, annual};

#[derive(Parser)]
#[command(name = "rax", about = "Fighter Rax valuation and team planning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the roster by legacy base value.
    Leaderboard(LeaderboardArgs),
    /// Show one fighter's annual value and history breakdown.
    Fighter(FighterArgs),
    /// Compare two fighters month by month.
    Compare(CompareArgs),
    /// Evaluate a selection with conflicts and recommendations.
    Team(TeamArgs),
    /// Rebuild the roster snapshot from the raw CSV inputs.
    Build(BuildArgs),
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 25)]
    limit: usize,
}

#[derive(Args, Debug)]
struct FighterArgs {
    name: String,
    /// Tier label or multiplier; defaults to the base tier.
    #[arg(long)]
    tier: Option<String>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    left: String,
    right: String,
    /// Tier for the first fighter; defaults to the base tier.
    #[arg(long)]
    left_tier: Option<String>,
    /// Tier for the second fighter; defaults to the base tier.
    #[arg(long)]
    right_tier: Option<String>,
}

#[derive(Args, Debug)]
struct TeamArgs {
    /// NAME or NAME=TIER; repeat for each selected fighter.
    #[arg(long = "pick", required = true, value_parser = parse_pick)]
    picks: Vec<Pick>,
    /// Fighter to leave out of recommendations; repeatable.
    #[arg(long)]
    exclude: Vec<String>,
    /// Override the concurrent claim threshold.
    #[arg(long)]
    threshold: Option<usize>,
    /// Override the number of recommendations.
    #[arg(long)]
    limit: Option<usize>,
    /// Break totals down by day instead of by month.
    #[arg(long)]
    daily: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Reference date for the two-year activity window.
    #[arg(long, value_parser = parse_date)]
    as_of: NaiveDate,
    /// Output path; defaults to the configured roster snapshot.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("invalid date `{raw}`: {e}"))
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = config::load_config().context("failed to load configuration")?;
    info!(
        "config loaded: threshold {}, {} tiers",
        config.policy.max_concurrent_claims,
        config.tiers.len()
    );

    let output = match cli.command {
        Command::Leaderboard(args) => run_leaderboard(&config, &load_snapshot(&config)?, args),
        Command::Fighter(args) => run_fighter(&config, &load_snapshot(&config)?, args)?,
        Command::Compare(args) => run_compare(&config, &load_snapshot(&config)?, args)?,
        Command::Team(args) => {
            let roster = load_snapshot(&config)?;
            run_team(&mut config, &roster, args)?
        }
        Command::Build(args) => run_build(&config, args)?,
    };

    print!("{output}");
    Ok(())
}

fn load_snapshot(config: &Config) -> anyhow::Result<Roster> {
    roster::load_roster(Path::new(&config.data_paths.roster))
        .context("failed to load roster snapshot; run `rax build` first")
}

fn run_leaderboard(config: &Config, roster: &Roster, args: LeaderboardArgs) -> String {
    let choices = MultiplierChoices::new(config.policy.default_multiplier);
    let rows = annual::leaderboard(roster.fighters(), &choices);
    report::render_leaderboard(&rows, args.search.as_deref(), args.limit)
}

fn multiplier_for(config: &Config, tier: Option<&str>) -> anyhow::Result<f64> {
    match tier {
        Some(tier) => resolve_multiplier(&config.tiers, tier),
        None => Ok(config.policy.default_multiplier),
    }
}

fn run_fighter(config: &Config, roster: &Roster, args: FighterArgs) -> anyhow::Result<String> {
    let fighter = find_fighter(roster, &args.name)?;
    let multiplier = multiplier_for(config, args.tier.as_deref())?;
    let valuation = annual::value_fighter(fighter, multiplier, &config.tiers);
    Ok(report::render_fighter(fighter, &valuation, &config.tiers))
}

fn run_compare(config: &Config, roster: &Roster, args: CompareArgs) -> anyhow::Result<String> {
    let left = find_fighter(roster, &args.left)?;
    let right = find_fighter(roster, &args.right)?;
    let left_value = annual::value_fighter(
        left,
        multiplier_for(config, args.left_tier.as_deref())?,
        &config.tiers,
    );
    let right_value = annual::value_fighter(
        right,
        multiplier_for(config, args.right_tier.as_deref())?,
        &config.tiers,
    );
    Ok(report::render_compare(
        (left, &left_value),
        (right, &right_value),
        &config.tiers,
    ))
}

fn run_team(config: &mut Config, roster: &Roster, args: TeamArgs) -> anyhow::Result<String> {
    if let Some(threshold) = args.threshold {
        anyhow::ensure!(threshold > 0, "--threshold must be at least 1");
        config.policy.max_concurrent_claims = threshold;
    }
    if let Some(limit) = args.limit {
        config.policy.recommendation_limit = limit;
    }

    let (selection, choices) = build_selection(
        &args.picks,
        roster,
        &config.tiers,
        config.policy.default_multiplier,
        config.policy.max_selection,
    )?;
    let excluded: HashSet<String> = args.exclude.into_iter().collect();

    let team = valuation::evaluate_team(roster.fighters(), &selection, &choices, &excluded, config);
    Ok(report::render_team(&team, &config.tiers, args.daily))
}

fn run_build(config: &Config, args: BuildArgs) -> anyhow::Result<String> {
    let paths = &config.data_paths;
    let values = paths
        .fighter_values
        .as_deref()
        .context("data_paths.fighter_values is not configured")?;
    let history = paths
        .fight_history
        .as_deref()
        .context("data_paths.fight_history is not configured")?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(&paths.roster));

    let roster = roster::build_roster_from_paths(
        Path::new(values),
        Path::new(history),
        paths.owned_passes.as_deref().map(Path::new),
        &config.active_overrides,
        args.as_of,
    )
    .context("failed to build roster")?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    roster::write_roster(&roster, &out).context("failed to write roster snapshot")?;

    let active = roster.iter().filter(|f| f.active).count();
    info!("wrote {} fighters to {}", roster.len(), out.display());
    Ok(format!(
        "Built {} fighters ({} active as of {}) -> {}\n",
        roster.len(),
        active,
        args.as_of,
        out.display()
    ))
}

/// Initialize tracing to stderr; stdout carries the reports.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rax=info,rax_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

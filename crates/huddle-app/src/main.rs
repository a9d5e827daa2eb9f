// huddle entry point.
//
// Startup sequence:
// 1. Parse CLI, initialize tracing (log file unless --log-stderr)
// 2. Load config (seeding config/ from defaults/)
// 3. Resolve the season
// 4. Build the stats provider and projection engine, or the ESPN client
// 5. Run the subcommand and print its table

mod cli;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use huddle_core::config::{self, Config};
use huddle_core::season::{resolve_season, today_eastern};
use huddle_core::{team, FantasyPosition, StatCategory};
use huddle_projection::{project_batch, rank_players, ProjectionEngine, ProjectionOutcome};
use huddle_stats::espn::EspnClient;
use huddle_stats::supplement::{SupplementLoader, TeamSeries};
use huddle_stats::NflverseProvider;
use tracing::info;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_stderr)?;
    info!("huddle starting up");

    let config = config::load_config().context("failed to load configuration")?;
    let season = resolve_season(cli.season.or(config.season.year), today_eastern());
    info!(season, "season resolved");

    match cli.command {
        Commands::Project { player } => project(&config, season, &player).await,
        Commands::Batch { players, concurrency } => {
            let players = if players.is_empty() { None } else { Some(players) };
            batch(&config, season, players, concurrency).await
        }
        Commands::Rank { limit } => {
            let engine = build_engine(&config)?;
            let ranked = rank_players(engine.provider().as_ref(), season, limit)
                .await
                .context("failed to rank players")?;
            for (i, player) in ranked.iter().enumerate() {
                println!("{:>3}. {}", i + 1, player);
            }
            Ok(())
        }
        Commands::Series { player, stat } => {
            let Some(category) = StatCategory::from_name(&stat) else {
                bail!("unknown stat `{stat}`");
            };
            let engine = build_engine(&config)?;
            let series = engine
                .weekly_series(&player, category, season)
                .await
                .context("failed to load weekly stats")?;
            println!("{player} {category} ({season})");
            for (i, value) in series.iter().enumerate() {
                match value {
                    Some(v) => println!("  week {:>2}: {:>7.1}", i + 1, v),
                    None => println!("  week {:>2}: {:>7}", i + 1, "-"),
                }
            }
            Ok(())
        }
        Commands::Defense { position } => defense(&config, season, &position).await,
        Commands::League => {
            let espn = build_espn(&config, season)?;
            let name = espn.league_name().await.context("failed to load league settings")?;
            println!("{name} ({season})");
            Ok(())
        }
        Commands::Standings => {
            let espn = build_espn(&config, season)?;
            let rows = espn.standings().await.context("failed to load standings")?;
            println!("{:<28} {:>3} {:>3} {:>8}", "Team", "W", "L", "PF");
            for row in rows.iter() {
                println!("{:<28} {:>3} {:>3} {:>8.1}", row.team, row.wins, row.losses, row.points_for);
            }
            Ok(())
        }
        Commands::Scoreboard => {
            let espn = build_espn(&config, season)?;
            let matchups = espn.scoreboard().await.context("failed to load scoreboard")?;
            for m in matchups.iter() {
                println!("{:<28} {:>7.2}  @  {:<28} {:>7.2}", m.away, m.away_score, m.home, m.home_score);
            }
            Ok(())
        }
        Commands::FreeAgents { position } => {
            let espn = build_espn(&config, season)?;
            let agents = espn
                .free_agents(position.as_deref())
                .await
                .context("failed to load free agents")?;
            println!("{:<28} {:<5} {:<4} {:>6}", "Player", "Pos", "Team", "Proj");
            for fa in agents.iter() {
                let proj = fa
                    .projected_points
                    .map(|p| format!("{p:.1}"))
                    .unwrap_or_else(|| "-".into());
                println!("{:<28} {:<5} {:<4} {:>6}", fa.name, fa.position, fa.pro_team, proj);
            }
            Ok(())
        }
        Commands::Usage { team: abbr, weeks } => {
            let abbr = abbr.to_uppercase();
            let loader = SupplementLoader::new(&config.supplement.dir);
            let usage = loader
                .team_usage(&abbr, weeks)
                .with_context(|| format!("failed to load usage data from {}", config.supplement.dir))?;
            println!("{}", team::display_name(&abbr));
            print_series("Air yards", &usage.air_yards);
            print_series("Snap %", &usage.snap_counts);
            Ok(())
        }
    }
}

fn build_engine(config: &Config) -> anyhow::Result<ProjectionEngine> {
    let provider = NflverseProvider::new(config.provider.clone()).context("failed to build stats provider")?;
    Ok(ProjectionEngine::new(
        Arc::new(provider),
        config.projection.min_sample,
        config.provider.cache_ttl(),
    ))
}

fn build_espn(config: &Config, season: u16) -> anyhow::Result<EspnClient> {
    if config.espn.league_id == 0 {
        bail!("espn.league_id is not set in config/huddle.toml");
    }
    EspnClient::new(&config.espn, &config.credentials, season, config.provider.timeout())
        .context("failed to build ESPN client")
}

async fn project(config: &Config, season: u16, player: &str) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let outcome = engine
        .project(player, season)
        .await
        .with_context(|| format!("projection for {player} failed"))?;

    let result = match outcome {
        ProjectionOutcome::Projected(result) => result,
        ProjectionOutcome::Abstained(reason) => {
            println!("{player}: no projection ({reason})");
            return Ok(());
        }
    };

    println!(
        "{} ({}) {}: mean {:.1}, std {:.1} over {} games",
        result.player,
        result.position,
        result.trend.category,
        result.trend.mean,
        result.trend.std,
        result.trend.sample_size
    );
    let fmt = |values: &[f64]| values.iter().map(|v| format!("{v:.1}")).collect::<Vec<_>>().join(", ");
    println!("  completed: [{}]", fmt(&result.completed_games));
    println!("  projected: [{}]", fmt(&result.future_projections));
    match result.average_projection() {
        Some(avg) => println!("  average:   {avg:.1}"),
        None => println!("  average:   - (no remaining games)"),
    }
    Ok(())
}

async fn batch(
    config: &Config,
    season: u16,
    players: Option<Vec<String>>,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let concurrency = concurrency.unwrap_or(config.projection.concurrency);
    let mut report = project_batch(
        &engine,
        players,
        season,
        concurrency,
        config.projection.default_batch_size,
    )
    .await;

    // Results arrive in completion order.
    report
        .entries
        .sort_by(|a, b| b.average_projection.total_cmp(&a.average_projection));

    println!("{:<28} {:<4} {:>8}", "Player", "Pos", "Avg");
    for entry in &report.entries {
        println!(
            "{:<28} {:<4} {:>8.1}",
            entry.player, entry.position, entry.average_projection
        );
    }
    if !report.excluded.is_empty() {
        println!("\n{} players excluded:", report.excluded.len());
        for ex in &report.excluded {
            println!("  {}: {:?}", ex.player, ex.reason);
        }
    }
    Ok(())
}

async fn defense(config: &Config, season: u16, position: &str) -> anyhow::Result<()> {
    let Some(position) = FantasyPosition::from_code(position) else {
        bail!("unsupported position `{position}` (expected RB, WR or TE)");
    };
    let engine = build_engine(config)?;
    let profiles = engine
        .defense_profiles(position.code(), season)
        .await
        .context("failed to compute defense profiles")?;

    let mut teams: Vec<_> = profiles.teams.values().collect();
    teams.sort_by(|a, b| b.allowed_mean.total_cmp(&a.allowed_mean));

    println!(
        "{} {} allowed, {}: league mean {:.1}, std {:.1}",
        position, profiles.category, season, profiles.league.allowed_mean, profiles.league.allowed_std
    );
    println!("{:<22} {:>8} {:>8} {:>6}", "Defense", "Mean", "Std", "z");
    for p in teams {
        let z = profiles.zscore(&p.team).unwrap_or_default();
        println!(
            "{:<22} {:>8.1} {:>8.1} {:>6.2}",
            team::display_name(&p.team),
            p.allowed_mean,
            p.allowed_std,
            z
        );
    }
    Ok(())
}

fn print_series(label: &str, rows: &[TeamSeries]) {
    println!("  {label}:");
    if rows.is_empty() {
        println!("    (no data)");
    }
    for row in rows {
        let cells: Vec<String> = row.weeks.iter().map(|(w, v)| format!("{w}={v}")).collect();
        println!("    {}", cells.join("  "));
    }
}

/// Initialize tracing to `logs/huddle.log`, or stderr when requested.
fn init_tracing(log_stderr: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huddle=info,warn"));

    if log_stderr {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        return tracing::subscriber::set_global_default(subscriber)
            .context("failed to set tracing subscriber");
    }

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("huddle.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use lol_analytics::collector::Collector;
use lol_analytics::config::{Config, TrackedSummoner};
use lol_analytics::db::{Repository, run_migrations};
use lol_analytics::error::AppError;
use lol_analytics::logging;
use lol_analytics::riot::RiotClient;

#[derive(Parser)]
#[command(name = "lol-analytics", about = "Collects Riot match data into a local warehouse")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the most recent matches for a summoner once and exit
    Collect {
        /// Riot ID of the summoner, as Name#TAG
        #[arg(long)]
        summoner: String,
        /// Number of recent matches to fetch
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
    /// Poll tracked summoners for active games until interrupted
    Live,
    /// Print rolling indicators and aggregate stats for a summoner
    Indicators {
        /// Summoner name as stored in the warehouse
        #[arg(long)]
        summoner: String,
        /// Maximum number of series points to print
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run(Cli::parse()).await {
        error!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_env()?;

    let db = Repository::connect(&config.database_url).await?;
    run_migrations(db.pool()).await?;

    let riot = RiotClient::new(config.riot_api_key.clone());
    let collector = Collector::new(riot, db.clone());

    match cli.command {
        Command::Collect { summoner, count } => {
            let target = TrackedSummoner::parse(&summoner, config.default_platform)?;
            let stored = collector.collect_history(&target, count).await?;
            info!(stored, "done");
        }
        Command::Live => {
            let poll_interval = Duration::from_secs(config.polling_interval_secs);
            tokio::select! {
                res = collector.run_live(&config.tracked_summoners, poll_interval) => res?,
                _ = tokio::signal::ctrl_c() => {
                    info!("🔄 interrupted, shutting down");
                }
            }
        }
        Command::Indicators { summoner, limit } => {
            print_indicators(&db, &summoner, limit).await?;
        }
    }

    Ok(())
}

async fn print_indicators(db: &Repository, summoner: &str, limit: i64) -> Result<(), AppError> {
    match db.player_stats(summoner).await? {
        Some(stats) => {
            println!("== {summoner} ==");
            println!(
                "games: {}  win rate: {:.0}%  avg KDA: {:.2}",
                stats.games_played,
                stats.win_rate * 100.0,
                stats.avg_kda
            );
            println!(
                "gold/min: {:.1}  damage/min: {:.1}  vision/min: {:.2}",
                stats.avg_gold_per_minute, stats.avg_damage_per_minute, stats.avg_vision_per_minute
            );
        }
        None => {
            println!("no stored matches for {summoner}");
            return Ok(());
        }
    }

    println!("\n-- champions --");
    for c in db.champion_performance(summoner).await? {
        println!(
            "{:<16} games: {:<3} avg KDA: {:.2}  win rate: {:.0}%",
            c.champion_name,
            c.games_played,
            c.avg_kda,
            c.win_rate * 100.0
        );
    }

    println!("\n-- RSI (14, KDA ratio) --");
    for p in db.rsi(summoner, limit).await? {
        match p.rsi {
            Some(rsi) => println!("{:<20} kda: {:>6.2}  rsi: {:>6.2}", p.match_id, p.kda_ratio, rsi),
            None => println!("{:<20} kda: {:>6.2}  rsi:      -", p.match_id, p.kda_ratio),
        }
    }

    println!("\n-- Bollinger Bands (20, gold/min) --");
    for p in db.bollinger_bands(summoner, limit).await? {
        match (p.lower_band, p.middle_band, p.upper_band) {
            (Some(lower), Some(middle), Some(upper)) => println!(
                "{:<20} gold/min: {:>7.1}  bands: {:>7.1} / {:>7.1} / {:>7.1}",
                p.match_id, p.gold_per_minute, lower, middle, upper
            ),
            _ => println!(
                "{:<20} gold/min: {:>7.1}  bands:       - /       - /       -",
                p.match_id, p.gold_per_minute
            ),
        }
    }

    Ok(())
}

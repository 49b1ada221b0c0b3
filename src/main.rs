use std::process::ExitCode;
use std::time::{Duration, SystemTime};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{Level, error, info};

use ladder::{IndexConfig, Leaderboard, RankInfo, RankingService};

/// Fill a leaderboard with random players and print the standard queries.
#[derive(Parser, Debug)]
#[command(name = "ladder", version)]
struct Args {
    /// Number of random players to submit.
    #[arg(long, default_value_t = 50)]
    players: usize,

    /// Seed for scores, timestamps, and skip list levels.
    #[arg(long)]
    seed: Option<u64>,

    /// How many entries to show for the top-N query.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Window size for the around-player query.
    #[arg(long, default_value_t = 10)]
    window: usize,

    /// Player to look up (defaults to the first generated player).
    #[arg(long)]
    player: Option<String>,

    /// Log every update.
    #[arg(short, long)]
    verbose: bool,
}

fn print_ranks(title: &str, ranks: &[RankInfo]) {
    println!("\n=== {} ===", title);
    for info in ranks {
        println!("  {}", info);
    }
}

fn run(args: &Args) -> ladder::leaderboard::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let config = IndexConfig {
        seed: args.seed,
        ..IndexConfig::default()
    };
    let board = Leaderboard::with_config(config);

    // Timestamps spread over a two minute window around now.
    let base = SystemTime::now() - Duration::from_secs(60);
    for i in 0..args.players {
        let player_id = format!("player{:03}", i);
        let score = rng.gen_range(0..200);
        let timestamp = base + Duration::from_secs(rng.gen_range(0..120));
        board.update_score(&player_id, score, timestamp)?;
    }
    let players = board.len()?;
    info!(players, "leaderboard filled");

    println!("{}", board.snapshot()?);
    print_ranks(&format!("top {}", args.top), &board.top_n(args.top)?);

    let player = args.player.clone().unwrap_or_else(|| "player000".to_string());
    let around = board.player_rank_range(&player, args.window)?;
    print_ranks(&format!("{} around {}", args.window, player), &around);

    let me = board.player_rank(&player)?;
    println!("\n{} is {}", player, me);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

//! BULWARK headless runner.
//!
//! Runs a combat session without a renderer, with an autopilot gunner
//! standing in for the player.
//!
//! # Usage
//!
//! ```bash
//! # Fixed-step run, one simulated minute, summary as JSON on stdout
//! cargo run -p bulwark-app -- run --frames 3600 --json
//!
//! # Real-time run on the game loop thread
//! cargo run -p bulwark-app -- live --seconds 20
//!
//! # Custom tuning
//! cargo run -p bulwark-app -- --config combat.json --seed 7 run
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to override the filter.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulwark_app::error::AppError;
use bulwark_app::game_loop::{spawn_game_loop, FRAME_RATE};
use bulwark_app::runner::{HeadlessRunner, RunOptions, RunSummary, DEFAULT_FRAME_MS};
use bulwark_app::state::{AppState, GameLoopCommand};
use bulwark_core::config::CombatConfig;

#[derive(Parser)]
#[command(name = "bulwark")]
#[command(about = "Headless BULWARK combat runner")]
#[command(version)]
struct Cli {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON combat config (missing fields use defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the config's RNG seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Autopilot fire interval in frames (0 disables the gunner)
    #[arg(long, global = true, default_value = "20")]
    fire_interval: u64,

    /// Polls each model load stays pending
    #[arg(long, global = true, default_value = "6")]
    load_latency: u32,

    /// Keep running after the shield collapses
    #[arg(long, global = true)]
    keep_going: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-step run as fast as possible
    Run {
        /// Frames to simulate
        #[arg(short, long, default_value = "3600")]
        frames: u64,

        /// Frame length in milliseconds
        #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
        frame_ms: f64,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Real-time run on the game loop thread
    Live {
        /// Wall-clock seconds to run
        #[arg(short, long, default_value = "30")]
        seconds: f64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = match &cli.config {
        Some(path) => CombatConfig::load(path)?,
        None => CombatConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let options = RunOptions {
        load_latency_polls: cli.load_latency,
        fire_interval_frames: (cli.fire_interval > 0).then_some(cli.fire_interval),
        stop_when_gone: !cli.keep_going,
        ..Default::default()
    };
    tracing::info!(seed = config.seed, "starting combat session");

    let command = cli.command.unwrap_or(Commands::Run {
        frames: 3600,
        frame_ms: DEFAULT_FRAME_MS,
        json: false,
    });
    let mut runner = HeadlessRunner::new(config, options)?;

    match command {
        Commands::Run {
            frames,
            frame_ms,
            json,
        } => {
            let summary = runner.run(frames, frame_ms);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                log_summary(&summary);
            }
        }
        Commands::Live { seconds } => {
            let state = AppState::new();
            let max_frames = (seconds.max(0.0) * f64::from(FRAME_RATE)).round() as u64;
            let (tx, handle) =
                spawn_game_loop(runner, Some(max_frames), state.latest_snapshot.clone())?;
            if let Ok(mut guard) = state.command_tx.lock() {
                *guard = Some(tx);
            }

            while !handle.is_finished() {
                std::thread::sleep(Duration::from_secs(1));
                if let Some(snapshot) = state.latest() {
                    tracing::info!(
                        t = format_args!("{:.1}s", snapshot.time.elapsed_secs),
                        ships = snapshot.active_ship_count,
                        shield = format_args!("{:.0}%", snapshot.shield.ratio * 100.0),
                        score = snapshot.score.score,
                        "status"
                    );
                }
            }
            state.send(GameLoopCommand::Shutdown);
            let summary = handle.join().map_err(|_| AppError::LoopPanicked)?;
            log_summary(&summary);
        }
    }
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        frames = summary.frames,
        seconds = format_args!("{:.1}", summary.elapsed_secs),
        score = summary.score.score,
        kills = ?summary.score.kills_by_type,
        spawned = summary.score.ships_spawned,
        load_failures = summary.score.loads_failed,
        shots = summary.shots_fired,
        shield = ?summary.shield.phase,
        shield_health = format_args!("{:.1}", summary.shield.health),
        "session summary"
    );
}

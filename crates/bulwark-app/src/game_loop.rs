//! Game loop thread: runs the combat engine at 60 Hz in real time.
//!
//! The runner is built on the caller's thread so config errors surface
//! there, then moved into the loop thread. Commands arrive over `mpsc`;
//! snapshots are stored in shared state for polling. Frame deltas are the
//! measured wall-clock time, so the engine sees real variable frames.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use bulwark_core::state::CombatSnapshot;

use crate::error::AppError;
use crate::runner::{HeadlessRunner, RunSummary};
use crate::state::GameLoopCommand;

/// Target frame rate.
pub const FRAME_RATE: u32 = 60;

/// Nominal duration of one frame.
pub const FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000 / FRAME_RATE as u64);

/// Start the loop thread. It stops after `max_frames` (if set), on
/// `Shutdown`, when the command channel closes, or when the runner reports
/// the session finished.
pub fn spawn_game_loop(
    runner: HeadlessRunner,
    max_frames: Option<u64>,
    latest_snapshot: Arc<Mutex<Option<CombatSnapshot>>>,
) -> Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<RunSummary>), AppError> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("bulwark-game-loop".into())
        .spawn(move || run_game_loop(runner, cmd_rx, max_frames, &latest_snapshot))?;

    Ok((cmd_tx, handle))
}

fn run_game_loop(
    mut runner: HeadlessRunner,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    max_frames: Option<u64>,
    latest_snapshot: &Mutex<Option<CombatSnapshot>>,
) -> RunSummary {
    let mut frames = 0u64;
    let mut last_frame = Instant::now();
    let mut next_frame_time = last_frame;

    loop {
        // 1. Drain pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => runner.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => return runner.summary(),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return runner.summary(),
            }
        }

        // 2. Advance by the measured frame time
        let now = Instant::now();
        let delta_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;
        let snapshot = runner.step(delta_ms).clone();

        // 3. Publish for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        frames += 1;
        if max_frames.is_some_and(|max| frames >= max) || runner.is_finished() {
            tracing::info!(frames, "game loop finished");
            return runner.summary();
        }

        // 4. Sleep until the next frame
        next_frame_time += FRAME_DURATION;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else if now - next_frame_time > FRAME_DURATION * 2 {
            // Too far behind; resync instead of catching up.
            next_frame_time = now;
        }
    }
}

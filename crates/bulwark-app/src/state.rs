//! State shared between the caller and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use bulwark_core::commands::PlayerCommand;
use bulwark_core::state::CombatSnapshot;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// Forward a player command to the combat engine.
    PlayerCommand(PlayerCommand),
    /// Stop the loop after the current frame.
    Shutdown,
}

/// Handles kept by whoever started the game loop.
///
/// `mpsc::Sender` is not `Sync`, hence the `Mutex`.
pub struct AppState {
    /// `None` until the loop is started.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Written by the loop thread after every frame.
    pub latest_snapshot: Arc<Mutex<Option<CombatSnapshot>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a command to the loop. False if the loop is not running.
    pub fn send(&self, command: GameLoopCommand) -> bool {
        match self.command_tx.lock() {
            Ok(guard) => guard
                .as_ref()
                .is_some_and(|tx| tx.send(command).is_ok()),
            Err(_) => false,
        }
    }

    /// Clone of the most recent snapshot, if any frame has run.
    pub fn latest(&self) -> Option<CombatSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|lock| lock.clone())
    }
}

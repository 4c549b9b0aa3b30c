//! Fixed-step headless runner.
//!
//! Wraps a `CombatEngine` with the headless scene, the scripted asset source
//! and an optional autopilot gunner.

use serde::{Deserialize, Serialize};

use bulwark_core::commands::PlayerCommand;
use bulwark_core::config::CombatConfig;
use bulwark_core::error::ConfigError;
use bulwark_core::state::{CombatSnapshot, ScoreView, ShieldView};
use bulwark_sim::assets::ScriptedAssetSource;
use bulwark_sim::scene::HeadlessScene;
use bulwark_sim::CombatEngine;

use crate::autopilot::Gunner;

/// Nominal 60 Hz frame.
pub const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Polls each model load stays pending.
    pub load_latency_polls: u32,
    /// Sub-part nodes per attached model.
    pub parts_per_model: usize,
    /// Autopilot fire interval in frames; `None` disables the gunner.
    pub fire_interval_frames: Option<u64>,
    /// Stop as soon as the shield collapse finishes.
    pub stop_when_gone: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            load_latency_polls: 6,
            parts_per_model: 2,
            fire_interval_frames: Some(20),
            stop_when_gone: true,
        }
    }
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed_secs: f64,
    pub session: u64,
    pub score: ScoreView,
    pub shield: ShieldView,
    pub active_ships: usize,
    pub shots_fired: u64,
}

pub struct HeadlessRunner {
    engine: CombatEngine<HeadlessScene, ScriptedAssetSource>,
    gunner: Option<Gunner>,
    stop_when_gone: bool,
    last_snapshot: Option<CombatSnapshot>,
}

impl HeadlessRunner {
    pub fn new(config: CombatConfig, options: RunOptions) -> Result<Self, ConfigError> {
        let engine = CombatEngine::new(
            config,
            HeadlessScene::new(options.parts_per_model),
            ScriptedAssetSource::new(options.load_latency_polls),
        )?;
        let mut runner = Self {
            engine,
            gunner: options.fire_interval_frames.map(Gunner::new),
            stop_when_gone: options.stop_when_gone,
            last_snapshot: None,
        };
        runner.engine.on_ship_destroyed(|ship_type| {
            tracing::debug!(?ship_type, "destroyed-ship hook fired");
        });
        Ok(runner)
    }

    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.engine.queue_command(command);
    }

    /// Advance one frame. The gunner reacts to the previous frame's snapshot.
    pub fn step(&mut self, delta_ms: f64) -> &CombatSnapshot {
        if let (Some(gunner), Some(snapshot)) = (self.gunner.as_mut(), self.last_snapshot.as_ref()) {
            if let Some(command) = gunner.aim(snapshot) {
                self.engine.queue_command(command);
            }
        }
        self.last_snapshot.insert(self.engine.advance(delta_ms))
    }

    /// Run up to `frames` frames of `frame_ms` each.
    pub fn run(&mut self, frames: u64, frame_ms: f64) -> RunSummary {
        for _ in 0..frames {
            self.step(frame_ms);
            if self.is_finished() {
                break;
            }
        }
        self.summary()
    }

    /// Shield gone and the runner was told to stop there.
    pub fn is_finished(&self) -> bool {
        self.stop_when_gone && self.engine.is_shield_gone()
    }

    pub fn engine(&self) -> &CombatEngine<HeadlessScene, ScriptedAssetSource> {
        &self.engine
    }

    pub fn summary(&self) -> RunSummary {
        let time = self.engine.time();
        let snapshot = self.engine.snapshot();
        RunSummary {
            frames: time.frame,
            elapsed_secs: time.elapsed_secs,
            session: snapshot.session,
            score: snapshot.score,
            shield: snapshot.shield,
            active_ships: snapshot.active_ship_count,
            shots_fired: self.gunner.as_ref().map_or(0, Gunner::shots_fired),
        }
    }
}

//! Autopilot gunner: stands in for the player's clicks in headless runs.

use bulwark_core::commands::PlayerCommand;
use bulwark_core::enums::LifecycleState;
use bulwark_core::state::CombatSnapshot;

/// Fires at the weakest Alive ship every `interval_frames` frames.
#[derive(Debug, Clone)]
pub struct Gunner {
    interval_frames: u64,
    frames_since_shot: u64,
    shots_fired: u64,
}

impl Gunner {
    pub fn new(interval_frames: u64) -> Self {
        Self {
            interval_frames: interval_frames.max(1),
            frames_since_shot: 0,
            shots_fired: 0,
        }
    }

    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    /// Look at the latest snapshot and decide whether to shoot.
    pub fn aim(&mut self, snapshot: &CombatSnapshot) -> Option<PlayerCommand> {
        self.frames_since_shot += 1;
        if self.frames_since_shot < self.interval_frames {
            return None;
        }

        let target = snapshot
            .ships
            .iter()
            .filter(|ship| ship.state == LifecycleState::Alive)
            .filter_map(|ship| ship.node.map(|node| (ship.health, ship.id, node)))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))?;

        self.frames_since_shot = 0;
        self.shots_fired += 1;
        Some(PlayerCommand::Fire { node: target.2 })
    }
}

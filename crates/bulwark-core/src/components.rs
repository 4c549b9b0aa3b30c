//! ECS components for hecs entities.
//!
//! Components are plain data. Game logic lives in systems; the only
//! methods here are read-only accessors on `AttackState`.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{BeamHandle, LoadTicket, ModelId, NodeId, ShipId};

/// Identity and type-derived stats of a hostile craft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub ship_type: ShipType,
    /// Score awarded when the ship is removed after being shot down.
    pub points: u32,
}

/// Hit points. `0 <= current <= max` at all times.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// Current lifecycle state of a ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifecycle {
    pub state: LifecycleState,
}

/// Index of the spawn slot this ship holds. Exactly one per ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef(pub usize);

/// World-space placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub orientation: DQuat,
}

/// Root scene node of a ship whose asset has resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Renderable {
    pub node: NodeId,
}

/// Outstanding asset acquisition for a Loading ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub model: ModelId,
}

/// Alive-ship drift schedule: move for a while, pause for a while.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Movement {
    pub phase: MovePhase,
    /// Seconds left in the current phase.
    pub phase_remaining: f64,
    /// Drift velocity while moving (units/s).
    pub velocity: DVec3,
    /// Slot position the ship drifts around.
    pub anchor: DVec3,
    /// Accumulated drift from the anchor.
    pub drift: DVec3,
    /// Bob oscillator phase (radians), runs in both phases.
    pub bob_phase: f64,
}

/// Death-fall state of a Dying ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fall {
    /// Downward speed (units/s), grows every frame.
    pub speed: f64,
    /// Per-axis spin rate (rad/s).
    pub spin_rate: DVec3,
    /// Accumulated per-axis rotation (rad).
    pub spin: DVec3,
    /// Orientation at the moment the ship was shot down.
    pub base_orientation: DQuat,
}

/// Per-ship attack state. The beam handle only exists while firing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackState {
    Cooldown { remaining: f64 },
    Charging { remaining: f64 },
    Firing { remaining: f64, beam: BeamHandle },
}

impl AttackState {
    pub fn mode(&self) -> AttackMode {
        match self {
            AttackState::Cooldown { .. } => AttackMode::Cooldown,
            AttackState::Charging { .. } => AttackMode::Charging,
            AttackState::Firing { .. } => AttackMode::Firing,
        }
    }

    pub fn beam(&self) -> Option<BeamHandle> {
        match self {
            AttackState::Firing { beam, .. } => Some(*beam),
            AttackState::Cooldown { .. } | AttackState::Charging { .. } => None,
        }
    }
}

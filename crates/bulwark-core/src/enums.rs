//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Hostile craft class. The numeric type id is what score and UI layers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipType {
    Light,
    Medium,
    Heavy,
}

impl ShipType {
    pub const ALL: [ShipType; 3] = [ShipType::Light, ShipType::Medium, ShipType::Heavy];

    /// Numeric type id (1 = light, 2 = medium, 3 = heavy).
    pub fn type_id(self) -> u8 {
        match self {
            ShipType::Light => 1,
            ShipType::Medium => 2,
            ShipType::Heavy => 3,
        }
    }

    pub fn from_type_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(ShipType::Light),
            2 => Some(ShipType::Medium),
            3 => Some(ShipType::Heavy),
            _ => None,
        }
    }

    /// Zero-based index for per-type tables.
    pub fn index(self) -> usize {
        self.type_id() as usize - 1
    }
}

/// Ship lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Slot held, no asset requested yet.
    Reserved,
    /// Asset requested, waiting for the template.
    Loading,
    /// Rendered; moves, attacks, takes player damage.
    Alive,
    /// Falling after destruction, non-interactive.
    Dying,
    /// Terminal. Slot released, awaiting despawn.
    Removed,
}

/// Attack controller mode, as exposed to views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackMode {
    #[default]
    Cooldown,
    Charging,
    Firing,
}

/// Alive-ship movement schedule phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePhase {
    Moving,
    Paused,
}

/// Shield state. Destroyed and Gone are one-way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldPhase {
    #[default]
    Intact,
    /// Health reached zero; the collapse timeline is running.
    Destroyed,
    /// Collapse finished; no longer rendered or collidable.
    Gone,
}

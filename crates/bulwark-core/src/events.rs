//! Events emitted by the simulation for score, audio and UI feedback.
//!
//! Drained into each snapshot; the core never reacts to its own events.

use serde::{Deserialize, Serialize};

use crate::enums::ShipType;
use crate::types::{ModelId, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A slot was reserved and the ship's model requested.
    ShipReserved { ship: ShipId, ship_type: ShipType },
    /// The model arrived; the ship is now in play.
    ShipArrived { ship: ShipId, ship_type: ShipType },
    /// The model failed to load; the reservation was released.
    ShipLoadFailed { ship: ShipId, model: ModelId },
    /// A player hit landed.
    ShipHit { ship: ShipId, health: f64 },
    /// Health reached zero; the ship started falling.
    ShipDowned { ship: ShipId, ship_type: ShipType },
    /// The wreck fell out of the world and was scored.
    ShipDestroyed {
        ship: ShipId,
        ship_type: ShipType,
        points: u32,
    },
    /// A ship opened fire on the shield.
    BeamStarted { ship: ShipId },
    /// A beam was released (burst ended or the ship was interrupted).
    BeamStopped { ship: ShipId },
    /// Shield health reached zero.
    ShieldDestroyed,
    /// Shield collapse finished.
    ShieldGone,
}

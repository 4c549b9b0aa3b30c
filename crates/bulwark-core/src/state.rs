//! Combat snapshot: the complete visible state handed to the renderer each frame.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::{NodeId, ShipId, SimTime};

/// Complete state broadcast after each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub session: u64,
    pub ships: Vec<ShipView>,
    pub slots: Vec<SlotView>,
    pub shield: ShieldView,
    pub score: ScoreView,
    /// Alive ships (what the radar shows).
    pub active_ship_count: usize,
    /// Outstanding asset acquisitions.
    pub in_flight_loads: usize,
    pub events: Vec<CombatEvent>,
}

/// One ship, in any lifecycle state but Removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: ShipId,
    pub ship_type: ShipType,
    pub state: LifecycleState,
    pub slot: usize,
    pub position: DVec3,
    pub orientation: DQuat,
    pub health: f64,
    pub max_health: f64,
    /// Root scene node once the model has resolved.
    pub node: Option<NodeId>,
    /// Attack mode for Alive ships.
    pub attack: Option<AttackMode>,
    pub beam_active: bool,
    pub moving: bool,
}

/// Spawn slot occupancy (for debug overlays).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotView {
    pub position: DVec3,
    pub occupied: bool,
}

/// Shield health and the derived visual parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldView {
    pub phase: ShieldPhase,
    pub health: f64,
    pub max_health: f64,
    /// `health / max_health`, always in [0, 1].
    pub ratio: f64,
    /// Dome radius before any collapse scaling.
    pub radius: f64,
    pub destroy_timer: f64,
    pub hit_flash_remaining: f64,
    pub emissive_intensity: f64,
    /// True while the hit flash is active or the dome is collapsing.
    pub hot: bool,
    pub scale: f64,
    pub opacity: f64,
    pub camera_shake: f64,
}

impl Default for ShieldView {
    fn default() -> Self {
        Self {
            phase: ShieldPhase::Intact,
            health: 0.0,
            max_health: 0.0,
            ratio: 0.0,
            radius: 0.0,
            destroy_timer: 0.0,
            hit_flash_remaining: 0.0,
            emissive_intensity: 0.0,
            hot: false,
            scale: 1.0,
            opacity: 0.0,
            camera_shake: 0.0,
        }
    }
}

/// Running score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub score: u32,
    /// Kills indexed by `ShipType::index()`.
    pub kills_by_type: [u32; 3],
    pub ships_spawned: u32,
    pub loads_failed: u32,
}

//! Simulation constants and tuning parameters.
//!
//! World units are scene units (roughly meters), y is up, the player
//! weapon looks down -z toward the shield.

use glam::DVec3;

// --- Frame ---

/// Longest frame the simulation will integrate in one step (seconds).
/// Larger deltas (tab switches, debugger pauses) are clamped.
pub const MAX_FRAME_SECS: f64 = 0.25;

// --- World layout ---

/// Centre of the shield dome base.
pub const SHIELD_CENTER: DVec3 = DVec3::new(0.0, -5.0, -10.0);

/// Position of the player weapon (camera rig).
pub const WEAPON_POSITION: DVec3 = DVec3::new(0.0, 10.0, 20.0);

/// Direction the shield "faces" (toward the weapon), horizontal.
pub const SHIELD_FORWARD: DVec3 = DVec3::new(0.0, 0.0, 1.0);

// --- Spawning ---

/// Upper bound on Alive + in-flight ships.
pub const MAX_ACTIVE_SHIPS: usize = 4;

/// Below this many Alive + in-flight ships, top up immediately.
pub const MIN_ACTIVE_SHIPS: usize = 2;

/// Global cap on simultaneously outstanding asset acquisitions.
pub const MAX_CONCURRENT_LOADS: usize = 2;

/// Periodic opportunistic spawn interval (seconds).
pub const SPAWN_INTERVAL_SECS: f64 = 1.2;

/// Slots closer than this to the weapon are never used.
pub const MIN_WEAPON_DISTANCE: f64 = 8.0;

/// Minimum distance between a new slot and any live ship.
pub const MIN_SHIP_SEPARATION: f64 = 6.0;

/// Half-angle of the spawn cone in front of the shield (radians, ~100°).
pub const SPAWN_CONE_HALF_ANGLE: f64 = 1.745;

/// Relaxed half-angle for sufficiently elevated slots (radians, ~140°).
pub const RELAXED_CONE_HALF_ANGLE: f64 = 2.443;

/// Height above the shield centre at which the relaxed cone applies.
pub const CONE_RELAXATION_ELEVATION: f64 = 6.0;

/// Number of slots in the default ring.
pub const SLOT_RING_COUNT: usize = 12;

/// Horizontal distance of ring slots from the shield centre.
pub const SLOT_RING_RADIUS: f64 = 21.0;

/// Slot height range above the shield centre.
pub const SLOT_HEIGHT_MIN: f64 = 3.0;
pub const SLOT_HEIGHT_MAX: f64 = 8.0;

// --- Ship types ---

pub const LIGHT_MAX_HEALTH: f64 = 30.0;
pub const LIGHT_POINTS: u32 = 10;
pub const LIGHT_SPAWN_WEIGHT: f64 = 0.5;
pub const LIGHT_BEAM_DPS: f64 = 5.0;

pub const MEDIUM_MAX_HEALTH: f64 = 60.0;
pub const MEDIUM_POINTS: u32 = 25;
pub const MEDIUM_SPAWN_WEIGHT: f64 = 0.35;
pub const MEDIUM_BEAM_DPS: f64 = 12.0;

pub const HEAVY_MAX_HEALTH: f64 = 120.0;
pub const HEAVY_POINTS: u32 = 60;
pub const HEAVY_SPAWN_WEIGHT: f64 = 0.15;
pub const HEAVY_BEAM_DPS: f64 = 25.0;

/// Beam damage per second for type ids outside the table.
pub const DEFAULT_BEAM_DPS: f64 = LIGHT_BEAM_DPS;

/// Damage of one player weapon hit.
pub const PLAYER_HIT_DAMAGE: f64 = 15.0;

// --- Attack ---

/// How long one beam burst lasts (seconds).
pub const FIRE_DURATION_SECS: f64 = 0.6;

/// Initial cooldown range when a ship becomes Alive (seconds).
pub const INITIAL_COOLDOWN_MIN: f64 = 0.0;
pub const INITIAL_COOLDOWN_MAX: f64 = 1.0;

/// Cooldown range after a burst (seconds).
pub const COOLDOWN_MIN: f64 = 2.0;
pub const COOLDOWN_MAX: f64 = 4.0;

// --- Movement ---

pub const MOVE_PHASE_MIN: f64 = 1.0;
pub const MOVE_PHASE_MAX: f64 = 3.0;
pub const PAUSE_PHASE_MIN: f64 = 1.0;
pub const PAUSE_PHASE_MAX: f64 = 2.0;

/// Max horizontal drift speed per axis (units/s).
pub const DRIFT_SPEED_HORIZONTAL: f64 = 0.6;

/// Max vertical drift speed (units/s).
pub const DRIFT_SPEED_VERTICAL: f64 = 0.3;

/// Ships never drift further than this from their slot.
pub const MAX_DRIFT: f64 = 3.0;

pub const BOB_AMPLITUDE: f64 = 0.15;

/// Bob angular rate (rad/s).
pub const BOB_RATE: f64 = 2.0;

// --- Death fall ---

pub const FALL_INITIAL_SPEED: f64 = 1.2;

/// Fall acceleration (units/s²).
pub const FALL_GRAVITY: f64 = 9.0;

/// Max per-axis spin rate of a falling wreck (rad/s).
pub const FALL_SPIN_MAX: f64 = 3.0;

/// A falling ship is removed once below this height.
pub const DEATH_DEPTH: f64 = -20.0;

// --- Shield ---

pub const SHIELD_MAX_HEALTH: f64 = 100.0;
pub const SHIELD_RADIUS: f64 = 12.0;

/// Hit-flash window (seconds).
pub const HIT_FLASH_SECS: f64 = 0.15;

pub const EMISSIVE_BASELINE: f64 = 0.9;
pub const EMISSIVE_HOT: f64 = 3.0;

/// Fraction of the gap to baseline closed per reference frame.
pub const EMISSIVE_EASE_PER_FRAME: f64 = 0.14;

/// Frame rate the ease factor is expressed at.
pub const EASE_REFERENCE_HZ: f64 = 60.0;

/// Destruction timeline: intensity ramp ends, collapse begins.
pub const DESTROY_RAMP_SECS: f64 = 0.5;

/// Destruction timeline: shield is gone.
pub const DESTROY_GONE_SECS: f64 = 1.3;

pub const DESTROY_EMISSIVE_START: f64 = 1.0;
pub const DESTROY_EMISSIVE_PEAK: f64 = 4.0;

/// Scale the dome collapses toward (never zero).
pub const DESTROY_SCALE_FLOOR: f64 = 0.05;

pub const SHIELD_BASE_OPACITY: f64 = 0.2;

/// Camera shake at the moment of destruction, fades to zero at gone.
pub const DESTROY_SHAKE_MAX: f64 = 0.15;

// --- Scene ---

/// Bound on parent hops when resolving a hit node to its ship.
pub const MAX_PARENT_WALK: usize = 32;

//! Tunable configuration for a combat session.
//!
//! `Default` reproduces the constants in [`crate::constants`]. Every struct
//! is `#[serde(default)]`, so a JSON file only needs the fields it changes.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Closed interval used for random draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: f64,
    pub max: f64,
}

impl SecondsRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min < 0.0 || self.min > self.max
        {
            return Err(ConfigError::Invalid(format!(
                "{name}: expected 0 <= min <= max, got {}..{}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// RNG seed. Same seed and same frame deltas give the same session.
    pub seed: u64,
    pub spawn: SpawnConfig,
    pub ships: ShipConfig,
    pub attack: AttackConfig,
    pub shield: ShieldConfig,
}

/// Spawn capacity and slot geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub min_active_ships: usize,
    pub max_active_ships: usize,
    pub max_concurrent_loads: usize,
    pub spawn_interval_secs: f64,
    pub weapon_position: DVec3,
    pub forward: DVec3,
    pub min_weapon_distance: f64,
    pub min_separation: f64,
    pub cone_half_angle: f64,
    pub relaxed_cone_half_angle: f64,
    pub relaxation_elevation: f64,
    pub layout: SlotLayout,
}

/// Candidate slot generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SlotLayout {
    /// Evenly spaced ring around the shield with random heights.
    Ring {
        count: usize,
        radius: f64,
        height_min: f64,
        height_max: f64,
    },
    /// Elevation/azimuth grid on a sphere around the shield.
    Grid {
        radius: f64,
        /// Elevation angles in radians above the horizon.
        elevations: Vec<f64>,
        azimuth_count: usize,
    },
}

/// Ship behaviour that is not per-type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub player_hit_damage: f64,
    pub move_phase: SecondsRange,
    pub pause_phase: SecondsRange,
    pub drift_speed_horizontal: f64,
    pub drift_speed_vertical: f64,
    pub max_drift: f64,
    pub bob_amplitude: f64,
    pub bob_rate: f64,
    pub fall_initial_speed: f64,
    pub fall_gravity: f64,
    pub fall_spin_max: f64,
    pub death_depth: f64,
}

/// Attack controller timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub fire_duration_secs: f64,
    pub initial_cooldown: SecondsRange,
    pub cooldown: SecondsRange,
    /// When set, ships charge for this long between cooldown and firing.
    pub charge_duration_secs: Option<f64>,
}

/// Shield dome parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    pub max_health: f64,
    pub center: DVec3,
    pub radius: f64,
    pub hit_flash_secs: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            spawn: SpawnConfig::default(),
            ships: ShipConfig::default(),
            attack: AttackConfig::default(),
            shield: ShieldConfig::default(),
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_active_ships: MIN_ACTIVE_SHIPS,
            max_active_ships: MAX_ACTIVE_SHIPS,
            max_concurrent_loads: MAX_CONCURRENT_LOADS,
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            weapon_position: WEAPON_POSITION,
            forward: SHIELD_FORWARD,
            min_weapon_distance: MIN_WEAPON_DISTANCE,
            min_separation: MIN_SHIP_SEPARATION,
            cone_half_angle: SPAWN_CONE_HALF_ANGLE,
            relaxed_cone_half_angle: RELAXED_CONE_HALF_ANGLE,
            relaxation_elevation: CONE_RELAXATION_ELEVATION,
            layout: SlotLayout::default(),
        }
    }
}

impl Default for SlotLayout {
    fn default() -> Self {
        SlotLayout::Ring {
            count: SLOT_RING_COUNT,
            radius: SLOT_RING_RADIUS,
            height_min: SLOT_HEIGHT_MIN,
            height_max: SLOT_HEIGHT_MAX,
        }
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            player_hit_damage: PLAYER_HIT_DAMAGE,
            move_phase: SecondsRange::new(MOVE_PHASE_MIN, MOVE_PHASE_MAX),
            pause_phase: SecondsRange::new(PAUSE_PHASE_MIN, PAUSE_PHASE_MAX),
            drift_speed_horizontal: DRIFT_SPEED_HORIZONTAL,
            drift_speed_vertical: DRIFT_SPEED_VERTICAL,
            max_drift: MAX_DRIFT,
            bob_amplitude: BOB_AMPLITUDE,
            bob_rate: BOB_RATE,
            fall_initial_speed: FALL_INITIAL_SPEED,
            fall_gravity: FALL_GRAVITY,
            fall_spin_max: FALL_SPIN_MAX,
            death_depth: DEATH_DEPTH,
        }
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            fire_duration_secs: FIRE_DURATION_SECS,
            initial_cooldown: SecondsRange::new(INITIAL_COOLDOWN_MIN, INITIAL_COOLDOWN_MAX),
            cooldown: SecondsRange::new(COOLDOWN_MIN, COOLDOWN_MAX),
            charge_duration_secs: None,
        }
    }
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            max_health: SHIELD_MAX_HEALTH,
            center: SHIELD_CENTER,
            radius: SHIELD_RADIUS,
            hit_flash_secs: HIT_FLASH_SECS,
        }
    }
}

impl CombatConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Reject configurations that would break the simulation invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let spawn = &self.spawn;
        if spawn.max_active_ships == 0 {
            return Err(ConfigError::Invalid("spawn.max_active_ships must be > 0".into()));
        }
        if spawn.min_active_ships > spawn.max_active_ships {
            return Err(ConfigError::Invalid(format!(
                "spawn.min_active_ships ({}) exceeds max_active_ships ({})",
                spawn.min_active_ships, spawn.max_active_ships
            )));
        }
        if spawn.max_concurrent_loads == 0 {
            return Err(ConfigError::Invalid(
                "spawn.max_concurrent_loads must be > 0".into(),
            ));
        }
        positive("spawn.spawn_interval_secs", spawn.spawn_interval_secs)?;
        non_negative("spawn.min_weapon_distance", spawn.min_weapon_distance)?;
        non_negative("spawn.min_separation", spawn.min_separation)?;
        if spawn.forward.length_squared() == 0.0 {
            return Err(ConfigError::Invalid("spawn.forward must be non-zero".into()));
        }
        match &spawn.layout {
            SlotLayout::Ring {
                count,
                radius,
                height_min,
                height_max,
            } => {
                if *count == 0 {
                    return Err(ConfigError::Invalid("ring layout needs at least one slot".into()));
                }
                positive("spawn.layout.radius", *radius)?;
                SecondsRange::new(*height_min, *height_max).check("spawn.layout.height")?;
            }
            SlotLayout::Grid {
                radius,
                elevations,
                azimuth_count,
            } => {
                if elevations.is_empty() || *azimuth_count == 0 {
                    return Err(ConfigError::Invalid("grid layout needs at least one slot".into()));
                }
                positive("spawn.layout.radius", *radius)?;
            }
        }

        let ships = &self.ships;
        positive("ships.player_hit_damage", ships.player_hit_damage)?;
        ships.move_phase.check("ships.move_phase")?;
        ships.pause_phase.check("ships.pause_phase")?;
        non_negative("ships.max_drift", ships.max_drift)?;
        positive("ships.fall_initial_speed", ships.fall_initial_speed)?;
        positive("ships.fall_gravity", ships.fall_gravity)?;

        let attack = &self.attack;
        positive("attack.fire_duration_secs", attack.fire_duration_secs)?;
        attack.initial_cooldown.check("attack.initial_cooldown")?;
        attack.cooldown.check("attack.cooldown")?;
        if let Some(charge) = attack.charge_duration_secs {
            positive("attack.charge_duration_secs", charge)?;
        }

        positive("shield.max_health", self.shield.max_health)?;
        positive("shield.radius", self.shield.radius)?;
        positive("shield.hit_flash_secs", self.shield.hit_flash_secs)?;
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")))
    }
}

//! Type-specific ship profiles.
//!
//! Consolidates per-type parameters for spawning, scoring and the attack FSM.

use rand::Rng;

use bulwark_core::constants::*;
use bulwark_core::enums::ShipType;
use bulwark_core::types::ModelId;

/// Stats for one ship type.
pub struct ShipProfile {
    pub max_health: f64,
    /// Score awarded on destruction.
    pub points: u32,
    /// Relative weight in the spawn draw.
    pub spawn_weight: f64,
    /// Shield damage per second while firing.
    pub beam_dps: f64,
    /// Model requested from the asset source.
    pub model: &'static str,
}

/// Get the profile for a given ship type.
pub fn get_profile(ship_type: ShipType) -> ShipProfile {
    match ship_type {
        ShipType::Light => ShipProfile {
            max_health: LIGHT_MAX_HEALTH,
            points: LIGHT_POINTS,
            spawn_weight: LIGHT_SPAWN_WEIGHT,
            beam_dps: LIGHT_BEAM_DPS,
            model: "/models/ship_light.glb",
        },
        ShipType::Medium => ShipProfile {
            max_health: MEDIUM_MAX_HEALTH,
            points: MEDIUM_POINTS,
            spawn_weight: MEDIUM_SPAWN_WEIGHT,
            beam_dps: MEDIUM_BEAM_DPS,
            model: "/models/ship_medium.glb",
        },
        ShipType::Heavy => ShipProfile {
            max_health: HEAVY_MAX_HEALTH,
            points: HEAVY_POINTS,
            spawn_weight: HEAVY_SPAWN_WEIGHT,
            beam_dps: HEAVY_BEAM_DPS,
            model: "/models/ship_heavy.glb",
        },
    }
}

/// Beam damage per second by numeric type id. Unknown ids get the light-ship rate.
pub fn beam_dps_for_type_id(type_id: u8) -> f64 {
    match ShipType::from_type_id(type_id) {
        Some(ship_type) => get_profile(ship_type).beam_dps,
        None => DEFAULT_BEAM_DPS,
    }
}

pub fn model_id(ship_type: ShipType) -> ModelId {
    ModelId::new(get_profile(ship_type).model)
}

/// Weighted draw over ship types (light 0.5, medium 0.35, heavy 0.15).
pub fn pick_ship_type(rng: &mut impl Rng) -> ShipType {
    let total: f64 = ShipType::ALL
        .iter()
        .map(|t| get_profile(*t).spawn_weight)
        .sum();
    let roll = rng.gen::<f64>() * total;

    let mut acc = 0.0;
    for ship_type in ShipType::ALL {
        acc += get_profile(ship_type).spawn_weight;
        if roll < acc {
            return ship_type;
        }
    }
    ShipType::Light
}

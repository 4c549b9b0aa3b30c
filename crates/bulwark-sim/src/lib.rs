//! Combat simulation engine for BULWARK.
//!
//! Owns the hecs ECS world, the spawn slot pool, the asset cache and the
//! shield, advances everything once per rendered frame, and produces
//! `CombatSnapshot`s for the renderer.

pub mod assets;
pub mod context;
pub mod engine;
pub mod scene;
pub mod score;
pub mod shield;
pub mod slots;
pub mod systems;
pub mod world_setup;

pub use bulwark_core as core;
pub use engine::CombatEngine;
pub use systems::lifecycle::HitOutcome;

#[cfg(test)]
mod tests;

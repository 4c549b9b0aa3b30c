//! ECS systems that operate on the combat world each frame.
//!
//! Systems are free functions over the `SimContext` (and the scene graph or
//! asset source where they touch the renderer). They own no state.

pub mod attack;
pub mod cleanup;
pub mod lifecycle;
pub mod movement;
pub mod snapshot;
pub mod spawner;

//! BULWARK headless runner.
//!
//! Wires the combat engine to headless collaborators, an autopilot gunner
//! and a fixed-rate game loop thread. The `bulwark` binary drives it from
//! the command line.

pub mod autopilot;
pub mod error;
pub mod game_loop;
pub mod runner;
pub mod state;

pub use bulwark_core as core;

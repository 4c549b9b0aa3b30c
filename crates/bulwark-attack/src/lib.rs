//! Attack behaviour for BULWARK ships.
//!
//! Implements the per-ship attack state machine and the per-type ship
//! profiles (health, score, spawn weight, beam damage).

pub mod fsm;
pub mod profiles;

pub use bulwark_core as core;

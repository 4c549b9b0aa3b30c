//! Core types and definitions for the BULWARK combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, configuration, errors, snapshot views, events,
//! and constants. It has no dependency on a renderer or runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;

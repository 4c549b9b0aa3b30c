//! Player commands sent from the input layer to the simulation.
//!
//! Commands are queued and processed at the start of the next frame.

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// The weapon fired and the hit test resolved to this scene node.
    Fire { node: NodeId },
    /// Freeze the simulation (frames still produce snapshots).
    Pause,
    /// Resume after a pause.
    Resume,
    /// Tear down every ship and start a fresh session.
    Reset,
}

//! Score tracking.

use bulwark_core::enums::ShipType;
use bulwark_core::state::ScoreView;

#[derive(Debug, Clone, Default)]
pub struct ScoreState {
    pub score: u32,
    pub kills_by_type: [u32; 3],
    pub ships_spawned: u32,
    pub loads_failed: u32,
}

impl ScoreState {
    pub fn record_kill(&mut self, ship_type: ShipType, points: u32) {
        self.score = self.score.saturating_add(points);
        self.kills_by_type[ship_type.index()] += 1;
    }

    pub fn total_kills(&self) -> u32 {
        self.kills_by_type.iter().sum()
    }

    pub fn view(&self) -> ScoreView {
        ScoreView {
            score: self.score,
            kills_by_type: self.kills_by_type,
            ships_spawned: self.ships_spawned,
            loads_failed: self.loads_failed,
        }
    }
}

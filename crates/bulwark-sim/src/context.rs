//! Mutable simulation state shared by the systems.
//!
//! Everything here is owned by one `CombatEngine`; the scene graph and the
//! asset source are passed alongside because they are generic collaborators.

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::{Lifecycle, Transform};
use bulwark_core::config::CombatConfig;
use bulwark_core::enums::LifecycleState;
use bulwark_core::events::CombatEvent;
use bulwark_core::types::{LoadTicket, NodeId, ShipId, SimTime};

use crate::assets::AssetCache;
use crate::score::ScoreState;
use crate::shield::Shield;
use crate::slots::{SlotConstraints, SlotPool};
use crate::world_setup;

/// A load the spawner is still waiting on.
#[derive(Debug, Clone, Copy)]
pub struct PendingSpawn {
    pub entity: Entity,
    /// Session the request was made in.
    pub session: u64,
}

#[derive(Debug, Default)]
pub struct SpawnState {
    /// Seconds until the next periodic spawn attempt.
    pub timer: f64,
    pub pending: BTreeMap<LoadTicket, PendingSpawn>,
}

pub struct SimContext {
    pub world: World,
    pub config: CombatConfig,
    pub rng: ChaCha8Rng,
    pub slots: SlotPool,
    pub assets: AssetCache,
    pub spawn: SpawnState,
    pub shield: Shield,
    pub score: ScoreState,
    pub events: Vec<CombatEvent>,
    /// Root node of every Alive ship.
    pub node_index: HashMap<NodeId, Entity>,
    pub next_ship_id: u32,
    pub session: u64,
    pub time: SimTime,
}

impl SimContext {
    pub fn new(config: CombatConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let slots = world_setup::build_slot_pool(&config, &mut rng);
        Self {
            world: World::new(),
            rng,
            slots,
            assets: AssetCache::new(config.spawn.max_concurrent_loads),
            spawn: SpawnState {
                timer: config.spawn.spawn_interval_secs,
                pending: BTreeMap::new(),
            },
            shield: Shield::new(&config.shield),
            score: ScoreState::default(),
            events: Vec::new(),
            node_index: HashMap::new(),
            next_ship_id: 0,
            session: 0,
            time: SimTime::default(),
            config,
        }
    }

    pub fn next_ship_id(&mut self) -> ShipId {
        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;
        id
    }

    /// Ships currently Alive.
    pub fn alive_count(&self) -> usize {
        self.world
            .query::<&Lifecycle>()
            .iter()
            .filter(|(_, lifecycle)| lifecycle.state == LifecycleState::Alive)
            .count()
    }

    /// Positions of every ship that has not been removed.
    pub fn live_positions(&self) -> Vec<DVec3> {
        self.world
            .query::<(&Lifecycle, &Transform)>()
            .iter()
            .filter(|(_, (lifecycle, _))| lifecycle.state != LifecycleState::Removed)
            .map(|(_, (_, transform))| transform.position)
            .collect()
    }

    /// Slot filter built from the spawn config and the given live positions.
    pub fn slot_constraints<'a>(&self, live_positions: &'a [DVec3]) -> SlotConstraints<'a> {
        let spawn = &self.config.spawn;
        SlotConstraints {
            weapon_position: spawn.weapon_position,
            min_weapon_distance: spawn.min_weapon_distance,
            shield_center: self.config.shield.center,
            forward: spawn.forward,
            cone_half_angle: spawn.cone_half_angle,
            relaxed_cone_half_angle: spawn.relaxed_cone_half_angle,
            relaxation_elevation: spawn.relaxation_elevation,
            min_separation: spawn.min_separation,
            live_positions,
        }
    }
}

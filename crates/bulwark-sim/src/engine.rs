//! Combat engine: the arbiter of a combat session.
//!
//! `CombatEngine` owns the hecs world, the slot pool, the asset cache, the
//! shield and the RNG, processes player commands, runs all systems once per
//! rendered frame and produces `CombatSnapshot`s. The renderer and the asset
//! loader are injected, so the engine runs headless in tests.

use std::collections::VecDeque;

use hecs::World;

use bulwark_core::commands::PlayerCommand;
use bulwark_core::components::{AttackState, Renderable};
use bulwark_core::config::CombatConfig;
use bulwark_core::constants::MAX_FRAME_SECS;
use bulwark_core::enums::ShipType;
use bulwark_core::error::ConfigError;
use bulwark_core::events::CombatEvent;
use bulwark_core::state::CombatSnapshot;
use bulwark_core::types::{NodeId, ShipId, SimTime};

use crate::assets::AssetSource;
use crate::context::SimContext;
use crate::scene::SceneGraph;
use crate::score::ScoreState;
use crate::shield::Shield;
use crate::slots::SlotPool;
use crate::systems;
use crate::systems::lifecycle::HitOutcome;

/// Callback invoked with the type of every ship reaped after being shot down.
pub type ShipDestroyedHook = Box<dyn FnMut(ShipType) + Send>;

pub struct CombatEngine<S: SceneGraph, A: AssetSource> {
    ctx: SimContext,
    scene: S,
    source: A,
    paused: bool,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    on_destroyed: Option<ShipDestroyedHook>,
}

impl<S: SceneGraph, A: AssetSource> CombatEngine<S, A> {
    /// Validate `config` and build an engine around the given collaborators.
    pub fn new(config: CombatConfig, scene: S, source: A) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(seed = config.seed, "combat engine created");
        Ok(Self {
            ctx: SimContext::new(config),
            scene,
            source,
            paused: false,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            on_destroyed: None,
        })
    }

    /// Queue a player command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Advance the simulation by one rendered frame of `delta_ms`
    /// milliseconds and return the resulting snapshot.
    ///
    /// Negative or non-finite deltas count as zero; long frames are clamped.
    pub fn advance(&mut self, delta_ms: f64) -> CombatSnapshot {
        let dt = frame_secs(delta_ms);
        self.process_commands();

        if !self.paused {
            self.run_systems(dt);
            self.ctx.time.advance(dt);
        }

        let events = std::mem::take(&mut self.ctx.events);
        systems::snapshot::build_snapshot(&self.ctx, self.paused, events)
    }

    /// Current state without advancing. Pending events stay queued.
    pub fn snapshot(&self) -> CombatSnapshot {
        systems::snapshot::build_snapshot(&self.ctx, self.paused, Vec::new())
    }

    /// Top the active count up to the configured band.
    pub fn spawn_if_needed(&mut self) {
        systems::spawner::spawn_if_needed(&mut self.ctx, &mut self.source);
    }

    /// Attempt to create a single ship. `None` when a cap is reached or no
    /// slot qualifies.
    pub fn try_spawn(&mut self) -> Option<ShipId> {
        systems::spawner::try_spawn(&mut self.ctx, &mut self.source)
    }

    /// Apply one player hit to whatever ship owns `node`.
    pub fn apply_player_damage(&mut self, node: NodeId) -> HitOutcome {
        systems::lifecycle::apply_player_damage(&mut self.ctx, &mut self.scene, node)
    }

    /// Damage the shield directly. Returns true if this destroyed it.
    pub fn damage_shield(&mut self, amount: f64) -> bool {
        let destroyed = self.ctx.shield.take_damage(amount);
        if destroyed {
            self.ctx.events.push(CombatEvent::ShieldDestroyed);
            tracing::info!("shield destroyed");
        }
        destroyed
    }

    /// Alive ships.
    pub fn active_ship_count(&self) -> usize {
        self.ctx.alive_count()
    }

    pub fn in_flight_loads(&self) -> usize {
        self.ctx.assets.in_flight()
    }

    pub fn shield_ratio(&self) -> f64 {
        self.ctx.shield.ratio()
    }

    pub fn is_shield_gone(&self) -> bool {
        self.ctx.shield.is_gone()
    }

    /// Register the destroyed-ship subscriber, replacing any previous one.
    pub fn on_ship_destroyed(&mut self, hook: impl FnMut(ShipType) + Send + 'static) {
        self.on_destroyed = Some(Box::new(hook));
    }

    pub fn clear_ship_destroyed_hook(&mut self) {
        self.on_destroyed = None;
    }

    /// Start a new session: every ship, beam and score is dropped and the
    /// shield is restored. Loads still in flight are abandoned; their
    /// results are discarded when they arrive.
    pub fn reset(&mut self) {
        for (_entity, (attack, renderable)) in self
            .ctx
            .world
            .query::<(Option<&AttackState>, Option<&Renderable>)>()
            .iter()
        {
            if let Some(beam) = attack.and_then(|a| a.beam()) {
                self.scene.release_beam(beam);
            }
            if let Some(renderable) = renderable {
                self.scene.remove(renderable.node);
            }
        }

        let ctx = &mut self.ctx;
        ctx.world.clear();
        ctx.node_index.clear();
        ctx.slots.release_all();
        ctx.session += 1;
        ctx.shield = Shield::new(&ctx.config.shield);
        ctx.score = ScoreState::default();
        ctx.events.clear();
        ctx.time = SimTime::default();
        ctx.spawn.timer = ctx.config.spawn.spawn_interval_secs;
        self.paused = false;

        tracing::info!(session = ctx.session, "combat session reset");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time(&self) -> SimTime {
        self.ctx.time
    }

    pub fn session(&self) -> u64 {
        self.ctx.session
    }

    pub fn config(&self) -> &CombatConfig {
        &self.ctx.config
    }

    pub fn world(&self) -> &World {
        &self.ctx.world
    }

    pub fn slots(&self) -> &SlotPool {
        &self.ctx.slots
    }

    pub fn shield(&self) -> &Shield {
        &self.ctx.shield
    }

    pub fn score(&self) -> &ScoreState {
        &self.ctx.score
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn source_mut(&mut self) -> &mut A {
        &mut self.source
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.ctx.world
    }

    /// Reserve a slot and bring a ship of `ship_type` straight to Alive,
    /// bypassing the asset cache.
    #[cfg(test)]
    pub(crate) fn spawn_alive_ship(&mut self, ship_type: ShipType) -> Option<(hecs::Entity, NodeId)> {
        use bulwark_attack::profiles::model_id;
        use bulwark_core::types::ModelTemplate;

        let live = self.ctx.live_positions();
        let slot = *self
            .ctx
            .slots
            .candidates(&self.ctx.slot_constraints(&live))
            .first()?;
        let position = self.ctx.slots.get(slot)?.position;
        self.ctx.slots.reserve(slot);
        let id = self.ctx.next_ship_id();
        let entity = crate::world_setup::spawn_reserved_ship(
            &mut self.ctx.world,
            id,
            ship_type,
            slot,
            position,
            self.ctx.config.shield.center,
        );
        if let Ok(mut lifecycle) = self
            .ctx
            .world
            .get::<&mut bulwark_core::components::Lifecycle>(entity)
        {
            lifecycle.state = bulwark_core::enums::LifecycleState::Loading;
        }
        let template = ModelTemplate {
            model: model_id(ship_type),
            handle: 0,
        };
        let node = systems::spawner::make_alive(&mut self.ctx, &mut self.scene, entity, &template)?;
        Some((entity, node))
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Fire { node } => {
                if !self.paused {
                    self.apply_player_damage(node);
                }
            }
            PlayerCommand::Pause => self.paused = true,
            PlayerCommand::Resume => self.paused = false,
            PlayerCommand::Reset => self.reset(),
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let ctx = &mut self.ctx;

        // 1. Asset resolution
        let resolutions = ctx.assets.pump(&mut self.source);
        systems::spawner::resolve_loads(ctx, &mut self.scene, resolutions);
        // 2. Spawn top-up and periodic spawn
        ctx.spawn.timer -= dt;
        systems::spawner::spawn_if_needed(ctx, &mut self.source);
        // 3. Alive ships drift, then attack
        let shield_center = ctx.shield.center();
        systems::movement::run(&mut ctx.world, &ctx.config.ships, shield_center, &mut ctx.rng, dt);
        systems::attack::run(ctx, &mut self.scene, dt);
        // 4. Death fall
        systems::lifecycle::update_dying(&mut ctx.world, &ctx.config.ships, dt);
        // 5. Reap removed ships
        let reaped = systems::cleanup::run(ctx, &mut self.scene, &mut self.despawn_buffer);
        if let Some(hook) = self.on_destroyed.as_mut() {
            for ship_type in reaped {
                hook(ship_type);
            }
        }
        // 6. Shield timers
        if ctx.shield.advance(dt) {
            ctx.events.push(CombatEvent::ShieldGone);
            tracing::info!("shield collapse finished");
        }
    }
}

/// Frame length in seconds, sanitized and clamped.
fn frame_secs(delta_ms: f64) -> f64 {
    let secs = delta_ms / 1000.0;
    if secs.is_finite() && secs > 0.0 {
        secs.min(MAX_FRAME_SECS)
    } else {
        0.0
    }
}

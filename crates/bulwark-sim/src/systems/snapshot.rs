//! Snapshot system: builds a `CombatSnapshot` from the current state.
//!
//! Read-only. Never modifies the world.

use bulwark_core::components::*;
use bulwark_core::enums::{LifecycleState, MovePhase};
use bulwark_core::events::CombatEvent;
use bulwark_core::state::*;

use crate::context::SimContext;

pub fn build_snapshot(ctx: &SimContext, paused: bool, events: Vec<CombatEvent>) -> CombatSnapshot {
    CombatSnapshot {
        time: ctx.time,
        paused,
        session: ctx.session,
        ships: build_ships(ctx),
        slots: build_slots(ctx),
        shield: ctx.shield.view(),
        score: ctx.score.view(),
        active_ship_count: ctx.alive_count(),
        in_flight_loads: ctx.assets.in_flight(),
        events,
    }
}

/// Every ship that has not been removed, ordered by id.
fn build_ships(ctx: &SimContext) -> Vec<ShipView> {
    let mut ships: Vec<ShipView> = ctx
        .world
        .query::<(
            &Ship,
            &Lifecycle,
            &SlotRef,
            &Transform,
            &Health,
            Option<&Renderable>,
            Option<&AttackState>,
            Option<&Movement>,
        )>()
        .iter()
        .filter(|(_, (_, lifecycle, ..))| lifecycle.state != LifecycleState::Removed)
        .map(
            |(_, (ship, lifecycle, slot, transform, health, renderable, attack, movement))| ShipView {
                id: ship.id,
                ship_type: ship.ship_type,
                state: lifecycle.state,
                slot: slot.0,
                position: transform.position,
                orientation: transform.orientation,
                health: health.current,
                max_health: health.max,
                node: renderable.map(|r| r.node),
                attack: attack.map(|a| a.mode()),
                beam_active: attack.and_then(|a| a.beam()).is_some(),
                moving: movement.is_some_and(|m| m.phase == MovePhase::Moving),
            },
        )
        .collect();
    ships.sort_by_key(|ship| ship.id);
    ships
}

fn build_slots(ctx: &SimContext) -> Vec<SlotView> {
    ctx.slots
        .iter()
        .map(|slot| SlotView {
            position: slot.position,
            occupied: slot.occupied,
        })
        .collect()
}

//! Ship attack finite state machine.
//!
//! Pure functions that turn elapsed time into attack transitions and shield
//! damage. No ECS or renderer dependency: the caller owns beam resources and
//! applies the returned step.

use rand::Rng;

use bulwark_core::components::AttackState;
use bulwark_core::config::{AttackConfig, SecondsRange};
use bulwark_core::enums::ShipType;
use bulwark_core::types::BeamHandle;

use crate::profiles::get_profile;

/// Input to the attack FSM for a single ship.
pub struct AttackContext {
    pub state: AttackState,
    pub ship_type: ShipType,
    pub is_alive: bool,
    /// Ship is in the moving half of its move/pause schedule.
    pub is_moving: bool,
    /// Elapsed seconds this frame.
    pub dt: f64,
}

/// What the ship's attack state becomes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackTransition {
    /// Store this state.
    Stay(AttackState),
    /// Countdown finished: acquire a beam and call [`engage`].
    Engage,
}

/// Output from the attack FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackStep {
    pub transition: AttackTransition,
    /// Beam the caller must release this frame.
    pub release_beam: Option<BeamHandle>,
    /// Damage to apply to the shield this frame.
    pub shield_damage: f64,
}

impl AttackStep {
    fn stay(state: AttackState) -> Self {
        Self {
            transition: AttackTransition::Stay(state),
            release_beam: None,
            shield_damage: 0.0,
        }
    }
}

/// State for a ship that just became Alive.
pub fn initial_state(config: &AttackConfig, rng: &mut impl Rng) -> AttackState {
    AttackState::Cooldown {
        remaining: roll(config.initial_cooldown, rng),
    }
}

/// Cooldown after a finished burst.
pub fn roll_cooldown(config: &AttackConfig, rng: &mut impl Rng) -> f64 {
    roll(config.cooldown, rng)
}

/// Complete an [`AttackTransition::Engage`].
///
/// With a beam the ship starts firing; without one (the renderer could not
/// build it) the ship cools down again instead.
pub fn engage(beam: Option<BeamHandle>, config: &AttackConfig, rng: &mut impl Rng) -> AttackState {
    match beam {
        Some(beam) => AttackState::Firing {
            remaining: config.fire_duration_secs,
            beam,
        },
        None => AttackState::Cooldown {
            remaining: roll_cooldown(config, rng),
        },
    }
}

/// Evaluate the FSM for one ship.
pub fn evaluate(ctx: &AttackContext, config: &AttackConfig, rng: &mut impl Rng) -> AttackStep {
    if !ctx.is_alive || ctx.is_moving {
        return stand_down(ctx.state);
    }

    match ctx.state {
        AttackState::Cooldown { remaining } => {
            let remaining = remaining - ctx.dt;
            if remaining > 0.0 {
                return AttackStep::stay(AttackState::Cooldown { remaining });
            }
            match config.charge_duration_secs {
                Some(charge) => AttackStep::stay(AttackState::Charging { remaining: charge }),
                None => AttackStep {
                    transition: AttackTransition::Engage,
                    release_beam: None,
                    shield_damage: 0.0,
                },
            }
        }
        AttackState::Charging { remaining } => {
            let remaining = remaining - ctx.dt;
            if remaining > 0.0 {
                AttackStep::stay(AttackState::Charging { remaining })
            } else {
                AttackStep {
                    transition: AttackTransition::Engage,
                    release_beam: None,
                    shield_damage: 0.0,
                }
            }
        }
        AttackState::Firing { remaining, beam } => {
            let remaining = remaining - ctx.dt;
            // Continuous damage for every firing frame, including the last.
            let shield_damage = get_profile(ctx.ship_type).beam_dps * ctx.dt;

            if remaining > 0.0 {
                AttackStep {
                    transition: AttackTransition::Stay(AttackState::Firing { remaining, beam }),
                    release_beam: None,
                    shield_damage,
                }
            } else {
                AttackStep {
                    transition: AttackTransition::Stay(AttackState::Cooldown {
                        remaining: roll_cooldown(config, rng),
                    }),
                    release_beam: Some(beam),
                    shield_damage,
                }
            }
        }
    }
}

/// Weapons only engage while the ship holds still.
///
/// A cooling ship keeps its remaining cooldown; a charging or firing ship
/// loses its beam and drops to an expired cooldown.
fn stand_down(state: AttackState) -> AttackStep {
    match state {
        AttackState::Cooldown { .. } => AttackStep::stay(state),
        AttackState::Charging { .. } => AttackStep::stay(AttackState::Cooldown { remaining: 0.0 }),
        AttackState::Firing { beam, .. } => AttackStep {
            transition: AttackTransition::Stay(AttackState::Cooldown { remaining: 0.0 }),
            release_beam: Some(beam),
            shield_damage: 0.0,
        },
    }
}

fn roll(range: SecondsRange, rng: &mut impl Rng) -> f64 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}

//! Shield dome: health pool, hit flash and the destruction timeline.

use glam::DVec3;

use bulwark_core::config::ShieldConfig;
use bulwark_core::constants::*;
use bulwark_core::enums::ShieldPhase;
use bulwark_core::state::ShieldView;

#[derive(Debug, Clone)]
pub struct Shield {
    health: f64,
    max_health: f64,
    center: DVec3,
    radius: f64,
    hit_flash_secs: f64,
    phase: ShieldPhase,
    destroy_timer: f64,
    hit_flash_remaining: f64,
    emissive: f64,
}

impl Shield {
    pub fn new(config: &ShieldConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            center: config.center,
            radius: config.radius,
            hit_flash_secs: config.hit_flash_secs,
            phase: ShieldPhase::Intact,
            destroy_timer: 0.0,
            hit_flash_remaining: 0.0,
            emissive: EMISSIVE_BASELINE,
        }
    }

    /// Subtract `amount` from the pool. Returns true if this call destroyed
    /// the shield.
    ///
    /// Ignored once destroyed, and for amounts that are not finite and positive.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.phase != ShieldPhase::Intact || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        if self.health > 0.0 {
            return false;
        }
        self.phase = ShieldPhase::Destroyed;
        self.destroy_timer = 0.0;
        self.hit_flash_remaining = 0.0;
        self.emissive = DESTROY_EMISSIVE_START;
        true
    }

    /// Restart the hit-flash timer. Emissive only jumps to the hot value
    /// while intact; once destroyed the collapse ramp owns it.
    pub fn trigger_hit_flash(&mut self) {
        self.hit_flash_remaining = self.hit_flash_secs;
        if self.phase == ShieldPhase::Intact {
            self.emissive = EMISSIVE_HOT;
        }
    }

    /// Advance timers by `dt` seconds. Returns true on the frame the collapse
    /// finishes.
    pub fn advance(&mut self, dt: f64) -> bool {
        match self.phase {
            ShieldPhase::Intact => {
                if self.hit_flash_remaining > 0.0 {
                    self.hit_flash_remaining = (self.hit_flash_remaining - dt).max(0.0);
                } else {
                    // Same visual rate at any frame rate.
                    let k = 1.0 - (1.0 - EMISSIVE_EASE_PER_FRAME).powf(dt * EASE_REFERENCE_HZ);
                    self.emissive += (EMISSIVE_BASELINE - self.emissive) * k;
                }
                false
            }
            ShieldPhase::Destroyed => {
                self.hit_flash_remaining = (self.hit_flash_remaining - dt).max(0.0);
                self.destroy_timer += dt;
                let t = self.destroy_timer;
                self.emissive = if t < DESTROY_RAMP_SECS {
                    DESTROY_EMISSIVE_START
                        + (DESTROY_EMISSIVE_PEAK - DESTROY_EMISSIVE_START) * (t / DESTROY_RAMP_SECS)
                } else {
                    DESTROY_EMISSIVE_PEAK
                };
                if t >= DESTROY_GONE_SECS {
                    self.phase = ShieldPhase::Gone;
                    return true;
                }
                false
            }
            ShieldPhase::Gone => {
                self.hit_flash_remaining = (self.hit_flash_remaining - dt).max(0.0);
                false
            }
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    /// Remaining health in [0, 1].
    pub fn ratio(&self) -> f64 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn phase(&self) -> ShieldPhase {
        self.phase
    }

    pub fn is_destroyed(&self) -> bool {
        self.phase != ShieldPhase::Intact
    }

    pub fn is_gone(&self) -> bool {
        self.phase == ShieldPhase::Gone
    }

    pub fn destroy_timer(&self) -> f64 {
        self.destroy_timer
    }

    pub fn hit_flash_remaining(&self) -> f64 {
        self.hit_flash_remaining
    }

    pub fn emissive_intensity(&self) -> f64 {
        self.emissive
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn is_hot(&self) -> bool {
        match self.phase {
            ShieldPhase::Intact => self.hit_flash_remaining > 0.0,
            ShieldPhase::Destroyed => true,
            ShieldPhase::Gone => false,
        }
    }

    pub fn scale(&self) -> f64 {
        match self.phase {
            ShieldPhase::Intact => 1.0,
            ShieldPhase::Destroyed | ShieldPhase::Gone => collapse_scale(self.destroy_timer),
        }
    }

    pub fn opacity(&self) -> f64 {
        match self.phase {
            ShieldPhase::Intact => SHIELD_BASE_OPACITY,
            ShieldPhase::Destroyed | ShieldPhase::Gone => collapse_opacity(self.destroy_timer),
        }
    }

    /// Camera shake amplitude, fading out over the collapse.
    pub fn camera_shake(&self) -> f64 {
        match self.phase {
            ShieldPhase::Destroyed => {
                DESTROY_SHAKE_MAX * (1.0 - self.destroy_timer / DESTROY_GONE_SECS).max(0.0)
            }
            ShieldPhase::Intact | ShieldPhase::Gone => 0.0,
        }
    }

    pub fn view(&self) -> ShieldView {
        ShieldView {
            phase: self.phase,
            health: self.health,
            max_health: self.max_health,
            ratio: self.ratio(),
            radius: self.radius,
            destroy_timer: self.destroy_timer,
            hit_flash_remaining: self.hit_flash_remaining,
            emissive_intensity: self.emissive,
            hot: self.is_hot(),
            scale: self.scale(),
            opacity: self.opacity(),
            camera_shake: self.camera_shake(),
        }
    }
}

/// Progress through the shrink/fade window, in [0, 1].
fn collapse_progress(t: f64) -> f64 {
    ((t - DESTROY_RAMP_SECS) / (DESTROY_GONE_SECS - DESTROY_RAMP_SECS)).clamp(0.0, 1.0)
}

/// Dome scale `t` seconds after destruction.
pub fn collapse_scale(t: f64) -> f64 {
    1.0 - (1.0 - DESTROY_SCALE_FLOOR) * collapse_progress(t)
}

/// Dome opacity `t` seconds after destruction.
pub fn collapse_opacity(t: f64) -> f64 {
    SHIELD_BASE_OPACITY * (1.0 - collapse_progress(t))
}

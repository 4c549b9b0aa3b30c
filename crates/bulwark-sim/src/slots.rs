//! Spawn slot pool.
//!
//! A fixed set of candidate positions around the shield, created once per
//! engine. A slot is occupied from reservation until its ship is removed or
//! its load fails.

use std::f64::consts::TAU;

use glam::DVec3;
use rand::Rng;

use bulwark_core::config::SlotLayout;

/// Horizontal offsets shorter than this count as directly overhead.
const OVERHEAD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSlot {
    pub position: DVec3,
    pub occupied: bool,
}

/// Geometric filter applied when choosing a slot.
#[derive(Debug, Clone, Copy)]
pub struct SlotConstraints<'a> {
    pub weapon_position: DVec3,
    pub min_weapon_distance: f64,
    pub shield_center: DVec3,
    pub forward: DVec3,
    pub cone_half_angle: f64,
    pub relaxed_cone_half_angle: f64,
    /// Height above the shield centre at which the relaxed cone applies.
    pub relaxation_elevation: f64,
    pub min_separation: f64,
    /// Positions of ships that still hold a slot.
    pub live_positions: &'a [DVec3],
}

impl SlotConstraints<'_> {
    fn admits(&self, position: DVec3) -> bool {
        if position.distance(self.weapon_position) <= self.min_weapon_distance {
            return false;
        }
        if !self.in_front(position) {
            return false;
        }
        self.live_positions
            .iter()
            .all(|other| position.distance(*other) >= self.min_separation)
    }

    fn in_front(&self, position: DVec3) -> bool {
        let offset = position - self.shield_center;
        let horizontal = DVec3::new(offset.x, 0.0, offset.z);
        let forward = DVec3::new(self.forward.x, 0.0, self.forward.z);
        if horizontal.length() < OVERHEAD_EPSILON || forward.length() < OVERHEAD_EPSILON {
            return true;
        }
        let angle = horizontal.angle_between(forward);
        let limit = if offset.y >= self.relaxation_elevation {
            self.relaxed_cone_half_angle
        } else {
            self.cone_half_angle
        };
        angle <= limit
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    slots: Vec<SpawnSlot>,
}

impl SlotPool {
    pub fn from_positions(positions: impl IntoIterator<Item = DVec3>) -> Self {
        Self {
            slots: positions
                .into_iter()
                .map(|position| SpawnSlot {
                    position,
                    occupied: false,
                })
                .collect(),
        }
    }

    /// Evenly spaced ring around `center`; each slot gets a random height in
    /// `[height_min, height_max]` above the centre.
    pub fn ring(
        center: DVec3,
        count: usize,
        radius: f64,
        height_min: f64,
        height_max: f64,
        rng: &mut impl Rng,
    ) -> Self {
        Self::from_positions((0..count).map(|i| {
            let azimuth = TAU * i as f64 / count as f64;
            let height = if height_max > height_min {
                rng.gen_range(height_min..=height_max)
            } else {
                height_min
            };
            center + DVec3::new(radius * azimuth.sin(), height, radius * azimuth.cos())
        }))
    }

    /// Elevation/azimuth grid on a sphere around `center`.
    pub fn grid(center: DVec3, radius: f64, elevations: &[f64], azimuth_count: usize) -> Self {
        let mut positions = Vec::with_capacity(elevations.len() * azimuth_count);
        for &elevation in elevations {
            for j in 0..azimuth_count {
                let azimuth = TAU * j as f64 / azimuth_count as f64;
                positions.push(
                    center
                        + radius
                            * DVec3::new(
                                elevation.cos() * azimuth.sin(),
                                elevation.sin(),
                                elevation.cos() * azimuth.cos(),
                            ),
                );
            }
        }
        Self::from_positions(positions)
    }

    pub fn from_layout(layout: &SlotLayout, center: DVec3, rng: &mut impl Rng) -> Self {
        match layout {
            SlotLayout::Ring {
                count,
                radius,
                height_min,
                height_max,
            } => Self::ring(center, *count, *radius, *height_min, *height_max, rng),
            SlotLayout::Grid {
                radius,
                elevations,
                azimuth_count,
            } => Self::grid(center, *radius, elevations, *azimuth_count),
        }
    }

    /// Indices of unoccupied slots that pass every constraint.
    pub fn candidates(&self, constraints: &SlotConstraints<'_>) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.occupied && constraints.admits(slot.position))
            .map(|(index, _)| index)
            .collect()
    }

    /// Mark a slot occupied. False if it is out of range or already taken.
    pub fn reserve(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if !slot.occupied => {
                slot.occupied = true;
                true
            }
            _ => false,
        }
    }

    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.occupied = false;
        }
    }

    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.occupied = false;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SpawnSlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnSlot> {
        self.slots.iter()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }
}

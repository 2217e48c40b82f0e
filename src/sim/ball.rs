//! Moving bodies
//!
//! A `Ball` is a circle with material properties (gravity, friction,
//! efficiency) and a bounded trail of past samples for rendering.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{Rgb, decay_toward_zero};

/// Trail sample for ball rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSample {
    pub color: Rgb,
    pub pos: DVec2,
    pub radius: f64,
}

/// Resolved construction parameters for a ball
///
/// `friction` is per-mille, the way scenarios draw it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallSpec {
    pub color: Rgb,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub gravity: f64,
    pub trail: usize,
    pub fading: bool,
    pub border: bool,
    pub efficiency: f64,
    pub friction: f64,
}

impl Default for BallSpec {
    fn default() -> Self {
        Self {
            color: Rgb(255, 255, 255),
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            radius: 10.0,
            gravity: 0.0,
            trail: 0,
            fading: true,
            border: false,
            efficiency: 1.0,
            friction: 0.0,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub color: Rgb,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    /// Added to vertical velocity every update
    pub gravity: f64,
    /// Per-axis velocity decay per unit time
    pub friction: f64,
    /// Restitution applied to collision normal velocity
    pub efficiency: f64,
    /// Resolved collisions of any kind
    pub bounces: u32,
    /// Fading (alpha ramp) vs solid trail
    pub fading: bool,
    /// Dark outline around the ball
    pub border: bool,
    trail_capacity: usize,
    /// Trail history for rendering (oldest first)
    trail: VecDeque<TrailSample>,
}

impl Ball {
    pub fn new(id: u32, spec: &BallSpec) -> Self {
        Self {
            id,
            color: spec.color,
            pos: spec.pos,
            vel: spec.vel,
            radius: spec.radius.abs(),
            gravity: spec.gravity,
            friction: spec.friction.max(0.0) / FRICTION_SCALE,
            efficiency: spec.efficiency,
            bounces: 0,
            fading: spec.fading,
            border: spec.border,
            trail_capacity: spec.trail,
            trail: VecDeque::with_capacity(spec.trail),
        }
    }

    /// Advance one step of `dt` (1.0 = one frame)
    pub fn update(&mut self, dt: f64) {
        self.pos += self.vel * dt;

        let decay = self.friction * dt;
        self.vel.x = decay_toward_zero(self.vel.x, decay);
        self.vel.y = decay_toward_zero(self.vel.y, decay);

        self.vel.y += self.gravity * dt;

        self.record_trail();
    }

    /// Record current position to trail, evicting the oldest sample
    fn record_trail(&mut self) {
        if self.trail_capacity == 0 {
            return;
        }
        while self.trail.len() >= self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back(TrailSample {
            color: self.color,
            pos: self.pos,
            radius: self.radius,
        });
    }

    pub fn trail(&self) -> &VecDeque<TrailSample> {
        &self.trail
    }

    pub fn trail_capacity(&self) -> usize {
        self.trail_capacity
    }

    /// Clear trail (on climax recentering)
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Stop the ball in place: no velocity, gravity or friction
    pub fn freeze(&mut self) {
        self.vel = DVec2::ZERO;
        self.gravity = 0.0;
        self.friction = 0.0;
    }

    /// Area-derived mass used by collision response
    #[inline]
    pub fn mass(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Pull toward `target` with a capped inverse-square acceleration
    ///
    /// Inside `ATTRACTION_MIN_DISTANCE` nothing is applied.
    pub fn apply_gravity_towards(&mut self, target: DVec2, strength: f64) {
        let delta = target - self.pos;
        let dist = delta.length();
        if dist < ATTRACTION_MIN_DISTANCE {
            return;
        }
        let accel = (strength / (dist * dist)).min(ATTRACTION_MAX_ACCEL);
        self.vel += delta / dist * accel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(spec: BallSpec) -> Ball {
        Ball::new(1, &spec)
    }

    #[test]
    fn test_update_moves_then_applies_gravity() {
        let mut b = ball(BallSpec {
            vel: DVec2::new(2.0, 0.0),
            gravity: 0.5,
            ..Default::default()
        });
        b.update(1.0);
        assert_eq!(b.pos, DVec2::new(2.0, 0.0));
        assert!((b.vel.y - 0.5).abs() < 1e-12);

        b.update(0.5);
        assert!((b.pos.x - 3.0).abs() < 1e-12);
        assert!((b.pos.y - 0.25).abs() < 1e-12);
        assert!((b.vel.y - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_friction_is_per_mille_and_clamps_at_zero() {
        let mut b = ball(BallSpec {
            vel: DVec2::new(1.0, -0.001),
            friction: 2.0,
            ..Default::default()
        });
        assert!((b.friction - 0.002).abs() < 1e-15);
        b.update(1.0);
        assert!((b.vel.x - 0.998).abs() < 1e-12);
        assert_eq!(b.vel.y, 0.0);
    }

    #[test]
    fn test_trail_is_bounded_fifo() {
        let mut b = ball(BallSpec {
            vel: DVec2::new(1.0, 0.0),
            trail: 3,
            ..Default::default()
        });
        for _ in 0..5 {
            b.update(1.0);
        }
        let xs: Vec<f64> = b.trail().iter().map(|s| s.pos.x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_zero_trail_keeps_nothing() {
        let mut b = ball(BallSpec::default());
        b.update(1.0);
        assert!(b.trail().is_empty());
    }

    #[test]
    fn test_attraction_skipped_when_close() {
        let mut b = ball(BallSpec {
            pos: DVec2::new(4.9, 0.0),
            ..Default::default()
        });
        b.apply_gravity_towards(DVec2::ZERO, 1000.0);
        assert_eq!(b.vel, DVec2::ZERO);
    }

    #[test]
    fn test_attraction_capped() {
        let mut b = ball(BallSpec {
            pos: DVec2::new(5.0, 0.0),
            ..Default::default()
        });
        b.apply_gravity_towards(DVec2::ZERO, 1000.0);
        assert!((b.vel.x + ATTRACTION_MAX_ACCEL).abs() < 1e-12);
        assert_eq!(b.vel.y, 0.0);
    }

    #[test]
    fn test_attraction_inverse_square() {
        let mut b = ball(BallSpec {
            pos: DVec2::new(0.0, 100.0),
            ..Default::default()
        });
        b.apply_gravity_towards(DVec2::ZERO, 1000.0);
        assert!((b.vel.y + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_freeze() {
        let mut b = ball(BallSpec {
            vel: DVec2::new(3.0, 4.0),
            gravity: 0.4,
            friction: 3.0,
            ..Default::default()
        });
        b.freeze();
        let before = b.pos;
        b.update(1.0);
        assert_eq!(b.pos, before);
        assert_eq!(b.vel, DVec2::ZERO);
    }
}

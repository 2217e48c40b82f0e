//! Simple pendulum for the pendulum-wave animation

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Effective gravity (tuned for visuals, not SI units)
pub const PENDULUM_GRAVITY: f64 = 0.4;
/// Per-step angular velocity damping
pub const PENDULUM_DAMPING: f64 = 0.999;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pendulum {
    pub pivot: DVec2,
    pub length: f64,
    /// Radians from vertical
    pub angle: f64,
    pub angular_vel: f64,
    pub radius: f64,
    pub color: Rgb,
    pub gravity: f64,
}

impl Pendulum {
    pub fn new(pivot: DVec2, length: f64, angle: f64, radius: f64, color: Rgb) -> Self {
        Self {
            pivot,
            length: length.max(f64::EPSILON),
            angle,
            angular_vel: 0.0,
            radius,
            color,
            gravity: PENDULUM_GRAVITY,
        }
    }

    /// Bob position
    pub fn bob(&self) -> DVec2 {
        self.pivot + self.length * DVec2::new(self.angle.sin(), self.angle.cos())
    }

    /// a = -(g/L) sin θ, then damping
    pub fn update(&mut self, dt: f64) {
        let angular_acc = -(self.gravity / self.length) * self.angle.sin();
        self.angular_vel += angular_acc * dt;
        self.angular_vel *= PENDULUM_DAMPING;
        self.angle += self.angular_vel * dt;
    }

    /// Passing through the vertical with some speed
    pub fn crossing_center(&self) -> bool {
        self.angle.abs() < 0.02 && self.angular_vel.abs() > 0.01
    }
}

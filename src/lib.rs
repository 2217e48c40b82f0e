//! shortsim - physics core for procedurally generated short animations
//!
//! Core modules:
//! - `sim`: Deterministic 2D physics (balls, rings, collisions, events, snapshots)
//! - `scenario`: One driver per animation type, plus the frame-budget runner
//! - `settings`: Passive configuration (frame budget, resolution, palette)
//! - `error`: Caller-facing error type

pub mod error;
pub mod scenario;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use settings::{Palette, Settings};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Simulation configuration constants
pub mod consts {
    /// Output resolution (vertical shorts)
    pub const WIDTH: f64 = 1080.0;
    pub const HEIGHT: f64 = 1920.0;

    /// Frame rate of the produced animation
    pub const FPS: u32 = 60;
    /// Frame budget (~59 seconds at 60 FPS)
    pub const MAX_FRAMES: u32 = 3540;
    /// Shortest animation worth keeping
    pub const MIN_FRAMES: u32 = 600;
    /// Length of the closing sequence after a terminal condition
    pub const END_FRAMES: u32 = 180;

    /// Slow motion right after a climax
    pub const SLOWMO_FRAMES: u32 = 60;
    pub const SLOWMO_DT: f64 = 0.3;
    /// Screen flash duration on climax
    pub const FLASH_FRAMES: u32 = 3;

    /// Substitute distance for coincident centers
    pub const COINCIDENT_EPSILON: f64 = 1e-6;
    /// Extra separation applied after a ball-ball contact (prevents sticking)
    pub const SEPARATION_MARGIN: f64 = 1.0;
    /// Post-bounce speed under which a border bounce snaps to rest
    pub const BORDER_REST_SPEED: f64 = 1.0;
    /// A lossy floor bounce settles once it sheds no more than this many
    /// frames of gravity
    pub const GRAVITY_REST_FRAMES: f64 = 2.0;
    /// Ring bounces snap to rest under `friction * RING_REST_FACTOR`
    pub const RING_REST_FACTOR: f64 = 500.0;
    /// Friction is supplied per-mille
    pub const FRICTION_SCALE: f64 = 1000.0;

    /// Radial attraction: no pull inside this distance
    pub const ATTRACTION_MIN_DISTANCE: f64 = 5.0;
    /// Radial attraction: acceleration cap
    pub const ATTRACTION_MAX_ACCEL: f64 = 2.0;
}

/// An 8-bit RGB color, as handed to the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear interpolation between two colors (t in 0..=1)
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    /// Dimmed version used for dormant entities
    pub fn dimmed(self) -> Rgb {
        let dim = |c: u8| (c / 4).max(20);
        Rgb(dim(self.0), dim(self.1), dim(self.2))
    }
}

/// Distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (b - a).length()
}

/// Unit vector of `v`, or `fallback` when `v` has no direction
#[inline]
pub fn normalize_or(v: DVec2, fallback: DVec2) -> DVec2 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Move `value` toward zero by `amount` without crossing it
#[inline]
pub fn decay_toward_zero(value: f64, amount: f64) -> f64 {
    if value.abs() > amount {
        value - amount * value.signum()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect() {
        let v = reflect(DVec2::new(3.0, -4.0), DVec2::new(0.0, 1.0));
        assert!((v.x - 3.0).abs() < 1e-12);
        assert!((v.y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_or_zero_vector() {
        let n = normalize_or(DVec2::ZERO, DVec2::X);
        assert_eq!(n, DVec2::X);
        let n = normalize_or(DVec2::new(0.0, 10.0), DVec2::X);
        assert!((n.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decay_never_flips_sign() {
        assert_eq!(decay_toward_zero(0.5, 1.0), 0.0);
        assert_eq!(decay_toward_zero(-0.5, 1.0), 0.0);
        assert!((decay_toward_zero(3.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((decay_toward_zero(-3.0, 1.0) + 2.0).abs() < 1e-12);
        assert_eq!(decay_toward_zero(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_color_lerp_and_dim() {
        let c = Rgb(0, 100, 200).lerp(Rgb(100, 100, 0), 0.5);
        assert_eq!(c, Rgb(50, 100, 100));
        assert_eq!(Rgb(200, 40, 8).dimmed(), Rgb(50, 20, 20));
    }
}

//! Circular containment boundary
//!
//! Balls live inside a ring and are reflected back off its inner edge. The
//! radius is mutable: the shrinking-ring scenario scales it every bounce.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::Rgb;

/// A circular boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub center: DVec2,
    /// Inner radius balls are contained by (never negative)
    radius: f64,
    /// Stroke width drawn outside `radius` (rendering only)
    pub width: f64,
    pub color: Rgb,
}

impl Ring {
    pub fn new(center: DVec2, radius: f64, width: f64, color: Rgb) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            width,
            color,
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the radius, clamped to zero
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    /// Scale the radius by `factor` (shrink < 1 < grow)
    pub fn scale(&mut self, factor: f64) {
        self.set_radius(self.radius * factor);
    }

    /// Outer radius including the stroke
    #[inline]
    pub fn outer_radius(&self) -> f64 {
        self.radius + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_clamped() {
        let mut ring = Ring::new(DVec2::ZERO, -5.0, 10.0, Rgb::default());
        assert_eq!(ring.radius(), 0.0);
        ring.set_radius(100.0);
        ring.scale(0.5);
        assert_eq!(ring.radius(), 50.0);
        ring.scale(-1.0);
        assert_eq!(ring.radius(), 0.0);
        assert_eq!(ring.outer_radius(), 10.0);
    }
}

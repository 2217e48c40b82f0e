//! Per-frame snapshots for the rendering collaborator
//!
//! A snapshot is a plain copy of everything drawable: balls with their
//! trails, rings, chain-reaction cells, pendulum bobs and an attractor.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, TrailSample};
use super::chain::Cell;
use super::pendulum::Pendulum;
use super::ring::Ring;
use crate::Rgb;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub pos: DVec2,
    pub radius: f64,
    pub color: Rgb,
    pub fading: bool,
    pub border: bool,
    /// Oldest first
    pub trail: Vec<TrailSample>,
}

impl From<&Ball> for BallSnapshot {
    fn from(ball: &Ball) -> Self {
        Self {
            pos: ball.pos,
            radius: ball.radius,
            color: ball.color,
            fading: ball.fading,
            border: ball.border,
            trail: ball.trail().iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSnapshot {
    pub center: DVec2,
    pub radius: f64,
    pub width: f64,
    pub color: Rgb,
}

impl From<&Ring> for RingSnapshot {
    fn from(ring: &Ring) -> Self {
        Self {
            center: ring.center,
            radius: ring.radius(),
            width: ring.width,
            color: ring.color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub pos: DVec2,
    pub radius: f64,
    pub color: Rgb,
    pub active: bool,
    /// Glow radius while the activation transient runs
    pub glow: Option<f64>,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        Self {
            pos: cell.pos,
            radius: cell.radius,
            color: if cell.active { cell.color } else { cell.color.dimmed() },
            active: cell.active,
            glow: cell.expanding.then_some(cell.expand_radius),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumSnapshot {
    pub pivot: DVec2,
    pub bob: DVec2,
    pub radius: f64,
    pub color: Rgb,
}

impl From<&Pendulum> for PendulumSnapshot {
    fn from(p: &Pendulum) -> Self {
        Self {
            pivot: p.pivot,
            bob: p.bob(),
            radius: p.radius,
            color: p.color,
        }
    }
}

/// A drawable circle that is neither a ball nor a ring (attractor core)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscSnapshot {
    pub pos: DVec2,
    pub radius: f64,
    pub color: Rgb,
}

/// Everything drawable on one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub index: u32,
    pub balls: Vec<BallSnapshot>,
    pub rings: Vec<RingSnapshot>,
    pub cells: Vec<CellSnapshot>,
    pub pendulums: Vec<PendulumSnapshot>,
    pub discs: Vec<DiscSnapshot>,
    /// Screen flash on this frame
    pub flash: bool,
    /// Short stat line the overlay collaborator prints
    pub stat: String,
}

impl FrameSnapshot {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn with_balls<'a>(mut self, balls: impl IntoIterator<Item = &'a Ball>) -> Self {
        self.balls.extend(balls.into_iter().map(BallSnapshot::from));
        self
    }

    pub fn with_ring(mut self, ring: &Ring) -> Self {
        self.rings.push(RingSnapshot::from(ring));
        self
    }

    pub fn with_stat(mut self, stat: impl Into<String>) -> Self {
        self.stat = stat.into();
        self
    }
}

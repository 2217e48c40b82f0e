//! Deterministic physics core
//!
//! Everything a scenario composes lives here. This module must stay pure and
//! deterministic:
//! - Frame-stepped only (`dt` is a time scale, 1.0 = one frame)
//! - No RNG: every random draw is resolved before it reaches the core
//! - Stable iteration order (by index)
//! - No rendering or audio dependencies; output is snapshots + events

pub mod ball;
pub mod chain;
pub mod collision;
pub mod event;
pub mod frame;
pub mod pendulum;
pub mod ring;

pub use ball::{Ball, BallSpec, TrailSample};
pub use chain::{Cell, ChainGrid, grid_positions};
pub use collision::{Contact, pair_mut};
pub use event::{EventKind, EventQueue, SimEvent};
pub use frame::{BallSnapshot, CellSnapshot, DiscSnapshot, FrameSnapshot, PendulumSnapshot, RingSnapshot};
pub use pendulum::Pendulum;
pub use ring::Ring;

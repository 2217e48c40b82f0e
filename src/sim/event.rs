//! Timestamped simulation events
//!
//! The physics step pushes one event per resolved contact; the audio and
//! particle collaborators drain the queue after the run (or per frame).

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::Rgb;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Ball bounced off the screen border
    Border,
    /// Ball bounced off a ring
    Ring,
    /// Two balls collided
    BallBall,
    /// Ball swallowed by an attractor
    Absorption,
    /// Chain-reaction cell switched on
    Activation,
    /// Pendulum bob crossed the vertical
    Swing,
    /// A new ball entered the scene
    Spawn,
    /// Growing sphere / shrinking ring reached its end state
    Climax,
}

/// A single event tagged with the frame it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub frame: u32,
    pub kind: EventKind,
    /// Where a particle burst should be emitted
    pub pos: DVec2,
    pub color: Rgb,
}

/// FIFO of events produced by the simulation
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: u32, kind: EventKind, pos: DVec2, color: Rgb) {
        self.events.push_back(SimEvent {
            frame,
            kind,
            pos,
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of queued events of one kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Events queued on a given frame
    pub fn on_frame(&self, frame: u32) -> impl Iterator<Item = &SimEvent> {
        self.events.iter().filter(move |e| e.frame == frame)
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }
}

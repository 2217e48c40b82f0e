//! Pendulum wave: a row of pendulums with graded lengths drifting in and
//! out of phase

use super::params::PendulumWaveParams;
use super::{Scenario, ScenarioKind, ScenarioStats, Step};
use crate::settings::Settings;
use crate::sim::{EventKind, EventQueue, FrameSnapshot, Pendulum, PendulumSnapshot};

/// Frames between two swing events
pub const SWING_COOLDOWN: u32 = 10;

pub struct PendulumWave {
    pendulums: Vec<Pendulum>,
    cooldown: u32,
    swings: u64,
    fps: u32,
}

impl PendulumWave {
    pub fn new(params: PendulumWaveParams, settings: &Settings) -> Self {
        log::info!("Pendulum wave with {} pendulums", params.pendulums.len());
        Self {
            pendulums: params.pendulums,
            cooldown: 0,
            swings: 0,
            fps: settings.fps.max(1),
        }
    }

    pub fn pendulums(&self) -> &[Pendulum] {
        &self.pendulums
    }
}

impl Scenario for PendulumWave {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::PendulumWave
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        for p in &mut self.pendulums {
            p.update(1.0);
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
        } else if let Some(p) = self.pendulums.iter().find(|p| p.crossing_center()) {
            events.push(frame, EventKind::Swing, p.bob(), p.color);
            self.swings += 1;
            self.cooldown = SWING_COOLDOWN;
        }
        Step::Continue
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::new(frame)
            .with_stat(format!("Time: {:.1}s", frame as f64 / self.fps as f64));
        snapshot.pendulums = self.pendulums.iter().map(PendulumSnapshot::from).collect();
        snapshot
    }

    fn description(&self) -> String {
        format!(
            "{} pendulums create mesmerizing wave patterns!",
            self.pendulums.len()
        )
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: self.pendulums.len(),
            bounces: self.swings,
        }
    }
}

//! Butterfly effect: many balls released from almost the same point

use glam::DVec2;

use super::params::ButterflyParams;
use super::{Scenario, ScenarioKind, ScenarioStats, Step};
use crate::settings::Settings;
use crate::sim::{Ball, BallSpec, EventKind, EventQueue, FrameSnapshot, Ring};

/// Start offset step along both axes; ball `i` sits `1 + 2 + .. + i` steps out
pub const START_OFFSET: f64 = 1.0 / 1000.0;
/// Gravity gained by the end of the frame budget (fraction of base)
pub const GRAVITY_RAMP: f64 = 0.5;

pub struct Butterfly {
    ring: Ring,
    balls: Vec<Ball>,
    base_gravity: f64,
    max_frames: u32,
}

impl Butterfly {
    pub fn new(params: ButterflyParams, settings: &Settings) -> Self {
        let balls: Vec<Ball> = params
            .colors
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                let steps = (i * (i + 1) / 2) as f64;
                let spec = BallSpec {
                    color,
                    pos: params.ball.pos + DVec2::splat(steps * START_OFFSET),
                    ..params.ball.clone()
                };
                Ball::new(i as u32, &spec)
            })
            .collect();
        log::info!("Butterfly effect with {} balls", balls.len());

        Self {
            ring: params.ring.build(settings.palette.ring),
            balls,
            base_gravity: params.ball.gravity,
            max_frames: settings.max_frames.max(1),
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    fn gravity_at(&self, frame: u32) -> f64 {
        self.base_gravity * (1.0 + frame as f64 / self.max_frames as f64 * GRAVITY_RAMP)
    }
}

impl Scenario for Butterfly {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Butterfly
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        let gravity = self.gravity_at(frame);
        for ball in &mut self.balls {
            ball.gravity = gravity;
            ball.update(1.0);
        }
        for ball in &mut self.balls {
            if ball.check_collision_with_ring(&self.ring) {
                events.push(frame, EventKind::Ring, ball.pos, ball.color);
            }
        }
        Step::Continue
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        FrameSnapshot::new(frame)
            .with_ring(&self.ring)
            .with_balls(&self.balls)
            .with_stat(format!("Balls: {}", self.balls.len()))
    }

    fn description(&self) -> String {
        format!(
            "{} balls spawn at almost the same point. Watch what happens!",
            self.balls.len()
        )
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: self.balls.len(),
            bounces: self.balls.iter().map(|b| b.bounces as u64).sum(),
        }
    }
}

//! Growing sphere and shrinking ring
//!
//! A single ball bounces inside a ring and every ring hit changes the
//! geometry: the ball grows, or the ring shrinks. Once the ball no longer
//! fits, the climax snaps it to fill the ring, flashes the screen and plays
//! the closing frames in slow motion.

use super::params::RingChangeParams;
use super::{Scenario, ScenarioKind, ScenarioStats, Step};
use crate::settings::Settings;
use crate::sim::{Ball, EventKind, EventQueue, FrameSnapshot, Ring};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Ring hits scale the ball radius
    Ball,
    /// Ring hits scale the ring radius
    Ring,
}

pub struct RingChange {
    target: Target,
    ring: Ring,
    ball: Ball,
    rate: f64,
    initial_ring_radius: f64,
    /// Frames elapsed since the climax
    end_count: Option<u32>,
    flash_timer: u32,
    flash: bool,
    end_frames: u32,
    slowmo_frames: u32,
    slowmo_dt: f64,
    flash_frames: u32,
}

impl RingChange {
    pub fn growing(params: RingChangeParams, settings: &Settings) -> Self {
        Self::new(Target::Ball, params, settings)
    }

    pub fn shrinking(params: RingChangeParams, settings: &Settings) -> Self {
        Self::new(Target::Ring, params, settings)
    }

    fn new(target: Target, params: RingChangeParams, settings: &Settings) -> Self {
        log::info!("{:?} change at rate {:.3}", target, params.rate);
        Self {
            target,
            ring: params.ring.build(settings.palette.ring),
            ball: Ball::new(0, &params.ball),
            rate: params.rate,
            initial_ring_radius: params.ring.radius,
            end_count: None,
            flash_timer: 0,
            flash: false,
            end_frames: settings.end_frames,
            slowmo_frames: settings.slowmo_frames,
            slowmo_dt: settings.slowmo_dt,
            flash_frames: crate::consts::FLASH_FRAMES,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn climaxed(&self) -> bool {
        self.end_count.is_some()
    }

    /// Time scale of the next frame
    pub fn dt(&self) -> f64 {
        match self.end_count {
            Some(n) if n < self.slowmo_frames => self.slowmo_dt,
            _ => 1.0,
        }
    }

    /// Fill the ring with the ball and stop everything
    fn climax(&mut self, frame: u32, events: &mut EventQueue) {
        self.ball.clear_trail();
        self.ball.radius = self.ring.radius();
        self.ball.pos = self.ring.center;
        self.ball.freeze();
        self.end_count = Some(0);
        self.flash_timer = self.flash_frames;
        events.push(frame, EventKind::Climax, self.ball.pos, self.ball.color);
        log::info!("Climax on frame {} after {} bounces", frame, self.ball.bounces);
    }
}

impl Scenario for RingChange {
    fn kind(&self) -> ScenarioKind {
        match self.target {
            Target::Ball => ScenarioKind::GrowingSphere,
            Target::Ring => ScenarioKind::ShrinkingRing,
        }
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        let dt = self.dt();
        self.ball.update(dt);

        if let Some(count) = self.end_count {
            self.end_count = Some(count + 1);
        } else if self.ball.check_collision_with_ring(&self.ring) {
            if self.ball.radius <= self.ring.radius() {
                match self.target {
                    Target::Ball => self.ball.radius *= self.rate,
                    Target::Ring => self.ring.scale(self.rate),
                }
                events.push(frame, EventKind::Ring, self.ball.pos, self.ball.color);
            } else {
                self.climax(frame, events);
            }
        }

        self.flash = self.flash_timer > 0;
        self.flash_timer = self.flash_timer.saturating_sub(1);

        match self.end_count {
            Some(count) if count >= self.end_frames => Step::Finished,
            _ => Step::Continue,
        }
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        let stat = match self.target {
            Target::Ball => {
                let pct = (self.ball.radius / self.ring.radius().max(f64::EPSILON) * 100.0) as u32;
                format!("Size: {}%", pct.min(100))
            }
            Target::Ring => {
                let pct = (self.ring.radius() / self.initial_ring_radius.max(f64::EPSILON) * 100.0) as u32;
                format!("Ring: {pct}%")
            }
        };
        let mut snapshot = FrameSnapshot::new(frame)
            .with_ring(&self.ring)
            .with_balls(std::iter::once(&self.ball))
            .with_stat(stat);
        snapshot.flash = self.flash;
        snapshot
    }

    fn description(&self) -> String {
        match self.target {
            Target::Ball => "The ball grows each time it bounces. Watch to the end!".to_string(),
            Target::Ring => "The ring shrinks with every bounce. Watch to the end!".to_string(),
        }
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: 1,
            bounces: self.ball.bounces as u64,
        }
    }
}

//! Bounce and time countdowns
//!
//! One active ball bounces inside a ring until its allowance runs out, then
//! settles in place and a fresh ball is launched from the starting spot. The
//! settled balls pile up and become obstacles for the next one.

use super::params::{CountdownParams, Draws, SpawnDraw};
use super::{Scenario, ScenarioKind, ScenarioStats, Step};
use crate::settings::Settings;
use crate::sim::{Ball, BallSpec, Contact, EventKind, EventQueue, FrameSnapshot, Ring};

/// Every this many spawns the bounce allowance drops by one
const ESCALATION_EVERY: u32 = 3;

/// What uses up a ball's allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    /// Ring and ball contacts; settled balls are immovable
    Bounces,
    /// Frames alive; settled balls can be nudged
    Frames,
}

pub struct Countdown {
    budget: Budget,
    ring: Ring,
    spec: BallSpec,
    spawns: Draws<SpawnDraw>,
    active: Ball,
    settled: Vec<Ball>,
    threshold: u32,
    initial_threshold: u32,
    /// Frames the active ball has been alive
    ball_time: u32,
    ball_count: u32,
    fps: u32,
}

impl Countdown {
    pub fn bounces(params: CountdownParams, settings: &Settings) -> Self {
        Self::new(Budget::Bounces, params, settings)
    }

    pub fn timed(params: CountdownParams, settings: &Settings) -> Self {
        Self::new(Budget::Frames, params, settings)
    }

    fn new(budget: Budget, params: CountdownParams, settings: &Settings) -> Self {
        let active = Ball::new(0, &params.ball);
        log::info!(
            "Countdown ({:?}): threshold {}, ring radius {}",
            budget,
            params.threshold,
            params.ring.radius
        );
        Self {
            budget,
            ring: params.ring.build(settings.palette.ring),
            spec: params.ball,
            spawns: params.spawns,
            active,
            settled: Vec::new(),
            threshold: params.threshold,
            initial_threshold: params.threshold,
            ball_time: 0,
            ball_count: 1,
            fps: settings.fps,
        }
    }

    fn contact(&self) -> Contact {
        match self.budget {
            Budget::Bounces => Contact::Static,
            Budget::Frames => Contact::Mutual,
        }
    }

    fn exhausted(&self) -> bool {
        match self.budget {
            Budget::Bounces => self.active.bounces >= self.threshold,
            Budget::Frames => self.ball_time >= self.threshold,
        }
    }

    /// Settle the active ball and launch the next one
    fn respawn(&mut self, frame: u32, events: &mut EventQueue) {
        let mut spec = self.spec.clone();
        if let Some(draw) = self.spawns.take() {
            spec.color = draw.color;
            spec.vel = draw.vel;
        }
        let next = Ball::new(self.ball_count, &spec);
        let mut done = std::mem::replace(&mut self.active, next);
        done.freeze();
        self.settled.push(done);

        self.ball_time = 0;
        self.ball_count += 1;
        if self.budget == Budget::Bounces && self.threshold > 1 && self.ball_count % ESCALATION_EVERY == 0 {
            self.threshold -= 1;
            log::debug!("Countdown threshold lowered to {}", self.threshold);
        }
        events.push(frame, EventKind::Spawn, self.active.pos, self.active.color);
    }

    pub fn settled(&self) -> &[Ball] {
        &self.settled
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Scenario for Countdown {
    fn kind(&self) -> ScenarioKind {
        match self.budget {
            Budget::Bounces => ScenarioKind::BounceCountdown,
            Budget::Frames => ScenarioKind::TimeCountdown,
        }
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        self.active.update(1.0);
        if self.active.check_collision_with_ring(&self.ring) {
            events.push(frame, EventKind::Ring, self.active.pos, self.active.color);
        }

        let contact = self.contact();
        for other in &mut self.settled {
            if self.active.check_collision_with_ball(other, contact) {
                events.push(frame, EventKind::BallBall, self.active.pos, self.active.color);
            }
        }

        if self.exhausted() {
            self.respawn(frame, events);
        }

        for ball in &mut self.settled {
            ball.freeze();
            ball.update(1.0);
        }

        self.ball_time += 1;
        Step::Continue
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        let stat = match self.budget {
            Budget::Bounces => format!("Bounces: {}/{}", self.active.bounces, self.threshold),
            Budget::Frames => {
                let left = self.threshold.saturating_sub(self.ball_time) as f64 / self.fps as f64;
                format!("Time: {left:.1}s")
            }
        };
        FrameSnapshot::new(frame)
            .with_ring(&self.ring)
            .with_balls(self.settled.iter().chain(std::iter::once(&self.active)))
            .with_stat(stat)
    }

    fn description(&self) -> String {
        match self.budget {
            Budget::Bounces => format!("Each ball stops after {} bounces!", self.initial_threshold),
            Budget::Frames => format!("Each ball has {} frames before it stops", self.initial_threshold),
        }
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: self.settled.len() + 1,
            bounces: self
                .settled
                .iter()
                .chain(std::iter::once(&self.active))
                .map(|b| b.bounces as u64)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::params::RingParams;
    use crate::Rgb;
    use glam::DVec2;

    fn params(threshold: u32) -> CountdownParams {
        CountdownParams {
            ring: RingParams {
                center: DVec2::new(540.0, 960.0),
                radius: 400.0,
                width: 10.0,
            },
            ball: BallSpec {
                pos: DVec2::new(540.0, 960.0),
                vel: DVec2::new(3.0, 0.0),
                radius: 20.0,
                gravity: 0.5,
                ..Default::default()
            },
            threshold,
            spawns: Draws::new(vec![SpawnDraw {
                color: Rgb(1, 2, 3),
                vel: DVec2::new(1.0, 2.0),
            }]),
        }
    }

    fn run_frames(scenario: &mut Countdown, frames: u32) -> EventQueue {
        let mut events = EventQueue::new();
        for frame in 0..frames {
            scenario.step(frame, &mut events);
        }
        events
    }

    #[test]
    fn test_balls_settle_and_respawn() {
        let mut scenario = Countdown::bounces(params(2), &Settings::default());
        let events = run_frames(&mut scenario, 600);

        assert!(!scenario.settled().is_empty());
        assert_eq!(events.count(EventKind::Spawn), scenario.settled().len());
        for ball in scenario.settled() {
            assert_eq!(ball.vel, DVec2::ZERO);
            assert_eq!(ball.gravity, 0.0);
        }
        assert_eq!(scenario.active.color, Rgb(1, 2, 3));
    }

    #[test]
    fn test_bounce_threshold_escalates_to_one() {
        let mut scenario = Countdown::bounces(params(3), &Settings::default());
        run_frames(&mut scenario, 3000);
        assert!(scenario.settled().len() >= 6);
        assert_eq!(scenario.threshold(), 1);
        assert!(scenario.description().contains('3'));
    }

    #[test]
    fn test_timed_balls_settle_on_schedule() {
        let mut scenario = Countdown::timed(params(60), &Settings::default());
        run_frames(&mut scenario, 181);
        assert_eq!(scenario.settled().len(), 3);
        assert_eq!(scenario.threshold(), 60);
        assert_eq!(scenario.kind(), ScenarioKind::TimeCountdown);
    }

    #[test]
    fn test_active_ball_stays_in_ring() {
        let mut scenario = Countdown::timed(params(1000), &Settings::default());
        let mut events = EventQueue::new();
        for frame in 0..500 {
            scenario.step(frame, &mut events);
            let d = (scenario.active.pos - scenario.ring.center).length();
            assert!(d + scenario.active.radius <= scenario.ring.radius() + 1e-6);
        }
    }
}

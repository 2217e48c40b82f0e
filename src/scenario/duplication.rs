//! Duplicating balls
//!
//! Balls bounce around a half-resolution box. Every `threshold`-th contact
//! between two balls drops a new ball in from the top edge, until the box
//! holds `max_balls`; then the closing countdown runs.

use glam::DVec2;

use super::params::{DuplicationParams, Draws};
use super::{Scenario, ScenarioKind, ScenarioStats, Step, Verdict};
use crate::settings::Settings;
use crate::sim::{Ball, BallSpec, Contact, EventKind, EventQueue, FrameSnapshot, pair_mut};
use crate::{Rgb, distance};

/// Spawn positions tried before a spawn is skipped
const SPAWN_TRIES: usize = 20;
/// Spawn height below the top edge, on top of the radius
const SPAWN_DROP: f64 = 10.0;
/// Fraction of the `(w/r)·(h/r)` packing bound that may be filled
const FILL_FACTOR: f64 = 0.2;
/// The scene starts with this many balls
const INITIAL_BALLS: usize = 2;

pub struct Duplication {
    width: f64,
    height: f64,
    spec: BallSpec,
    spawn_x: Draws<f64>,
    colors: Draws<Rgb>,
    balls: Vec<Ball>,
    threshold: u32,
    max_balls: usize,
    end_frames: u32,
    next_id: u32,
}

impl Duplication {
    pub fn new(params: DuplicationParams, settings: &Settings) -> Self {
        let r = params.ball.radius.max(1.0);
        let max_balls = ((params.height / r) * (params.width / r) * FILL_FACTOR) as usize;

        let mut scenario = Self {
            width: params.width,
            height: params.height,
            spec: params.ball,
            spawn_x: params.spawn_x,
            colors: params.colors,
            balls: Vec::new(),
            threshold: params.threshold.max(1),
            max_balls,
            end_frames: settings.end_frames,
            next_id: 0,
        };
        for _ in 0..INITIAL_BALLS {
            scenario.spawn();
        }
        log::info!(
            "Duplicating balls: threshold {}, max {} balls",
            scenario.threshold,
            scenario.max_balls
        );
        scenario
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn max_balls(&self) -> usize {
        self.max_balls
    }

    /// Drop a ball in at the first clear spot along the top edge
    fn spawn(&mut self) -> Option<DVec2> {
        let r = self.spec.radius;
        let y = r + SPAWN_DROP;
        let pos = (0..SPAWN_TRIES)
            .filter_map(|_| self.spawn_x.take())
            .map(|x| DVec2::new(x, y))
            .find(|&p| self.balls.iter().all(|b| distance(b.pos, p) > b.radius + r))?;

        let mut spec = self.spec.clone();
        spec.pos = pos;
        if let Some(color) = self.colors.take() {
            spec.color = color;
        }
        self.balls.push(Ball::new(self.next_id, &spec));
        self.next_id += 1;
        Some(pos)
    }

    fn full(&self) -> bool {
        self.balls.len() >= self.max_balls
    }
}

impl Scenario for Duplication {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Duplication
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        for ball in &mut self.balls {
            ball.update(1.0);
        }

        let mut duplicate = false;
        let count = self.balls.len();
        for i in 0..count {
            let ball = &mut self.balls[i];
            if ball.check_collision_with_border(self.width, self.height) {
                events.push(frame, EventKind::Border, ball.pos, ball.color);
            }

            for j in (0..count).filter(|&j| j != i) {
                let Some((ball, other)) = pair_mut(&mut self.balls, i, j) else {
                    continue;
                };
                if !ball.check_collision_with_ball(other, Contact::Mutual) {
                    continue;
                }
                events.push(frame, EventKind::BallBall, ball.pos, ball.color);
                if count <= self.max_balls && (ball.bounces % self.threshold == 0 || count <= INITIAL_BALLS) {
                    duplicate = true;
                }
            }
        }

        if self.full() {
            self.end_frames = self.end_frames.saturating_sub(1);
        }

        if duplicate {
            if let Some(pos) = self.spawn() {
                if let Some(ball) = self.balls.last() {
                    events.push(frame, EventKind::Spawn, pos, ball.color);
                }
                if self.full() {
                    log::info!("Duplicating balls reached {} balls on frame {}", self.balls.len(), frame);
                }
            }
        }

        if self.end_frames == 0 {
            Step::Finished
        } else {
            Step::Continue
        }
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        FrameSnapshot::new(frame)
            .with_balls(&self.balls)
            .with_stat(format!("Balls: {}", self.balls.len()))
    }

    fn verdict(&self) -> Verdict {
        if self.balls.len() <= INITIAL_BALLS {
            Verdict::Reject(format!("only {} balls", self.balls.len()))
        } else {
            Verdict::Accept
        }
    }

    fn description(&self) -> String {
        format!(
            "Every {} bounces with another ball, a new ball spawns",
            self.threshold
        )
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: self.balls.len(),
            bounces: self.balls.iter().map(|b| b.bounces as u64).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(threshold: u32, xs: Vec<f64>) -> DuplicationParams {
        DuplicationParams {
            width: 540.0,
            height: 960.0,
            ball: BallSpec {
                vel: DVec2::new(6.0, 3.0),
                radius: 20.0,
                gravity: 0.5,
                efficiency: 0.9,
                ..Default::default()
            },
            threshold,
            spawn_x: Draws::new(xs),
            colors: Draws::new(vec![Rgb(10, 20, 30), Rgb(40, 50, 60)]),
        }
    }

    #[test]
    fn test_starts_with_two_clear_balls() {
        let s = Duplication::new(params(4, vec![100.0, 110.0, 300.0]), &Settings::default());
        assert_eq!(s.balls().len(), 2);
        assert_eq!(s.balls()[0].pos.x, 100.0);
        // 110 overlaps the first ball and is skipped
        assert_eq!(s.balls()[1].pos.x, 300.0);
        assert_eq!(s.balls()[0].pos.y, 30.0);
        assert_eq!(s.max_balls(), (48.0 * 27.0 * 0.2) as usize);
    }

    #[test]
    fn test_blocked_spawn_is_skipped() {
        let mut s = Duplication::new(params(4, vec![100.0]), &Settings::default());
        assert_eq!(s.balls().len(), 1);
        assert!(s.spawn().is_none());
        assert!(matches!(s.verdict(), Verdict::Reject(_)));
    }

    #[test]
    fn test_ball_hits_spawn_new_balls() {
        let xs = (0..50).map(|i| 30.0 + (i as f64 * 47.0) % 480.0).collect();
        let mut s = Duplication::new(params(1, xs), &Settings::default());
        let mut events = EventQueue::new();
        for frame in 0..1500 {
            if s.step(frame, &mut events) == Step::Finished {
                break;
            }
        }
        assert!(s.balls().len() > 2);
        assert_eq!(events.count(EventKind::Spawn), s.balls().len() - 2);
        assert!(s.balls().len() <= s.max_balls() + 1);
        assert_eq!(s.verdict(), Verdict::Accept);
    }
}

//! Gravity well
//!
//! Balls orbit a central attractor, spiral in and are swallowed. Each
//! absorption grows the attractor. Balls flung far off screen are dropped.

use glam::DVec2;

use super::params::GravityWellParams;
use super::{Scenario, ScenarioKind, ScenarioStats, Step};
use crate::settings::Settings;
use crate::sim::{Ball, DiscSnapshot, EventKind, EventQueue, FrameSnapshot};
use crate::{Rgb, distance};

/// Balls this far outside the canvas are culled
pub const CULL_MARGIN: f64 = 100.0;
/// A ball is absorbed once its center is within `attractor + this * r`
pub const ABSORB_REACH: f64 = 0.5;
/// Attractor radius gained per absorbed ball, as a fraction of its radius
pub const ABSORB_GROWTH: f64 = 0.4;

pub struct GravityWell {
    center: DVec2,
    radius: f64,
    strength: f64,
    color: Rgb,
    balls: Vec<Ball>,
    width: f64,
    height: f64,
    absorbed: u32,
    /// Something was absorbed or culled on the last frame
    flash: bool,
    /// Closing frames left once the last ball is gone
    end_frames: u32,
}

impl GravityWell {
    pub fn new(params: GravityWellParams, settings: &Settings) -> Self {
        let balls: Vec<Ball> = params
            .balls
            .iter()
            .enumerate()
            .map(|(i, spec)| Ball::new(i as u32, spec))
            .collect();
        log::info!(
            "Gravity well: {} balls, attractor radius {}, strength {:.0}",
            balls.len(),
            params.attractor_radius,
            params.strength
        );

        Self {
            center: params.center,
            radius: params.attractor_radius,
            strength: params.strength,
            color: settings.palette.accent,
            balls,
            width: settings.width,
            height: settings.height,
            absorbed: 0,
            flash: false,
            end_frames: settings.end_frames,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn attractor_radius(&self) -> f64 {
        self.radius
    }

    pub fn absorbed(&self) -> u32 {
        self.absorbed
    }

    fn off_screen(&self, pos: DVec2) -> bool {
        pos.x < -CULL_MARGIN
            || pos.x > self.width + CULL_MARGIN
            || pos.y < -CULL_MARGIN
            || pos.y > self.height + CULL_MARGIN
    }
}

impl Scenario for GravityWell {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::GravityWell
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        if self.balls.is_empty() {
            self.flash = false;
            self.end_frames = self.end_frames.saturating_sub(1);
            return if self.end_frames == 0 {
                Step::Finished
            } else {
                Step::Continue
            };
        }

        for ball in &mut self.balls {
            ball.apply_gravity_towards(self.center, self.strength);
            ball.update(1.0);
        }

        // In index order: a growing attractor can reach later balls this frame
        let before = self.balls.len();
        let mut kept = Vec::with_capacity(before);
        for ball in std::mem::take(&mut self.balls) {
            if distance(ball.pos, self.center) < self.radius + ball.radius * ABSORB_REACH {
                self.radius += ball.radius * ABSORB_GROWTH;
                self.absorbed += 1;
                events.push(frame, EventKind::Absorption, ball.pos, ball.color);
            } else if !self.off_screen(ball.pos) {
                kept.push(ball);
            }
        }
        self.balls = kept;
        self.flash = self.balls.len() < before;

        if self.balls.is_empty() {
            log::info!(
                "Gravity well emptied on frame {} ({} absorbed)",
                frame,
                self.absorbed
            );
        }
        Step::Continue
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        let stat = if self.balls.is_empty() {
            format!("Absorbed: {}", self.absorbed)
        } else {
            format!("Survivors: {}", self.balls.len())
        };
        let mut snapshot = FrameSnapshot::new(frame).with_balls(&self.balls).with_stat(stat);
        snapshot.discs.push(DiscSnapshot {
            pos: self.center,
            radius: self.radius,
            color: self.color,
        });
        snapshot.flash = self.flash;
        snapshot
    }

    fn description(&self) -> String {
        format!(
            "A gravity well absorbs orbiting balls. {} were consumed!",
            self.absorbed
        )
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: self.balls.len(),
            bounces: self.absorbed as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BallSpec;

    fn well(balls: Vec<BallSpec>) -> GravityWell {
        let params = GravityWellParams {
            center: DVec2::new(540.0, 960.0),
            attractor_radius: 30.0,
            strength: 1500.0,
            balls,
        };
        GravityWell::new(params, &Settings::default())
    }

    fn ball_at(pos: DVec2, vel: DVec2) -> BallSpec {
        BallSpec {
            pos,
            vel,
            radius: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_absorption_grows_attractor() {
        let mut w = well(vec![ball_at(DVec2::new(560.0, 960.0), DVec2::ZERO)]);
        let mut events = EventQueue::new();
        w.step(0, &mut events);

        assert!(w.balls().is_empty());
        assert_eq!(w.absorbed(), 1);
        assert!((w.attractor_radius() - 34.0).abs() < 1e-12);
        assert_eq!(events.count(EventKind::Absorption), 1);
        assert!(w.snapshot(0).flash);
    }

    #[test]
    fn test_grown_attractor_reaches_later_ball() {
        // Second ball sits just outside the initial reach (30 + 5)
        let mut w = well(vec![
            ball_at(DVec2::new(560.0, 960.0), DVec2::ZERO),
            ball_at(DVec2::new(540.0, 997.0), DVec2::ZERO),
        ]);
        let mut events = EventQueue::new();
        w.step(0, &mut events);
        assert_eq!(w.absorbed(), 2);
    }

    #[test]
    fn test_far_balls_are_culled() {
        let mut w = well(vec![ball_at(DVec2::new(-150.0, 960.0), DVec2::new(-5.0, 0.0))]);
        let mut events = EventQueue::new();
        w.step(0, &mut events);
        assert!(w.balls().is_empty());
        assert_eq!(w.absorbed(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_finishes_after_closing_frames() {
        let mut w = well(vec![ball_at(DVec2::new(545.0, 960.0), DVec2::ZERO)]);
        let mut events = EventQueue::new();
        let end = Settings::default().end_frames;
        let mut frame = 0;
        while w.step(frame, &mut events) == Step::Continue {
            frame += 1;
            assert!(frame <= end + 1);
        }
        assert_eq!(frame, end);
        assert_eq!(w.snapshot(frame).stat, "Absorbed: 1");
    }
}

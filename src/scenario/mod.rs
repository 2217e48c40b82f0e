//! Scenario drivers
//!
//! One driver per animation type. Each owns its simulation state, is built
//! from an already-drawn `Params`, and advances one frame per `step`. The
//! runner owns the frame budget, the stop flag and the fail/retry policy.

pub mod butterfly;
pub mod chain_reaction;
pub mod countdown;
pub mod duplication;
pub mod gravity_well;
pub mod params;
pub mod pendulum_wave;
pub mod ring_change;
pub mod runner;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::settings::Settings;
use crate::sim::{EventQueue, FrameSnapshot};

pub use params::{Draws, Params};
pub use runner::{FrameCounter, FrameSink, Run, RunStatus, generate, run};

/// Animation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    BounceCountdown,
    TimeCountdown,
    Butterfly,
    Duplication,
    GravityWell,
    ChainReaction,
    GrowingSphere,
    ShrinkingRing,
    PendulumWave,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 9] = [
        ScenarioKind::BounceCountdown,
        ScenarioKind::TimeCountdown,
        ScenarioKind::Butterfly,
        ScenarioKind::Duplication,
        ScenarioKind::GravityWell,
        ScenarioKind::ChainReaction,
        ScenarioKind::GrowingSphere,
        ScenarioKind::ShrinkingRing,
        ScenarioKind::PendulumWave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::BounceCountdown => "bounce_countdown",
            ScenarioKind::TimeCountdown => "time_countdown",
            ScenarioKind::Butterfly => "butterfly_effect",
            ScenarioKind::Duplication => "duplicating_balls",
            ScenarioKind::GravityWell => "gravity_well",
            ScenarioKind::ChainReaction => "chain_reaction",
            ScenarioKind::GrowingSphere => "growing_sphere",
            ScenarioKind::ShrinkingRing => "shrinking_ring",
            ScenarioKind::PendulumWave => "pendulum_wave",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = SimError;

    /// Accepts the snake_case name or the 1-based menu number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = s.trim().to_lowercase();
        if let Ok(n) = query.parse::<usize>() {
            if (1..=Self::ALL.len()).contains(&n) {
                return Ok(Self::ALL[n - 1]);
            }
        }
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == query || (query.len() >= 3 && k.as_str().starts_with(&query)))
            .ok_or_else(|| SimError::UnknownScenario(s.to_string()))
    }
}

/// Outcome of a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Terminal condition reached (after any closing sequence)
    Finished,
}

/// Scenario-specific judgement of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(String),
}

/// Counters used to compare runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStats {
    /// Bodies still in the scene
    pub bodies: usize,
    /// Sum of every body's bounce counter
    pub bounces: u64,
}

/// A frame-stepped animation
pub trait Scenario {
    fn kind(&self) -> ScenarioKind;

    /// Advance one frame, queueing any events tagged with `frame`
    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step;

    /// Drawable state after the last `step`
    fn snapshot(&self, frame: u32) -> FrameSnapshot;

    /// Extra acceptance rules beyond the minimum frame count
    fn verdict(&self) -> Verdict {
        Verdict::Accept
    }

    /// One-line description of what happened
    fn description(&self) -> String;

    fn stats(&self) -> ScenarioStats;
}

/// Build the driver for a set of drawn parameters
pub fn build(params: Params, settings: &Settings) -> Box<dyn Scenario> {
    match params {
        Params::BounceCountdown(p) => Box::new(countdown::Countdown::bounces(p, settings)),
        Params::TimeCountdown(p) => Box::new(countdown::Countdown::timed(p, settings)),
        Params::Butterfly(p) => Box::new(butterfly::Butterfly::new(p, settings)),
        Params::Duplication(p) => Box::new(duplication::Duplication::new(p, settings)),
        Params::GravityWell(p) => Box::new(gravity_well::GravityWell::new(p, settings)),
        Params::ChainReaction(p) => Box::new(chain_reaction::ChainReaction::new(p, settings)),
        Params::GrowingSphere(p) => Box::new(ring_change::RingChange::growing(p, settings)),
        Params::ShrinkingRing(p) => Box::new(ring_change::RingChange::shrinking(p, settings)),
        Params::PendulumWave(p) => Box::new(pendulum_wave::PendulumWave::new(p, settings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_kind_from_name_and_number() {
        assert_eq!("gravity_well".parse::<ScenarioKind>().unwrap(), ScenarioKind::GravityWell);
        assert_eq!("8".parse::<ScenarioKind>().unwrap(), ScenarioKind::GrowingSphere);
        assert_eq!("Chain".parse::<ScenarioKind>().unwrap(), ScenarioKind::ChainReaction);
        assert!(matches!(
            "warp_drive".parse::<ScenarioKind>(),
            Err(SimError::UnknownScenario(_))
        ));
        assert!("0".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn test_names_roundtrip() {
        for kind in ScenarioKind::ALL {
            assert_eq!(kind.to_string().parse::<ScenarioKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_build_matches_drawn_kind() {
        let settings = Settings::default();
        for kind in ScenarioKind::ALL {
            let params = Params::draw(kind, &mut Pcg32::seed_from_u64(1), &settings);
            let mut scenario = build(params, &settings);
            assert_eq!(scenario.kind(), kind);

            let mut events = EventQueue::new();
            scenario.step(0, &mut events);
            let snapshot = scenario.snapshot(0);
            assert_eq!(snapshot.index, 0);
            assert!(!snapshot.stat.is_empty());
            assert!(!scenario.description().is_empty());
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let settings = Settings {
            max_frames: 600,
            min_frames: 0,
            max_attempts: 3,
            seed: 42,
            ..Default::default()
        };
        let outcome = |kind| {
            generate(kind, &settings, &mut runner::FrameCounter::default(), &AtomicBool::new(false))
                .map(|run| (run.seed, run.frames, run.stats, run.events.len()))
        };
        for kind in ScenarioKind::ALL {
            assert_eq!(format!("{:?}", outcome(kind)), format!("{:?}", outcome(kind)));
        }
    }

    #[test]
    fn test_every_kind_generates_with_defaults() {
        let settings = Settings::default();
        for kind in ScenarioKind::ALL {
            let mut counter = runner::FrameCounter::default();
            let run = generate(kind, &settings, &mut counter, &AtomicBool::new(false))
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
            assert!(run.completed(), "{kind}: {:?}", run.status);
            assert!(run.frames >= settings.min_frames);
            assert_eq!(counter.frames, run.frames);
        }
    }

    #[test]
    fn test_stop_flag_ends_generation() {
        let run = generate(
            ScenarioKind::Butterfly,
            &Settings::default(),
            &mut runner::FrameCounter::default(),
            &AtomicBool::new(true),
        )
        .unwrap();
        assert_eq!(run.status, RunStatus::Stopped);
        assert_eq!(run.frames, 0);
    }
}

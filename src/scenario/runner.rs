//! Frame-budget runner and retry loop
//!
//! `run` drives one built scenario to completion; `generate` draws fresh
//! parameters per attempt and retries rejected runs with a new seed.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Params, Scenario, ScenarioKind, ScenarioStats, Step, Verdict, build};
use crate::error::{Result, SimError};
use crate::settings::Settings;
use crate::sim::{EventQueue, FrameSnapshot, SimEvent};

/// Receives frames as they are produced
pub trait FrameSink {
    fn frame(&mut self, snapshot: FrameSnapshot);

    /// Drop everything received so far (the run was rejected)
    fn discard(&mut self);
}

impl FrameSink for Vec<FrameSnapshot> {
    fn frame(&mut self, snapshot: FrameSnapshot) {
        self.push(snapshot);
    }

    fn discard(&mut self) {
        self.clear();
    }
}

/// Sink that only counts frames
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCounter {
    pub frames: u32,
}

impl FrameSink for FrameCounter {
    fn frame(&mut self, _snapshot: FrameSnapshot) {
        self.frames += 1;
    }

    fn discard(&mut self) {
        self.frames = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Failed(String),
    /// Stop was requested before the run ended
    Stopped,
}

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub kind: ScenarioKind,
    pub seed: u64,
    pub status: RunStatus,
    pub frames: u32,
    pub events: Vec<SimEvent>,
    pub description: String,
    pub stats: ScenarioStats,
}

impl Run {
    pub fn completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Step `scenario` until it finishes, the frame budget runs out or `stop` is set
pub fn run(
    scenario: &mut dyn Scenario,
    settings: &Settings,
    sink: &mut dyn FrameSink,
    stop: &AtomicBool,
) -> Run {
    let mut events = EventQueue::new();
    let mut frames = 0;
    let mut stopped = false;

    while frames < settings.max_frames {
        if stop.load(Ordering::Relaxed) {
            stopped = true;
            break;
        }
        let step = scenario.step(frames, &mut events);
        sink.frame(scenario.snapshot(frames));
        frames += 1;
        if step == Step::Finished {
            break;
        }
    }

    let status = if stopped {
        RunStatus::Stopped
    } else if frames < settings.min_frames {
        RunStatus::Failed(format!("only {} of {} frames", frames, settings.min_frames))
    } else {
        match scenario.verdict() {
            Verdict::Accept => RunStatus::Completed,
            Verdict::Reject(reason) => RunStatus::Failed(reason),
        }
    };

    log::debug!("{} ran {} frames: {:?}", scenario.kind(), frames, status);

    Run {
        kind: scenario.kind(),
        seed: 0,
        status,
        frames,
        events: events.drain(),
        description: scenario.description(),
        stats: scenario.stats(),
    }
}

/// Draw, build and run `kind`, retrying rejected runs with a new seed
///
/// Attempt `n` seeds its generator with `settings.seed + n`. A stopped run is
/// returned as is; it is not retried.
pub fn generate(
    kind: ScenarioKind,
    settings: &Settings,
    sink: &mut dyn FrameSink,
    stop: &AtomicBool,
) -> Result<Run> {
    settings.validate()?;
    retry(kind, settings, sink, stop, |seed| {
        let mut rng = Pcg32::seed_from_u64(seed);
        build(Params::draw(kind, &mut rng, settings), settings)
    })
}

/// Run scenarios from `make` until one is kept or the attempts run out
fn retry(
    kind: ScenarioKind,
    settings: &Settings,
    sink: &mut dyn FrameSink,
    stop: &AtomicBool,
    mut make: impl FnMut(u64) -> Box<dyn Scenario>,
) -> Result<Run> {
    for attempt in 0..settings.max_attempts {
        let seed = settings.seed.wrapping_add(attempt as u64);
        let mut scenario = make(seed);

        log::info!("Generating {} (attempt {}, seed {})", kind, attempt + 1, seed);
        let mut outcome = run(scenario.as_mut(), settings, sink, stop);
        outcome.seed = seed;

        if let RunStatus::Failed(reason) = &outcome.status {
            log::warn!("{} attempt {} rejected: {}", kind, attempt + 1, reason);
            sink.discard();
            continue;
        }
        return Ok(outcome);
    }

    Err(SimError::Exhausted {
        kind,
        attempts: settings.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EventKind;
    use glam::DVec2;

    /// Finishes after a fixed number of frames with one event per frame
    struct Fixed {
        length: u32,
        reject: bool,
    }

    impl Scenario for Fixed {
        fn kind(&self) -> ScenarioKind {
            ScenarioKind::PendulumWave
        }

        fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
            events.push(frame, EventKind::Swing, DVec2::ZERO, Default::default());
            if frame + 1 >= self.length {
                Step::Finished
            } else {
                Step::Continue
            }
        }

        fn snapshot(&self, frame: u32) -> FrameSnapshot {
            FrameSnapshot::new(frame)
        }

        fn verdict(&self) -> Verdict {
            if self.reject {
                Verdict::Reject("nope".into())
            } else {
                Verdict::Accept
            }
        }

        fn description(&self) -> String {
            "fixed".into()
        }

        fn stats(&self) -> ScenarioStats {
            ScenarioStats::default()
        }
    }

    fn settings() -> Settings {
        Settings {
            max_frames: 100,
            min_frames: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_stops_on_finish() {
        let mut scenario = Fixed { length: 30, reject: false };
        let mut frames: Vec<FrameSnapshot> = Vec::new();
        let run = run(&mut scenario, &settings(), &mut frames, &AtomicBool::new(false));
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.frames, 30);
        assert_eq!(frames.len(), 30);
        assert_eq!(frames[29].index, 29);
        assert_eq!(run.events.len(), 30);
    }

    #[test]
    fn test_run_capped_by_budget() {
        let mut scenario = Fixed { length: 1000, reject: false };
        let mut counter = FrameCounter::default();
        let run = run(&mut scenario, &settings(), &mut counter, &AtomicBool::new(false));
        assert_eq!(run.frames, 100);
        assert_eq!(counter.frames, 100);
        assert!(run.completed());
    }

    #[test]
    fn test_short_run_fails() {
        let mut scenario = Fixed { length: 10, reject: false };
        let run = run(&mut scenario, &settings(), &mut FrameCounter::default(), &AtomicBool::new(false));
        assert!(matches!(run.status, RunStatus::Failed(_)));
    }

    #[test]
    fn test_verdict_can_reject() {
        let mut scenario = Fixed { length: 50, reject: true };
        let run = run(&mut scenario, &settings(), &mut FrameCounter::default(), &AtomicBool::new(false));
        assert_eq!(run.status, RunStatus::Failed("nope".into()));
    }

    #[test]
    fn test_stop_flag_checked_before_each_frame() {
        let mut scenario = Fixed { length: 50, reject: false };
        let run = run(&mut scenario, &settings(), &mut FrameCounter::default(), &AtomicBool::new(true));
        assert_eq!(run.status, RunStatus::Stopped);
        assert_eq!(run.frames, 0);
    }

    #[test]
    fn test_rejected_attempts_are_discarded() {
        let settings = Settings {
            max_attempts: 3,
            seed: 40,
            ..settings()
        };
        let mut counter = FrameCounter::default();
        let mut seeds = Vec::new();
        let result = retry(
            ScenarioKind::PendulumWave,
            &settings,
            &mut counter,
            &AtomicBool::new(false),
            |seed| {
                seeds.push(seed);
                Box::new(Fixed { length: 50, reject: true })
            },
        );
        match result {
            Err(SimError::Exhausted { kind, attempts }) => {
                assert_eq!(kind, ScenarioKind::PendulumWave);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(counter.frames, 0);
        assert_eq!(seeds, vec![40, 41, 42]);
    }

    #[test]
    fn test_retry_keeps_first_accepted_run() {
        let settings = Settings {
            seed: 7,
            ..settings()
        };
        let mut frames: Vec<FrameSnapshot> = Vec::new();
        let run = retry(
            ScenarioKind::PendulumWave,
            &settings,
            &mut frames,
            &AtomicBool::new(false),
            |seed| Box::new(Fixed { length: 30 + seed as u32, reject: seed == 7 }),
        )
        .unwrap();
        assert_eq!(run.seed, 8);
        assert!(run.completed());
        // Frames of the rejected first attempt are gone
        assert_eq!(frames.len(), 38);
        assert_eq!(frames[0].index, 0);
    }

    #[test]
    fn test_generate_rejects_bad_settings() {
        let settings = Settings {
            fps: 0,
            ..Default::default()
        };
        let result = generate(
            ScenarioKind::Butterfly,
            &settings,
            &mut FrameCounter::default(),
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(SimError::InvalidSettings(_))));
    }
}

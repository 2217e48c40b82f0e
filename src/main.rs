//! shortsim entry point
//!
//! Runs one scenario headless and prints a JSON summary of the run.
//!
//! Usage: `shortsim [scenario] [seed] [settings.json]`

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use serde::Serialize;

use shortsim::scenario::{FrameCounter, Run, RunStatus, ScenarioKind, ScenarioStats, generate};
use shortsim::sim::EventKind;
use shortsim::{Result, Settings};

/// What the caller gets back on stdout
#[derive(Debug, Serialize)]
struct RunSummary {
    scenario: ScenarioKind,
    seed: u64,
    status: RunStatus,
    frames: u32,
    seconds: f64,
    description: String,
    stats: ScenarioStats,
    events: Vec<(EventKind, usize)>,
}

impl RunSummary {
    fn new(run: &Run, fps: u32) -> Self {
        let mut events: Vec<(EventKind, usize)> = Vec::new();
        for event in &run.events {
            match events.iter_mut().find(|(kind, _)| *kind == event.kind) {
                Some((_, count)) => *count += 1,
                None => events.push((event.kind, 1)),
            }
        }
        Self {
            scenario: run.kind,
            seed: run.seed,
            status: run.status.clone(),
            frames: run.frames,
            seconds: run.frames as f64 / fps.max(1) as f64,
            description: run.description.clone(),
            stats: run.stats,
            events,
        }
    }
}

fn execute(args: &[String]) -> Result<RunSummary> {
    let kind: ScenarioKind = args.first().map(String::as_str).unwrap_or("1").parse()?;
    let mut settings = match args.get(2) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.get(1) {
        settings.seed = seed
            .parse()
            .map_err(|_| shortsim::SimError::InvalidSettings(format!("bad seed: {seed}")))?;
    }

    let stop = AtomicBool::new(false);
    let mut counter = FrameCounter::default();
    let run = generate(kind, &settings, &mut counter, &stop)?;
    log::info!("{}: {} frames, {}", run.kind, run.frames, run.description);
    Ok(RunSummary::new(&run, settings.fps))
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("shortsim starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let summary = match execute(&args) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

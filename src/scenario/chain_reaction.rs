//! Chain reaction
//!
//! A trigger ball falls through a grid of dormant cells. Cells it touches
//! light up, and freshly lit cells light their neighbors, until the whole
//! grid is active.

use super::params::ChainReactionParams;
use super::{Scenario, ScenarioKind, ScenarioStats, Step};
use crate::settings::Settings;
use crate::sim::{Ball, CellSnapshot, ChainGrid, EventKind, EventQueue, FrameSnapshot};

/// Frames kept running once every cell is active
///
/// Stretched when the cascade finishes early, so the run still reaches the
/// minimum length.
pub const END_BUFFER: u32 = 120;
/// More propagated activations than this in one frame flash the screen
pub const MASS_ACTIVATION: usize = 5;

pub struct ChainReaction {
    grid: ChainGrid,
    trigger: Ball,
    width: f64,
    height: f64,
    /// Closing frames left, counted once the grid is full
    end_buffer: Option<u32>,
    flash: bool,
    min_frames: u32,
}

impl ChainReaction {
    pub fn new(params: ChainReactionParams, settings: &Settings) -> Self {
        let grid = ChainGrid::new(params.cells, params.activation_radius);
        log::info!(
            "Chain reaction: {} cells, activation radius {:.1}",
            grid.len(),
            grid.activation_radius()
        );
        Self {
            grid,
            trigger: Ball::new(0, &params.trigger),
            width: settings.width,
            height: settings.height,
            end_buffer: None,
            flash: false,
            min_frames: settings.min_frames,
        }
    }

    pub fn grid(&self) -> &ChainGrid {
        &self.grid
    }

    fn percent_active(&self) -> usize {
        self.grid.active_count() * 100 / self.grid.len().max(1)
    }
}

impl Scenario for ChainReaction {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ChainReaction
    }

    fn step(&mut self, frame: u32, events: &mut EventQueue) -> Step {
        self.trigger.update(1.0);
        if self.trigger.check_collision_with_border(self.width, self.height) {
            events.push(frame, EventKind::Border, self.trigger.pos, self.trigger.color);
        }

        if let Some(left) = self.end_buffer.as_mut() {
            self.grid.update();
            self.flash = false;
            *left = left.saturating_sub(1);
            return if *left == 0 { Step::Finished } else { Step::Continue };
        }

        let touched = self.grid.touch(self.trigger.pos, self.trigger.radius);
        let spread = self.grid.propagate();
        for &i in touched.iter().chain(&spread) {
            let cell = &self.grid.cells()[i];
            events.push(frame, EventKind::Activation, cell.pos, cell.color);
        }
        self.grid.update();
        self.flash = spread.len() > MASS_ACTIVATION;

        if self.grid.all_active() {
            // Finishing on frame `frame + buffer` makes `frame + buffer + 1` frames
            let buffer = END_BUFFER.max(self.min_frames.saturating_sub(frame + 1));
            log::info!("Chain reaction complete on frame {}, closing for {} frames", frame, buffer);
            self.end_buffer = Some(buffer);
        }
        Step::Continue
    }

    fn snapshot(&self, frame: u32) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::new(frame)
            .with_balls(std::iter::once(&self.trigger))
            .with_stat(format!("Activated: {}%", self.percent_active()));
        snapshot.cells = self.grid.cells().iter().map(CellSnapshot::from).collect();
        snapshot.flash = self.flash;
        snapshot
    }

    fn description(&self) -> String {
        format!(
            "One ball triggers a chain reaction across {} circles!",
            self.grid.len()
        )
    }

    fn stats(&self) -> ScenarioStats {
        ScenarioStats {
            bodies: self.grid.active_count(),
            bounces: self.trigger.bounces as u64,
        }
    }
}

//! Chain-reaction cells
//!
//! Cells sit in a fixed arena (`Vec<Cell>`) and refer to each other by index.
//! Neighborhoods are computed once at construction; per-frame propagation
//! only walks the precomputed lists.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Frames after activation during which a cell still spreads to neighbors
pub const SPREAD_WINDOW: u32 = 3;
/// Length of the activation glow transient
pub const EXPAND_FRAMES: u32 = 15;
/// Glow radius growth per frame while expanding
pub const EXPAND_RATE: f64 = 2.0;

/// Layout margins of the cell grid
pub const GRID_MARGIN_X: f64 = 80.0;
pub const GRID_MARGIN_TOP: f64 = 300.0;
pub const GRID_MARGIN_BOTTOM: f64 = 200.0;
/// Cell pitch as a multiple of cell radius
pub const GRID_SPACING_FACTOR: f64 = 3.0;
/// Activation radius as a multiple of the pitch
pub const ACTIVATION_RADIUS_FACTOR: f64 = 1.3;

/// A dormant circle that lights up on contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub pos: DVec2,
    pub radius: f64,
    pub color: Rgb,
    pub active: bool,
    pub expanding: bool,
    pub expand_radius: f64,
    /// Frames spent in the activation transient
    pub activation_timer: u32,
}

impl Cell {
    pub fn new(pos: DVec2, radius: f64, color: Rgb) -> Self {
        Self {
            pos,
            radius,
            color,
            active: false,
            expanding: false,
            expand_radius: 0.0,
            activation_timer: 0,
        }
    }

    /// Switch on; returns false if the cell was already active
    pub fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.expanding = true;
        self.expand_radius = self.radius;
        true
    }

    /// Whether the cell is fresh enough to spread
    #[inline]
    pub fn spreading(&self) -> bool {
        self.active && self.activation_timer <= SPREAD_WINDOW
    }

    /// Advance the activation transient by one frame
    pub fn update(&mut self) {
        if self.expanding {
            self.expand_radius += EXPAND_RATE;
            self.activation_timer += 1;
            if self.activation_timer > EXPAND_FRAMES {
                self.expanding = false;
            }
        }
    }
}

/// Cell centers of the activation grid for a canvas
pub fn grid_positions(width: f64, height: f64, cell_radius: f64) -> Vec<DVec2> {
    let spacing = (cell_radius * GRID_SPACING_FACTOR).max(1.0);
    let cols = ((width - 2.0 * GRID_MARGIN_X) / spacing).floor().max(0.0) as usize;
    let rows = ((height - GRID_MARGIN_TOP - GRID_MARGIN_BOTTOM) / spacing)
        .floor()
        .max(0.0) as usize;
    let half = (spacing / 2.0).floor();

    let mut positions = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            positions.push(DVec2::new(
                GRID_MARGIN_X + col as f64 * spacing + half,
                GRID_MARGIN_TOP + row as f64 * spacing + half,
            ));
        }
    }
    positions
}

/// Arena of cells plus their fixed neighborhoods
#[derive(Debug, Clone)]
pub struct ChainGrid {
    cells: Vec<Cell>,
    neighbors: Vec<Vec<usize>>,
    activation_radius: f64,
    active_count: usize,
}

impl ChainGrid {
    /// Build the grid and its adjacency (one-time O(n²))
    pub fn new(cells: Vec<Cell>, activation_radius: f64) -> Self {
        let limit = activation_radius * activation_radius;
        let neighbors = (0..cells.len())
            .map(|i| {
                (0..cells.len())
                    .filter(|&j| j != i && cells[i].pos.distance_squared(cells[j].pos) < limit)
                    .collect()
            })
            .collect();
        let active_count = cells.iter().filter(|c| c.active).count();

        Self {
            cells,
            neighbors,
            activation_radius,
            active_count,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    pub fn activation_radius(&self) -> f64 {
        self.activation_radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn all_active(&self) -> bool {
        self.active_count == self.cells.len()
    }

    /// Activate one cell; a no-op for active cells
    pub fn activate(&mut self, index: usize) -> bool {
        let Some(cell) = self.cells.get_mut(index) else {
            return false;
        };
        let fresh = cell.activate();
        if fresh {
            self.active_count += 1;
        }
        fresh
    }

    /// Activate every dormant cell overlapped by a moving circle
    pub fn touch(&mut self, pos: DVec2, radius: f64) -> Vec<usize> {
        let hits: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                let reach = radius + c.radius;
                !c.active && c.pos.distance_squared(pos) < reach * reach
            })
            .map(|(i, _)| i)
            .collect();
        hits.into_iter().filter(|&i| self.activate(i)).collect()
    }

    /// Spread from freshly active cells to their dormant neighbors
    ///
    /// Targets are collected before any is activated, so cells switched on
    /// here only spread on the next call.
    pub fn propagate(&mut self) -> Vec<usize> {
        let mut targets = Vec::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if !cell.spreading() {
                continue;
            }
            targets.extend(self.neighbors[i].iter().copied().filter(|&j| !self.cells[j].active));
        }
        targets.into_iter().filter(|&i| self.activate(i)).collect()
    }

    /// Advance every cell's transient
    pub fn update(&mut self) {
        for cell in &mut self.cells {
            cell.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(n: usize, pitch: f64) -> ChainGrid {
        let cells = (0..n)
            .map(|i| Cell::new(DVec2::new(i as f64 * pitch, 0.0), 5.0, Rgb(200, 100, 50)))
            .collect();
        ChainGrid::new(cells, pitch * 1.3)
    }

    #[test]
    fn test_adjacency_only_links_close_cells() {
        let grid = row_of(4, 30.0);
        assert_eq!(grid.neighbors(0), &[1]);
        assert_eq!(grid.neighbors(1), &[0, 2]);
        assert_eq!(grid.neighbors(3), &[2]);
    }

    #[test]
    fn test_activation_is_idempotent() {
        let mut grid = row_of(3, 30.0);
        assert!(grid.activate(1));
        assert!(!grid.activate(1));
        assert_eq!(grid.active_count(), 1);
        assert!(!grid.activate(99));
    }

    #[test]
    fn test_touch_uses_combined_radius() {
        let mut grid = row_of(3, 30.0);
        assert!(grid.touch(DVec2::new(30.0, 14.9), 10.0).contains(&1));
        assert!(grid.touch(DVec2::new(30.0, 0.0), 10.0).is_empty());
        assert!(grid.touch(DVec2::new(0.0, 15.0), 10.0).is_empty());
    }

    #[test]
    fn test_propagation_walks_one_step_per_call() {
        let mut grid = row_of(5, 30.0);
        let adjacency: Vec<Vec<usize>> = (0..5).map(|i| grid.neighbors(i).to_vec()).collect();

        grid.activate(0);
        assert_eq!(grid.propagate(), vec![1]);
        grid.update();
        assert_eq!(grid.propagate(), vec![2]);
        grid.update();
        assert_eq!(grid.propagate(), vec![3]);
        grid.update();
        assert_eq!(grid.propagate(), vec![4]);
        assert!(grid.all_active());

        let after: Vec<Vec<usize>> = (0..5).map(|i| grid.neighbors(i).to_vec()).collect();
        assert_eq!(adjacency, after);
    }

    #[test]
    fn test_spread_window_closes() {
        let mut cell = Cell::new(DVec2::ZERO, 5.0, Rgb::default());
        cell.activate();
        for _ in 0..=SPREAD_WINDOW {
            assert!(cell.spreading());
            cell.update();
        }
        assert!(!cell.spreading());
        for _ in 0..EXPAND_FRAMES {
            cell.update();
        }
        assert!(!cell.expanding);
        assert_eq!(cell.activation_timer, EXPAND_FRAMES + 1);
    }

    #[test]
    fn test_grid_positions_fill_canvas() {
        let positions = grid_positions(1080.0, 1920.0, 20.0);
        // spacing 60: 15 cols, 23 rows
        assert_eq!(positions.len(), 15 * 23);
        assert_eq!(positions[0], DVec2::new(110.0, 330.0));
    }
}

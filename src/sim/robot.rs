//! Differential-drive robot pose and exploration bookkeeping.

use std::collections::HashSet;

use super::arena::Arena;

/// Clamp margin keeping the robot inside the arena, in pixels.
const EDGE_MARGIN: f64 = 20.0;

/// Robot pose plus the visited-cell and trajectory records fitness is
/// computed from.
#[derive(Debug, Clone)]
pub struct Robot {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees; 0 points along +y.
    pub heading: f64,
    grid_cell_size: f64,
    visited: HashSet<(i64, i64)>,
    trajectory: Vec<(f64, f64)>,
}

impl Robot {
    pub fn new(x: f64, y: f64, heading: f64, grid_cell_size: f64) -> Self {
        Self {
            x,
            y,
            heading,
            grid_cell_size,
            visited: HashSet::new(),
            trajectory: Vec::new(),
        }
    }

    /// Advance along the heading. A step landing inside an obstacle is
    /// rejected outright; the position always stays a margin inside the
    /// arena.
    pub fn forward(&mut self, velocity: f64, arena: &Arena) {
        let rad = self.heading.to_radians();
        let nx = self.x + rad.sin() * velocity;
        let ny = self.y + rad.cos() * velocity;
        if !arena.contains(nx, ny) {
            self.x = nx;
            self.y = ny;
        }
        self.x = self.x.clamp(EDGE_MARGIN, arena.width - EDGE_MARGIN);
        self.y = self.y.clamp(EDGE_MARGIN, arena.height - EDGE_MARGIN);
    }

    pub fn backward(&mut self, velocity: f64, arena: &Arena) {
        self.forward(-velocity, arena);
    }

    pub fn turn_left(&mut self, degrees: f64) {
        self.heading = (self.heading + degrees).rem_euclid(360.0);
    }

    pub fn turn_right(&mut self, degrees: f64) {
        self.heading = (self.heading - degrees).rem_euclid(360.0);
    }

    /// Record the current position for the replay trajectory.
    pub fn record_trajectory(&mut self) {
        self.trajectory.push((self.x, self.y));
    }

    /// Mark the occupancy-grid cell under the robot as visited.
    pub fn record_cell(&mut self) {
        let cx = (self.x / self.grid_cell_size).floor() as i64;
        let cy = (self.y / self.grid_cell_size).floor() as i64;
        self.visited.insert((cx, cy));
    }

    /// Unique cells visited so far.
    pub fn cells_visited(&self) -> usize {
        self.visited.len()
    }

    pub fn trajectory(&self) -> &[(f64, f64)] {
        &self.trajectory
    }

    pub fn into_trajectory(self) -> Vec<(f64, f64)> {
        self.trajectory
    }
}

//! Sim module - Built-in candidate evaluator: rover exploration.
//!
//! Fitness is the number of unique occupancy-grid cells the robot visits
//! over a fixed number of control ticks. The loop contains no randomness,
//! so a genome always scores the same.

mod arena;
mod controller;
mod robot;

pub use arena::*;
pub use controller::*;
pub use robot::*;

use crate::schema::WorldConfig;
use crate::search::{EvalError, EvaluationRequest, Evaluator, Genome, RunTrace};

/// Beam offsets relative to the heading: left, front, right.
const BEAM_ANGLES: [f64; 3] = [45.0, 0.0, -45.0];

/// Exploration-fitness evaluator over a `WorldConfig`.
#[derive(Debug, Clone)]
pub struct ExplorationEvaluator {
    world: WorldConfig,
}

impl ExplorationEvaluator {
    pub fn new(world: WorldConfig) -> Self {
        Self { world }
    }

    /// Run one full simulation for a genome. Tick order: record the
    /// trajectory point, sense, act, record the visited cell.
    fn simulate(&self, genome: &Genome) -> (usize, Vec<(f64, f64)>) {
        let arena = Arena::new(self.world.width, self.world.height);
        let (x, y, heading) = self.world.start_pose();
        let mut robot = Robot::new(x, y, heading, self.world.grid_cell_size);
        let controller = ReactiveController::new(*genome, &self.world);
        let range = self.world.sensor_range();

        for _ in 0..self.world.eval_timesteps {
            robot.record_trajectory();
            let senses = (
                arena.proximity(robot.x, robot.y, robot.heading + BEAM_ANGLES[0], range),
                arena.proximity(robot.x, robot.y, robot.heading + BEAM_ANGLES[1], range),
                arena.proximity(robot.x, robot.y, robot.heading + BEAM_ANGLES[2], range),
            );
            controller.act(&mut robot, &arena, senses);
            robot.record_cell();
        }

        let cells_visited = robot.cells_visited();
        (cells_visited, robot.into_trajectory())
    }
}

impl Evaluator for ExplorationEvaluator {
    fn evaluate(&self, request: &EvaluationRequest) -> Result<f64, EvalError> {
        let (cells_visited, _) = self.simulate(&request.genome);
        Ok(cells_visited as f64)
    }

    fn trace(&self, genome: &Genome) -> Option<RunTrace> {
        let (cells_visited, trajectory) = self.simulate(genome);
        Some(RunTrace {
            trajectory,
            cells_visited,
        })
    }
}

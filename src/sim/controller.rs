//! Reactive exploration controller.
//!
//! Rule-based obstacle avoidance always wins; otherwise the evolved linear
//! mapping from proximity readings to wheel velocities drives.

use crate::schema::WorldConfig;
use crate::search::Genome;

use super::arena::Arena;
use super::robot::Robot;

const OBSTACLE_THRESHOLD: f64 = 0.3;
const CRITICAL_THRESHOLD: f64 = 0.6;

/// Sensor-driven controller for one candidate genome.
#[derive(Debug, Clone)]
pub struct ReactiveController {
    genome: Genome,
    max_speed: f64,
    max_turn_rate: f64,
    base_velocity: f64,
    turn_velocity: f64,
    turn_constant: f64,
}

impl ReactiveController {
    pub fn new(genome: Genome, world: &WorldConfig) -> Self {
        Self {
            genome,
            max_speed: world.max_speed,
            max_turn_rate: world.max_turn_rate,
            base_velocity: world.default_velocity,
            turn_velocity: world.default_angle_velocity,
            turn_constant: world.turn_constant,
        }
    }

    /// One control tick over (left, front, right) proximity readings.
    ///
    /// Avoidance branches turn before advancing; the evolved branch
    /// advances before turning.
    pub fn act(&self, robot: &mut Robot, arena: &Arena, senses: (f64, f64, f64)) {
        let (s_left, s_front, s_right) = senses;

        if s_front > CRITICAL_THRESHOLD {
            // Sharp turn toward the freer side, creeping forward.
            if s_left < s_right {
                robot.turn_left(self.turn_velocity * 4.0);
            } else {
                robot.turn_right(self.turn_velocity * 4.0);
            }
            robot.forward(self.base_velocity * 0.3, arena);
            return;
        }

        if s_front > OBSTACLE_THRESHOLD {
            if s_left < s_right {
                robot.turn_left(self.turn_velocity * 2.0);
            } else {
                robot.turn_right(self.turn_velocity * 2.0);
            }
            robot.forward(self.base_velocity * 0.5, arena);
            return;
        }

        if s_left > OBSTACLE_THRESHOLD {
            robot.turn_right(self.turn_velocity);
            robot.forward(self.base_velocity * 0.7, arena);
            return;
        }

        if s_right > OBSTACLE_THRESHOLD {
            robot.turn_left(self.turn_velocity);
            robot.forward(self.base_velocity * 0.7, arena);
            return;
        }

        // Evolved differential-drive mapping.
        let [g0, g1, g2] = self.genome.genes;
        let v_left =
            (g0.slope * (1.0 - s_left) + g0.intercept).clamp(-self.max_speed, self.max_speed);
        let v_right = (g1.slope * (1.0 - s_right) + g1.intercept
            + g2.slope * (1.0 - s_front)
            + g2.intercept)
            .clamp(-self.max_speed, self.max_speed);

        let linear = (v_left + v_right) / 2.0;
        let turn = (self.turn_constant * (v_right - v_left))
            .clamp(-self.max_turn_rate, self.max_turn_rate);

        if linear.abs() > 0.1 {
            if linear > 0.0 {
                robot.forward(linear, arena);
            } else {
                robot.backward(-linear, arena);
            }
        }
        if turn.abs() > 0.1 {
            if turn > 0.0 {
                robot.turn_left(turn.abs().round());
            } else {
                robot.turn_right(turn.abs().round());
            }
        }
    }
}

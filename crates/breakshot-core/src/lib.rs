pub mod ball;
pub mod config;
pub mod error;
pub mod geometry;
pub mod rack;
pub mod table;
pub mod vector;

pub use ball::{Ball, BallId};
pub use config::PhysicsConfig;
pub use error::{ConfigError, GeometryError};
pub use table::{CornerId, Cushion, Pocket, PocketId, SegmentId, Table, standard_table};
pub use vector::Vec2;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::ball::Ball;
    use crate::table::{Cushion, Table};
    use crate::vector::Vec2;

    /// A closed rectangular cushion loop with no pockets, counter-clockwise from
    /// the origin. Segment 0 is the bottom rail.
    pub fn box_table(width: f64, height: f64) -> Table {
        Table {
            name: "Test Box".to_string(),
            width,
            height,
            cushions: vec![Cushion {
                vertices: vec![
                    Vec2::new(0.0, 0.0),
                    Vec2::new(width, 0.0),
                    Vec2::new(width, height),
                    Vec2::new(0.0, height),
                    Vec2::new(0.0, 0.0),
                ],
            }],
            pockets: Vec::new(),
        }
    }

    /// A radius-1 ball at `(x, y)` moving with `(vx, vy)` per tick.
    pub fn ball_at(x: f64, y: f64, vx: f64, vy: f64) -> Ball {
        Ball::new(Vec2::new(x, y), 1.0).with_velocity(Vec2::new(vx, vy))
    }

    /// Total unit-mass kinetic energy of the balls still in play.
    pub fn kinetic_energy(balls: &[Ball]) -> f64 {
        balls
            .iter()
            .filter(|b| !b.is_sunk)
            .map(Ball::kinetic_energy)
            .sum()
    }

    /// Sum of velocities (unit-mass momentum) of the balls still in play.
    pub fn momentum(balls: &[Ball]) -> Vec2 {
        balls
            .iter()
            .filter(|b| !b.is_sunk)
            .fold(Vec2::ZERO, |acc, b| acc + b.velocity)
    }
}

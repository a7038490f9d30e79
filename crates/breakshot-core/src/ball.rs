use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::approach_time;
use crate::vector::Vec2;

/// Index of a ball in the driver's ball list.
pub type BallId = usize;

/// A single ball on the table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ball {
    pub position: Vec2,
    /// Displacement per tick.
    pub velocity: Vec2,
    pub radius: f64,
    #[serde(default)]
    pub is_sunk: bool,
}

impl Ball {
    pub fn new(position: Vec2, radius: f64) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            is_sunk: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Whether the ball can produce contacts on its own this tick.
    pub fn is_moving(&self) -> bool {
        !self.is_sunk && self.velocity != Vec2::ZERO
    }

    /// Whether the ball is effectively stationary.
    pub fn is_stopped(&self, min_speed: f64) -> bool {
        self.is_sunk || self.velocity == Vec2::ZERO || self.speed() < min_speed
    }

    /// Where the ball will be after `dt` of a tick at its current velocity.
    pub fn position_at(&self, dt: f64) -> Vec2 {
        self.position + self.velocity * dt
    }

    /// Move the ball forward by `dt` of a tick. Sunk balls stay put.
    pub fn advance(&mut self, dt: f64) {
        if !self.is_sunk {
            self.position = self.position_at(dt);
        }
    }

    /// Unit-mass kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocity.length_squared()
    }

    /// Time from now, in ticks, until this ball touches `other`, assuming both keep
    /// their current velocities. `None` if they never close to contact distance.
    pub fn time_to_ball(&self, other: &Ball) -> Option<f64> {
        approach_time(
            other.position - self.position,
            other.velocity - self.velocity,
            self.radius + other.radius,
        )
    }

    pub fn validate(&self, id: BallId) -> Result<(), GeometryError> {
        if self.radius.is_nan() || self.radius <= 0.0 {
            return Err(GeometryError::BadBallRadius {
                ball: id,
                radius: self.radius,
            });
        }
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(GeometryError::NonFiniteBall { ball: id });
        }
        Ok(())
    }
}

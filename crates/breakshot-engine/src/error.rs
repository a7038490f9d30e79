use breakshot_core::{BallId, ConfigError, GeometryError};

use crate::pending::EventId;

/// Contract violations surfaced by the engine and the tick driver.
///
/// None of these are transient: each means the layout or the detection logic is
/// inconsistent, and retrying the same tick would fail the same way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("balls {a} and {b} share a center; the contact normal is undefined")]
    CoincidentBalls { a: BallId, b: BallId },
    #[error("ball {ball} touches corner {point:?} at its own center")]
    CoincidentCorner { ball: BallId, point: (f64, f64) },
    #[error("ball {ball} is referenced by more than one pending event")]
    SharedParticipant { ball: BallId },
    #[error("no pending event {0}")]
    UnknownEvent(EventId),
    #[error("ball {0} is not on the table")]
    UnknownBall(BallId),
    #[error("resolved {0} events in one tick without reaching the tick boundary")]
    EventBudgetExceeded(usize),
    #[error("re-detection did not settle after {0} passes")]
    DetectionRunaway(usize),
    #[error("strike on ball {ball} needs a finite angle and power, got {angle} and {power}")]
    BadStrike { ball: BallId, angle: f64, power: f64 },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("invalid physics settings: {0}")]
    Config(#[from] ConfigError),
}

use crate::ball::BallId;

/// Table or ball layouts the contact queries cannot work with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("cushion {cushion} segment {segment} has zero length")]
    DegenerateSegment { cushion: usize, segment: usize },
    #[error("cushion {cushion} needs at least two vertices, has {count}")]
    ShortCushion { cushion: usize, count: usize },
    #[error("pocket {pocket} has non-positive radius {radius}")]
    BadPocketRadius { pocket: usize, radius: f64 },
    #[error("ball {ball} has non-positive radius {radius}")]
    BadBallRadius { ball: BallId, radius: f64 },
    #[error("ball {ball} has a non-finite position or velocity")]
    NonFiniteBall { ball: BallId },
}

/// Physics settings outside the range the engine can simulate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    NotAFraction { field: &'static str, value: f64 },
    #[error("max_events_per_tick must be at least 1")]
    NoEventBudget,
}

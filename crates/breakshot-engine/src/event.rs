use breakshot_core::{BallId, CornerId, PocketId, SegmentId, Vec2};

/// What a ball is predicted to hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionKind {
    /// Another ball.
    Ball { other: BallId },
    /// A flat cushion face. `velocity` is the rebound, fixed when the hit was
    /// predicted.
    Wall { segment: SegmentId, velocity: Vec2 },
    /// A cushion vertex, located at `point`.
    Corner { corner: CornerId, point: Vec2 },
    /// A pocket's capture radius.
    Pocket { pocket: PocketId },
}

/// A predicted contact inside the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Fraction of the tick at which contact happens.
    pub time: f64,
    pub ball: BallId,
    pub kind: CollisionKind,
}

impl CollisionEvent {
    pub fn ball_ball(time: f64, ball: BallId, other: BallId) -> Self {
        Self {
            time,
            ball,
            kind: CollisionKind::Ball { other },
        }
    }

    pub fn wall(time: f64, ball: BallId, segment: SegmentId, velocity: Vec2) -> Self {
        Self {
            time,
            ball,
            kind: CollisionKind::Wall { segment, velocity },
        }
    }

    pub fn corner(time: f64, ball: BallId, corner: CornerId, point: Vec2) -> Self {
        Self {
            time,
            ball,
            kind: CollisionKind::Corner { corner, point },
        }
    }

    pub fn pocket(time: f64, ball: BallId, pocket: PocketId) -> Self {
        Self {
            time,
            ball,
            kind: CollisionKind::Pocket { pocket },
        }
    }

    /// The second ball of a ball-ball contact.
    pub fn other_ball(&self) -> Option<BallId> {
        match self.kind {
            CollisionKind::Ball { other } => Some(other),
            _ => None,
        }
    }

    /// Balls whose velocity this event changes when resolved.
    pub fn participants(&self) -> impl Iterator<Item = BallId> {
        std::iter::once(self.ball).chain(self.other_ball())
    }

    pub fn involves(&self, ball: BallId) -> bool {
        self.ball == ball || self.other_ball() == Some(ball)
    }

    /// Short label for logs.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            CollisionKind::Ball { .. } => "ball",
            CollisionKind::Wall { .. } => "wall",
            CollisionKind::Corner { .. } => "corner",
            CollisionKind::Pocket { .. } => "pocket",
        }
    }
}

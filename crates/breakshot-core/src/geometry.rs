//! Continuous contact-time queries between balls and table features.
//!
//! Every query assumes the ball positions are sampled at `window.start` and that
//! velocities stay constant until `window.end`. Results are absolute tick times;
//! anything outside the window is reported as no contact.

use crate::ball::Ball;
use crate::table::{CornerId, PocketId, SegmentId, Table};
use crate::vector::Vec2;

/// The slice of the current tick still to be simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// The whole tick.
    pub const TICK: Self = Self {
        start: 0.0,
        end: 1.0,
    };

    /// From `start` to the end of the tick.
    pub fn remaining(start: f64) -> Self {
        Self { start, end: 1.0 }
    }

    /// Half-open: `start` is inside, `end` is not.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    /// Convert a delay from `start` into an absolute time, if it lands inside.
    pub fn at(&self, delay: f64) -> Option<f64> {
        let t = self.start + delay;
        self.contains(t).then_some(t)
    }
}

/// A predicted cushion bounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub time: f64,
    pub segment: SegmentId,
    /// Velocity the ball leaves the cushion with.
    pub velocity: Vec2,
}

/// A predicted clip of a cushion vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerHit {
    pub time: f64,
    pub corner: CornerId,
    pub point: Vec2,
}

/// A predicted pocket capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PocketHit {
    pub time: f64,
    pub pocket: PocketId,
}

/// Delay until two circles closing with relative motion come within `reach` of
/// each other.
///
/// `offset` is the other body's position minus ours, `relative` its velocity
/// minus ours. Only approaching pairs report a contact; a pair that already
/// overlaps and is still closing reports zero.
pub fn approach_time(offset: Vec2, relative: Vec2, reach: f64) -> Option<f64> {
    let b = offset.dot(relative);
    if b >= 0.0 {
        return None;
    }
    let a = relative.length_squared();
    let c = offset.length_squared() - reach * reach;
    if c <= 0.0 {
        return Some(0.0);
    }
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    // Smaller root of a*s^2 + 2b*s + c, in the form that avoids cancellation.
    Some(c / (disc.sqrt() - b))
}

/// Reflect `velocity` off a surface with unit normal `normal`.
pub fn reflect(velocity: Vec2, normal: Vec2, restitution: f64) -> Vec2 {
    velocity - normal * ((1.0 + restitution) * velocity.dot(normal))
}

/// Earliest time in `window` at which `a` and `b` touch.
pub fn ball_vs_ball(a: &Ball, b: &Ball, window: TimeWindow) -> Option<f64> {
    if a.is_sunk || b.is_sunk {
        return None;
    }
    window.at(a.time_to_ball(b)?)
}

/// Earliest cushion segment `ball` bounces off in `window`.
///
/// Segments are two-sided; the contact normal faces whichever side the ball is
/// on. `exclude` skips the segment the ball has just left.
pub fn ball_vs_segments(
    ball: &Ball,
    table: &Table,
    window: TimeWindow,
    restitution: f64,
    exclude: Option<SegmentId>,
) -> Option<WallHit> {
    if !ball.is_moving() {
        return None;
    }
    let mut best: Option<WallHit> = None;
    for (id, a, b) in table.segments() {
        if exclude == Some(id) {
            continue;
        }
        let Some((delay, normal)) = segment_contact(ball, a, b) else {
            continue;
        };
        let Some(time) = window.at(delay) else {
            continue;
        };
        if best.is_none_or(|hit| time < hit.time) {
            best = Some(WallHit {
                time,
                segment: id,
                velocity: reflect(ball.velocity, normal, restitution),
            });
        }
    }
    best
}

/// Delay and contact normal for `ball` meeting the flat face of segment `a`-`b`.
fn segment_contact(ball: &Ball, a: Vec2, b: Vec2) -> Option<(f64, Vec2)> {
    let len = a.distance(b);
    let along = (b - a).normalized()?;
    let mut normal = along.perp();
    let mut dist = (ball.position - a).dot(normal);
    if dist < 0.0 {
        normal = -normal;
        dist = -dist;
    }

    let closing = -ball.velocity.dot(normal);
    if closing <= 0.0 {
        return None;
    }
    let delay = ((dist - ball.radius) / closing).max(0.0);

    // The flat face only exists between the endpoints; past them it is a corner.
    let contact = ball.position_at(delay);
    let projected = (contact - a).dot(along);
    if projected < 0.0 || projected > len {
        return None;
    }
    Some((delay, normal))
}

/// Earliest cushion vertex `ball` clips in `window`.
pub fn ball_vs_corners(ball: &Ball, table: &Table, window: TimeWindow) -> Option<CornerHit> {
    if !ball.is_moving() {
        return None;
    }
    let mut best: Option<CornerHit> = None;
    for (id, point) in table.corners() {
        let Some(delay) = approach_time(point - ball.position, -ball.velocity, ball.radius) else {
            continue;
        };
        let Some(time) = window.at(delay) else {
            continue;
        };
        if best.is_none_or(|hit| time < hit.time) {
            best = Some(CornerHit {
                time,
                corner: id,
                point,
            });
        }
    }
    best
}

/// Earliest pocket whose capture radius `ball`'s center enters in `window`.
pub fn ball_vs_pockets(ball: &Ball, table: &Table, window: TimeWindow) -> Option<PocketHit> {
    if !ball.is_moving() {
        return None;
    }
    let mut best: Option<PocketHit> = None;
    for (id, pocket) in table.pockets.iter().enumerate() {
        let offset = pocket.center - ball.position;
        let delay = if offset.length_squared() <= pocket.radius * pocket.radius {
            Some(0.0)
        } else {
            approach_time(offset, -ball.velocity, pocket.radius)
        };
        let Some(time) = delay.and_then(|d| window.at(d)) else {
            continue;
        };
        if best.is_none_or(|hit| time < hit.time) {
            best = Some(PocketHit { time, pocket: id });
        }
    }
    best
}

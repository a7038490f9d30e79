use std::collections::VecDeque;

use breakshot_core::geometry::{self, TimeWindow};
use breakshot_core::{Ball, BallId, PhysicsConfig, SegmentId, Table, Vec2};

use crate::error::EngineError;
use crate::event::{CollisionEvent, CollisionKind};
use crate::pending::{EventId, PendingEvents};
use crate::physics::{exchange_normal_velocities, reflect_off_point};

/// Owns the pending contacts of one tick and keeps them consistent with the
/// balls' current velocities.
///
/// The engine never picks which event happens next; the caller chooses one
/// (normally [`PendingEvents::earliest`]), moves the balls to its time and hands
/// it to [`CollisionEngine::resolve`].
#[derive(Debug)]
pub struct CollisionEngine {
    config: PhysicsConfig,
    pending: PendingEvents,
}

impl CollisionEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            pending: PendingEvents::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn pending(&self) -> &PendingEvents {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Predict the first contact of every ball in play. Ball positions must be
    /// sampled at `now`.
    pub fn detect_all(&mut self, balls: &[Ball], table: &Table, now: f64) -> Result<(), EngineError> {
        let work = balls
            .iter()
            .enumerate()
            .filter(|(_, ball)| !ball.is_sunk)
            .map(|(id, _)| (id, None));
        self.redetect(work, balls, table, now, None)?;
        self.pending.check_invariant()
    }

    /// Apply event `id` to the balls and re-predict everything it invalidated.
    ///
    /// Ball positions must already be advanced to the event's time. Returns the
    /// event that was applied.
    pub fn resolve(
        &mut self,
        id: EventId,
        balls: &mut [Ball],
        table: &Table,
    ) -> Result<CollisionEvent, EngineError> {
        let event = self.pending.remove(id).ok_or(EngineError::UnknownEvent(id))?;
        if let Some(missing) = event.participants().find(|&b| b >= balls.len()) {
            return Err(EngineError::UnknownBall(missing));
        }
        tracing::debug!(
            time = event.time,
            ball = event.ball,
            kind = event.kind_name(),
            "Resolving collision"
        );

        // Removing the event dropped the only prediction each participant had.
        if let Some(ball) = event.participants().find(|&b| self.pending.event_for(b).is_some()) {
            return Err(EngineError::SharedParticipant { ball });
        }

        apply_effect(&event, balls)?;

        let work: Vec<(BallId, Option<SegmentId>)> = match event.kind {
            CollisionKind::Ball { other } => vec![(event.ball, None), (other, None)],
            CollisionKind::Wall { segment, .. } => vec![(event.ball, Some(segment))],
            CollisionKind::Corner { corner, .. } => {
                tracing::trace!(ball = event.ball, %corner, "Clipped cushion corner");
                vec![(event.ball, None)]
            },
            // A pocketed ball is out of play; nothing left to predict for it.
            CollisionKind::Pocket { .. } => Vec::new(),
        };

        // A pocketed ball is out of play even before the driver marks it sunk.
        let retired = match event.kind {
            CollisionKind::Pocket { .. } => Some(event.ball),
            _ => None,
        };
        self.redetect(work, balls, table, event.time, retired)?;
        self.pending.check_invariant()?;
        Ok(event)
    }

    /// Give each queued ball its earliest valid prediction from `now` on.
    ///
    /// A ball-ball candidate wins over the partner's existing commitment only if
    /// it is strictly earlier; the displaced commitment's other ball is queued
    /// for a fresh prediction of its own. `retired` is treated as already out
    /// of play.
    fn redetect(
        &mut self,
        work: impl IntoIterator<Item = (BallId, Option<SegmentId>)>,
        balls: &[Ball],
        table: &Table,
        now: f64,
        retired: Option<BallId>,
    ) -> Result<(), EngineError> {
        let queue: VecDeque<_> = work.into_iter().collect();
        let limit = 4 * balls.len() * balls.len() + queue.len() + 16;
        self.redetect_bounded(queue, balls, table, now, retired, limit)
    }

    /// [`Self::redetect`] with an explicit cap on queue passes.
    fn redetect_bounded(
        &mut self,
        mut queue: VecDeque<(BallId, Option<SegmentId>)>,
        balls: &[Ball],
        table: &Table,
        now: f64,
        retired: Option<BallId>,
        limit: usize,
    ) -> Result<(), EngineError> {
        let window = TimeWindow::remaining(now);
        let mut passes = 0;

        while let Some((id, exclude)) = queue.pop_front() {
            passes += 1;
            if passes > limit {
                return Err(EngineError::DetectionRunaway(limit));
            }
            let ball = balls.get(id).ok_or(EngineError::UnknownBall(id))?;
            if ball.is_sunk || retired == Some(id) {
                continue;
            }
            let Some(candidate) =
                self.earliest_candidate(id, balls, table, window, exclude, retired)
            else {
                continue;
            };
            if let Some((_, current)) = self.pending.event_for(id)
                && current.time <= candidate.time
            {
                continue;
            }

            for participant in candidate.participants() {
                if let Some(evicted) = self.pending.purge(participant) {
                    tracing::trace!(
                        ball = participant,
                        evicted_time = evicted.time,
                        new_time = candidate.time,
                        "Evicted later prediction"
                    );
                    queue.extend(
                        evicted
                            .participants()
                            .filter(|&b| !candidate.involves(b))
                            .map(|b| (b, None)),
                    );
                }
            }
            tracing::trace!(
                time = candidate.time,
                ball = candidate.ball,
                kind = candidate.kind_name(),
                "Scheduled collision"
            );
            self.pending.insert(candidate)?;
        }
        Ok(())
    }

    /// The soonest contact `id` can make in `window` given the other balls'
    /// commitments.
    fn earliest_candidate(
        &self,
        id: BallId,
        balls: &[Ball],
        table: &Table,
        window: TimeWindow,
        exclude: Option<SegmentId>,
        retired: Option<BallId>,
    ) -> Option<CollisionEvent> {
        let ball = &balls[id];
        let mut best: Option<CollisionEvent> = None;
        let mut consider = |event: CollisionEvent| {
            if best.is_none_or(|b| event.time < b.time) {
                best = Some(event);
            }
        };

        for (other_id, other) in balls.iter().enumerate() {
            if other_id == id || retired == Some(other_id) {
                continue;
            }
            let Some(time) = geometry::ball_vs_ball(ball, other, window) else {
                continue;
            };
            // The other ball changes course before it would reach us.
            if let Some((_, committed)) = self.pending.event_for(other_id)
                && !committed.involves(id)
                && committed.time <= time
            {
                continue;
            }
            consider(CollisionEvent::ball_ball(time, id, other_id));
        }

        if let Some(hit) = geometry::ball_vs_segments(
            ball,
            table,
            window,
            self.config.cushion_restitution,
            exclude,
        ) {
            consider(CollisionEvent::wall(hit.time, id, hit.segment, hit.velocity));
        }
        if let Some(hit) = geometry::ball_vs_corners(ball, table, window) {
            consider(CollisionEvent::corner(hit.time, id, hit.corner, hit.point));
        }
        if let Some(hit) = geometry::ball_vs_pockets(ball, table, window) {
            consider(CollisionEvent::pocket(hit.time, id, hit.pocket));
        }
        best
    }
}

/// Change the participants' velocities the way `event` dictates.
fn apply_effect(event: &CollisionEvent, balls: &mut [Ball]) -> Result<(), EngineError> {
    let id = event.ball;
    match event.kind {
        CollisionKind::Ball { other } => {
            let a = balls.get(id).ok_or(EngineError::UnknownBall(id))?;
            let b = balls.get(other).ok_or(EngineError::UnknownBall(other))?;
            let (va, vb) = exchange_normal_velocities(a, b)
                .ok_or(EngineError::CoincidentBalls { a: id, b: other })?;
            balls[id].velocity = va;
            balls[other].velocity = vb;
        },
        CollisionKind::Wall { velocity, .. } => {
            ball_mut(balls, id)?.velocity = velocity;
        },
        CollisionKind::Corner { point, .. } => {
            let ball = ball_mut(balls, id)?;
            ball.velocity = reflect_off_point(ball, point).ok_or(EngineError::CoincidentCorner {
                ball: id,
                point: (point.x, point.y),
            })?;
        },
        CollisionKind::Pocket { .. } => {
            ball_mut(balls, id)?.velocity = Vec2::ZERO;
        },
    }
    Ok(())
}

fn ball_mut(balls: &mut [Ball], id: BallId) -> Result<&mut Ball, EngineError> {
    balls.get_mut(id).ok_or(EngineError::UnknownBall(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakshot_core::{CornerId, Pocket};
    use breakshot_core::test_helpers::{ball_at, box_table};

    fn engine() -> CollisionEngine {
        CollisionEngine::new(PhysicsConfig::frictionless())
    }

    fn advance(balls: &mut [Ball], dt: f64) {
        for ball in balls.iter_mut() {
            ball.advance(dt);
        }
    }

    #[test]
    fn head_on_pair_is_one_event() {
        let table = box_table(20.0, 10.0);
        let balls = vec![ball_at(5.0, 5.0, 1.0, 0.0), ball_at(8.0, 5.0, -1.0, 0.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");

        assert_eq!(engine.pending().len(), 1);
        let (_, event) = engine.pending().earliest().expect("one event");
        assert_eq!(event.time, 0.5);
        assert!(event.involves(0) && event.involves(1));
    }

    #[test]
    fn resolving_head_on_swaps_and_clears() {
        let table = box_table(20.0, 10.0);
        let mut balls = vec![ball_at(5.0, 5.0, 1.0, 0.0), ball_at(8.0, 5.0, -1.0, 0.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (id, event) = engine.pending().earliest().expect("one event");
        let time = event.time;

        advance(&mut balls, time);
        engine.resolve(id, &mut balls, &table).expect("resolve");

        assert_eq!(balls[0].velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(balls[1].velocity, Vec2::new(1.0, 0.0));
        // Receding at 1/tick from x=5.5 and x=7.5: neither reaches a cushion.
        assert!(engine.pending().is_empty());
    }

    #[test]
    fn later_partner_commitment_is_evicted() {
        let table = box_table(40.0, 20.0);
        // Ball 0 rises to meet ball 1 at t = 0.8; ball 2 cuts in from the left
        // and reaches ball 1 at t = 0.3.
        let mut balls = vec![
            ball_at(10.0, 3.2, 0.0, 2.0),
            ball_at(10.0, 10.0, 0.0, -4.0),
            ball_at(6.5, 8.8, 5.0, 0.0),
        ];
        let mut engine = engine();

        balls[2].is_sunk = true;
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (_, event) = engine.pending().event_for(1).expect("1 meets 0");
        assert!(event.involves(0));
        assert!((event.time - 0.8).abs() < 1e-9);

        balls[2].is_sunk = false;
        engine.clear();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (_, event) = engine.pending().event_for(1).expect("1 meets 2");
        assert!(event.involves(2), "ball 1 should be committed to ball 2: {event:?}");
        assert!((event.time - 0.3).abs() < 1e-9);
        assert!(
            engine.pending().event_for(0).is_none(),
            "ball 0 lost its partner and has nothing else to hit"
        );
        assert_eq!(engine.pending().check_invariant(), Ok(()));
    }

    #[test]
    fn wall_bounce_applies_precomputed_velocity() {
        let table = box_table(20.0, 10.0);
        let mut balls = vec![ball_at(5.0, 2.0, 1.0, -2.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (id, event) = engine.pending().earliest().expect("wall");
        let CollisionKind::Wall { velocity, .. } = event.kind else {
            panic!("expected a wall event, got {event:?}");
        };
        let time = event.time;

        advance(&mut balls, time);
        engine.resolve(id, &mut balls, &table).expect("resolve");
        assert_eq!(balls[0].velocity, velocity);
        assert_eq!(velocity, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn corner_clip_reflects_about_contact_normal() {
        let mut table = box_table(20.0, 20.0);
        table.cushions.push(breakshot_core::Cushion {
            vertices: vec![Vec2::new(10.0, 10.0), Vec2::new(10.0, 15.0)],
        });
        let mut balls = vec![ball_at(10.0, 7.0, 0.0, 4.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (id, event) = engine.pending().earliest().expect("corner");
        let CollisionKind::Corner { corner, point } = event.kind else {
            panic!("expected a corner event, got {event:?}");
        };
        assert_eq!(
            corner,
            CornerId {
                cushion: 1,
                vertex: 0
            }
        );
        assert_eq!(point, Vec2::new(10.0, 10.0));
        assert_eq!(event.time, 0.5);

        advance(&mut balls, 0.5);
        engine.resolve(id, &mut balls, &table).expect("resolve");
        assert_eq!(balls[0].velocity, Vec2::new(0.0, -4.0));
    }

    #[test]
    fn pocket_stops_ball_and_leaves_nothing_behind() {
        let mut table = box_table(20.0, 10.0);
        table.pockets.push(Pocket {
            center: Vec2::new(10.0, 5.0),
            radius: 1.0,
        });
        let mut balls = vec![ball_at(6.0, 5.0, 4.0, 0.0), ball_at(15.0, 8.0, 0.0, 0.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (id, event) = engine.pending().earliest().expect("pocket");
        assert!(matches!(event.kind, CollisionKind::Pocket { pocket: 0 }));

        advance(&mut balls, event.time);
        engine.resolve(id, &mut balls, &table).expect("resolve");
        assert_eq!(balls[0].velocity, Vec2::ZERO);
        assert!(engine.pending().event_for(0).is_none());
    }

    #[test]
    fn unknown_event_is_an_error() {
        let table = box_table(20.0, 10.0);
        let mut balls = vec![ball_at(5.0, 2.0, 1.0, -2.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        let (id, _) = engine.pending().earliest().expect("wall");
        engine.resolve(id, &mut balls, &table).expect("first resolve");
        assert_eq!(
            engine.resolve(id, &mut balls, &table),
            Err(EngineError::UnknownEvent(id))
        );
    }

    #[test]
    fn coincident_balls_are_a_contract_violation() {
        let table = box_table(20.0, 10.0);
        let mut balls = vec![ball_at(5.0, 5.0, 1.0, 0.0), ball_at(5.0, 5.0, -1.0, 0.0)];
        let mut engine = engine();
        let id = engine
            .pending
            .insert(CollisionEvent::ball_ball(0.0, 0, 1))
            .expect("free balls");
        assert_eq!(
            engine.resolve(id, &mut balls, &table),
            Err(EngineError::CoincidentBalls { a: 0, b: 1 })
        );
    }

    #[test]
    fn stationary_balls_produce_nothing() {
        let table = box_table(20.0, 10.0);
        let balls = vec![ball_at(5.0, 5.0, 0.0, 0.0), ball_at(8.0, 5.0, 0.0, 0.0)];
        let mut engine = engine();
        engine.detect_all(&balls, &table, 0.0).expect("detect");
        assert!(engine.pending().is_empty());
    }

    #[test]
    fn detection_is_repeatable() {
        let table = box_table(40.0, 20.0);
        let balls = vec![
            ball_at(5.0, 5.0, 3.0, 1.0),
            ball_at(12.0, 7.0, -2.0, 0.5),
            ball_at(20.0, 3.0, 0.0, -4.0),
            ball_at(30.0, 15.0, 5.0, 2.0),
        ];
        let snapshot = |engine: &CollisionEngine| {
            let mut events: Vec<_> = engine.pending().iter().map(|(_, e)| *e).collect();
            events.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.ball.cmp(&b.ball)));
            events
        };
        let mut first = engine();
        first.detect_all(&balls, &table, 0.0).expect("detect");
        let mut second = engine();
        second.detect_all(&balls, &table, 0.0).expect("detect");
        assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[test]
    fn corner_at_ball_center_is_a_contract_violation() {
        let table = box_table(20.0, 10.0);
        let mut balls = vec![ball_at(5.0, 5.0, 1.0, 0.0)];
        let mut engine = engine();
        let corner = CornerId {
            cushion: 0,
            vertex: 0,
        };
        let id = engine
            .pending
            .insert(CollisionEvent::corner(0.0, 0, corner, Vec2::new(5.0, 5.0)))
            .expect("free ball");
        assert_eq!(
            engine.resolve(id, &mut balls, &table),
            Err(EngineError::CoincidentCorner {
                ball: 0,
                point: (5.0, 5.0)
            })
        );
        assert_eq!(balls[0].velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn event_naming_a_missing_ball_is_rejected() {
        let table = box_table(20.0, 10.0);
        let mut balls = vec![ball_at(5.0, 5.0, 1.0, 0.0), ball_at(8.0, 5.0, -1.0, 0.0)];
        let mut engine = engine();
        let id = engine
            .pending
            .insert(CollisionEvent::ball_ball(0.2, 1, 7))
            .expect("free balls");
        assert_eq!(
            engine.resolve(id, &mut balls, &table),
            Err(EngineError::UnknownBall(7))
        );
        assert_eq!(balls[1].velocity, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn redetection_stops_at_its_pass_limit() {
        let table = box_table(40.0, 20.0);
        let balls = vec![ball_at(5.0, 5.0, -8.0, 0.0), ball_at(30.0, 15.0, 8.0, 0.0)];
        let mut engine = engine();
        let queue = VecDeque::from([(0, None), (1, None)]);
        assert_eq!(
            engine.redetect_bounded(queue, &balls, &table, 0.0, None, 1),
            Err(EngineError::DetectionRunaway(1))
        );
    }
}

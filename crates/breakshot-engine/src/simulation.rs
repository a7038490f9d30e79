use serde::Serialize;

use breakshot_core::{Ball, BallId, PhysicsConfig, Table, Vec2};

use crate::engine::CollisionEngine;
use crate::error::EngineError;
use crate::event::{CollisionEvent, CollisionKind};
use crate::pending::PendingEvents;

/// What happened during one tick.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events_resolved: usize,
    pub pocketed: Vec<BallId>,
}

/// Drives the balls on a table through fixed ticks.
///
/// Each tick runs to completion before returning: every contact predicted
/// inside it is resolved in time order, then the balls are carried to the end
/// of the tick and cloth friction is applied.
#[derive(Debug)]
pub struct Simulation {
    table: Table,
    balls: Vec<Ball>,
    engine: CollisionEngine,
    /// Fraction of the current tick already simulated.
    now: f64,
    tick: u64,
    report: TickReport,
}

impl Simulation {
    pub fn new(table: Table, balls: Vec<Ball>, config: PhysicsConfig) -> Result<Self, EngineError> {
        config.validate()?;
        table.validate()?;
        for (id, ball) in balls.iter().enumerate() {
            ball.validate(id)?;
        }
        Ok(Self {
            table,
            balls,
            engine: CollisionEngine::new(config),
            now: 0.0,
            tick: 0,
            report: TickReport::default(),
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id)
    }

    pub fn config(&self) -> &PhysicsConfig {
        self.engine.config()
    }

    pub fn pending(&self) -> &PendingEvents {
        self.engine.pending()
    }

    /// Fraction of the current tick already simulated.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether every ball in play has come to rest.
    pub fn is_settled(&self) -> bool {
        let min_speed = self.config().min_speed;
        self.balls.iter().all(|b| b.is_stopped(min_speed))
    }

    /// Hit `ball` with the cue at `angle` radians from +X. Power is clamped to
    /// the configured maximum cue speed. Sunk balls ignore the strike.
    pub fn strike(&mut self, ball: BallId, angle: f64, power: f64) -> Result<(), EngineError> {
        if !(angle.is_finite() && power.is_finite()) {
            return Err(EngineError::BadStrike { ball, angle, power });
        }
        let max = self.engine.config().max_cue_speed;
        let target = self
            .balls
            .get_mut(ball)
            .ok_or(EngineError::UnknownBall(ball))?;
        if target.is_sunk {
            return Ok(());
        }
        target.velocity = Vec2::from_angle(angle) * power.clamp(0.0, max);
        tracing::debug!(ball, angle, power, "Cue strike");
        Ok(())
    }

    /// Start a tick: forget old predictions and predict from the current state.
    pub fn begin_tick(&mut self) -> Result<(), EngineError> {
        self.now = 0.0;
        self.report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };
        self.engine.clear();
        self.engine.detect_all(&self.balls, &self.table, 0.0)
    }

    /// Resolve the earliest pending contact, if any remains in this tick.
    pub fn resolve_next(&mut self) -> Result<Option<CollisionEvent>, EngineError> {
        let Some((id, event)) = self.engine.pending().earliest() else {
            return Ok(None);
        };
        let time = event.time;
        if time >= 1.0 {
            return Ok(None);
        }
        let budget = self.engine.config().max_events_per_tick;
        if self.report.events_resolved >= budget {
            return Err(EngineError::EventBudgetExceeded(self.report.events_resolved));
        }

        self.advance_to(time);
        let event = self.engine.resolve(id, &mut self.balls, &self.table)?;
        self.report.events_resolved += 1;

        if let CollisionKind::Pocket { pocket } = event.kind
            && let Some(ball) = self.balls.get_mut(event.ball)
        {
            ball.is_sunk = true;
            self.report.pocketed.push(event.ball);
            tracing::info!(ball = event.ball, pocket, time, "Ball pocketed");
        }
        Ok(Some(event))
    }

    /// Carry every ball to the end of the tick and apply cloth friction.
    pub fn finish_tick(&mut self) -> TickReport {
        self.advance_to(1.0);
        self.engine.clear();

        let config = self.engine.config();
        let keep = 1.0 - config.rolling_decay;
        let min_speed = config.min_speed;
        for ball in self.balls.iter_mut().filter(|b| !b.is_sunk) {
            ball.velocity = ball.velocity * keep;
            if ball.speed() < min_speed {
                ball.velocity = Vec2::ZERO;
            }
        }

        self.now = 0.0;
        self.tick += 1;
        std::mem::take(&mut self.report)
    }

    /// Simulate one whole tick.
    pub fn advance_tick(&mut self) -> Result<TickReport, EngineError> {
        self.begin_tick()?;
        while self.resolve_next()?.is_some() {}
        Ok(self.finish_tick())
    }

    /// Run ticks until the table settles or `max_ticks` have passed. Returns the
    /// reports of every tick run.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> Result<Vec<TickReport>, EngineError> {
        let mut reports = Vec::new();
        for _ in 0..max_ticks {
            if self.is_settled() {
                break;
            }
            reports.push(self.advance_tick()?);
        }
        Ok(reports)
    }

    fn advance_to(&mut self, time: f64) {
        let dt = time - self.now;
        if dt > 0.0 {
            for ball in &mut self.balls {
                ball.advance(dt);
            }
            self.now = time;
        }
    }
}

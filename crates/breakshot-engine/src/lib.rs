//! Event-driven collision handling for balls on a pocketed table.
//!
//! Within one tick, [`CollisionEngine`] keeps a set of predicted contacts that
//! always matches the balls' current velocities, and [`Simulation`] walks those
//! contacts in time order until none remain before the tick boundary.

pub mod engine;
pub mod error;
pub mod event;
pub mod pending;
pub mod physics;
pub mod simulation;

pub use engine::CollisionEngine;
pub use error::EngineError;
pub use event::{CollisionEvent, CollisionKind};
pub use pending::{EventId, PendingEvents};
pub use simulation::{Simulation, TickReport};

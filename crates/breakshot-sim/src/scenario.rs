use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use breakshot_core::rack::{break_layout, foot_spot, head_spot};
use breakshot_core::{Ball, BallId, PhysicsConfig, Table, standard_table};

/// Largest random deviation, in radians, applied to the default break.
pub const BREAK_JITTER: f64 = 0.01;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse scenario {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// A cue strike applied before the first tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub ball: BallId,
    /// Radians from +X.
    pub angle: f64,
    pub power: f64,
}

/// Starting layout for a run. Missing parts fall back to a standard table and
/// a racked break.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub table: Option<Table>,
    pub balls: Vec<Ball>,
    pub shot: Option<Shot>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ScenarioError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Resolve defaults into a concrete table, balls and opening shot.
    ///
    /// `rng` only perturbs the default break; explicit shots are used as given.
    pub fn resolve(self, config: &PhysicsConfig, rng: &mut impl Rng) -> (Table, Vec<Ball>, Shot) {
        let table = self.table.unwrap_or_else(|| standard_table(config));
        let balls = if self.balls.is_empty() {
            break_layout(config)
        } else {
            self.balls
        };
        let shot = self.shot.unwrap_or_else(|| {
            let aim = foot_spot(config) - head_spot(config);
            Shot {
                ball: 0,
                angle: aim.y.atan2(aim.x) + rng.random_range(-BREAK_JITTER..BREAK_JITTER),
                power: config.max_cue_speed,
            }
        });
        (table, balls, shot)
    }
}

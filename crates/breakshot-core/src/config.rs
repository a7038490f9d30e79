use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default ball radius (inches, regulation pool ball).
pub const BALL_RADIUS: f64 = 1.125;

/// Physical constants shared by the geometry queries, the collision engine and
/// the tick driver.
///
/// Lengths are in table units, speeds in table units per tick. Built once at
/// startup and passed around by reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Playing surface width, cushion nose to cushion nose.
    pub table_width: f64,
    /// Playing surface height.
    pub table_height: f64,
    pub ball_radius: f64,
    /// Capture radius of the four corner pockets.
    pub corner_pocket_radius: f64,
    /// Capture radius of the two side pockets.
    pub side_pocket_radius: f64,
    /// Distance from the table corner to where a long/short rail begins.
    pub corner_mouth: f64,
    /// Half the opening of a side pocket along the long rail.
    pub side_mouth: f64,
    /// Fraction of normal speed kept after a cushion bounce. 1.0 is an ideal rail.
    pub cushion_restitution: f64,
    /// Fraction of speed lost to cloth friction at the end of every tick.
    pub rolling_decay: f64,
    /// Speeds below this are snapped to zero at the end of a tick.
    pub min_speed: f64,
    /// Upper bound on cue strike speed.
    pub max_cue_speed: f64,
    /// Resolutions allowed in one tick before the driver reports a fault.
    pub max_events_per_tick: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            table_width: 100.0,
            table_height: 50.0,
            ball_radius: BALL_RADIUS,
            corner_pocket_radius: 2.5,
            side_pocket_radius: 2.5,
            corner_mouth: 4.0,
            side_mouth: 2.75,
            cushion_restitution: 1.0,
            rolling_decay: 0.005,
            min_speed: 0.01,
            max_cue_speed: 8.0,
            max_events_per_tick: 1000,
        }
    }
}

impl PhysicsConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing, unparseable or out of range.
    pub fn load() -> Self {
        let path = std::env::var("BREAKSHOT_CONFIG")
            .unwrap_or_else(|_| "config/physics.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<PhysicsConfig>(&content) {
                Ok(cfg) => match cfg.validate() {
                    Ok(()) => cfg,
                    Err(e) => {
                        tracing::warn!("Invalid settings in {path}: {e}, using defaults");
                        PhysicsConfig::default()
                    },
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    PhysicsConfig::default()
                },
            },
            Err(_) => PhysicsConfig::default(),
        }
    }

    /// Check every setting is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("table_width", self.table_width),
            ("table_height", self.table_height),
            ("ball_radius", self.ball_radius),
            ("corner_pocket_radius", self.corner_pocket_radius),
            ("side_pocket_radius", self.side_pocket_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("corner_mouth", self.corner_mouth),
            ("side_mouth", self.side_mouth),
            ("min_speed", self.min_speed),
            ("max_cue_speed", self.max_cue_speed),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        for (field, value) in [
            ("cushion_restitution", self.cushion_restitution),
            ("rolling_decay", self.rolling_decay),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::NotAFraction { field, value });
            }
        }
        if self.max_events_per_tick == 0 {
            return Err(ConfigError::NoEventBudget);
        }
        Ok(())
    }

    /// Config with friction and cushion losses turned off, so kinetic energy is
    /// conserved across whole ticks.
    pub fn frictionless() -> Self {
        Self {
            cushion_restitution: 1.0,
            rolling_decay: 0.0,
            min_speed: 0.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: PhysicsConfig = toml::from_str("rolling_decay = 0.02\n").expect("valid toml");
        assert_eq!(cfg.rolling_decay, 0.02);
        assert_eq!(cfg.ball_radius, BALL_RADIUS);
        assert_eq!(cfg.max_events_per_tick, 1000);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PhysicsConfig::default().validate(), Ok(()));
        assert_eq!(PhysicsConfig::frictionless().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let negative_cue = PhysicsConfig {
            max_cue_speed: -1.0,
            ..PhysicsConfig::default()
        };
        assert_eq!(
            negative_cue.validate(),
            Err(ConfigError::Negative {
                field: "max_cue_speed",
                value: -1.0
            })
        );

        let nan_cue = PhysicsConfig {
            max_cue_speed: f64::NAN,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            nan_cue.validate(),
            Err(ConfigError::Negative { field: "max_cue_speed", .. })
        ));

        let sticky_cloth = PhysicsConfig {
            rolling_decay: 1.5,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            sticky_cloth.validate(),
            Err(ConfigError::NotAFraction { field: "rolling_decay", .. })
        ));

        let no_pocket = PhysicsConfig {
            side_pocket_radius: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            no_pocket.validate(),
            Err(ConfigError::NotPositive { field: "side_pocket_radius", .. })
        ));

        let no_budget = PhysicsConfig {
            max_events_per_tick: 0,
            ..PhysicsConfig::default()
        };
        assert_eq!(no_budget.validate(), Err(ConfigError::NoEventBudget));
    }

    #[test]
    fn frictionless_disables_losses() {
        let cfg = PhysicsConfig::frictionless();
        assert_eq!(cfg.rolling_decay, 0.0);
        assert_eq!(cfg.cushion_restitution, 1.0);
        assert_eq!(cfg.table_width, PhysicsConfig::default().table_width);
    }
}

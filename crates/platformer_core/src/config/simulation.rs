//! # Simulation Configuration
//!
//! Tunables for the movement stepper and the level the actors move in.
//! Everything here is tick-based: speeds are pixels per tick at a time
//! multiplier of `1.0`, delays are counted in ticks.
//!
//! Structural constants (tree fattening margin, tile size, trigger count) are
//! not configurable and live next to the code that relies on them.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::tiles::PitType;

/// Movement stepper tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Speed clamp applied to both axes before integration
    pub max_speed: f32,
    /// Slice length used when scanning for the furthest partial move
    pub collision_check_step: f32,
    /// Displacement per tick above which a step is split into two halves
    pub substep_threshold: f32,
    /// Default horizontal force decay per tick
    pub default_friction: f32,
    /// Ticks to wait between two unstuck nudges
    pub unstuck_cooldown: f32,
    /// Gravity multiplier below the water level
    pub water_gravity_scale: f32,
    /// Elasticity multiplier below the water level
    pub water_elasticity_scale: f32,
    /// Fraction of gravity that decays upward forces every tick
    pub gravity_decay: f32,
    /// Horizontal progress ratio below which an airborne move counts as a wall hit
    pub wall_hit_ratio: f32,
    /// Minimum vertical range probed when walking over slopes
    pub max_slope_y_diff: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 16.0,
            collision_check_step: 0.5,
            substep_threshold: 20.0,
            default_friction: 1.5,
            unstuck_cooldown: 60.0,
            water_gravity_scale: 0.5,
            water_elasticity_scale: 0.7,
            gravity_decay: 0.33,
            wall_hit_ratio: 0.3,
            max_slope_y_diff: 3.0,
        }
    }
}

/// Level-wide tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Gravity added to the vertical speed of airborne actors every tick
    pub gravity: f32,
    /// Y coordinate of the water surface; actors below it are slowed down
    pub water_level: f32,
    /// What happens below the bottom row of the tile grid
    pub pit_type: PitType,
    /// Ticks between two frames of a collapsing tile
    pub collapse_delay: u16,
    /// Length of one collapse timer period in ticks
    pub collapse_period: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            water_level: f32::MAX,
            pit_type: PitType::StandOnPlatform,
            collapse_delay: 4,
            collapse_period: 1.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Movement stepper settings
    pub movement: MovementConfig,
    /// Level settings
    pub level: LevelConfig,
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Check that every step and threshold is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("movement.max_speed", self.movement.max_speed)?;
        positive("movement.collision_check_step", self.movement.collision_check_step)?;
        positive("movement.substep_threshold", self.movement.substep_threshold)?;
        positive("level.collapse_period", self.level.collapse_period)?;

        if self.movement.default_friction < 0.0 {
            return Err(ConfigError::Invalid {
                field: "movement.default_friction",
                reason: format!("must not be negative, got {}", self.movement.default_friction),
            });
        }
        if self.level.gravity.is_nan() {
            return Err(ConfigError::Invalid {
                field: "level.gravity",
                reason: "must be a number".to_string(),
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

//! Demo configuration

use platformer_core::config::{Config, ConfigError, SimulationConfig};
use serde::{Deserialize, Serialize};

/// Demo configuration, loadable from `.toml` or `.ron`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Core simulation settings
    pub simulation: SimulationConfig,

    /// Scenario settings
    pub scenario: ScenarioConfig,
}

/// What the headless run does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Ticks to simulate
    pub ticks: u32,

    /// Time multiplier per tick (1.0 = one 60 Hz frame)
    pub time_mult: f32,

    /// Number of walkers spawned above the level
    pub walkers: u32,

    /// Walking speed in pixels per tick
    pub walk_speed: f32,

    /// Chance per grounded tick that a walker jumps
    pub jump_chance: f64,

    /// Seed for walker behavior and debris scatter
    pub seed: u64,

    /// Ticks between two progress reports
    pub report_interval: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            time_mult: 1.0,
            walkers: 6,
            walk_speed: 1.5,
            jump_chance: 0.02,
            seed: 0x5eed,
            report_interval: 120,
        }
    }
}

impl Config for DemoConfig {}

impl DemoConfig {
    /// Check every value the demo depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;

        if !(self.scenario.time_mult > 0.0) {
            return Err(ConfigError::Invalid {
                field: "scenario.time_mult",
                reason: format!("must be positive, got {}", self.scenario.time_mult),
            });
        }
        if !(0.0..=1.0).contains(&self.scenario.jump_chance) {
            return Err(ConfigError::Invalid {
                field: "scenario.jump_chance",
                reason: format!("must be within 0..=1, got {}", self.scenario.jump_chance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            [scenario]
            walkers = 2

            [simulation.level]
            gravity = 0.25
        "#;
        let config = DemoConfig::from_str_with_format(text, "demo.toml").unwrap();

        assert_eq!(config.scenario.walkers, 2);
        assert_eq!(config.scenario.ticks, 600);
        assert_relative_eq!(config.simulation.level.gravity, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_jump_chance() {
        let mut config = DemoConfig::default();
        config.scenario.jump_chance = 2.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "scenario.jump_chance", .. })
        ));
    }
}

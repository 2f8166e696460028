//! Declarative benchmark configuration.
//!
//! A [`BenchConfig`] names the grid, the timing methodology and the rating
//! model. It can be built in code or loaded from TOML:
//!
//! ```toml
//! num_trials = 1000
//! best_of = 100
//!
//! [[axes]]
//! name = "method"
//! values = ["labeled_break", "early_return"]
//!
//! [[axes]]
//! name = "n1"
//! values = [1, 2, 4, 8]
//! ```
//!
//! Axes are an array so their declaration order survives parsing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, ConfigError};
use crate::grid::Axes;
use crate::rating::ModelParams;
use crate::registry::CandidateRegistry;
use crate::utils::stats::DEFAULT_EPSILON;
use crate::utils::timer::TimingConfig;

/// Everything needed to run and rank one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Parameter grid, `method` axis included
    pub axes: Axes,
    #[serde(flatten)]
    pub timing: TimingConfig,
    /// Emit one long-form row per robust sample, not only min/mean
    pub record_all: bool,
    /// Floor (seconds) applied to statistics before computing speedups
    pub epsilon: f64,
    /// Rating model parameters
    pub model: ModelParams,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            axes: Axes::new(),
            timing: TimingConfig::default(),
            record_all: true,
            epsilon: DEFAULT_EPSILON,
            model: ModelParams::default(),
        }
    }
}

impl BenchConfig {
    pub fn with_axes(mut self, axes: Axes) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, BenchError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks that need no candidates: grid shape, timing, epsilon, model.
    pub fn validate_shape(&self) -> Result<(), ConfigError> {
        self.axes.validate()?;
        self.timing.validate()?;
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon {
                epsilon: self.epsilon,
            });
        }
        self.model.validate()
    }

    /// Full validation against the candidates that will be dispatched to.
    pub fn validate(&self, registry: &CandidateRegistry) -> Result<(), ConfigError> {
        self.validate_shape()?;
        for name in self.axes.method_names()? {
            if registry.find(&name).is_none() {
                return Err(ConfigError::UnknownCandidate { name });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Candidate;
    use crate::utils::timer::PinStrategy;

    const SAMPLE: &str = r#"
num_trials = 20
best_of = 5
warmup_iterations = 0
pin_strategy = "off"
record_all = false

[[axes]]
name = "method"
values = ["b", "a"]

[[axes]]
name = "n"
values = [1, 2, 3]

[[axes]]
name = "mode"
values = ["fast", "slow"]

[model]
beta = 2.0
"#;

    #[test]
    fn test_parse_toml_keeps_axis_order() {
        let config = BenchConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.axes.names(), vec!["method", "n", "mode"]);
        assert_eq!(config.axes.method_names().unwrap(), vec!["b", "a"]);
        assert_eq!(config.timing.num_trials, 20);
        assert_eq!(config.timing.best_of, 5);
        assert_eq!(config.timing.pin_strategy, PinStrategy::Off);
        assert!(!config.record_all);
        assert_eq!(config.model.beta, 2.0);
        assert_eq!(config.model.mu, ModelParams::default().mu);
        assert_eq!(config.axes.grid_size(), Some(12));
    }

    #[test]
    fn test_defaults_when_missing() {
        let config = BenchConfig::from_toml_str("").unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.validate_shape(), Err(ConfigError::EmptyAxes));
    }

    #[test]
    fn test_validate_against_registry() {
        let config = BenchConfig::from_toml_str(SAMPLE).unwrap();
        let mut registry = CandidateRegistry::new();
        registry.register(Candidate::new("a", &["n"], |_| Ok(()))).unwrap();
        assert_eq!(
            config.validate(&registry),
            Err(ConfigError::UnknownCandidate {
                name: "b".to_string()
            })
        );
        registry.register(Candidate::new("b", &["n"], |_| Ok(()))).unwrap();
        assert!(config.validate(&registry).is_ok());
    }

    #[test]
    fn test_best_of_must_divide() {
        let mut config = BenchConfig::from_toml_str(SAMPLE).unwrap();
        config.timing.best_of = 3;
        assert_eq!(
            config.validate_shape(),
            Err(ConfigError::BestOfNotDivisor {
                best_of: 3,
                num_trials: 20
            })
        );
    }

    #[test]
    fn test_invalid_epsilon() {
        let mut config = BenchConfig::from_toml_str(SAMPLE).unwrap();
        config.epsilon = 0.0;
        assert!(matches!(
            config.validate_shape(),
            Err(ConfigError::InvalidEpsilon { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = BenchConfig::load(&path).unwrap();
        assert_eq!(config.timing.num_trials, 20);
        assert!(matches!(
            BenchConfig::load(dir.path().join("missing.toml")),
            Err(BenchError::Io(_))
        ));
    }
}

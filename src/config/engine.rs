// src/config/engine.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};

const WEIGHT_EPSILON: f64 = 1e-9;

fn default_max_matching_positions() -> usize { 100 }

/// Blend of the two ranking signals. Both weights lie in `[0, 1]` and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the suspicious percentage.
    pub percent: f64,
    /// Weight of the matched-fingerprint count relative to the run maximum.
    pub matches: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { percent: 0.5, matches: 0.5 }
    }
}

impl ScoreWeights {
    pub fn new(percent: f64, matches: f64) -> Result<Self> {
        let weights = Self { percent, matches };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("percent", self.percent), ("matches", self.matches)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(
                    format!("Invalid score weight {} (must be between 0 and 1): {}", name, value)
                ));
            }
        }
        let total = self.percent + self.matches;
        if (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(Error::Config(
                format!("Score weights must sum to 1, got {}", total)
            ));
        }
        Ok(())
    }
}

/// Installation-wide settings read from `lichen_config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cap on matching positions in one `others` group before it is flushed.
    #[serde(default = "default_max_matching_positions")]
    pub max_matching_positions: usize,
    #[serde(default)]
    pub score_weights: ScoreWeights,
    /// Run the per-submission pass on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_matching_positions: default_max_matching_positions(),
            score_weights: ScoreWeights::default(),
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_matching_positions < 1 {
            return Err(Error::Config(
                format!("Invalid max_matching_positions (must be at least 1): {}", self.max_matching_positions)
            ));
        }
        self.score_weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let weights = ScoreWeights::default();
        assert!(weights.validate().is_ok());
        assert!((weights.percent + weights.matches - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        assert!(ScoreWeights::new(0.7, 0.7).is_err());
        assert!(ScoreWeights::new(1.5, -0.5).is_err());
        assert!(ScoreWeights::new(0.25, 0.75).is_ok());
    }

    #[test]
    fn parses_partial_engine_config() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"max_sequences_per_file": 10000, "max_matching_positions": 2}"#
        ).unwrap();
        assert_eq!(config.max_matching_positions, 2);
        assert_eq!(config.score_weights, ScoreWeights::default());
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_matching_positions_is_invalid() {
        let config = EngineConfig { max_matching_positions: 0, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }
}

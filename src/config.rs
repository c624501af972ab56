//! Runtime configuration, optionally loaded from a YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SemantleError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemantleConfig {
    /// The word of the day.
    pub secret: String,
    pub corpus: CorpusConfig,
    pub training: TrainingConfig,
    pub solver: SolverConfig,
    pub bench: BenchConfig,
}

impl Default for SemantleConfig {
    fn default() -> Self {
        Self {
            secret: "school".to_string(),
            corpus: CorpusConfig::default(),
            training: TrainingConfig::default(),
            solver: SolverConfig::default(),
            bench: BenchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub path: PathBuf,
    pub text_column: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/simpsons_script_lines.csv"),
            text_column: "normalized_text".to_string(),
        }
    }
}

/// Word2vec hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub vector_size: usize,
    /// Context words taken on each side of the centre word.
    pub window: usize,
    /// Words seen fewer times than this are dropped from the vocabulary.
    pub min_count: usize,
    /// Noise words drawn per training pair.
    pub negative: usize,
    pub epochs: usize,
    pub alpha: f32,
    pub min_alpha: f32,
    /// Downsampling threshold for frequent words; 0 disables it.
    pub sample: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vector_size: 300,
            window: 5,
            min_count: 5,
            negative: 5,
            epochs: 5,
            alpha: 0.025,
            min_alpha: 0.0001,
            sample: 1e-3,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Matching tolerance is `10^-tolerance_decimals`.
    pub tolerance_decimals: u32,
    pub max_rounds: usize,
    /// Consecutive rounds without any elimination before the remaining
    /// candidates are reported as indistinguishable.
    pub max_stalled_rounds: usize,
    /// Fixed RNG seed for probe selection; random when absent.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance_decimals: 6,
            max_rounds: 1000,
            max_stalled_rounds: 8,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn tolerance(&self) -> f32 {
        10f32.powi(-(self.tolerance_decimals as i32))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// How many secrets to sample from the vocabulary.
    pub secrets: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self { secrets: 100 }
    }
}

impl SemantleConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(SemantleError::InvalidConfig(msg.to_string())) };

        if self.secret.trim().is_empty() {
            return invalid("secret must not be empty");
        }
        let t = &self.training;
        if t.vector_size == 0 {
            return invalid("training.vector_size must be positive");
        }
        if t.window == 0 {
            return invalid("training.window must be positive");
        }
        if t.epochs == 0 {
            return invalid("training.epochs must be positive");
        }
        if !(t.alpha > 0.0) || t.min_alpha < 0.0 || t.min_alpha > t.alpha {
            return invalid("training.alpha must be positive and at least min_alpha");
        }
        if t.sample < 0.0 {
            return invalid("training.sample must not be negative");
        }
        if self.solver.tolerance_decimals > 15 {
            return invalid("solver.tolerance_decimals must be at most 15");
        }
        if self.solver.max_rounds == 0 {
            return invalid("solver.max_rounds must be positive");
        }
        if self.solver.max_stalled_rounds == 0 {
            return invalid("solver.max_stalled_rounds must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SemantleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.secret, "school");
        assert_eq!(config.training.vector_size, 300);
        assert_eq!(config.training.min_count, 5);
        assert_eq!(config.solver.tolerance_decimals, 6);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SemantleConfig::from_yaml_str(
            "secret: donut\ntraining:\n  vector_size: 50\nsolver:\n  seed: 7\n",
        )
        .unwrap();
        assert_eq!(config.secret, "donut");
        assert_eq!(config.training.vector_size, 50);
        assert_eq!(config.training.window, 5);
        assert_eq!(config.solver.seed, Some(7));
        assert_eq!(config.corpus.text_column, "normalized_text");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SemantleConfig::from_yaml_str("training:\n  epochs: 0\n").is_err());
        assert!(SemantleConfig::from_yaml_str("solver:\n  tolerance_decimals: 40\n").is_err());
        assert!(SemantleConfig::from_yaml_str("secret: '  '\n").is_err());
    }

    #[test]
    fn tolerance_from_decimals() {
        let solver = SolverConfig {
            tolerance_decimals: 2,
            ..SolverConfig::default()
        };
        assert!((solver.tolerance() - 0.01).abs() < 1e-9);
    }
}

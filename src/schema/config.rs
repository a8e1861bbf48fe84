//! Configuration types for genome genesis, mutation and lineage runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Bounds that govern random genome construction and mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeConfig {
    /// Inclusive bounds for the heritable mutation rate.
    #[serde(default = "default_mutation_rate_bounds")]
    pub mutation_rate_bounds: (u32, u32),
    /// Inclusive bounds for the heritable clone rate (percent).
    #[serde(default = "default_clone_rate_bounds")]
    pub clone_rate_bounds: (u32, u32),
    /// Maximum number of loci a genome may grow to.
    #[serde(default = "default_max_loci")]
    pub max_loci: usize,
    /// Upper bound (exclusive) on extra loci drawn at genesis.
    #[serde(default = "default_initial_complexity")]
    pub initial_complexity: usize,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            mutation_rate_bounds: default_mutation_rate_bounds(),
            clone_rate_bounds: default_clone_rate_bounds(),
            max_loci: default_max_loci(),
            initial_complexity: default_initial_complexity(),
        }
    }
}

fn default_mutation_rate_bounds() -> (u32, u32) {
    (0, 100)
}
fn default_clone_rate_bounds() -> (u32, u32) {
    (0, 100)
}
fn default_max_loci() -> usize {
    100
}
fn default_initial_complexity() -> usize {
    8
}

impl GenomeConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check_bounds = |bounds: (u32, u32), name: &'static str| {
            if bounds.0 > bounds.1 {
                Err(ConfigError::InvalidBounds {
                    name,
                    min: bounds.0,
                    max: bounds.1,
                })
            } else {
                Ok(())
            }
        };

        check_bounds(self.mutation_rate_bounds, "mutation_rate")?;
        check_bounds(self.clone_rate_bounds, "clone_rate")?;

        if self.clone_rate_bounds.1 > 100 {
            return Err(ConfigError::CloneRateAbovePercent(self.clone_rate_bounds.1));
        }
        if self.max_loci == 0 {
            return Err(ConfigError::InvalidMaxLoci);
        }
        if self.initial_complexity == 0 {
            return Err(ConfigError::InvalidComplexity);
        }
        Ok(())
    }
}

/// Configuration for a lineage run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Genesis and mutation bounds.
    #[serde(default)]
    pub genome: GenomeConfig,
    /// Number of organisms kept alive each generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of reproduction rounds.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Drift at which a lineage splits off into a new clade.
    #[serde(default = "default_clade_drift_threshold")]
    pub clade_drift_threshold: u32,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            genome: GenomeConfig::default(),
            population_size: default_population_size(),
            generations: default_generations(),
            clade_drift_threshold: default_clade_drift_threshold(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    64
}
fn default_generations() -> usize {
    100
}
fn default_clade_drift_threshold() -> u32 {
    5
}

impl LineageConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: LineageConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.genome.validate()?;
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.clade_drift_threshold == 0 {
            return Err(ConfigError::InvalidDriftThreshold);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name} bounds: min ({min}) > max ({max})")]
    InvalidBounds {
        name: &'static str,
        min: u32,
        max: u32,
    },
    #[error("Clone rate is a percentage, max {0} exceeds 100")]
    CloneRateAbovePercent(u32),
    #[error("Maximum locus count must be at least 1")]
    InvalidMaxLoci,
    #[error("Initial complexity must be at least 1")]
    InvalidComplexity,
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error("Clade drift threshold must be non-zero")]
    InvalidDriftThreshold,
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

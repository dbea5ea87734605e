//! Pond configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. Everything is fixed once the
//! simulation starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{PondError, Result};

/// Instruction slots packed into one genome word
pub const SLOTS_PER_WORD: usize = 16;

/// Configuration for the pond and its energy economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PondConfig {
    // === GRID ===
    /// Pond size along X (cells)
    pub width: usize,

    /// Pond size along Y (cells)
    pub height: usize,

    /// Genome length in four-bit instruction slots
    ///
    /// Must be a multiple of 16 so genomes pack exactly into 64-bit words.
    /// This is also the capacity of the VM loop stack.
    pub genome_depth: usize,

    // === EVOLUTION ===
    /// Mutation probability numerator out of 2^32, checked per instruction
    ///
    /// At 5000 roughly one instruction in 860,000 is mutated. Zero disables
    /// mutation entirely, which makes runs with a fixed seed reproducible
    /// down to the last nibble.
    pub mutation_rate: u32,

    // === REPORTING ===
    /// Cycles between reports
    ///
    /// Each report scans the whole pond, so low values slow the run down.
    pub report_frequency: u64,

    // === ENERGY ===
    /// Cycles between random cell injections
    ///
    /// Too frequent and the pond is chaotic noise; too rare and it starves.
    pub inflow_frequency: u64,

    /// Base energy added to an injected cell
    pub inflow_rate_base: u64,

    /// Upper bound (exclusive) of random extra energy per injection
    ///
    /// `None` or zero gives a fixed inflow of `inflow_rate_base`.
    pub inflow_rate_variation: Option<u64>,

    /// Divisor for the energy penalty on a failed KILL of a viable neighbor
    ///
    /// The acting cell loses `energy / failed_kill_penalty`. Higher numbers
    /// mean lower penalties; 1 drains the cell completely.
    pub failed_kill_penalty: u64,

    // === DETERMINISM ===
    /// Seed for the random source; `None` bootstraps from entropy
    pub seed: Option<u64>,
}

impl Default for PondConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            genome_depth: 1024,

            mutation_rate: 5000,

            report_frequency: 200_000,

            inflow_frequency: 100,
            inflow_rate_base: 600,
            inflow_rate_variation: Some(1000),
            failed_kill_penalty: 3,

            seed: None,
        }
    }
}

impl PondConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PondConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Number of 64-bit words per genome
    pub fn genome_words(&self) -> usize {
        self.genome_depth / SLOTS_PER_WORD
    }

    /// Total number of cells in the pond
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PondError::InvalidConfig(format!(
                "pond must have non-zero size, got {}x{}",
                self.width, self.height
            )));
        }

        if self.genome_depth < SLOTS_PER_WORD || self.genome_depth % SLOTS_PER_WORD != 0 {
            return Err(PondError::InvalidConfig(format!(
                "genome_depth ({}) must be a non-zero multiple of {}",
                self.genome_depth, SLOTS_PER_WORD
            )));
        }

        if self.report_frequency == 0 || self.inflow_frequency == 0 {
            return Err(PondError::InvalidConfig(
                "report_frequency and inflow_frequency must be positive".into(),
            ));
        }

        let max_variation = self.inflow_rate_variation.unwrap_or(0);
        if self.inflow_rate_base.checked_add(max_variation).is_none() {
            return Err(PondError::InvalidConfig(format!(
                "inflow_rate_base ({}) plus inflow_rate_variation ({}) overflows",
                self.inflow_rate_base, max_variation
            )));
        }

        if self.failed_kill_penalty == 0 {
            return Err(PondError::InvalidConfig(
                "failed_kill_penalty must be positive".into(),
            ));
        }

        Ok(())
    }
}

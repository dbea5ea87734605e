//! Statistics aggregation and periodic reports
//!
//! Running counters accumulate between reports. A report scans the whole
//! pond once, merges the scan with the counters into a [`Report`], and then
//! the counters start over.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Clock;
use crate::pond::{Cell, Pond};
use crate::vm::opcode::Opcode;

/// Counters reset after every report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatCounters {
    /// Executions of each opcode since the last report
    pub instruction_executions: [u64; 16],
    /// Cells executed since the last report
    pub cell_executions: u64,
    /// Viable cells overwritten by another cell's offspring
    pub viable_cells_replaced: u64,
    /// Viable cells KILLed
    pub viable_cells_killed: u64,
    /// Successful SHAREs with a viable neighbor
    pub viable_cell_shares: u64,
}

impl StatCounters {
    #[inline]
    pub fn record(&mut self, op: Opcode) {
        self.instruction_executions[op.code() as usize] += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One full scan of the pond
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PondCensus {
    pub active_cells: u64,
    /// Energy summed over active cells
    pub total_energy: u64,
    /// Active cells with generation > 2
    pub viable_replicators: u64,
    /// Highest generation among active cells
    pub max_generation: u64,
}

impl PondCensus {
    /// Scan every cell; the reduction runs in parallel
    pub fn scan(pond: &Pond) -> Self {
        pond.cells()
            .par_iter()
            .fold(Self::default, |acc, cell| acc.with_cell(cell))
            .reduce(Self::default, Self::merge)
    }

    fn with_cell(mut self, cell: &Cell) -> Self {
        if cell.is_active() {
            self.active_cells += 1;
            self.total_energy = self.total_energy.saturating_add(cell.energy);
            if cell.is_viable() {
                self.viable_replicators += 1;
            }
            self.max_generation = self.max_generation.max(cell.generation);
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            active_cells: self.active_cells + other.active_cells,
            total_energy: self.total_energy.saturating_add(other.total_energy),
            viable_replicators: self.viable_replicators + other.viable_replicators,
            max_generation: self.max_generation.max(other.max_generation),
        }
    }
}

/// Summary record emitted once per report interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub clock: Clock,
    pub total_energy: u64,
    pub active_cells: u64,
    pub viable_replicators: u64,
    pub max_generation: u64,
    pub viable_cells_replaced: u64,
    pub viable_cells_killed: u64,
    pub viable_cell_shares: u64,
    /// Average executions of each opcode per cell execution
    pub instruction_frequencies: [f64; 16],
    /// Average instructions executed per cell execution
    pub metabolism: f64,
}

impl Report {
    pub fn new(clock: Clock, census: &PondCensus, stats: &StatCounters) -> Self {
        let per_cell = |count: u64| {
            if stats.cell_executions > 0 {
                count as f64 / stats.cell_executions as f64
            } else {
                0.0
            }
        };

        let mut instruction_frequencies = [0.0; 16];
        for (freq, &count) in instruction_frequencies
            .iter_mut()
            .zip(stats.instruction_executions.iter())
        {
            *freq = per_cell(count);
        }

        Self {
            clock,
            total_energy: census.total_energy,
            active_cells: census.active_cells,
            viable_replicators: census.viable_replicators,
            max_generation: census.max_generation,
            viable_cells_replaced: stats.viable_cells_replaced,
            viable_cells_killed: stats.viable_cells_killed,
            viable_cell_shares: stats.viable_cell_shares,
            instruction_frequencies,
            metabolism: per_cell(stats.instruction_executions.iter().sum()),
        }
    }

    /// Column names matching the `Display` output
    pub fn csv_header() -> String {
        let mut columns: Vec<String> = [
            "clock",
            "total_energy",
            "active_cells",
            "viable_replicators",
            "max_generation",
            "viable_replaced",
            "viable_killed",
            "viable_shares",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        columns.extend(Opcode::ALL.iter().map(|op| op.mnemonic().to_lowercase()));
        columns.push("metabolism".to_string());
        columns.join(",")
    }

    /// One-line JSON record with the same fields as the CSV line
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.clock,
            self.total_energy,
            self.active_cells,
            self.viable_replicators,
            self.max_generation,
            self.viable_cells_replaced,
            self.viable_cells_killed,
            self.viable_cell_shares
        )?;
        for freq in &self.instruction_frequencies {
            write!(f, ",{:.4}", freq)?;
        }
        write!(f, ",{:.4}", self.metabolism)
    }
}

/// Viable-population transition between two reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationEvent {
    /// Viable replicators went from some to none
    Extinction,
    /// Viable replicators went from none to some
    Appearance,
}

impl fmt::Display for PopulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulationEvent::Extinction => write!(f, "Viable replicators have gone extinct"),
            PopulationEvent::Appearance => write!(f, "Viable replicators have appeared"),
        }
    }
}

/// Remembers the previous viable count to detect zero crossings
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    last_viable: u64,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, viable: u64) -> Option<PopulationEvent> {
        let event = match (self.last_viable > 0, viable > 0) {
            (true, false) => Some(PopulationEvent::Extinction),
            (false, true) => Some(PopulationEvent::Appearance),
            _ => None,
        };
        self.last_viable = viable;
        event
    }
}

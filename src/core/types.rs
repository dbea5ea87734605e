//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for cells
pub type CellId = u64;

/// Simulation clock (one cycle = one cell execution)
pub type Clock = u64;

/// Generation above which a cell counts as a real replicator
pub const VIABLE_GENERATION: u64 = 2;

/// Cardinal direction a cell can face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
}

impl Direction {
    /// Map a VM facing value onto a direction (only the low 2 bits count)
    pub fn from_facing(facing: u8) -> Self {
        match facing & 3 {
            0 => Direction::Left,
            1 => Direction::Right,
            2 => Direction::Up,
            _ => Direction::Down,
        }
    }
}

/// Monotonic source of cell identities
///
/// Starts at 1 so that no issued id is ever equal to the id of a blank cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounter {
    next: CellId,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next id
    pub fn next_id(&mut self) -> CellId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id that will be issued next
    pub fn peek(&self) -> CellId {
        self.next
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

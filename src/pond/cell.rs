//! A single pond location and its occupant

use crate::core::types::{CellId, VIABLE_GENERATION};
use crate::pond::genome::Genome;

/// One cell of the pond
///
/// Cells are never removed. A cell is "born" when its identity fields are
/// reassigned and "dies" implicitly when its energy runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Globally unique cell ID
    pub id: CellId,
    /// ID of the parent; 0 means no live ancestor
    pub parent_id: CellId,
    /// ID of the first cell in the replication chain
    pub lineage: CellId,
    /// 0 for seeded cells, parent + 1 for offspring
    pub generation: u64,
    pub energy: u64,
    pub genome: Genome,
}

impl Cell {
    /// A blank cell: no identity, no energy, sentinel genome
    pub fn blank(genome_depth: usize) -> Self {
        Self {
            id: 0,
            parent_id: 0,
            lineage: 0,
            generation: 0,
            energy: 0,
            genome: Genome::new_sentinel(genome_depth),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.energy > 0
    }

    /// Generation above 2 marks a real replicator rather than seed noise
    #[inline]
    pub fn is_viable(&self) -> bool {
        self.generation > VIABLE_GENERATION
    }

    /// Never born (or cleared by a KILL); always accessible
    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.parent_id == 0
    }

    /// Reassign identity as a fresh, ownerless cell
    pub fn rebirth_seed(&mut self, id: CellId) {
        self.id = id;
        self.parent_id = 0;
        self.lineage = id;
        self.generation = 0;
    }

    /// Reassign identity as the offspring of `parent`
    pub fn rebirth_child(&mut self, id: CellId, parent: CellId, lineage: CellId, parent_generation: u64) {
        self.id = id;
        self.parent_id = parent;
        self.lineage = lineage;
        self.generation = parent_generation + 1;
    }
}

//! Toroidal grid of cells

use ahash::AHashMap;

use crate::core::types::{CellId, Direction};
use crate::pond::cell::Cell;

/// Fixed-size 2D pond; every edge wraps to the opposite edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pond {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Pond {
    /// A pond of blank cells
    pub fn new(width: usize, height: usize, genome_depth: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(genome_depth); width * height],
        }
    }

    /// Linear index of `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    #[inline]
    pub fn at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Coordinates of the neighbor of `(x, y)` in `dir`, wrapping at edges
    #[inline]
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> (usize, usize) {
        match dir {
            Direction::Left => (if x > 0 { x - 1 } else { self.width - 1 }, y),
            Direction::Right => (if x + 1 < self.width { x + 1 } else { 0 }, y),
            Direction::Up => (x, if y > 0 { y - 1 } else { self.height - 1 }),
            Direction::Down => (x, if y + 1 < self.height { y + 1 } else { 0 }),
        }
    }

    /// Linear index of the neighbor of `(x, y)` in `dir`
    #[inline]
    pub fn neighbor_index(&self, x: usize, y: usize, dir: Direction) -> usize {
        let (nx, ny) = self.neighbor(x, y, dir);
        self.index(nx, ny)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count of active viable cells per lineage
    pub fn lineage_census(&self) -> AHashMap<CellId, usize> {
        let mut census = AHashMap::new();
        for cell in self.cells.iter().filter(|c| c.is_active() && c.is_viable()) {
            *census.entry(cell.lineage).or_default() += 1;
        }
        census
    }

    /// Lineage with the most active viable cells, if any
    pub fn dominant_lineage(&self) -> Option<(CellId, usize)> {
        self.lineage_census()
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }
}

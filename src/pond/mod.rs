//! The pond - a toroidal grid of genome-carrying cells

pub mod cell;
pub mod genome;
pub mod grid;

pub use cell::Cell;
pub use genome::{Genome, SENTINEL_WORD};
pub use grid::Pond;

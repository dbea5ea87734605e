//! Simulation engine - the per-cycle loop and the rules it applies

pub mod access;
pub mod inflow;
pub mod interaction;
pub mod stats;
pub mod tick;
pub mod world;

pub use access::{access_allowed, Sense};
pub use inflow::{seed_random_cell, Inflow};
pub use interaction::{kill, reproduce, share, KillOutcome};
pub use stats::{PondCensus, PopulationEvent, Report, Reporter, StatCounters};
pub use tick::{run_cycle, select_cell, CycleOutcome, Simulation};
pub use world::World;

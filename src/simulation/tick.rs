//! Tick system - one cycle of the pond
//!
//! Each cycle:
//! 1. Advance the clock (the first cycle is clock 1)
//! 2. Report when the clock hits the report frequency
//! 3. Seed a random cell when the clock hits the inflow frequency
//! 4. Pick one cell uniformly at random and execute it

use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::config::PondConfig;
use crate::core::error::Result;
use crate::core::types::Clock;
use crate::simulation::inflow::{seed_random_cell, Inflow};
use crate::simulation::stats::{PopulationEvent, Report};
use crate::simulation::world::World;
use crate::vm::machine::{execute_cell, Execution, Machine};

/// Everything observable that happened in one cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub clock: Clock,
    pub report: Option<(Report, Option<PopulationEvent>)>,
    pub inflow: Option<Inflow>,
    pub execution: Execution,
}

/// Pick the cell to execute this cycle
///
/// X and Y come from disjoint halves of one draw so they are independent.
pub fn select_cell(world: &mut World) -> (usize, usize) {
    let draw = world.rng.draw();
    let x = ((draw & 0xffff_ffff) % world.config.width as u64) as usize;
    let y = ((draw >> 32) % world.config.height as u64) as usize;
    (x, y)
}

/// Run a single cycle
pub fn run_cycle(world: &mut World, machine: &mut Machine) -> CycleOutcome {
    world.clock += 1;
    let clock = world.clock;

    let report = if clock % world.config.report_frequency == 0 {
        let (report, event) = world.report();
        match event {
            Some(PopulationEvent::Extinction) => tracing::warn!(clock, "{}", PopulationEvent::Extinction),
            Some(PopulationEvent::Appearance) => tracing::info!(clock, "{}", PopulationEvent::Appearance),
            None => {}
        }
        Some((report, event))
    } else {
        None
    };

    let inflow = if clock % world.config.inflow_frequency == 0 {
        Some(seed_random_cell(world))
    } else {
        None
    };

    let (x, y) = select_cell(world);
    let execution = execute_cell(world, machine, x, y);

    CycleOutcome {
        clock,
        report,
        inflow,
        execution,
    }
}

/// A world plus the reusable VM that executes it
pub struct Simulation {
    pub world: World,
    machine: Machine,
}

impl Simulation {
    pub fn new(config: PondConfig) -> Result<Self> {
        let world = World::new(config)?;
        Ok(Self::from_world(world))
    }

    pub fn from_world(world: World) -> Self {
        let machine = Machine::new(world.config.genome_depth);
        Self { world, machine }
    }

    pub fn clock(&self) -> Clock {
        self.world.clock
    }

    pub fn step(&mut self) -> CycleOutcome {
        run_cycle(&mut self.world, &mut self.machine)
    }

    /// Run `cycles` cycles, handing every report (and the world it describes) to `on_report`
    pub fn run_cycles<F>(&mut self, cycles: u64, mut on_report: F)
    where
        F: FnMut(&World, &Report, Option<PopulationEvent>),
    {
        for _ in 0..cycles {
            if let Some((report, event)) = self.step().report {
                on_report(&self.world, &report, event);
            }
        }
    }

    /// Run until `shutdown` is set or `max_cycles` have elapsed
    ///
    /// The flag is checked once per cycle, never in the middle of a cell
    /// execution. Returns the number of cycles run.
    pub fn run_until<F>(&mut self, shutdown: &AtomicBool, max_cycles: Option<u64>, mut on_report: F) -> u64
    where
        F: FnMut(&World, &Report, Option<PopulationEvent>),
    {
        let mut cycles = 0u64;
        while !shutdown.load(Ordering::Relaxed) && max_cycles.map_or(true, |max| cycles < max) {
            if let Some((report, event)) = self.step().report {
                on_report(&self.world, &report, event);
            }
            cycles += 1;
        }
        tracing::debug!(cycles, clock = self.world.clock, "Simulation loop finished");
        cycles
    }
}

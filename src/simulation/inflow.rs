//! Energy inflow - periodic seeding of random cells
//!
//! Inflow is the pond's only external source of energy and entropy. Each
//! injection picks a random location, gives the occupant a fresh identity,
//! tops up its energy and replaces its genome with random noise.

use crate::core::types::CellId;
use crate::simulation::world::World;

/// Where and what was seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inflow {
    pub x: usize,
    pub y: usize,
    pub id: CellId,
    pub energy_added: u64,
}

/// Seed one random cell
///
/// Draw order: x, y, energy variation (only when configured), then one draw
/// per genome word.
pub fn seed_random_cell(world: &mut World) -> Inflow {
    let x = (world.rng.draw() % world.config.width as u64) as usize;
    let y = (world.rng.draw() % world.config.height as u64) as usize;
    let id = world.ids.next_id();

    let energy_added = world.config.inflow_rate_base
        + match world.config.inflow_rate_variation {
            Some(variation) if variation > 0 => world.rng.draw() % variation,
            _ => 0,
        };

    let cell = world.pond.cell_mut(x, y);
    cell.rebirth_seed(id);
    cell.energy = cell.energy.saturating_add(energy_added);
    cell.genome.randomize(&mut world.rng);

    Inflow { x, y, id, energy_added }
}

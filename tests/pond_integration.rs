//! Integration tests for the pond simulation
//!
//! These exercise the public API end to end:
//! - Inflow seeding of fresh cells
//! - KILL, SHARE and replication through real VM runs
//! - Determinism for a fixed seed
//! - Report cadence and population transitions

use ahash::AHashSet;
use pondlife::core::config::PondConfig;
use pondlife::core::rng::PondRng;
use pondlife::pond::{Genome, SENTINEL_WORD};
use pondlife::simulation::access::{gate, nibble_distance, Sense};
use pondlife::simulation::{
    kill, seed_random_cell, share, KillOutcome, PopulationEvent, Simulation, World,
};
use pondlife::vm::{execute_cell, Machine, Opcode, StopReason};

fn small_config(seed: u64) -> PondConfig {
    PondConfig {
        width: 24,
        height: 16,
        genome_depth: 128,
        mutation_rate: 0,
        report_frequency: 1_000,
        inflow_frequency: 20,
        seed: Some(seed),
        ..PondConfig::default()
    }
}

fn program(ops: &[Opcode]) -> Vec<u8> {
    // slot 0 is the header nibble and never executes
    std::iter::once(0).chain(ops.iter().map(|op| op.code())).collect()
}

#[test]
fn test_inflow_seeds_fixed_energy_cell() {
    let config = PondConfig {
        inflow_rate_base: 600,
        inflow_rate_variation: Some(0),
        ..small_config(13)
    };
    let mut world = World::new(config).unwrap();

    let inflow = seed_random_cell(&mut world);
    let cell = world.pond.cell(inflow.x, inflow.y);

    assert_eq!(cell.energy, 600);
    assert_eq!(cell.generation, 0);
    assert_eq!(cell.parent_id, 0);
    assert!(!cell.genome.is_sentinel());
    assert!(cell.genome.words().iter().any(|&w| w != SENTINEL_WORD));
}

#[test]
fn test_kill_on_vacant_target_ignores_roll() {
    for seed in 0..100 {
        let mut world = World::new(small_config(seed)).unwrap();
        let actor = world.pond.index(5, 5);
        let target = world.pond.index(4, 5);
        world.pond.at_mut(actor).energy = 10;
        // a target genome maximally unlike the guess still falls
        world.pond.at_mut(target).genome.set_nibble(0, 0x0);
        world.pond.at_mut(target).energy = 3;

        assert_eq!(kill(&mut world, actor, target, 0xf), KillOutcome::Killed);
        let victim = world.pond.at(target);
        assert_eq!(victim.generation, 0);
        assert_eq!(victim.parent_id, 0);
        assert_eq!(victim.lineage, victim.id);
    }
}

#[test]
fn test_cooperative_gate_on_opposite_nibbles() {
    let mut world = World::new(small_config(77)).unwrap();
    let actor = world.pond.index(0, 0);
    let target = world.pond.index(1, 0);
    {
        let cell = world.pond.at_mut(target);
        cell.genome.set_nibble(0, 0b1010);
        cell.parent_id = 3;
        cell.energy = 40;
    }
    world.pond.at_mut(actor).energy = 60;
    assert_eq!(nibble_distance(world.pond.at(target), 0b0101), 4);

    let mut granted = 0;
    for _ in 0..400 {
        let mut peek = world.rng.clone();
        let roll = (peek.draw() & 0xf) as u8;
        let expected = gate(roll, 4, Sense::Cooperative, false);
        assert_eq!(expected, roll >= 4);
        assert_eq!(share(&mut world, actor, target, 0b0101), expected);
        if expected {
            granted += 1;
        }
        assert_eq!(world.pond.at(actor).energy + world.pond.at(target).energy, 100);
    }
    // 12 of 16 rolls pass
    assert!(granted > 250 && granted < 350);
}

#[test]
fn test_counted_loop_program() {
    let mut world = World::new(small_config(1)).unwrap();
    let slots = program(&[
        Opcode::Zero,
        Opcode::Inc,
        Opcode::Inc,
        Opcode::Inc,
        Opcode::Loop,
        Opcode::WriteB,
        Opcode::Dec,
        Opcode::Rep,
        Opcode::Stop,
    ]);
    {
        let cell = world.pond.cell_mut(3, 3);
        cell.genome = Genome::from_slots(128, &slots);
        cell.energy = 1000;
    }

    let mut machine = Machine::new(128);
    let exec = execute_cell(&mut world, &mut machine, 3, 3);

    assert_eq!(exec.stop_reason, StopReason::Stopped);
    assert_eq!(world.stats.instruction_executions[Opcode::WriteB as usize], 3);
    assert_eq!(world.stats.instruction_executions[Opcode::Loop as usize], 3);
    assert_eq!(machine.output().nibble(0), 1);
    assert_eq!(world.pond.cell(3, 3).energy, 1000 - 17);
}

#[test]
fn test_replicator_copies_itself() {
    // READG/WRITEB copy loop: copies the genome into the buffer until the
    // register reads a STOP nibble (0xf wraps to 0 after INC)
    let mut world = World::new(small_config(5)).unwrap();
    let slots = program(&[
        Opcode::Zero,
        Opcode::Inc,
        Opcode::Loop,
        Opcode::ReadG,
        Opcode::WriteB,
        Opcode::Fwd,
        Opcode::Inc,
        Opcode::Rep,
        Opcode::Stop,
    ]);
    {
        let cell = world.pond.cell_mut(10, 10);
        cell.genome = Genome::from_slots(128, &slots);
        cell.energy = 5000;
        cell.id = 900;
        cell.lineage = 900;
        cell.generation = 2;
        cell.parent_id = 1;
    }
    world.pond.cell_mut(9, 10).energy = 1;

    let mut machine = Machine::new(128);
    let exec = execute_cell(&mut world, &mut machine, 10, 10);

    assert!(exec.offspring);
    let parent_genome = world.pond.cell(10, 10).genome.clone();
    let child = world.pond.cell(9, 10);
    assert_eq!(child.parent_id, 900);
    assert_eq!(child.lineage, 900);
    assert_eq!(child.generation, 3);
    assert!(child.is_viable());
    // the copy runs through the STOP that ends the loop
    for slot in 0..slots.len() {
        assert_eq!(child.genome.nibble(slot), parent_genome.nibble(slot));
    }
}

#[test]
fn test_fixed_seed_runs_are_identical() {
    let config = PondConfig {
        inflow_frequency: u64::MAX,
        report_frequency: u64::MAX,
        ..small_config(4242)
    };

    let run = || {
        let mut world = World::new(config.clone()).unwrap();
        for _ in 0..80 {
            seed_random_cell(&mut world);
        }
        let mut sim = Simulation::from_world(world);
        sim.run_cycles(20_000, |_, _, _| {});
        sim.world
    };

    let a = run();
    let b = run();
    assert_eq!(a.pond, b.pond);
    assert_eq!(a.rng, b.rng);
    assert_eq!(a.ids, b.ids);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn test_issued_ids_are_unique_and_increasing() {
    let mut sim = Simulation::new(small_config(99)).unwrap();
    let mut last_inflow_id = 0;
    for _ in 0..20_000 {
        if let Some(inflow) = sim.step().inflow {
            assert!(inflow.id > last_inflow_id);
            last_inflow_id = inflow.id;
        }
    }

    let next = sim.world.ids.peek();
    let mut seen = AHashSet::new();
    for cell in sim.world.pond.cells().iter().filter(|c| c.id != 0) {
        assert!(cell.id < next);
        assert!(seen.insert(cell.id), "duplicate id {}", cell.id);
    }
}

#[test]
fn test_population_events_follow_viable_count() {
    let mut world = World::new(small_config(8)).unwrap();
    let (_, event) = world.report();
    assert_eq!(event, None);

    {
        let cell = world.pond.cell_mut(2, 2);
        cell.generation = 4;
        cell.energy = 10;
    }
    let (report, event) = world.report();
    assert_eq!(report.viable_replicators, 1);
    assert_eq!(event, Some(PopulationEvent::Appearance));

    world.pond.cell_mut(2, 2).energy = 0;
    let (report, event) = world.report();
    assert_eq!(report.viable_replicators, 0);
    assert_eq!(event, Some(PopulationEvent::Extinction));
}

#[test]
fn test_long_run_keeps_pond_alive() {
    let config = PondConfig {
        mutation_rate: 5000,
        report_frequency: 25_000,
        ..small_config(31337)
    };
    let mut sim = Simulation::new(config).unwrap();
    let mut reports = Vec::new();
    sim.run_cycles(100_000, |_, report, _| reports.push(report.clone()));

    assert_eq!(reports.len(), 4);
    for report in &reports {
        assert!(report.active_cells > 0);
        assert!(report.total_energy > 0);
        assert!(report.metabolism > 0.0);
        let sum: f64 = report.instruction_frequencies.iter().sum();
        assert!((sum - report.metabolism).abs() < 1e-9);
    }
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("pondlife-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "width = 40\nheight = 30\ngenome_depth = 256\nmutation_rate = 0\nseed = 7\n",
    )
    .unwrap();

    let config = PondConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!((config.width, config.height), (40, 30));
    assert_eq!(config.genome_words(), 16);
    let world = World::new(config).unwrap();
    assert_eq!(world.rng, PondRng::with_seed(7));
}

#[test]
fn test_kill_clears_only_header_words() {
    let mut world = World::new(small_config(2)).unwrap();
    let target = world.pond.index(0, 0);
    let words = world.pond.at(target).genome.word_count();
    for w in 0..words {
        world.pond.at_mut(target).genome.set_word(w, w as u64);
    }
    kill(&mut world, 1, target, 0);
    let genome = &world.pond.at(target).genome;
    assert_eq!(genome.word(0), SENTINEL_WORD);
    assert_eq!(genome.word(1), SENTINEL_WORD);
    for w in 2..words {
        assert_eq!(genome.word(w), w as u64);
    }
}

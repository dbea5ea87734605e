//! Genome interpreter
//!
//! Runs one cell until its energy is gone or it stops. Every instruction
//! costs one unit of energy, so execution always terminates. Pointers are
//! slot indices into the genome and wrap instead of failing; the only abnormal
//! end is a loop-stack overflow, which stops this cell and nothing else.

use crate::core::types::Direction;
use crate::pond::Genome;
use crate::simulation::interaction;
use crate::simulation::world::World;
use crate::vm::opcode::Opcode;

/// First executed slot; slot 0 is a header nibble and never runs
pub const EXEC_START_SLOT: usize = 1;

/// Why a cell's run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EnergyExhausted,
    /// STOP instruction
    Stopped,
    /// LOOP with a full loop stack
    LoopOverflow,
}

/// Summary of one cell execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub x: usize,
    pub y: usize,
    /// Instructions fetched (each cost one energy unit)
    pub instructions: u64,
    pub stop_reason: StopReason,
    /// Register value when the run ended
    pub register: u8,
    pub facing: Direction,
    /// Whether the output buffer was copied into a neighbor
    pub offspring: bool,
}

/// VM state, reused across executions
#[derive(Debug, Clone)]
pub struct Machine {
    /// Instruction pointer (slot)
    ip: usize,
    /// Memory pointer (slot) for genome and buffer access
    mp: usize,
    register: u8,
    facing: u8,
    loop_stack: Vec<usize>,
    false_loop_depth: usize,
    stop: Option<StopReason>,
    output: Genome,
}

impl Machine {
    pub fn new(genome_depth: usize) -> Self {
        Self {
            ip: EXEC_START_SLOT,
            mp: 0,
            register: 0,
            facing: 0,
            loop_stack: Vec::with_capacity(genome_depth),
            false_loop_depth: 0,
            stop: None,
            output: Genome::new_sentinel(genome_depth),
        }
    }

    /// Restore the initial state before a run
    pub fn reset(&mut self) {
        self.ip = EXEC_START_SLOT;
        self.mp = 0;
        self.register = 0;
        self.facing = 0;
        self.loop_stack.clear();
        self.false_loop_depth = 0;
        self.stop = None;
        self.output.fill_sentinel();
    }

    /// Offspring buffer written by WRITEB
    pub fn output(&self) -> &Genome {
        &self.output
    }

    #[inline]
    fn depth(&self) -> usize {
        self.output.depth()
    }

    /// Move the instruction pointer forward; past the end it restarts after the header
    #[inline]
    fn advance_ip(&mut self) {
        self.ip += 1;
        if self.ip >= self.depth() {
            self.ip = EXEC_START_SLOT;
        }
    }

    #[inline]
    fn forward_mp(&mut self) {
        self.mp += 1;
        if self.mp >= self.depth() {
            self.mp = 0;
        }
    }

    #[inline]
    fn back_mp(&mut self) {
        self.mp = if self.mp == 0 { self.depth() - 1 } else { self.mp - 1 };
    }

    /// Track nesting while skipping the body of a LOOP entered with a zero register
    #[inline]
    fn skip(&mut self, op: Opcode) {
        match op {
            Opcode::Loop => self.false_loop_depth += 1,
            Opcode::Rep => self.false_loop_depth -= 1,
            _ => {}
        }
    }
}

/// Run the cell at `(x, y)` to completion, then try to place its offspring
pub fn execute_cell(world: &mut World, machine: &mut Machine, x: usize, y: usize) -> Execution {
    machine.reset();
    let idx = world.pond.index(x, y);
    let mutation_rate = u64::from(world.config.mutation_rate);
    let capacity = world.config.genome_depth;
    let mut instructions = 0u64;

    world.stats.cell_executions += 1;

    while world.pond.at(idx).energy > 0 && machine.stop.is_none() {
        let mut inst = world.pond.at(idx).genome.nibble(machine.ip);

        if (world.rng.draw() & 0xffff_ffff) < mutation_rate {
            let frob = world.rng.draw();
            if frob & 0x80 != 0 {
                inst = (frob & 0xf) as u8;
            } else {
                machine.register = (frob & 0xf) as u8;
            }
        }

        world.pond.at_mut(idx).energy -= 1;
        instructions += 1;

        let op = Opcode::from_nibble(inst);
        if machine.false_loop_depth > 0 {
            machine.skip(op);
        } else {
            world.stats.record(op);
            match op {
                Opcode::Zero => {
                    machine.register = 0;
                    machine.mp = 0;
                    machine.facing = 0;
                }
                Opcode::Fwd => machine.forward_mp(),
                Opcode::Back => machine.back_mp(),
                Opcode::Inc => machine.register = (machine.register + 1) & 0xf,
                Opcode::Dec => machine.register = machine.register.wrapping_sub(1) & 0xf,
                Opcode::ReadG => machine.register = world.pond.at(idx).genome.nibble(machine.mp),
                Opcode::WriteG => {
                    let (slot, value) = (machine.mp, machine.register);
                    world.pond.at_mut(idx).genome.set_nibble(slot, value);
                }
                Opcode::ReadB => machine.register = machine.output.nibble(machine.mp),
                Opcode::WriteB => {
                    let (slot, value) = (machine.mp, machine.register);
                    machine.output.set_nibble(slot, value);
                }
                Opcode::Loop => {
                    if machine.register != 0 {
                        if machine.loop_stack.len() >= capacity {
                            machine.stop = Some(StopReason::LoopOverflow);
                        } else {
                            machine.loop_stack.push(machine.ip);
                        }
                    } else {
                        machine.false_loop_depth = 1;
                    }
                }
                Opcode::Rep => {
                    if let Some(start) = machine.loop_stack.pop() {
                        if machine.register != 0 {
                            // land on the LOOP itself so it runs again
                            machine.ip = start;
                            continue;
                        }
                    }
                }
                Opcode::Turn => machine.facing = machine.register & 3,
                Opcode::Xchg => {
                    machine.advance_ip();
                    let slot = machine.ip;
                    let genome = &mut world.pond.at_mut(idx).genome;
                    let held = genome.nibble(slot);
                    genome.set_nibble(slot, machine.register);
                    machine.register = held;
                }
                Opcode::Kill => {
                    let target = world.pond.neighbor_index(x, y, Direction::from_facing(machine.facing));
                    interaction::kill(world, idx, target, machine.register);
                }
                Opcode::Share => {
                    let target = world.pond.neighbor_index(x, y, Direction::from_facing(machine.facing));
                    interaction::share(world, idx, target, machine.register);
                }
                Opcode::Stop => machine.stop = Some(StopReason::Stopped),
            }
        }

        machine.advance_ip();
    }

    let facing = Direction::from_facing(machine.facing);
    let target = world.pond.neighbor_index(x, y, facing);
    let offspring = interaction::reproduce(world, idx, target, machine.register, &machine.output);

    Execution {
        x,
        y,
        instructions,
        stop_reason: machine.stop.unwrap_or(StopReason::EnergyExhausted),
        register: machine.register,
        facing,
        offspring,
    }
}

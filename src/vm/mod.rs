//! Four-bit genome virtual machine

pub mod machine;
pub mod opcode;

pub use machine::{execute_cell, Execution, Machine, StopReason, EXEC_START_SLOT};
pub use opcode::Opcode;

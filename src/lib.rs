//! pondlife - an artificial-life pond of self-replicating genome programs

pub mod core;
pub mod pond;
pub mod simulation;
pub mod vm;

//! The fixed sixteen-instruction set

use serde::{Deserialize, Serialize};

/// Four-bit VM instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Zero register, memory pointer and facing
    Zero = 0x0,
    /// Memory pointer forward one slot
    Fwd = 0x1,
    /// Memory pointer back one slot
    Back = 0x2,
    Inc = 0x3,
    Dec = 0x4,
    /// Register from genome at memory pointer
    ReadG = 0x5,
    /// Register to genome at memory pointer
    WriteG = 0x6,
    /// Register from output buffer at memory pointer
    ReadB = 0x7,
    /// Register to output buffer at memory pointer
    WriteB = 0x8,
    /// Enter loop if register is nonzero, else skip to matching REP
    Loop = 0x9,
    /// Jump back to matching LOOP if register is nonzero
    Rep = 0xa,
    /// Face the direction in the register
    Turn = 0xb,
    /// Swap register with the next instruction slot
    Xchg = 0xc,
    /// Clear the faced neighbor
    Kill = 0xd,
    /// Pool energy with the faced neighbor
    Share = 0xe,
    Stop = 0xf,
}

impl Opcode {
    pub const ALL: [Opcode; 16] = [
        Opcode::Zero,
        Opcode::Fwd,
        Opcode::Back,
        Opcode::Inc,
        Opcode::Dec,
        Opcode::ReadG,
        Opcode::WriteG,
        Opcode::ReadB,
        Opcode::WriteB,
        Opcode::Loop,
        Opcode::Rep,
        Opcode::Turn,
        Opcode::Xchg,
        Opcode::Kill,
        Opcode::Share,
        Opcode::Stop,
    ];

    /// Decode the low four bits of `nibble`
    #[inline]
    pub fn from_nibble(nibble: u8) -> Self {
        Self::ALL[(nibble & 0xf) as usize]
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Zero => "ZERO",
            Opcode::Fwd => "FWD",
            Opcode::Back => "BACK",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::ReadG => "READG",
            Opcode::WriteG => "WRITEG",
            Opcode::ReadB => "READB",
            Opcode::WriteB => "WRITEB",
            Opcode::Loop => "LOOP",
            Opcode::Rep => "REP",
            Opcode::Turn => "TURN",
            Opcode::Xchg => "XCHG",
            Opcode::Kill => "KILL",
            Opcode::Share => "SHARE",
            Opcode::Stop => "STOP",
        }
    }
}

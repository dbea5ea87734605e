//! Access gate - may one cell act on another?
//!
//! Permission is a coin flip weighted by how different the target's first
//! genome nibble is from the actor's guess. Hostile acts (KILL, copying
//! offspring over a neighbor) succeed more often against similar targets;
//! cooperative acts (SHARE) succeed more often with dissimilar ones. Vacant
//! targets are always accessible.

use crate::core::rng::PondRng;
use crate::pond::Cell;

/// Polarity of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// KILL and reproduce-by-copy
    Hostile,
    /// SHARE
    Cooperative,
}

/// Number of differing bits between the target's first nibble and `guess`
#[inline]
pub fn nibble_distance(target: &Cell, guess: u8) -> u32 {
    (((target.genome.word(0) & 0xf) as u8 ^ (guess & 0xf)) & 0xf).count_ones()
}

/// The gate comparison for a given four-bit roll
#[inline]
pub fn gate(roll: u8, distance: u32, sense: Sense, vacant: bool) -> bool {
    let roll = u32::from(roll & 0xf);
    let by_roll = match sense {
        Sense::Hostile => roll <= distance,
        Sense::Cooperative => roll >= distance,
    };
    by_roll || vacant
}

/// Decide access, consuming exactly one random draw
///
/// The draw happens even for vacant targets so the random stream advances
/// identically whatever the outcome.
pub fn access_allowed(rng: &mut PondRng, target: &Cell, guess: u8, sense: Sense) -> bool {
    let roll = (rng.draw() & 0xf) as u8;
    gate(roll, nibble_distance(target, guess), sense, target.is_vacant())
}

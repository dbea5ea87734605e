//! Genome storage - four-bit instructions packed into 64-bit words
//!
//! Slot `n` lives in word `n / 16` at bit offset `(n % 16) * 4`, so slot 0 is
//! the low nibble of word 0. An all-ones word is the sentinel: it marks an
//! empty genome and decodes as a run of STOP instructions.

use crate::core::config::SLOTS_PER_WORD;
use crate::core::rng::PondRng;
use crate::vm::opcode::Opcode;

/// The all-ones sentinel word
pub const SENTINEL_WORD: u64 = u64::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genome {
    words: Box<[u64]>,
}

impl Genome {
    /// Genome of `depth` slots filled with the sentinel
    pub fn new_sentinel(depth: usize) -> Self {
        Self {
            words: vec![SENTINEL_WORD; depth / SLOTS_PER_WORD].into_boxed_slice(),
        }
    }

    /// Genome filled with one random draw per word
    pub fn random(depth: usize, rng: &mut PondRng) -> Self {
        let mut genome = Self::new_sentinel(depth);
        genome.randomize(rng);
        genome
    }

    /// Build a genome from instruction slots, padding the rest with STOP
    pub fn from_slots(depth: usize, slots: &[u8]) -> Self {
        let mut genome = Self::new_sentinel(depth);
        for (slot, &value) in slots.iter().take(depth).enumerate() {
            genome.set_nibble(slot, value);
        }
        genome
    }

    /// Overwrite every word with a fresh random draw
    pub fn randomize(&mut self, rng: &mut PondRng) {
        for word in self.words.iter_mut() {
            *word = rng.draw();
        }
    }

    /// Reset every word to the sentinel
    pub fn fill_sentinel(&mut self) {
        self.words.fill(SENTINEL_WORD);
    }

    /// Length in instruction slots
    #[inline]
    pub fn depth(&self) -> usize {
        self.words.len() * SLOTS_PER_WORD
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn word(&self, index: usize) -> u64 {
        self.words[index]
    }

    #[inline]
    pub fn set_word(&mut self, index: usize, value: u64) {
        self.words[index] = value;
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Read the four-bit value at `slot`
    #[inline]
    pub fn nibble(&self, slot: usize) -> u8 {
        let (word, shift) = locate(slot);
        ((self.words[word] >> shift) & 0xf) as u8
    }

    /// Write the low four bits of `value` at `slot`
    #[inline]
    pub fn set_nibble(&mut self, slot: usize, value: u8) {
        let (word, shift) = locate(slot);
        self.words[word] &= !(0xfu64 << shift);
        self.words[word] |= u64::from(value & 0xf) << shift;
    }

    /// Copy another genome of the same depth into this one
    pub fn copy_from(&mut self, other: &Genome) {
        self.words.copy_from_slice(&other.words);
    }

    /// True when every word is still the sentinel
    pub fn is_sentinel(&self) -> bool {
        self.words.iter().all(|&w| w == SENTINEL_WORD)
    }

    /// Mnemonic listing of the first `slots` instructions
    ///
    /// Trailing STOP filler is trimmed so short programs read cleanly.
    pub fn disassemble(&self, slots: usize) -> String {
        let end = slots.min(self.depth());
        let mut ops: Vec<&'static str> = (0..end)
            .map(|slot| Opcode::from_nibble(self.nibble(slot)).mnemonic())
            .collect();
        while ops.len() > 1 && ops[ops.len() - 1] == "STOP" && ops[ops.len() - 2] == "STOP" {
            ops.pop();
        }
        ops.join(" ")
    }
}

#[inline]
fn locate(slot: usize) -> (usize, u32) {
    (slot / SLOTS_PER_WORD, ((slot % SLOTS_PER_WORD) * 4) as u32)
}

//! Program memory.
//!
//! Sixteen 11-bit instruction words, addressed by the 4-bit program counter.
//! Because the address type is a [`Nibble`], reads and writes cannot go out
//! of range.

use crate::bits::{Nibble, Word11};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of program words.
pub const MEMORY_SIZE: usize = 16;

/// Program memory: 16 eleven-bit words.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    words: [Word11; MEMORY_SIZE],
}

impl Memory {
    /// Create a new memory with all words zeroed.
    pub fn new() -> Self {
        Self {
            words: [Word11::ZERO; MEMORY_SIZE],
        }
    }

    /// Read a word.
    #[inline]
    pub fn read(&self, addr: Nibble) -> Word11 {
        self.words[addr.index()]
    }

    /// Write a word.
    #[inline]
    pub fn write(&mut self, addr: Nibble, value: Word11) {
        self.words[addr.index()] = value;
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.words = [Word11::ZERO; MEMORY_SIZE];
    }

    /// All words, address 0 first.
    pub fn words(&self) -> &[Word11; MEMORY_SIZE] {
        &self.words
    }

    /// Load a program into memory starting at address 0.
    ///
    /// Words past the end of the program are left untouched.
    pub fn load_program(&mut self, program: &[Word11]) -> Result<(), MemoryError> {
        if program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available: MEMORY_SIZE,
            });
        }

        self.words[..program.len()].copy_from_slice(program);
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show non-zero words
        let non_zero = self.words.iter().filter(|w| !w.is_zero()).count();

        f.debug_struct("Memory")
            .field("non_zero_words", &non_zero)
            .field("total_words", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
}

//! Program image files.
//!
//! A program image is plain text:
//! - One 11-bit word per line, written in binary, MSB first
//! - Either packed (`01100010101`) or grouped (`011 0001 0101`)
//! - Anything after `;` is a comment
//! - Blank lines are ignored
//!
//! At most 16 words fit in program memory.

use crate::bits::Word11;
use crate::cpu::memory::MEMORY_SIZE;
use crate::asm::disasm::disassemble_instruction;
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;

/// Parse image text into words.
pub fn parse_image(text: &str) -> Result<Vec<Word11>, ImageError> {
    let mut words = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let content = match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let content = content.trim();

        if content.is_empty() {
            continue;
        }

        let word = Word11::parse(content).map_err(|e| ImageError::ParseError {
            line: line_num + 1,
            message: e.to_string(),
        })?;
        words.push(word);
    }

    if words.len() > MEMORY_SIZE {
        return Err(ImageError::TooManyWords { count: words.len() });
    }

    Ok(words)
}

/// Render words as image text, with the address and disassembly as comments.
pub fn format_image(words: &[Word11]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; 4-bit CPU program image");
    let _ = writeln!(out, "; {} words", words.len());
    let _ = writeln!(out);

    for (addr, word) in words.iter().enumerate() {
        let _ = writeln!(out, "{} ; {:02} {}", word.grouped(), addr, disassemble_instruction(*word));
    }

    out
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<Word11>, ImageError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_image(&text)
}

/// Save words to an image file.
pub fn save_image<P: AsRef<Path>>(path: P, words: &[Word11]) -> Result<(), ImageError> {
    if words.len() > MEMORY_SIZE {
        return Err(ImageError::TooManyWords { count: words.len() });
    }
    std::fs::write(path.as_ref(), format_image(words))?;
    Ok(())
}

/// Errors that can occur when reading or writing images.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("image has {count} words but memory holds 16")]
    TooManyWords { count: usize },
}

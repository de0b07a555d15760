//! Assembler and disassembler for 4-bit programs.
//!
//! This module provides:
//! - A simple two-pass assembler (text → instruction words)
//! - A disassembler (instruction words → readable text)
//! - The program image text format

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, AssemblerError};
pub use disasm::{disassemble, disassemble_instruction};
pub use image::{load_image, save_image, parse_image, format_image, ImageError};

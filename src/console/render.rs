//! Text rendering of the machine state.

use crate::asm::disasm::{disassemble_instruction, format_instruction};
use crate::cpu::Snapshot;
use crate::cpu::decode::encode;
use std::io::{self, Write};

const RULE: &str = "---------------------------------------------------------------------";

/// Write the register/program table for one snapshot.
pub fn render<W: Write>(out: &mut W, snap: &Snapshot) -> io::Result<()> {
    writeln!(out, "Total cycles: {}   Mode: {}", snap.cycles, snap.mode)?;
    writeln!(out, "--------------------------4-Bit LEG Like CPU-------------------------")?;
    writeln!(out, "------------Registers--------------------------Program---------------")?;

    for (i, (reg, word)) in snap.registers.iter().zip(snap.program.iter()).enumerate() {
        let marker = if i == snap.pc.index() { '>' } else { ' ' };
        writeln!(out, "| R{:<3}| {} |{}P{:<3}| {} |", i, reg, marker, i, word.grouped())?;
    }
    let next = snap.current_word();
    writeln!(out, "| CLK | {} |   NEXT: {} ({})", snap.pc, next.grouped(), disassemble_instruction(next))?;
    writeln!(out, "{}", RULE)?;

    match snap.last_instruction {
        Some(instr) => {
            let word = encode(&instr);
            writeln!(out, "LAST: {}   ({})   R0 = {}", word.grouped(), format_instruction(&instr), snap.registers[0])?;
        }
        None => writeln!(out, "LAST: ---   R0 = {}", snap.registers[0])?,
    }
    writeln!(out, "{}", RULE)?;
    Ok(())
}

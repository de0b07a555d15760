//! Property tests for the bit codec and the instruction set.

use nibble4::bits::codec::{from_bits, mask, to_bits};
use nibble4::bits::{Nibble, Word11};
use nibble4::cpu::decode::{decode, encode};
use nibble4::Cpu;
use proptest::prelude::*;

fn imm(cpu: &mut Cpu, reg: u8, value: u8) {
    cpu.submit(3, reg, value).unwrap();
}

fn reg(cpu: &Cpu, addr: u8) -> u8 {
    cpu.regs.read(Nibble::new(addr)).value()
}

proptest! {
    #[test]
    fn codec_round_trips_masked_value(value in any::<u64>(), width in 1u32..=64) {
        let bits = to_bits(value, width);
        prop_assert_eq!(bits.len(), width as usize);
        prop_assert_eq!(from_bits(&bits), value & mask(width));
    }

    #[test]
    fn clock_counts_cycles_mod_16(n in 0usize..100) {
        let mut cpu = Cpu::new();
        for _ in 0..n {
            // MOV R1, R2 never jumps
            cpu.submit(2, 1, 2).unwrap();
        }
        prop_assert_eq!(cpu.regs.pc.value() as usize, n % 16);
        prop_assert_eq!(cpu.cycles, n as u64);
    }

    #[test]
    fn add_wraps(x in 0u8..16, y in 0u8..16) {
        let mut cpu = Cpu::new();
        imm(&mut cpu, 1, x);
        imm(&mut cpu, 2, y);
        cpu.submit(0, 1, 2).unwrap();
        prop_assert_eq!(reg(&cpu, 0), (x + y) % 16);
    }

    #[test]
    fn sub_wraps(x in 0u8..16, y in 0u8..16) {
        let mut cpu = Cpu::new();
        imm(&mut cpu, 1, x);
        imm(&mut cpu, 2, y);
        cpu.submit(1, 1, 2).unwrap();
        prop_assert_eq!(reg(&cpu, 0), (16 + x - y) % 16);
    }

    #[test]
    fn logic_ops_stay_in_four_bits(x in 0u8..16, y in 0u8..16) {
        let mut cpu = Cpu::new();
        imm(&mut cpu, 1, x);
        imm(&mut cpu, 2, y);

        cpu.submit(5, 1, 2).unwrap();
        prop_assert_eq!(reg(&cpu, 0), x & y);

        cpu.submit(6, 1, 2).unwrap();
        prop_assert_eq!(reg(&cpu, 0), x | y);

        cpu.submit(7, 1, 3).unwrap();
        prop_assert_eq!(reg(&cpu, 3), !x & 0xF);
    }

    #[test]
    fn every_word_decodes_and_encodes_back(raw in 0u16..2048) {
        let word = Word11::new(raw);
        prop_assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn oversized_operands_change_nothing(op in 0u8..8, a in 16u8..=255, b in 0u8..16) {
        let mut cpu = Cpu::new();
        let before = cpu.snapshot();
        prop_assert!(cpu.submit(op, a, b).is_err());
        prop_assert!(cpu.submit(op, b, a).is_err());
        prop_assert_eq!(cpu.snapshot(), before);
    }

    #[test]
    fn runs_never_touch_program_memory(
        program in prop::collection::vec(0u16..2048, 0..=16),
        cycles in 0u64..64,
    ) {
        let words: Vec<Word11> = program.into_iter().map(Word11::new).collect();
        let mut cpu = Cpu::new();
        cpu.load_program(&words).unwrap();
        let before = *cpu.mem.words();

        let ran = cpu.run_limited(cycles).unwrap();
        prop_assert_eq!(ran, cycles);
        prop_assert_eq!(*cpu.mem.words(), before);
    }
}

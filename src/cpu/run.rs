//! Continuous, timed execution.
//!
//! A run resets the program counter, then repeatedly executes one cycle
//! from program memory and pauses for one cadence period. The loop only
//! ends on a stop request or an optional cycle budget; both are checked
//! once per cycle, after the cycle's mutations are complete.

use crate::cpu::execute::{Cpu, CpuError, Mode};
use crate::bits::Nibble;
use serde::{Serialize, Deserialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Run rate in cycles per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    hz: u32,
}

impl Cadence {
    /// Default rate: 5 cycles per second (200 ms per cycle).
    pub const DEFAULT_HZ: u32 = 5;

    /// Create a cadence. Zero is rejected.
    pub fn from_hz(hz: u32) -> Result<Self, CpuError> {
        if hz == 0 {
            return Err(CpuError::ZeroCadence);
        }
        Ok(Self { hz })
    }

    pub fn hz(&self) -> u32 {
        self.hz
    }

    /// Pause between cycles.
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.hz
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self { hz: Self::DEFAULT_HZ }
    }
}

/// Settings for a timed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Cycles per second.
    pub hz: u32,
    /// Stop after this many cycles. `None` runs until stopped.
    pub max_cycles: Option<u64>,
}

impl RunConfig {
    pub fn cadence(&self) -> Result<Cadence, CpuError> {
        Cadence::from_hz(self.hz)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            hz: Cadence::DEFAULT_HZ,
            max_cycles: None,
        }
    }
}

impl Cpu {
    /// Enter run mode with the program counter at 0.
    pub fn start_run(&mut self) -> Result<(), CpuError> {
        self.require_mode(Mode::Interactive)?;
        self.mode = Mode::Running;
        self.regs.jump(Nibble::ZERO);
        info!("running");
        Ok(())
    }

    /// Leave run mode. Registers, memory and program counter are kept.
    pub fn stop_run(&mut self) {
        if self.mode == Mode::Running {
            self.mode = Mode::Interactive;
            info!(cycles = self.cycles, "stopped");
        }
    }

    /// Run the program in memory at the configured cadence.
    ///
    /// `on_cycle` sees the machine after every cycle. Setting `stop` (from
    /// any thread, or from `on_cycle`) ends the run before the next pause.
    /// Returns the number of cycles executed.
    pub fn run<F>(&mut self, config: &RunConfig, stop: &AtomicBool, mut on_cycle: F) -> Result<u64, CpuError>
    where
        F: FnMut(&Cpu),
    {
        let cadence = config.cadence()?;
        self.start_run()?;

        let start_cycles = self.cycles;
        let finished = |cpu: &Cpu| {
            stop.load(Ordering::SeqCst)
                || config.max_cycles.is_some_and(|max| cpu.cycles - start_cycles >= max)
        };

        while !finished(&*self) {
            if let Err(e) = self.step() {
                self.stop_run();
                return Err(e);
            }
            on_cycle(self);
            if finished(&*self) {
                break;
            }
            thread::sleep(cadence.period());
        }

        self.stop_run();
        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` cycles without pausing.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        self.start_run()?;
        let start_cycles = self.cycles;

        while self.cycles - start_cycles < max_cycles {
            if let Err(e) = self.step() {
                self.stop_run();
                return Err(e);
            }
        }

        self.stop_run();
        Ok(self.cycles - start_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::{encode, Instruction};

    fn n(v: u8) -> Nibble {
        Nibble::new(v)
    }

    fn sum_program() -> Vec<crate::bits::Word11> {
        vec![
            encode(&Instruction::Immd { dst: n(1), value: n(5) }),
            encode(&Instruction::Immd { dst: n(2), value: n(3) }),
            encode(&Instruction::Add { a: n(1), b: n(2) }),
        ]
    }

    #[test]
    fn test_cadence_period() {
        assert_eq!(Cadence::default().period(), Duration::from_millis(200));
        assert_eq!(Cadence::from_hz(1000).unwrap().period(), Duration::from_millis(1));
        assert_eq!(Cadence::from_hz(0), Err(CpuError::ZeroCadence));
    }

    #[test]
    fn test_run_limited_end_to_end() {
        let mut cpu = Cpu::new();
        cpu.load_program(&sum_program()).unwrap();
        cpu.regs.jump(n(7));

        let executed = cpu.run_limited(3).unwrap();

        assert_eq!(executed, 3);
        assert_eq!(cpu.regs.read(n(0)).value(), 8);
        assert_eq!(cpu.regs.pc.value(), 3);
        assert_eq!(cpu.mode(), Mode::Interactive);
    }

    #[test]
    fn test_run_with_budget() {
        let mut cpu = Cpu::new();
        cpu.load_program(&sum_program()).unwrap();
        let stop = AtomicBool::new(false);
        let config = RunConfig { hz: 1000, max_cycles: Some(3) };

        let mut seen = Vec::new();
        let executed = cpu.run(&config, &stop, |c| seen.push(c.regs.pc.value())).unwrap();

        assert_eq!(executed, 3);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(cpu.regs.read(n(0)).value(), 8);
    }

    #[test]
    fn test_run_pauses_between_cycles() {
        let mut cpu = Cpu::new();
        cpu.load_program(&sum_program()).unwrap();
        let stop = AtomicBool::new(false);
        let config = RunConfig { hz: 50, max_cycles: Some(3) };
        let period = config.cadence().unwrap().period();

        let started = std::time::Instant::now();
        let executed = cpu.run(&config, &stop, |_| {}).unwrap();

        // Three cycles, two pauses: no pause after the last one
        assert_eq!(executed, 3);
        assert!(started.elapsed() >= period * 2);
        assert_eq!(cpu.regs.read(n(0)).value(), 8);
    }

    #[test]
    fn test_stop_signal_ends_run_after_cycle() {
        let mut cpu = Cpu::new();
        cpu.load_program(&sum_program()).unwrap();
        let stop = AtomicBool::new(false);
        let config = RunConfig { hz: 1000, max_cycles: None };

        let executed = cpu
            .run(&config, &stop, |c| {
                if c.regs.pc.value() == 2 {
                    stop.store(true, Ordering::SeqCst);
                }
            })
            .unwrap();

        assert_eq!(executed, 2);
        assert_eq!(cpu.regs.pc.value(), 2);
        assert_eq!(cpu.regs.read(n(2)).value(), 3);
        assert_eq!(cpu.mode(), Mode::Interactive);
    }

    #[test]
    fn test_run_wraps_through_memory() {
        // Zero words are ADD R0, R0: the counter walks all of memory
        let mut cpu = Cpu::new();
        cpu.run_limited(20).unwrap();
        assert_eq!(cpu.regs.pc.value(), 4);
    }

    #[test]
    fn test_run_rejected_while_programming() {
        let mut cpu = Cpu::new();
        cpu.begin_capture().unwrap();
        let stop = AtomicBool::new(false);
        assert!(cpu.run(&RunConfig::default(), &stop, |_| {}).is_err());
        assert!(cpu.is_programming());
    }

    #[test]
    fn test_zero_cadence_rejected_before_state_change() {
        let mut cpu = Cpu::new();
        cpu.regs.jump(n(6));
        let stop = AtomicBool::new(false);
        let config = RunConfig { hz: 0, max_cycles: Some(1) };
        assert_eq!(cpu.run(&config, &stop, |_| {}), Err(CpuError::ZeroCadence));
        assert_eq!(cpu.regs.pc.value(), 6);
    }
}

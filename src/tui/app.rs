//! Debugger application state and logic.

use crate::console::{parse_command, Command};
use crate::cpu::{Cadence, Cpu, CpuError, Mode};
use crate::asm::disasm::disassemble_instruction;
use crate::bits::Nibble;
use std::time::{Duration, Instant};

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being shown.
    pub cpu: Cpu,
    /// Line being typed.
    pub input: String,
    /// Run rate.
    pub cadence: Cadence,
    /// When the last run cycle executed.
    last_tick: Instant,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
}

impl DebuggerApp {
    /// Create a debugger around a machine.
    pub fn new(cpu: Cpu, cadence: Cadence) -> Self {
        Self {
            cpu,
            input: String::new(),
            cadence,
            last_tick: Instant::now(),
            should_quit: false,
            status: "Ready. Type an instruction or command, Enter to submit.".into(),
        }
    }

    /// Submit the typed line.
    pub fn submit_line(&mut self) {
        let line = std::mem::take(&mut self.input);
        match parse_command(&line) {
            Ok(command) => self.apply(command),
            Err(e) => self.status = format!("Invalid input: {}", e),
        }
    }

    fn apply(&mut self, command: Command) {
        let result = match command {
            Command::Exit => {
                self.should_quit = true;
                Ok(())
            }
            Command::Reset => {
                self.cpu.reset();
                self.status = "System reset.".into();
                Ok(())
            }
            Command::Program => self.cpu.begin_capture().map(|_| {
                self.status = "Programming: each instruction is stored at the clock address.".into();
            }),
            Command::End => self.cpu.end_capture().map(|_| {
                self.status = "Programming ended.".into();
            }),
            Command::Run => self.cpu.start_run().map(|_| {
                self.last_tick = Instant::now();
                self.status = format!("Running at {} Hz. Esc to stop.", self.cadence.hz());
            }),
            Command::Instruction { opcode, a, b } => self.execute_line(opcode, a, b),
        };

        if let Err(e) = result {
            self.status = format!("Ignored: {}", e);
        }
    }

    fn execute_line(&mut self, opcode: u8, a: u8, b: u8) -> Result<(), CpuError> {
        if self.cpu.mode() == Mode::Programming {
            let addr = self.cpu.capture(opcode, a, b)?;
            self.status = format!("Stored at P{}.", addr.value());
        } else {
            let instr = self.cpu.submit(opcode, a, b)?;
            self.status = format!("Executed {}.", crate::asm::disasm::format_instruction(&instr));
        }
        Ok(())
    }

    /// Stop a run in progress.
    pub fn stop(&mut self) {
        if self.cpu.is_running() {
            self.cpu.stop_run();
            self.status = format!("Stopped after {} cycles.", self.cpu.cycles);
        }
    }

    /// Execute one run cycle if a cadence period has passed.
    pub fn tick(&mut self) {
        if !self.cpu.is_running() || self.last_tick.elapsed() < self.cadence.period() {
            return;
        }
        self.last_tick = Instant::now();

        if let Err(e) = self.cpu.step() {
            self.cpu.stop_run();
            self.status = format!("Error: {}", e);
        }
    }

    /// How long the event loop may block before the next tick is due.
    pub fn poll_timeout(&self) -> Duration {
        let idle = Duration::from_millis(50);
        if !self.cpu.is_running() {
            return idle;
        }
        self.cadence.period().saturating_sub(self.last_tick.elapsed()).min(idle)
    }

    /// Program listing: (address, disassembly, is_current).
    pub fn get_program_listing(&self) -> Vec<(u8, String, bool)> {
        let pc = self.cpu.regs.pc;
        Nibble::all()
            .map(|addr| {
                let word = self.cpu.mem.read(addr);
                let text = format!("{}  {}", word.grouped(), disassemble_instruction(word));
                (addr.value(), text, addr == pc)
            })
            .collect()
    }
}

/// Run the debugger on a machine.
pub fn run_debugger(cpu: Cpu, cadence: Cadence) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(cpu, cadence);

    // Main loop
    let result = loop {
        // Draw
        if let Err(e) = terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        }) {
            break Err(e);
        }

        // Handle input
        match event::poll(app.poll_timeout()) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                                app.should_quit = true;
                            }
                            KeyCode::Char(c) => app.input.push(c),
                            KeyCode::Backspace => {
                                app.input.pop();
                            }
                            KeyCode::Enter => app.submit_line(),
                            KeyCode::Esc => app.stop(),
                            _ => {}
                        }
                    }
                }
            }
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        // Tick for continuous running
        app.tick();

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(app: &mut DebuggerApp, line: &str) {
        app.input = line.to_string();
        app.submit_line();
    }

    #[test]
    fn test_typed_instructions_execute() {
        let mut app = DebuggerApp::new(Cpu::new(), Cadence::default());
        typed(&mut app, "011 0001 0101");
        assert_eq!(app.cpu.regs.read(Nibble::new(1)).value(), 5);
        assert!(app.status.contains("IMMD R1, 5"));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_program_then_run() {
        let mut app = DebuggerApp::new(Cpu::new(), Cadence::from_hz(1000).unwrap());
        typed(&mut app, "program");
        typed(&mut app, "011 0001 0101");
        typed(&mut app, "011 0010 0011");
        typed(&mut app, "000 0001 0010");
        typed(&mut app, "end");
        typed(&mut app, "run");
        assert!(app.cpu.is_running());

        while app.cpu.cycles < 3 {
            std::thread::sleep(app.cadence.period());
            app.tick();
        }
        app.stop();

        assert_eq!(app.cpu.regs.read(Nibble::new(0)).value(), 8);
        assert_eq!(app.cpu.mode(), Mode::Interactive);
    }

    #[test]
    fn test_instruction_while_running_is_ignored() {
        let mut app = DebuggerApp::new(Cpu::new(), Cadence::default());
        typed(&mut app, "run");
        typed(&mut app, "011 0001 0101");
        assert!(app.status.starts_with("Ignored"));
        assert!(app.cpu.regs.read(Nibble::new(1)).is_zero());
    }

    #[test]
    fn test_listing_marks_pc() {
        let mut app = DebuggerApp::new(Cpu::new(), Cadence::default());
        typed(&mut app, "100 0011 0000");
        let listing = app.get_program_listing();
        assert_eq!(listing.len(), 16);
        assert!(listing[3].2);
        assert!(!listing[0].2);
    }

    #[test]
    fn test_exit_quits() {
        let mut app = DebuggerApp::new(Cpu::new(), Cadence::default());
        typed(&mut app, "exit");
        assert!(app.should_quit);
    }
}

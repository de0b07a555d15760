//! Line-driven console session.
//!
//! Reads one line at a time, applies it to the machine and redraws the
//! register/program table. `run` keeps redrawing after every cycle until
//! the shared [`RunSignal`] asks it to stop.

use crate::console::command::{parse_command, Command};
use crate::console::render::render;
use crate::cpu::{Cpu, CpuError, Mode, RunConfig};
use crossterm::{cursor::MoveTo, queue, terminal::{Clear, ClearType}};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

const PROMPT: &str = "Enter opcode (3-bit) and two 4-bit inputs, separated by spaces:";
const USAGE: &str = "Invalid input. Format: OPCODE (3-bit) INPUT1 (4-bit) INPUT2 (4-bit)";

/// Flags shared with an interrupt handler.
///
/// While a run is in progress the handler should call [`request_stop`];
/// otherwise an interrupt means the user wants to quit.
///
/// [`request_stop`]: RunSignal::request_stop
#[derive(Debug, Default)]
pub struct RunSignal {
    running: AtomicBool,
    stop: AtomicBool,
}

impl RunSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Whether the session keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// An interactive console over any line source and output sink.
pub struct Session<R, W> {
    cpu: Cpu,
    input: R,
    out: W,
    config: RunConfig,
    signal: Arc<RunSignal>,
    clear_screen: bool,
    status: Option<String>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a session with a fresh machine and the default 5 Hz cadence.
    pub fn new(input: R, out: W) -> Self {
        Self {
            cpu: Cpu::new(),
            input,
            out,
            config: RunConfig::default(),
            signal: Arc::new(RunSignal::new()),
            clear_screen: false,
            status: None,
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_signal(mut self, signal: Arc<RunSignal>) -> Self {
        self.signal = signal;
        self
    }

    /// Clear the terminal before each redraw.
    pub fn clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    /// Start from an existing machine, e.g. one with a program loaded.
    pub fn with_cpu(mut self, cpu: Cpu) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read and apply lines until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let mut line = String::new();
        loop {
            self.redraw()?;
            writeln!(self.out, "{}", PROMPT)?;
            write!(self.out, "> ")?;
            self.out.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }

            let flow = match parse_command(&line) {
                Ok(command) => self.apply(command)?,
                Err(e) => {
                    self.status = Some(format!("{} ({})", USAGE, e));
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> io::Result<Flow> {
        let result = match command {
            Command::Exit => return Ok(Flow::Exit),
            Command::Reset => {
                self.cpu.reset();
                self.status = Some("System reset.".into());
                Ok(())
            }
            Command::Program => self.cpu.begin_capture(),
            Command::End => self.cpu.end_capture(),
            Command::Run => self.run_program()?,
            Command::Instruction { opcode, a, b } => {
                if self.cpu.mode() == Mode::Programming {
                    self.cpu.capture(opcode, a, b).map(|addr| {
                        self.status = Some(format!("Stored at P{}.", addr.value()));
                    })
                } else {
                    self.cpu.submit(opcode, a, b).map(|_| ())
                }
            }
        };

        if let Err(e) = result {
            warn!("{}", e);
            self.status = Some(format!("Ignored: {}", e));
        }
        Ok(Flow::Continue)
    }

    /// Run the program in memory, redrawing after every cycle.
    fn run_program(&mut self) -> io::Result<Result<(), CpuError>> {
        let Self { cpu, out, config, signal, clear_screen, .. } = &mut *self;

        signal.stop.store(false, Ordering::SeqCst);
        signal.running.store(true, Ordering::SeqCst);

        let mut io_error = None;
        let result = cpu.run(config, &signal.stop, |cpu| {
            if io_error.is_some() {
                return;
            }
            if let Err(e) = draw(&mut *out, cpu, *clear_screen, None) {
                io_error = Some(e);
                signal.request_stop();
            }
        });

        signal.running.store(false, Ordering::SeqCst);
        signal.stop.store(false, Ordering::SeqCst);

        if let Some(e) = io_error {
            return Err(e);
        }
        Ok(result.map(|cycles| {
            self.status = Some(format!("Run stopped after {} cycles.", cycles));
        }))
    }

    fn redraw(&mut self) -> io::Result<()> {
        let status = self.status.take();
        draw(&mut self.out, &self.cpu, self.clear_screen, status.as_deref())
    }
}

fn draw<W: Write>(out: &mut W, cpu: &Cpu, clear: bool, status: Option<&str>) -> io::Result<()> {
    if clear {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    render(out, &cpu.snapshot())?;
    if let Some(status) = status {
        writeln!(out, "{}", status)?;
    }
    out.flush()
}

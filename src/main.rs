//! 4-bit Machine Emulator - CLI Entry Point
//!
//! Commands:
//! - `nibble4-emu console [program]` - Interactive line console (default)
//! - `nibble4-emu tui [program]` - Full-screen debugger
//! - `nibble4-emu run <program>` - Run an image or ASM file
//! - `nibble4-emu asm <source>` - Assemble to a program image
//! - `nibble4-emu disasm <image>` - Disassemble a program image

use clap::{Parser, Subcommand};
use nibble4::asm::{assemble, disassemble, load_image, save_image, format_image};
use nibble4::asm::disasm::format_instruction;
use nibble4::bits::Word11;
use nibble4::console::{RunSignal, Session};
use nibble4::cpu::{Cadence, Cpu, RunConfig};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nibble4-emu")]
#[command(version)]
#[command(about = "An instructional emulator of a minimal 4-bit processor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console: type instructions and commands line by line
    Console {
        /// Program image or ASM file to preload
        program: Option<String>,
        /// Run cadence in cycles per second
        #[arg(long, default_value_t = Cadence::DEFAULT_HZ)]
        hz: u32,
        /// Do not clear the screen between redraws
        #[arg(long)]
        no_clear: bool,
    },
    /// Full-screen terminal debugger
    #[cfg(feature = "tui")]
    Tui {
        /// Program image or ASM file to preload
        program: Option<String>,
        /// Run cadence in cycles per second
        #[arg(long, default_value_t = Cadence::DEFAULT_HZ)]
        hz: u32,
    },
    /// Run a program from address 0 until stopped
    Run {
        /// Path to the image or ASM file to execute
        program: String,
        /// Run cadence in cycles per second
        #[arg(long, default_value_t = Cadence::DEFAULT_HZ)]
        hz: u32,
        /// Stop after this many cycles (default: run until Ctrl-C)
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Print the final machine state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assemble source to a program image
    Asm {
        /// Path to the source file
        source: String,
        /// Output image file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble a program image to readable text
    Disasm {
        /// Path to the image file
        image: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Console { program, hz, no_clear }) => {
            init_logging();
            console(program.as_deref(), hz, !no_clear);
        }
        #[cfg(feature = "tui")]
        Some(Commands::Tui { program, hz }) => {
            debug_program(program.as_deref(), hz);
        }
        Some(Commands::Run { program, hz, max_cycles, trace, json }) => {
            init_logging();
            run_program(&program, RunConfig { hz, max_cycles }, trace, json);
        }
        Some(Commands::Asm { source, output }) => {
            init_logging();
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { image }) => {
            init_logging();
            disassemble_file(&image);
        }
        None => {
            init_logging();
            console(None, Cadence::DEFAULT_HZ, true);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load a program, assembling it first if it is an ASM file.
fn load_program(path: &str) -> Vec<Word11> {
    if path.ends_with(".asm") {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        };

        match assemble(&source) {
            Ok(words) => {
                println!("📝 Assembled {} instructions", words.len());
                words
            }
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match load_image(path) {
            Ok(words) => {
                println!("📂 Loaded {} instructions", words.len());
                words
            }
            Err(e) => {
                eprintln!("❌ Failed to load image: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Build a machine, optionally preloaded with a program.
fn machine(program: Option<&str>) -> Cpu {
    let mut cpu = Cpu::new();
    if let Some(path) = program {
        let words = load_program(path);
        if let Err(e) = cpu.load_program(&words) {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    }
    cpu
}

fn cadence_or_exit(hz: u32) -> Cadence {
    match Cadence::from_hz(hz) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn console(program: Option<&str>, hz: u32, clear: bool) {
    cadence_or_exit(hz);
    let cpu = machine(program);

    // Ctrl-C stops a run in progress; otherwise it quits.
    let signal = Arc::new(RunSignal::new());
    let handler_signal = Arc::clone(&signal);
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_signal.is_running() {
            handler_signal.request_stop();
        } else {
            std::process::exit(0);
        }
    }) {
        eprintln!("⚠️  Could not install Ctrl-C handler: {}", e);
    }

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout())
        .with_cpu(cpu)
        .with_config(RunConfig { hz, max_cycles: None })
        .with_signal(signal)
        .clear_screen(clear);

    if let Err(e) = session.run() {
        eprintln!("❌ Console error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "tui")]
fn debug_program(program: Option<&str>, hz: u32) {
    use nibble4::tui::run_debugger;

    let cadence = cadence_or_exit(hz);
    let cpu = machine(program);

    if let Err(e) = run_debugger(cpu, cadence) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

fn run_program(path: &str, config: RunConfig, trace: bool, json: bool) {
    println!("🔧 Running: {}", path);

    let words = load_program(path);
    if words.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut cpu = machine(None);
    if let Err(e) = cpu.load_program(&words) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst)) {
        eprintln!("⚠️  Could not install Ctrl-C handler: {}", e);
    }

    println!();
    println!("━━━ Execution ━━━");

    let result = cpu.run(&config, &stop, |cpu| {
        if trace {
            if let Some(instr) = cpu.last_instruction() {
                println!("{:>6}: {:<14} CLK={:>2} R0={:>2}",
                    cpu.cycles, format_instruction(&instr), cpu.regs.pc.value(),
                    cpu.regs.values()[0].value());
            }
        }
    });

    let cycles = match result {
        Ok(n) => n,
        Err(e) => {
            eprintln!("❌ Run failed: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("━━━ Result ━━━");
    if json {
        match cpu.snapshot().to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Cycles: {}", cycles);
    println!("Clock:  {}", cpu.regs.pc);
    for (i, value) in cpu.regs.values().iter().enumerate() {
        if !value.is_zero() {
            println!("R{:<2} = {} ({})", i, value, value.value());
        }
    }
}

fn assemble_file(source_path: &str, output: Option<String>) {
    println!("📝 Assembling: {}", source_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let words = match assemble(&source) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✅ Assembled {} instructions", words.len());

    match output {
        Some(out_path) => {
            if let Err(e) = save_image(&out_path, &words) {
                eprintln!("❌ Failed to write image: {}", e);
                std::process::exit(1);
            }
            println!("💾 Saved to: {}", out_path);
        }
        None => {
            println!();
            print!("{}", format_image(&words));
        }
    }
}

fn disassemble_file(path: &str) {
    let words = match load_image(path) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    };

    println!("; Disassembly of {}", path);
    println!("; {} instructions", words.len());
    println!();
    print!("{}", disassemble(&words));
}

//! TUI debugger for the 4-bit machine.
//!
//! Provides a full-screen terminal front end with:
//! - Live register and clock view
//! - Program memory listing with the clock address highlighted
//! - A command line accepting the same input as the console
//! - Paced runs that can be stopped with Esc

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};

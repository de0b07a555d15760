//! Line-based console front end.
//!
//! The classic interface: type a binary instruction to execute it, or one of
//! the command words `reset`, `exit`, `program`, `run`, `end`.

mod command;
mod render;
mod session;

pub use command::{parse_command, Command, CommandError};
pub use render::render;
pub use session::{RunSignal, Session};

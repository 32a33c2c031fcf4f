//! Command interpreter and session controller.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The interpreter splits input
//! lines, rewrites aliases, checks declared arguments, and dispatches
//! `execute()`. A `Session` wraps the interpreter in the prompt/result loop
//! and drives an external `Renderer`.

mod alias;
mod commands;
pub mod eval;
mod interpreter;
mod session;


/// Runtime-mutable alias table.
pub use alias::AliasTable;
/// Register the built-in commands, in `help` order.
pub use commands::{format_date, parse_exit_code, register_builtins};
/// Core dispatch types.
pub use interpreter::{
    ArgSpec, Command, CommandRegistry, CommandResult, Environment, EnvironmentState, Renderable,
    tokenize, usage,
};
/// Session loop and its output surface.
pub use session::{Renderer, Session, SessionState};

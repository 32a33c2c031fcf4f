//! Command trait, registry, and dispatch logic.
//!
//! A line is split on single spaces, the first token is rewritten through
//! the alias table once, the command is looked up, and its declared
//! arguments are checked before `execute()` runs. Quoting is not supported:
//! `echo "a b"` yields the two tokens `"a` and `b"`.

use std::collections::HashMap;

use blockterm_types::config::TermConfig;
use blockterm_types::error::Result;
use blockterm_vfs::Vfs;

use crate::alias::AliasTable;

/// An opaque item the renderer knows how to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderable {
    /// An image loaded from a URL.
    Image { url: String },
}

/// Output produced by a command.
///
/// The variant alone decides how the renderer presents the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Plain text.
    Text(String),
    /// An error message, rendered inline.
    Error(String),
    /// A renderable block (e.g. an image).
    Block(Renderable),
    /// Command produced no visible output.
    Empty,
    /// Command succeeded with nothing to show.
    Success,
    /// Input was empty; nothing ran.
    Cancel,
}

impl CommandResult {
    /// Convenience constructor for text output.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Convenience constructor for an inline error.
    pub fn error(s: impl Into<String>) -> Self {
        Self::Error(s.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A declared, named positional argument. Used by `help` and by the
/// missing-argument check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub description: &'static str,
}

impl ArgSpec {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// Mutable per-session record: identity, working directory, line counter
/// and exit state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentState {
    pub cwd: String,
    pub username: String,
    pub hostname: String,
    /// Index of the current input line.
    pub line: u64,
    /// Cleared by `exit`; the session stops issuing prompts afterwards.
    pub running: bool,
    pub exit_code: i32,
    clear_requested: bool,
}

impl EnvironmentState {
    pub fn new(username: &str, hostname: &str, cwd: &str) -> Self {
        Self {
            cwd: cwd.to_string(),
            username: username.to_string(),
            hostname: hostname.to_string(),
            line: 0,
            running: true,
            exit_code: 0,
            clear_requested: false,
        }
    }

    pub fn from_config(config: &TermConfig) -> Self {
        Self::new(&config.username, &config.hostname, &config.home)
    }

    /// Prompt string, `<username>@<hostname>:<cwd>#`.
    pub fn prompt(&self) -> String {
        format!("{}@{}:{}#", self.username, self.hostname, self.cwd)
    }

    /// Reset the line counter and ask the session to wipe rendered output.
    pub fn request_clear(&mut self) {
        self.line = 0;
        self.clear_requested = true;
    }

    /// Consume a pending clear request.
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }
}

/// Shared mutable environment passed to every command.
///
/// The three mutable pieces (`state`, `vfs`, `aliases`) are the only state a
/// command may touch. `registry` is read-only and lets `help` enumerate the
/// catalog.
pub struct Environment<'a> {
    pub state: &'a mut EnvironmentState,
    pub vfs: &'a mut dyn Vfs,
    pub aliases: &'a mut AliasTable,
    pub registry: &'a CommandRegistry,
}

/// A single executable command.
pub trait Command {
    /// The canonical command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Declared positional arguments, in order.
    fn args(&self) -> &[ArgSpec] {
        &[]
    }

    /// Execute the command with the given arguments and environment.
    ///
    /// User-facing failures are `Ok(CommandResult::Error)`. An `Err` means
    /// the command itself is faulty.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult>;
}

/// Ordered registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    index: HashMap<String, usize>,
    banner: String,
}

impl CommandRegistry {
    /// Create an empty command registry with the stock version banner.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
            banner: TermConfig::default().banner(),
        }
    }

    /// Replace the version banner shown at the top of `help`.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Register a command. Replaces any existing command with the same name,
    /// keeping its original position.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name().to_string();
        match self.index.get(&name) {
            Some(&i) => self.commands[i] = cmd,
            None => {
                self.index.insert(name, self.commands.len());
                self.commands.push(cmd);
            },
        }
    }

    /// Look up a command by canonical name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.index.get(name).map(|&i| self.commands[i].as_ref())
    }

    /// Commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Parse and execute one raw input line.
    ///
    /// Empty input yields `Cancel`. Unknown commands and missing arguments
    /// yield `CommandResult::Error`. An `Err` from the command propagates.
    pub fn interpret(&self, line: &str, env: &mut Environment<'_>) -> Result<CommandResult> {
        if line.is_empty() {
            return Ok(CommandResult::Cancel);
        }

        let tokens = tokenize(line);
        let invoked = tokens[0];
        let name = env.aliases.resolve(invoked).to_string();
        if name != invoked {
            log::debug!("alias {invoked} -> {name}");
        }

        let Some(cmd) = self.get(&name) else {
            return Ok(CommandResult::error(format!("invalid command {name}")));
        };

        let args = &tokens[1..];
        if !cmd.args().is_empty() && args.is_empty() {
            log::warn!("{name}: missing required arguments");
            return Ok(CommandResult::Error(usage(cmd)));
        }

        log::debug!("dispatch {name} ({} args)", args.len());
        cmd.execute(args, env)
    }

    /// Full `help` listing: banner, then one line per command in
    /// registration order.
    pub fn help_text(&self) -> String {
        let mut lines = vec![self.banner.clone()];
        for cmd in self.commands() {
            let args: Vec<String> = cmd
                .args()
                .iter()
                .map(|a| format!("[{}: {}]", a.name, a.description))
                .collect();
            if args.is_empty() {
                lines.push(format!("\t{}: {}", cmd.name(), cmd.description()));
            } else {
                lines.push(format!(
                    "\t{} {}: {}",
                    cmd.name(),
                    args.join(" "),
                    cmd.description()
                ));
            }
        }
        lines.join("\n")
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Usage message listing every declared argument of `cmd`.
pub fn usage(cmd: &dyn Command) -> String {
    let declared = cmd.args();
    let plural = if declared.len() == 1 { "" } else { "s" };
    let mut out = format!(
        "{} requires {} argument{plural}:",
        cmd.name(),
        declared.len()
    );
    for arg in declared {
        out.push_str(&format!("\n\t{}: {}", arg.name, arg.description));
    }
    out
}

/// Split a line on single spaces.
///
/// Consecutive, leading, or trailing spaces produce empty tokens, so the
/// result always has at least one element.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').collect()
}

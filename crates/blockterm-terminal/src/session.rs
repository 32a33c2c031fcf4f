//! Session controller: the read-execute-render loop.
//!
//! A [`Session`] owns the environment, filesystem, alias table and command
//! registry of one terminal. The host feeds it one line at a time through
//! [`Session::submit_line`] and supplies a [`Renderer`] that draws prompts
//! and results.

use blockterm_types::config::TermConfig;
use blockterm_types::error::Result;
use blockterm_vfs::{MemoryVfs, Vfs};

use crate::alias::AliasTable;
use crate::commands::register_builtins;
use crate::interpreter::{CommandRegistry, CommandResult, Environment, EnvironmentState};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A prompt is showing and the session waits for input.
    AwaitingLine,
    /// A submitted line is being interpreted.
    Executing,
    /// `exit` ran. Further input is ignored.
    Terminated,
}

/// Output surface driven by the session.
pub trait Renderer {
    /// Show a fresh prompt for input line `line`.
    fn render_prompt(&mut self, prompt: &str, line: u64) -> Result<()>;

    /// Show the outcome of a command.
    fn render_result(&mut self, result: &CommandResult) -> Result<()>;

    /// Freeze the input of a completed line.
    fn disable_input(&mut self, _line: u64) -> Result<()> {
        Ok(())
    }

    /// Wipe all rendered history.
    fn clear_all(&mut self) -> Result<()>;

    /// The session has ended with `exit_code`.
    fn mark_terminated(&mut self, exit_code: i32) -> Result<()>;
}

/// One interactive terminal session.
pub struct Session {
    registry: CommandRegistry,
    env: EnvironmentState,
    vfs: Box<dyn Vfs>,
    aliases: AliasTable,
    state: SessionState,
}

impl Session {
    /// Build a session from configuration with the built-in commands.
    pub fn new(config: &TermConfig) -> Self {
        let mut registry = CommandRegistry::new().with_banner(config.banner());
        register_builtins(&mut registry);
        Self {
            registry,
            env: EnvironmentState::from_config(config),
            vfs: Box::new(MemoryVfs::with_entries(config.filesystem.iter().cloned())),
            aliases: config.aliases.clone().into_iter().collect(),
            state: SessionState::AwaitingLine,
        }
    }

    /// Replace the command registry.
    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the filesystem backend.
    pub fn with_vfs(mut self, vfs: Box<dyn Vfs>) -> Self {
        self.vfs = vfs;
        self
    }

    /// Render the initial prompt.
    pub fn start(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        log::info!("Session started as {}", self.prompt());
        renderer.render_prompt(&self.prompt(), self.env.line)
    }

    /// Interpret one submitted line and drive the renderer.
    ///
    /// Returns the state the session settled in. Once terminated, input is
    /// ignored and nothing is rendered.
    pub fn submit_line(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<SessionState> {
        if self.state == SessionState::Terminated {
            log::debug!("Ignoring input after termination");
            return Ok(SessionState::Terminated);
        }

        self.state = SessionState::Executing;
        let outcome = self.run_line(text, renderer);
        self.state = match &outcome {
            Ok(next) => *next,
            Err(_) if !self.env.running => SessionState::Terminated,
            Err(_) => SessionState::AwaitingLine,
        };
        log::debug!("Session state: {:?}", self.state);
        outcome
    }

    fn run_line(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<SessionState> {
        let completed = self.env.line;
        let outcome = {
            let mut env = Environment {
                state: &mut self.env,
                vfs: &mut *self.vfs,
                aliases: &mut self.aliases,
                registry: &self.registry,
            };
            self.registry.interpret(text, &mut env)
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                log::error!("Faulty command {text:?}: {e}");
                CommandResult::error("Faulty command")
            },
        };

        let cleared = self.env.take_clear_request();
        if cleared {
            log::info!("Terminal cleared");
            renderer.clear_all()?;
        } else {
            renderer.render_result(&result)?;
            renderer.disable_input(completed)?;
        }

        if !self.env.running {
            log::info!("Session terminated with exit code {}", self.env.exit_code);
            renderer.mark_terminated(self.env.exit_code)?;
            return Ok(SessionState::Terminated);
        }

        if !cleared {
            self.env.line += 1;
        }
        renderer.render_prompt(&self.prompt(), self.env.line)?;
        Ok(SessionState::AwaitingLine)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Environment record (cwd, identity, line, exit state).
    pub fn env(&self) -> &EnvironmentState {
        &self.env
    }

    pub fn vfs(&self) -> &dyn Vfs {
        &*self.vfs
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn prompt(&self) -> String {
        self.env.prompt()
    }

    pub fn exit_code(&self) -> i32 {
        self.env.exit_code
    }
}

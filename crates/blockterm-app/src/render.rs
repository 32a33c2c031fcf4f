//! Plain-text renderer for a terminal session.

use std::io::Write;

use blockterm_terminal::{CommandResult, Renderable, Renderer};
use blockterm_types::error::Result;

/// ANSI: erase display, cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Writes prompts and results as plain text lines.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// End a dangling prompt line.
    pub fn finish_line(&mut self) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render_prompt(&mut self, prompt: &str, _line: u64) -> Result<()> {
        write!(self.out, "{prompt} ")?;
        self.out.flush()?;
        Ok(())
    }

    fn render_result(&mut self, result: &CommandResult) -> Result<()> {
        match result {
            CommandResult::Text(text) => writeln!(self.out, "{text}")?,
            CommandResult::Error(msg) => writeln!(self.out, "error: {msg}")?,
            CommandResult::Block(Renderable::Image { url }) => {
                writeln!(self.out, "[image: {url}]")?
            },
            CommandResult::Empty | CommandResult::Success | CommandResult::Cancel => {},
        }
        self.out.flush()?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        write!(self.out, "{CLEAR_SCREEN}")?;
        self.out.flush()?;
        Ok(())
    }

    fn mark_terminated(&mut self, exit_code: i32) -> Result<()> {
        writeln!(self.out, "[Exited with code {exit_code}]")?;
        self.out.flush()?;
        Ok(())
    }
}

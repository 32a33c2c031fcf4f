//! BlockTerm console entry point.
//!
//! Reads one line at a time from stdin and feeds it to a terminal session
//! that renders to stdout. The process exits with the session's exit code
//! once `exit` runs or stdin closes.

mod render;

use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{Context, Result};

use blockterm_terminal::{Session, SessionState};
use blockterm_types::config::TermConfig;
use render::ConsoleRenderer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from CLI arg, BLOCKTERM_CONFIG env var, or defaults.
    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BLOCKTERM_CONFIG").ok())
    {
        Some(path) => TermConfig::load(Path::new(&path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => TermConfig::default(),
    };
    log::info!("Starting {}", config.banner());

    let mut session = Session::new(&config);
    let mut renderer = ConsoleRenderer::new(io::stdout().lock());
    session.start(&mut renderer)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if session.submit_line(&line, &mut renderer)? == SessionState::Terminated {
            break;
        }
    }

    if !session.is_terminated() {
        renderer.finish_line()?;
        log::info!("stdin closed, leaving session");
    }
    let code = session.exit_code();
    drop(renderer);
    std::process::exit(code);
}

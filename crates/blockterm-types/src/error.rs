//! Error types for BlockTerm.

use std::io;

/// Errors produced by the BlockTerm crates.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error("config error: {0}")]
    Config(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TermError>;

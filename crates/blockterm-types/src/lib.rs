//! Foundation types for BlockTerm.
//!
//! This crate holds the types shared by every BlockTerm crate: the error
//! enum and its `Result` alias, plus the TOML-backed session configuration
//! and version record.

pub mod config;
pub mod error;

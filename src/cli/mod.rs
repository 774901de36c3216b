//! Command-line interface module.
//!
//! Provides argument parsing and the one-shot `list`/`up`/`down` commands.

pub mod args;
pub mod commands;

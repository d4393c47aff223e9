//! sql-migrator command-line tool
//!
//! The binary (main.rs) parses arguments with [`cli::Cli`], resolves the
//! configuration and dispatches to the handlers in [`commands`].

pub mod cli;
pub mod commands;
pub mod context;

pub use cli::{Cli, Command, DbCommand};
pub use context::CommandContext;

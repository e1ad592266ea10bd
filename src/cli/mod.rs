//! CLI module for schemasearch
//!
//! Provides command-line interface for:
//! - mapping: index creation body of a document type
//! - schema: generated consumer schema SDL
//! - plan: engine request planned for a search read from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{mapping, plan, run, run_command, schema};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};

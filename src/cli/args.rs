//! CLI argument definitions using clap
//!
//! Commands:
//! - schemasearch mapping --type <DocType> --config <path>
//! - schemasearch schema --config <path>
//! - schemasearch plan --type <DocType> --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schema-driven search: index mappings, consumer schema and query plans
#[derive(Parser, Debug)]
#[command(name = "schemasearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the index creation body of a document type
    Mapping {
        /// Path to configuration file
        #[arg(long, default_value = "./search.json")]
        config: PathBuf,

        /// Document type name
        #[arg(long = "type")]
        document_type: String,
    },

    /// Print the generated consumer schema
    Schema {
        /// Path to configuration file
        #[arg(long, default_value = "./search.json")]
        config: PathBuf,
    },

    /// Read a search request from stdin and print the engine request it plans
    Plan {
        /// Path to configuration file
        #[arg(long, default_value = "./search.json")]
        config: PathBuf,

        /// Document type name
        #[arg(long = "type")]
        document_type: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

//! schemasearch CLI entry point
//!
//! Installs the log subscriber (stderr, `RUST_LOG`, default
//! `schemasearch=info`), delegates to the CLI module and exits non-zero on
//! failure.

use schemasearch::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schemasearch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

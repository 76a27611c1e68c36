//! testdeck - terminal test suite runner
//!
//! Discovers a test suite through an external framework process and
//! executes it, streaming per-test results as they come back.

use clap::Parser;
use testdeck::cli::{self, Commands};
use testdeck::common::logging;

#[derive(Parser)]
#[command(name = "testdeck", about = "Terminal test suite runner")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

//! CLI entry point for lattice diagram growth simulation

use clap::Parser;
use tracing_subscriber::EnvFilter;
use youngsim::io::cli::{Cli, SimulationRunner};
use youngsim::io::configuration::DEFAULT_LOG_FILTER;

fn main() -> youngsim::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    SimulationRunner::new(cli).run()
}

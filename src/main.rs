use clap::Parser;
use tracing_subscriber::EnvFilter;

use sweynscan::cli::{self, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let result = match cli.command {
        Commands::Length(args) => cli::length::handle_length(args),
        Commands::Pairing(args) => cli::pairing::handle_pairing(args),
        Commands::Probe(args) => cli::probe::handle_probe(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

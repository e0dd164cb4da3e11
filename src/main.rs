// logroute - main.rs
// Command-line front end for emitting events through a configured router

use clap::Parser;
use logroute::cli::{run, Cli};
use std::process::exit;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("logroute: {e:#}");
        exit(1);
    }
}

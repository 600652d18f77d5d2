mod app;
mod input;
mod render;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Galton box (bean machine) in the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// lattice half-width in pins (odd)
    #[arg(long)]
    pins: Option<usize>,

    /// draws at or below this lean left (1..=10, 5 is fair)
    #[arg(long)]
    bias: Option<u8>,

    /// animation speed (1..=10)
    #[arg(long)]
    speed: Option<u8>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with `machine` and `settings` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// drop N beans without animating and print the histogram
    #[arg(long)]
    drops: Option<u64>,

    /// write logs here while the animation owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// start paused
    #[arg(long, default_value_t = false)]
    paused: bool,
}

fn main() -> Result<()> {
    app::run(Args::parse())
}

//! clipbake - bake clip-masked SVG images into flattened, embedded rasters.

mod cli;
mod config;
mod convert;
mod document;
mod embed;
mod geom;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;
use std::env;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load(&env::current_dir()?)?,
    };

    match &cli.command {
        Commands::Convert { args } => {
            logger::set_verbose(args.verbose);
            cli::run_convert(args, &config)
        }
        Commands::Scan { args } => cli::run_scan(args),
    }
}

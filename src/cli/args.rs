//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Bake clip-masked SVG images into flattened, embedded rasters
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: clipbake.toml in the current directory)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replace clip-masked images with embedded rasters
    #[command(visible_alias = "c")]
    Convert {
        #[command(flatten)]
        args: ConvertArgs,
    },

    /// List clip-masked images as JSON without touching the file
    #[command(visible_alias = "s")]
    Scan {
        #[command(flatten)]
        args: ScanArgs,
    },
}

/// Convert command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// SVG document to convert
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Write the result here instead of back to the input file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Target resolution for the embedded bitmaps; skips the interactive
    /// picker
    #[arg(short, long, value_parser = parse_dpi, value_name = "50|72|96")]
    pub dpi: Option<f64>,

    /// Override the configured rasterizer command
    #[arg(long, value_name = "CMD")]
    pub rasterizer: Option<String>,

    /// Skip lossless PNG recompression
    #[arg(long)]
    pub no_optimize: bool,

    /// Keep the scratch directory with the staged working document
    #[arg(short, long)]
    pub keep: bool,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Scan command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// SVG document to inspect
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

fn parse_dpi(value: &str) -> Result<f64, String> {
    match value {
        "50" => Ok(50.0),
        "72" => Ok(72.0),
        "96" => Ok(96.0),
        _ => Err(format!(
            "unsupported resolution `{value}`, pick one of 50, 72 or 96"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpi_accepts_only_the_fixed_set() {
        assert_eq!(parse_dpi("50"), Ok(50.0));
        assert_eq!(parse_dpi("72"), Ok(72.0));
        assert_eq!(parse_dpi("96"), Ok(96.0));
        assert!(parse_dpi("97").is_err());
        assert!(parse_dpi("96.0").is_err());
        assert!(parse_dpi("").is_err());
    }

    #[test]
    fn test_cli_parses_convert_flags() {
        let cli = Cli::parse_from([
            "clipbake", "convert", "drawing.svg", "-o", "out.svg", "--dpi", "72", "--keep",
            "--no-optimize",
        ]);
        let Commands::Convert { args } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, PathBuf::from("drawing.svg"));
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));
        assert_eq!(args.dpi, Some(72.0));
        assert!(args.keep);
        assert!(args.no_optimize);
        assert!(!args.verbose);
    }
}

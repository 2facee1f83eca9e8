//! The `convert` subcommand: run the conversion pipeline over one file.

use crate::cli::args::ConvertArgs;
use crate::cli::picker;
use crate::config::Config;
use crate::convert::{self, CommandRasterizer, ConvertOptions};
use crate::document::Document;
use crate::log;
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

pub fn run_convert(args: &ConvertArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if let Some(command) = &args.rasterizer {
        config.rasterizer.command = command.split_whitespace().map(String::from).collect();
    }
    if args.no_optimize {
        config.export.optimize = false;
    }
    config.validate()?;

    // The picker runs before the document is even read; canceling leaves
    // everything untouched.
    let target_dpi = match args.dpi {
        Some(dpi) => dpi,
        None => picker::pick_dpi(config.export.dpi)?
            .ok_or_else(|| anyhow!("no export resolution selected"))?,
    };

    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut doc = Document::parse(&content)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let rasterizer = CommandRasterizer::new(config.rasterizer.command.clone());
    let options = ConvertOptions {
        target_dpi,
        optimize: config.export.optimize,
        keep_working_files: args.keep,
    };
    let report = convert::run(&mut doc, &rasterizer, &options)?;

    for warning in &report.warnings {
        log!("warning"; "{warning}");
    }

    let output = args.output.as_deref().unwrap_or(&args.input);
    let bytes = doc.to_bytes()?;
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    if report.total == 0 {
        log!("convert"; "wrote {} unchanged", output.display());
    } else if report.skipped.is_empty() {
        log!(
            "convert";
            "converted {} of {}, wrote {}",
            report.converted(),
            report.total,
            output.display()
        );
    } else {
        log!(
            "convert";
            "converted {} of {} ({} skipped), wrote {}",
            report.converted(),
            report.total,
            report.skipped.len(),
            output.display()
        );
    }

    verify_output(&bytes, output);
    Ok(())
}

/// Best-effort render check on the written result.
fn verify_output(bytes: &[u8], path: &Path) {
    if let Err(err) = usvg::Tree::from_data(bytes, &usvg::Options::default()) {
        log!("warning"; "{} may not render cleanly: {err}", path.display());
    }
}

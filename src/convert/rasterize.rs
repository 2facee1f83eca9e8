//! External rasterizer invocation.

use crate::utils::exec::{Cmd, FilterRule};
use anyhow::{Result, bail};
use std::path::Path;

/// Stderr prefixes from the rasterizer that are not worth relaying.
static RASTERIZER_NOISE: FilterRule = FilterRule::new(&[
    "Gtk-Message:",
    "Fontconfig warning:",
    "Background RRGGBBAA:",
    "Area ",
]);

/// Renders a single element of a document to a PNG file.
pub trait Rasterizer {
    /// Render `element_id` from the document at `document` at the given
    /// resolution, writing a PNG to `output`.
    fn export(&self, document: &Path, element_id: &str, dpi: f64, output: &Path) -> Result<()>;
}

/// Rasterizer backed by an external command speaking Inkscape's CLI dialect.
pub struct CommandRasterizer {
    command: Vec<String>,
}

impl CommandRasterizer {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl Rasterizer for CommandRasterizer {
    fn export(&self, document: &Path, element_id: &str, dpi: f64, output: &Path) -> Result<()> {
        Cmd::from_slice(&self.command)
            .arg("--export-type=png")
            .arg(format!("--export-filename={}", output.display()))
            .arg(format!("--export-dpi={dpi}"))
            .arg(format!("--export-id={element_id}"))
            .arg(document)
            .filter(&RASTERIZER_NOISE)
            .run()?;

        // Some rasterizers exit zero without writing anything for an
        // unknown id; treat that as a failure too.
        if !output.is_file() {
            bail!(
                "rasterizer exited successfully but wrote no file at {}",
                output.display()
            );
        }
        Ok(())
    }
}

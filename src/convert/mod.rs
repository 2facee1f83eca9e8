//! Clip-to-raster conversion pipeline.
//!
//! Replaces every clip-masked `<image>` element in a document with a
//! flattened, pre-cropped bitmap embedded as a data URI, and removes the
//! clip definitions that are no longer needed. Each element goes through
//! the same sequence: duplicate the element into an off-canvas staging
//! group, export the duplicate through an external rasterizer at a
//! resolution derived from the crop ratio, recompress the bitmap, then
//! swap the original for a plain `<image>` carrying the payload.
//!
//! Per-element failures skip that element and leave its markup untouched;
//! the run carries on with the remaining candidates.

mod compose;
mod element;
mod error;
mod optimize;
mod params;
mod rasterize;

pub use element::ElementOutcome;
pub use params::{derive_scale, safe_offset};
pub use rasterize::{CommandRasterizer, Rasterizer};

use crate::document::{Document, NodeId, url_reference};
use crate::{debug, log};
use anyhow::{Context, Result, bail};
use element::RunContext;

/// Knobs for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Pixel density the embedded bitmaps should have on the final canvas.
    pub target_dpi: f64,
    /// Re-encode exported PNGs at maximum compression.
    pub optimize: bool,
    /// Keep the scratch directory (with the staged working document) on
    /// disk after the run.
    pub keep_working_files: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            target_dpi: 96.0,
            optimize: true,
            keep_working_files: false,
        }
    }
}

/// A clip-masked image element eligible for conversion.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub image: NodeId,
    pub clip_id: String,
}

/// Every `<image>` element whose `clip-path` is a `url(#...)` reference,
/// in document order.
pub fn find_candidates(doc: &Document) -> Vec<Candidate> {
    let Some(root) = doc.root_element() else {
        return Vec::new();
    };
    doc.descendants(root)
        .into_iter()
        .filter(|&node| doc.is_element(node, "image"))
        .filter_map(|node| {
            let clip_id = url_reference(doc.attr(node, "clip-path")?)?;
            Some(Candidate {
                image: node,
                clip_id: clip_id.to_string(),
            })
        })
        .collect()
}

/// Outcome of a whole conversion run.
#[derive(Debug, Default)]
pub struct ConvertReport {
    /// Candidates found in the document.
    pub total: usize,
    /// Elements actually replaced.
    pub outcomes: Vec<ElementOutcome>,
    /// Per-element failures; those elements keep their original markup.
    pub skipped: Vec<String>,
    /// Non-fatal notes accumulated across the run.
    pub warnings: Vec<String>,
}

impl ConvertReport {
    pub fn converted(&self) -> usize {
        self.outcomes.len()
    }
}

/// Convert every clip-masked image in `doc`, in place.
///
/// Returns an error only when the document as a whole cannot be processed;
/// that happens before any mutation. Everything element-scoped lands in
/// the report instead.
pub fn run(
    doc: &mut Document,
    rasterizer: &dyn Rasterizer,
    options: &ConvertOptions,
) -> Result<ConvertReport> {
    let candidates = find_candidates(doc);
    let mut report = ConvertReport {
        total: candidates.len(),
        ..ConvertReport::default()
    };
    if candidates.is_empty() {
        log!("convert"; "no clip-masked images found, nothing to do");
        return Ok(report);
    }
    let suffix = if report.total == 1 { "" } else { "s" };
    log!("convert"; "found {} clip-masked image{suffix}", report.total);

    let mut warnings = Vec::new();

    let canvas = match doc.canvas_bounds(&mut warnings) {
        Some(canvas) => canvas,
        None => {
            for warning in &warnings {
                log!("warning"; "{warning}");
            }
            bail!("no canvas bounding box could be computed, cannot derive a safe off-canvas offset");
        }
    };
    let offset = safe_offset(&canvas);
    debug!("convert"; "canvas {}x{}, staging offset ({}, {})",
        canvas.width(), canvas.height(), offset.0, offset.1);

    // A clip shared between elements disappears with the first conversion
    // that references it; later candidates then fail to resolve their clip
    // and are skipped.
    let reference_counts = doc.reference_counts();
    let mut flagged: Vec<&str> = Vec::new();
    for candidate in &candidates {
        let count = reference_counts
            .get(&candidate.clip_id)
            .copied()
            .unwrap_or(0);
        if count > 1 && !flagged.contains(&candidate.clip_id.as_str()) {
            flagged.push(&candidate.clip_id);
            warnings.push(format!(
                "clip `{}` is referenced {count} times; only the first \
                 referencing element converts cleanly",
                candidate.clip_id
            ));
        }
    }

    let scratch = tempfile::Builder::new()
        .prefix("clipbake-")
        .tempdir()
        .context("creating scratch directory")?;
    debug!("convert"; "scratch directory {}", scratch.path().display());

    let container = doc.create_element("g");
    let staging_id = doc.allocate_unique_id("export-stage");
    doc.set_attr(container, "id", staging_id.as_str());
    let root = doc.root_element().context("document has no root element")?;
    doc.append_child(root, container)?;

    let ctx = RunContext {
        rasterizer,
        options,
        scratch: scratch.path(),
        container,
        offset,
    };

    for (index, candidate) in candidates.iter().enumerate() {
        log!(
            "convert";
            "processing image {} of {}: {}",
            index + 1,
            report.total,
            doc.describe(candidate.image)
        );
        match element::convert_element(doc, candidate.image, &candidate.clip_id, &ctx, &mut warnings)
        {
            Ok(outcome) => {
                let verb = if outcome.embedded {
                    "embedded"
                } else {
                    "exported"
                };
                log!(
                    "convert";
                    "{}: {verb} {} bytes at {:.0} dpi",
                    outcome.element,
                    outcome.payload_size,
                    outcome.export_dpi
                );
                report.outcomes.push(outcome);
            }
            Err(err) => {
                log!("error"; "{err}");
                report.skipped.push(err.to_string());
            }
        }
    }

    doc.detach(container);

    if options.keep_working_files {
        let kept = scratch.keep();
        log!("convert"; "keeping working files in {}", kept.display());
    }

    report.warnings = warnings;
    Ok(report)
}

//! Per-element conversion: duplicate, isolate, export, embed, replace.

use super::ConvertOptions;
use super::compose;
use super::error::ConvertError;
use super::optimize::recompress_png;
use super::params::{derive_export_dpi, derive_scale};
use super::rasterize::Rasterizer;
use crate::debug;
use crate::document::{Document, NodeId};
use crate::embed;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Run-wide state shared by every element conversion.
pub(super) struct RunContext<'a> {
    pub rasterizer: &'a dyn Rasterizer,
    pub options: &'a ConvertOptions,
    /// Scratch directory holding the working document and exported bitmaps.
    pub scratch: &'a Path,
    /// Staging group the duplicates are parked in during export.
    pub container: NodeId,
    /// Off-canvas translation applied to every duplicate.
    pub offset: (f64, f64),
}

/// What happened to one converted element.
#[derive(Debug)]
pub struct ElementOutcome {
    /// Description of the original element.
    pub element: String,
    /// Resolution the bitmap was rendered at.
    pub export_dpi: f64,
    /// Whether the bitmap went in as a data URI. `false` means the exported
    /// content had no recognizable type and the replacement links a plain
    /// file name instead.
    pub embedded: bool,
    /// Size of the embedded payload in bytes.
    pub payload_size: usize,
}

/// Convert a single clip-masked image in place.
///
/// On any error the document is left exactly as it was for this element;
/// the staged duplicate never survives either path.
pub(super) fn convert_element(
    doc: &mut Document,
    image: NodeId,
    clip_id: &str,
    ctx: &RunContext<'_>,
    warnings: &mut Vec<String>,
) -> Result<ElementOutcome, ConvertError> {
    let element = doc.describe(image);

    let clip = doc
        .find_by_id(clip_id)
        .ok_or_else(|| ConvertError::MissingClip {
            element: element.clone(),
            clip: clip_id.to_string(),
        })?;
    let shape = doc
        .first_element_child(clip)
        .ok_or_else(|| degenerate(&element, format!("clip `{clip_id}` contains no shape")))?;

    // Parent-frame boxes: the replacement lands under the same parent, and
    // the staged duplicate renders with its own transform only.
    let image_box = doc
        .local_bounding_box(image, warnings)
        .ok_or_else(|| degenerate(&element, "image bounding box is undefined".into()))?;
    let clip_box = doc
        .local_bounding_box(shape, warnings)
        .ok_or_else(|| degenerate(&element, "clip bounding box is undefined".into()))?;

    let scale = derive_scale(&image_box, &clip_box)
        .ok_or_else(|| degenerate(&element, "image bounding box has zero width".into()))?;
    let export_dpi = derive_export_dpi(ctx.options.target_dpi, scale);
    debug!("convert"; "{element}: crop scale {scale:.4}, export dpi {export_dpi:.1}");

    // Duplicate into the staging group and shift the copy off-canvas, so
    // the rasterizer sees it clear of every other element. The clip is
    // still in the document at this point and applies to the copy too.
    let clone = doc.clone_subtree(image);
    doc.append_child(ctx.container, clone)
        .map_err(|cause| ConvertError::Document {
            element: element.clone(),
            cause,
        })?;
    let transform = doc
        .parsed_transform(image, warnings)
        .with_translation(ctx.offset.0, ctx.offset.1);
    doc.set_attr(clone, "transform", transform.to_svg());
    let clone_id = doc.allocate_unique_id(doc.attr(image, "id").unwrap_or("image"));
    doc.set_attr(clone, "id", clone_id.as_str());
    debug!("convert"; "{element}: staged duplicate `{clone_id}` at offset ({}, {})",
        ctx.offset.0, ctx.offset.1);

    // The duplicate comes back out of the tree on the failure path too.
    let exported = export_isolated(doc, &clone_id, export_dpi, ctx, warnings);
    doc.detach(clone);
    let payload = exported.map_err(|cause| ConvertError::Export {
        element: element.clone(),
        cause,
    })?;

    let filename = format!("{clone_id}.png");
    let prefix = &payload[..payload.len().min(embed::PREFIX_LEN)];
    let (href, embedded) = match embed::classify(prefix, &filename) {
        Some(media) => (embed::data_uri(media, &payload), true),
        None => {
            warnings.push(format!(
                "{element}: exported content is not any of image/png, image/jpeg, \
                 image/bmp, image/gif, image/tiff or image/x-icon; leaving \
                 `{filename}` as an unresolved link"
            ));
            (filename, false)
        }
    };

    let href_attr = compose::href_attr_name(doc);
    let replacement = compose::build_replacement(doc, &image_box, href_attr, &href);
    compose::commit(doc, image, clip, replacement).map_err(|cause| ConvertError::Document {
        element: element.clone(),
        cause,
    })?;

    Ok(ElementOutcome {
        element,
        export_dpi,
        embedded,
        payload_size: payload.len(),
    })
}

fn degenerate(element: &str, reason: String) -> ConvertError {
    ConvertError::DegenerateGeometry {
        element: element.to_string(),
        reason,
    }
}

/// Serialize the staged document, run the rasterizer on it, and read the
/// bitmap back. The exported file is deleted on both paths; the working
/// document stays in the scratch directory so `--keep` can preserve it.
fn export_isolated(
    doc: &Document,
    clone_id: &str,
    dpi: f64,
    ctx: &RunContext<'_>,
    warnings: &mut Vec<String>,
) -> Result<Vec<u8>> {
    let working = ctx.scratch.join("working.svg");
    let content = doc.to_bytes()?;
    fs::write(&working, content)
        .with_context(|| format!("writing working copy {}", working.display()))?;

    let output = ctx.scratch.join(format!("{clone_id}.png"));
    let result = ctx
        .rasterizer
        .export(&working, clone_id, dpi, &output)
        .and_then(|()| {
            fs::read(&output).with_context(|| format!("reading exported {}", output.display()))
        });
    let _ = fs::remove_file(&output);
    let mut payload = result?;

    if ctx.options.optimize {
        match recompress_png(&payload) {
            Ok(recompressed) => payload = recompressed,
            Err(err) => warnings.push(format!(
                "PNG optimization failed, keeping the exported bytes: {err:#}"
            )),
        }
    }
    Ok(payload)
}

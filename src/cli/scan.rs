//! The `scan` subcommand: read-only JSON inspector for clip-masked images.

use crate::cli::args::ScanArgs;
use crate::convert::{self, derive_scale};
use crate::document::Document;
use crate::embed;
use crate::geom::BoundingBox;
use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};
use std::fs;

pub fn run_scan(args: &ScanArgs) -> Result<()> {
    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let doc = Document::parse(&content)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let output = scan_entries(&doc);
    let formatted = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{formatted}");
    Ok(())
}

/// One JSON object per candidate: the element, its clip, both boxes, and
/// the derived crop scale. Unmeasurable geometry comes out as `null`.
fn scan_entries(doc: &Document) -> JsonValue {
    let mut warnings = Vec::new();
    let entries: Vec<JsonValue> = convert::find_candidates(doc)
        .iter()
        .map(|candidate| {
            let mut obj = Map::new();
            obj.insert(
                "element".to_string(),
                JsonValue::String(doc.describe(candidate.image)),
            );
            obj.insert(
                "clip".to_string(),
                JsonValue::String(candidate.clip_id.clone()),
            );

            // Same parent-frame boxes the converter derives its scale from.
            let image_box = doc.local_bounding_box(candidate.image, &mut warnings);
            let clip_box = doc
                .find_by_id(&candidate.clip_id)
                .and_then(|clip| doc.first_element_child(clip))
                .and_then(|shape| doc.local_bounding_box(shape, &mut warnings));
            let scale = match (&image_box, &clip_box) {
                (Some(image), Some(clip)) => derive_scale(image, clip),
                _ => None,
            };

            obj.insert("image_box".to_string(), box_json(image_box.as_ref()));
            obj.insert("clip_box".to_string(), box_json(clip_box.as_ref()));
            obj.insert(
                "scale".to_string(),
                scale.map_or(JsonValue::Null, JsonValue::from),
            );

            let embedded = doc
                .attr(candidate.image, "xlink:href")
                .or_else(|| doc.attr(candidate.image, "href"))
                .is_some_and(embed::is_data_uri);
            obj.insert("embedded_source".to_string(), JsonValue::Bool(embedded));
            JsonValue::Object(obj)
        })
        .collect();
    JsonValue::Array(entries)
}

fn box_json(bb: Option<&BoundingBox>) -> JsonValue {
    let Some(bb) = bb else {
        return JsonValue::Null;
    };
    let mut obj = Map::new();
    obj.insert("x".to_string(), JsonValue::from(bb.min_x));
    obj.insert("y".to_string(), JsonValue::from(bb.min_y));
    obj.insert("width".to_string(), JsonValue::from(bb.width()));
    obj.insert("height".to_string(), JsonValue::from(bb.height()));
    JsonValue::Object(obj)
}

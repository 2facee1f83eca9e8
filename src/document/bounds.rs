//! Bounding boxes over document subtrees.
//!
//! Extents are measured in user units in one of two frames: document
//! space (every ancestor `transform` composed in, so boxes from different
//! branches of the tree fold together) or the parent frame (the node's
//! own `transform` only, the space its siblings live in). Rotated or
//! skewed shapes yield the hull of their mapped corner or control points,
//! which can overestimate but never underestimates.

use super::{Document, NodeId, NodeKind};
use crate::geom::path::control_points;
use crate::geom::{BoundingBox, Transform};

/// Elements that never contribute rendered geometry. Their subtrees are
/// skipped without a warning.
const NON_RENDERING: &[&str] = &[
    "clipPath",
    "defs",
    "desc",
    "filter",
    "linearGradient",
    "marker",
    "mask",
    "metadata",
    "pattern",
    "radialGradient",
    "script",
    "style",
    "symbol",
    "title",
];

/// Renderable elements this scanner cannot measure.
const UNMEASURED: &[&str] = &["foreignObject", "text", "textPath", "tspan", "use"];

impl Document {
    /// Bounding box of `node` in document space, ancestor transforms
    /// included. `None` when the subtree holds no measurable geometry.
    pub fn bounding_box(&self, node: NodeId, warnings: &mut Vec<String>) -> Option<BoundingBox> {
        let mut ancestors = Vec::new();
        let mut cur = node;
        while let Some(parent) = self.parent(cur) {
            ancestors.push(parent);
            cur = parent;
        }
        let mut ctm = Transform::IDENTITY;
        for &ancestor in ancestors.iter().rev() {
            if matches!(self.kind(ancestor), NodeKind::Element { .. }) {
                ctm = ctm * self.parsed_transform(ancestor, warnings);
            }
        }

        let mut bb = BoundingBox::EMPTY;
        self.accumulate_bounds(node, &ctm, &mut bb, warnings);
        bb.is_valid().then_some(bb)
    }

    /// Bounding box of `node` in its parent's coordinate system: the node's
    /// own `transform` applies, ancestor transforms do not. Anything placed
    /// next to the node with these coordinates renders at the same spot.
    pub fn local_bounding_box(
        &self,
        node: NodeId,
        warnings: &mut Vec<String>,
    ) -> Option<BoundingBox> {
        let mut bb = BoundingBox::EMPTY;
        self.accumulate_bounds(node, &Transform::IDENTITY, &mut bb, warnings);
        bb.is_valid().then_some(bb)
    }

    /// Fold the bounding boxes of `elements` into their union. Elements
    /// without a measurable box are skipped with a warning; `None` means no
    /// element yielded one.
    pub fn union_bounding_box(
        &self,
        elements: &[NodeId],
        warnings: &mut Vec<String>,
    ) -> Option<BoundingBox> {
        let mut union = BoundingBox::EMPTY;
        for &node in elements {
            match self.bounding_box(node, warnings) {
                Some(bb) => union.union(&bb),
                None => warnings.push(format!(
                    "{}: bounding box is undefined, element skipped",
                    self.describe(node)
                )),
            }
        }
        union.is_valid().then_some(union)
    }

    /// Union box of all rendered content directly under the root element.
    pub fn canvas_bounds(&self, warnings: &mut Vec<String>) -> Option<BoundingBox> {
        let root = self.root_element()?;
        let content: Vec<NodeId> = self
            .children(root)
            .iter()
            .copied()
            .filter(|&child| {
                self.local_name(child)
                    .is_some_and(|name| !NON_RENDERING.contains(&name))
            })
            .collect();
        self.union_bounding_box(&content, warnings)
    }

    fn accumulate_bounds(
        &self,
        node: NodeId,
        parent_ctm: &Transform,
        bb: &mut BoundingBox,
        warnings: &mut Vec<String>,
    ) {
        let Some(local) = self.local_name(node) else {
            return;
        };
        if NON_RENDERING.contains(&local) {
            return;
        }
        let ctm = *parent_ctm * self.parsed_transform(node, warnings);

        match local {
            "g" | "a" | "svg" | "switch" => {
                for &child in self.children(node) {
                    self.accumulate_bounds(child, &ctm, bb, warnings);
                }
            }
            "rect" | "image" => {
                let geom = (
                    self.length(node, "x", 0.0),
                    self.length(node, "y", 0.0),
                    self.length(node, "width", 0.0),
                    self.length(node, "height", 0.0),
                );
                if let (Some(x), Some(y), Some(w), Some(h)) = geom {
                    if w > 0.0 && h > 0.0 {
                        include_quad(bb, &ctm, x, y, w, h);
                    }
                } else {
                    self.warn_unparsed(node, warnings);
                }
            }
            "circle" => {
                let geom = (
                    self.length(node, "cx", 0.0),
                    self.length(node, "cy", 0.0),
                    self.length(node, "r", 0.0),
                );
                if let (Some(cx), Some(cy), Some(r)) = geom {
                    if r > 0.0 {
                        include_quad(bb, &ctm, cx - r, cy - r, 2.0 * r, 2.0 * r);
                    }
                } else {
                    self.warn_unparsed(node, warnings);
                }
            }
            "ellipse" => {
                let geom = (
                    self.length(node, "cx", 0.0),
                    self.length(node, "cy", 0.0),
                    self.length(node, "rx", 0.0),
                    self.length(node, "ry", 0.0),
                );
                if let (Some(cx), Some(cy), Some(rx), Some(ry)) = geom {
                    if rx > 0.0 && ry > 0.0 {
                        include_quad(bb, &ctm, cx - rx, cy - ry, 2.0 * rx, 2.0 * ry);
                    }
                } else {
                    self.warn_unparsed(node, warnings);
                }
            }
            "line" => {
                let geom = (
                    self.length(node, "x1", 0.0),
                    self.length(node, "y1", 0.0),
                    self.length(node, "x2", 0.0),
                    self.length(node, "y2", 0.0),
                );
                if let (Some(x1), Some(y1), Some(x2), Some(y2)) = geom {
                    include_point(bb, &ctm, x1, y1);
                    include_point(bb, &ctm, x2, y2);
                } else {
                    self.warn_unparsed(node, warnings);
                }
            }
            "polyline" | "polygon" => {
                let raw = self.attr(node, "points").unwrap_or_default();
                match parse_number_list(raw) {
                    Some(values) => {
                        for pair in values.chunks_exact(2) {
                            include_point(bb, &ctm, pair[0], pair[1]);
                        }
                    }
                    None => self.warn_unparsed(node, warnings),
                }
            }
            "path" => {
                let Some(d) = self.attr(node, "d") else {
                    return;
                };
                match control_points(d) {
                    Ok(points) => {
                        for (x, y) in points {
                            include_point(bb, &ctm, x, y);
                        }
                    }
                    Err(err) => warnings.push(format!(
                        "{}: path data ignored: {err}",
                        self.describe(node)
                    )),
                }
            }
            other if UNMEASURED.contains(&other) => {
                warnings.push(format!(
                    "{}: cannot measure this element kind",
                    self.describe(node)
                ));
            }
            _ => {}
        }
    }

    /// Read a presentation length attribute in user units. Absent means
    /// `default`; an unresolvable value means `None`.
    fn length(&self, node: NodeId, name: &str, default: f64) -> Option<f64> {
        match self.attr(node, name) {
            None => Some(default),
            Some(raw) => parse_length(raw),
        }
    }

    fn warn_unparsed(&self, node: NodeId, warnings: &mut Vec<String>) {
        warnings.push(format!(
            "{}: geometry attribute not understood, element ignored",
            self.describe(node)
        ));
    }
}

/// Include the four mapped corners of an axis-aligned quad.
fn include_quad(bb: &mut BoundingBox, ctm: &Transform, x: f64, y: f64, w: f64, h: f64) {
    include_point(bb, ctm, x, y);
    include_point(bb, ctm, x + w, y);
    include_point(bb, ctm, x, y + h);
    include_point(bb, ctm, x + w, y + h);
}

fn include_point(bb: &mut BoundingBox, ctm: &Transform, x: f64, y: f64) {
    let (px, py) = ctm.apply(x, y);
    bb.include_point(px, py);
}

/// Parse an SVG length into user units at the 96 dpi basis. Percentages and
/// font-relative units have no absolute value here and yield `None`.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number_len = value
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%')
        .len();
    let (number, unit) = value.split_at(number_len);
    let n: f64 = number.trim().parse().ok()?;
    let per_unit = match unit {
        "" | "px" => 1.0,
        "in" => 96.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "mm" => 96.0 / 25.4,
        "cm" => 96.0 / 2.54,
        "Q" | "q" => 96.0 / 101.6,
        _ => return None,
    };
    Some(n * per_unit)
}

/// Split a whitespace/comma separated list of numbers, as used by the
/// `points` attribute.
fn parse_number_list(raw: &str) -> Option<Vec<f64>> {
    raw.split([' ', '\t', '\n', '\r', ','])
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok())
        .collect()
}

//! Replacement element construction and the final document substitution.

use crate::document::{Document, NodeId};
use crate::geom::BoundingBox;
use anyhow::Result;

/// Build the replacement raster element. Position and size come from the
/// original element's box in its parent's frame, so under that same parent
/// the bitmap lands exactly where the clipped artwork used to render. The
/// node is left detached.
pub fn build_replacement(
    doc: &mut Document,
    original_box: &BoundingBox,
    href_attr: &str,
    href: &str,
) -> NodeId {
    let node = doc.create_element("image");
    doc.set_attr(node, "x", original_box.min_x.to_string());
    doc.set_attr(node, "y", original_box.min_y.to_string());
    doc.set_attr(node, "width", original_box.width().to_string());
    doc.set_attr(node, "height", original_box.height().to_string());
    doc.set_attr(node, "style", "image-rendering:optimizeSpeed;");
    // The bitmap is pre-cropped; it has to stretch to the box as-is.
    doc.set_attr(node, "preserveAspectRatio", "none");
    doc.set_attr(node, href_attr, href);
    node
}

/// Swap the original for its replacement and drop the clip definition. The
/// replacement is attached before anything is removed, so the document never
/// passes through a state where neither node is present.
pub fn commit(doc: &mut Document, original: NodeId, clip: NodeId, replacement: NodeId) -> Result<()> {
    doc.insert_after(original, replacement)?;
    doc.detach(original);
    doc.detach(clip);
    Ok(())
}

/// Attribute name for the image link: `xlink:href` when the root element
/// declares the xlink namespace, plain `href` otherwise.
pub fn href_attr_name(doc: &Document) -> &'static str {
    let Some(root) = doc.root_element() else {
        return "href";
    };
    if doc.attr(root, "xmlns:xlink").is_some() {
        "xlink:href"
    } else {
        "href"
    }
}

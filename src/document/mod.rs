//! Owned SVG document tree.
//!
//! The document is an arena of nodes addressed by [`NodeId`] handles; all
//! mutation goes through explicit methods, so node ownership is unambiguous
//! at every step. Node 0 is a synthetic document node whose children are the
//! prolog (comments, doctype) and the root element.
//!
//! Parsing and serialization live in [`parse`] and [`write`]; geometry
//! queries in [`bounds`].

mod bounds;
mod parse;
mod write;

use crate::geom::Transform;
use anyhow::{Result, bail};
use rustc_hash::FxHashMap;

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single element attribute. Order within the element is preserved.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Synthetic document root (node 0 only).
    Document,
    Element {
        name: String,
        attrs: Vec<Attribute>,
    },
    /// Character data, stored unescaped.
    Text(String),
    /// Comment body, stored raw.
    Comment(String),
    CData(String),
    /// Processing instruction, stored raw.
    ProcInst(String),
    /// Doctype body, stored raw.
    Doctype(String),
    /// Any other construct (for example an entity reference), stored as the
    /// exact markup text and written back verbatim.
    Raw(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// XML declaration captured from the prolog.
#[derive(Debug, Clone)]
pub struct XmlDecl {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// An owned XML document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    decl: Option<XmlDecl>,
}

impl Document {
    /// The synthetic document node.
    pub const DOCUMENT: NodeId = NodeId(0);

    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            decl: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Qualified element name, or `None` for non-element nodes.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Element name with any namespace prefix stripped.
    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        self.name(node)
            .map(|n| n.rsplit_once(':').map_or(n, |(_, local)| local))
    }

    pub fn is_element(&self, node: NodeId, local: &str) -> bool {
        self.local_name(node) == Some(local)
    }

    /// First element child of the document node.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(Self::DOCUMENT)
            .iter()
            .copied()
            .find(|&n| matches!(self.kind(n), NodeKind::Element { .. }))
    }

    pub fn decl(&self) -> Option<&XmlDecl> {
        self.decl.as_ref()
    }

    pub(crate) fn set_decl(&mut self, decl: XmlDecl) {
        self.decl = Some(decl);
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing an existing one of the same name in place.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node.0].kind {
            let value = value.into();
            match attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute {
                    name: name.to_string(),
                    value,
                }),
            }
        }
    }

    /// The node's own `transform` attribute, parsed. Absent → identity,
    /// malformed → identity plus a recorded warning.
    pub fn parsed_transform(&self, node: NodeId, warnings: &mut Vec<String>) -> Transform {
        match self.attr(node, "transform") {
            None => Transform::IDENTITY,
            Some(expr) => Transform::parse(expr).unwrap_or_else(|err| {
                warnings.push(format!(
                    "{}: falling back to identity transform: {err}",
                    self.describe(node)
                ));
                Transform::IDENTITY
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Construction and mutation
    // ------------------------------------------------------------------------

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create(NodeKind::Element {
            name: name.to_string(),
            attrs: Vec::new(),
        })
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        if self.nodes[node.0].parent.is_some() {
            bail!("node is already attached");
        }
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.push(node);
        Ok(())
    }

    /// Attach a detached node as the next sibling of `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        if self.nodes[node.0].parent.is_some() {
            bail!("node is already attached");
        }
        let Some(parent) = self.parent(anchor) else {
            bail!("anchor node is not attached");
        };
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == anchor)
            .map_or(self.nodes[parent.0].children.len(), |p| p + 1);
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, node);
        Ok(())
    }

    /// Detach a node (and its subtree) from its parent. The nodes stay in
    /// the arena but are no longer reachable from the document node.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Deep-copy a subtree. The copy is detached.
    pub fn clone_subtree(&mut self, node: NodeId) -> NodeId {
        let kind = self.nodes[node.0].kind.clone();
        let copy = self.create(kind);
        for child in self.nodes[node.0].children.clone() {
            let child_copy = self.clone_subtree(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Pre-order traversal of the subtree rooted at `from`, `from` included.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// First element in the document with the given `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(Self::DOCUMENT)
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    /// First element descendant of `from`, excluding `from` itself.
    pub fn first_element_child(&self, from: NodeId) -> Option<NodeId> {
        self.descendants(from)
            .into_iter()
            .skip(1)
            .find(|&n| matches!(self.kind(n), NodeKind::Element { .. }))
    }

    /// Allocate an element id that does not occur in the document yet,
    /// derived from `seed`.
    pub fn allocate_unique_id(&self, seed: &str) -> String {
        let seed = if seed.is_empty() { "node" } else { seed };
        let mut n = 1usize;
        loop {
            let candidate = format!("{seed}-{n}");
            if self.find_by_id(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Count `url(#...)` and same-document `href="#..."` references per
    /// target id across all elements.
    pub fn reference_counts(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for node in self.descendants(Self::DOCUMENT) {
            let NodeKind::Element { attrs, .. } = self.kind(node) else {
                continue;
            };
            for attr in attrs {
                if let Some(target) = url_reference(&attr.value) {
                    *counts.entry(target.to_string()).or_insert(0) += 1;
                } else if attr.name.ends_with("href")
                    && let Some(target) = attr.value.strip_prefix('#')
                {
                    *counts.entry(target.to_string()).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Short human-readable node description for diagnostics.
    pub fn describe(&self, node: NodeId) -> String {
        match self.kind(node) {
            NodeKind::Element { name, .. } => match self.attr(node, "id") {
                Some(id) => format!("<{name} id=\"{id}\">"),
                None => format!("<{name}>"),
            },
            other => format!("{other:?}"),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the target id from a `url(#id)` functional reference, tolerating
/// optional quotes. Returns `None` for anything else.
pub fn url_reference(value: &str) -> Option<&str> {
    let rest = value.trim().strip_prefix("url(")?;
    let rest = rest.trim_start().trim_start_matches(['\'', '"']);
    let rest = rest.strip_prefix('#')?;
    let end = rest.find([')', '\'', '"'])?;
    let target = rest[..end].trim();
    (!target.is_empty()).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <defs id="defs1">
    <clipPath id="clip1"><rect id="cliprect" x="0" y="0" width="50" height="100"/></clipPath>
  </defs>
  <image id="img1" x="0" y="0" width="100" height="100" clip-path="url(#clip1)"/>
</svg>"#;

    #[test]
    fn test_find_by_id_and_local_names() {
        let doc = Document::parse(SAMPLE).unwrap();
        let image = doc.find_by_id("img1").unwrap();
        assert!(doc.is_element(image, "image"));
        assert_eq!(doc.attr(image, "clip-path"), Some("url(#clip1)"));
        let clip = doc.find_by_id("clip1").unwrap();
        assert!(doc.is_element(clip, "clipPath"));
        assert!(doc.find_by_id("nope").is_none());
    }

    #[test]
    fn test_first_element_child_skips_text() {
        let doc = Document::parse(SAMPLE).unwrap();
        let clip = doc.find_by_id("clip1").unwrap();
        let shape = doc.first_element_child(clip).unwrap();
        assert!(doc.is_element(shape, "rect"));
        assert_eq!(doc.attr(shape, "id"), Some("cliprect"));
    }

    #[test]
    fn test_clone_subtree_is_detached_deep_copy() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let defs = doc.find_by_id("defs1").unwrap();
        let copy = doc.clone_subtree(defs);
        assert!(doc.parent(copy).is_none());
        // Copy keeps structure but the original stays in place
        let clip_copy = doc.first_element_child(copy).unwrap();
        assert!(doc.is_element(clip_copy, "clipPath"));
        assert!(doc.find_by_id("defs1").is_some());
    }

    #[test]
    fn test_insert_after_orders_siblings() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let image = doc.find_by_id("img1").unwrap();
        let marker = doc.create_element("rect");
        doc.set_attr(marker, "id", "after-img");
        doc.insert_after(image, marker).unwrap();

        let parent = doc.parent(image).unwrap();
        let children: Vec<_> = doc
            .children(parent)
            .iter()
            .filter(|&&c| matches!(doc.kind(c), NodeKind::Element { .. }))
            .copied()
            .collect();
        let img_pos = children.iter().position(|&c| c == image).unwrap();
        assert_eq!(children[img_pos + 1], marker);
    }

    #[test]
    fn test_detach_removes_subtree_from_reach() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let clip = doc.find_by_id("clip1").unwrap();
        doc.detach(clip);
        assert!(doc.find_by_id("clip1").is_none());
        assert!(doc.find_by_id("cliprect").is_none());
        assert!(doc.parent(clip).is_none());
    }

    #[test]
    fn test_allocate_unique_id_avoids_collisions() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let id = doc.allocate_unique_id("img1");
        assert_eq!(id, "img1-1");
        let root = doc.root_element().unwrap();
        let extra = doc.create_element("g");
        doc.set_attr(extra, "id", "img1-1");
        doc.append_child(root, extra).unwrap();
        assert_eq!(doc.allocate_unique_id("img1"), "img1-2");
        assert_eq!(doc.allocate_unique_id(""), "node-1");
    }

    #[test]
    fn test_reference_counts_sees_url_refs() {
        let doc = Document::parse(SAMPLE).unwrap();
        let counts = doc.reference_counts();
        assert_eq!(counts.get("clip1"), Some(&1));
    }

    #[test]
    fn test_url_reference_forms() {
        assert_eq!(url_reference("url(#a)"), Some("a"));
        assert_eq!(url_reference("url('#a-b')"), Some("a-b"));
        assert_eq!(url_reference("url(\"#x\")"), Some("x"));
        assert_eq!(url_reference("url(#a) fill"), Some("a"));
        assert_eq!(url_reference("none"), None);
        assert_eq!(url_reference("url(image.png)"), None);
        assert_eq!(url_reference("url(#)"), None);
    }

    #[test]
    fn test_parsed_transform_fallback() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let image = doc.find_by_id("img1").unwrap();
        let mut warnings = Vec::new();

        assert_eq!(
            doc.parsed_transform(image, &mut warnings),
            Transform::IDENTITY
        );
        assert!(warnings.is_empty());

        doc.set_attr(image, "transform", "translate(3 4)");
        let t = doc.parsed_transform(image, &mut warnings);
        assert_eq!(t.e, 3.0);
        assert!(warnings.is_empty());

        doc.set_attr(image, "transform", "wobble(1)");
        assert_eq!(
            doc.parsed_transform(image, &mut warnings),
            Transform::IDENTITY
        );
        assert_eq!(warnings.len(), 1);
    }
}

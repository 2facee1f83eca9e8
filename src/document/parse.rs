//! XML to document-tree parsing.

use super::{Attribute, Document, NodeId, NodeKind, XmlDecl};
use anyhow::{Result, bail};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

impl Document {
    /// Parse an XML document, preserving prolog, comments, whitespace text
    /// nodes, and attribute order.
    pub fn parse(content: &str) -> Result<Self> {
        let mut doc = Self::new();
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<NodeId> = vec![Self::DOCUMENT];

        loop {
            match reader.read_event() {
                Ok(Event::Start(elem)) => {
                    let node = doc.push_element(&elem)?;
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                    stack.push(node);
                }
                Ok(Event::Empty(elem)) => {
                    let node = doc.push_element(&elem)?;
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Ok(Event::End(_)) => {
                    if stack.len() <= 1 {
                        bail!(
                            "XML parse error at position {}: unmatched closing tag",
                            reader.error_position()
                        );
                    }
                    stack.pop();
                }
                Ok(Event::Text(text)) => {
                    let text = text.decode()?.into_owned();
                    let node = doc.create(NodeKind::Text(text));
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Ok(Event::CData(data)) => {
                    let node = doc.create(NodeKind::CData(
                        String::from_utf8_lossy(&data).into_owned(),
                    ));
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Ok(Event::Comment(text)) => {
                    let node = doc.create(NodeKind::Comment(
                        String::from_utf8_lossy(&text).into_owned(),
                    ));
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Ok(Event::PI(pi)) => {
                    let node =
                        doc.create(NodeKind::ProcInst(String::from_utf8_lossy(&pi).into_owned()));
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Ok(Event::DocType(text)) => {
                    let node = doc.create(NodeKind::Doctype(
                        String::from_utf8_lossy(&text).into_owned(),
                    ));
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Ok(Event::Decl(decl)) => {
                    let version = String::from_utf8_lossy(decl.version()?.as_ref()).into_owned();
                    let encoding = match decl.encoding() {
                        Some(enc) => Some(String::from_utf8_lossy(enc?.as_ref()).into_owned()),
                        None => None,
                    };
                    let standalone = match decl.standalone() {
                        Some(sa) => Some(String::from_utf8_lossy(sa?.as_ref()).into_owned()),
                        None => None,
                    };
                    doc.set_decl(XmlDecl {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Ok(Event::Eof) => break,
                // Anything else (entity references and future event kinds)
                // is preserved as verbatim markup.
                Ok(event) => {
                    let mut raw = Writer::new(Cursor::new(Vec::new()));
                    raw.write_event(event)?;
                    let bytes = raw.into_inner().into_inner();
                    let markup = String::from_utf8_lossy(&bytes).into_owned();
                    let node = doc.create(NodeKind::Raw(markup));
                    doc.append_child(*stack.last().unwrap_or(&Self::DOCUMENT), node)?;
                }
                Err(e) => bail!(
                    "XML parse error at position {}: {:?}",
                    reader.error_position(),
                    e
                ),
            }
        }

        if doc.root_element().is_none() {
            bail!("document has no root element");
        }
        Ok(doc)
    }

    fn push_element(&mut self, elem: &BytesStart<'_>) -> Result<NodeId> {
        let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in elem.attributes() {
            let attr = attr?;
            attrs.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: attr.unescape_value()?.into_owned(),
            });
        }
        Ok(self.create(NodeKind::Element { name, attrs }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_structure() {
        let doc = Document::parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!-- banner -->\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\">\n  <g id=\"layer\">\n    \
             <rect id=\"r\" width=\"5\" height=\"5\"/>\n  </g>\n</svg>",
        )
        .unwrap();

        let decl = doc.decl().unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));

        let root = doc.root_element().unwrap();
        assert!(doc.is_element(root, "svg"));
        assert!(doc.find_by_id("layer").is_some());
        assert!(doc.find_by_id("r").is_some());

        // Comment before the root element is kept in the prolog
        let has_comment = doc
            .children(Document::DOCUMENT)
            .iter()
            .any(|&n| matches!(doc.kind(n), NodeKind::Comment(c) if c.contains("banner")));
        assert!(has_comment);
    }

    #[test]
    fn test_parse_unescapes_attributes() {
        let doc =
            Document::parse("<svg><text id=\"t\" data-x=\"a &amp; b\">x &lt; y</text></svg>")
                .unwrap();
        let text = doc.find_by_id("t").unwrap();
        assert_eq!(doc.attr(text, "data-x"), Some("a & b"));
        assert!(!doc.children(text).is_empty());
    }

    #[test]
    fn test_parse_splits_text_around_entity_references() {
        let doc = Document::parse("<svg><desc id=\"d\">Tom &amp; Jerry</desc></svg>").unwrap();
        let desc = doc.find_by_id("d").unwrap();
        let children = doc.children(desc).to_vec();
        assert_eq!(children.len(), 3);
        assert!(matches!(doc.kind(children[0]), NodeKind::Text(t) if t == "Tom "));
        assert!(matches!(doc.kind(children[1]), NodeKind::Raw(r) if r == "&amp;"));
        assert!(matches!(doc.kind(children[2]), NodeKind::Text(t) if t == " Jerry"));

        // The reference survives serialization verbatim
        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(out.contains("Tom &amp; Jerry"), "{out}");
    }

    #[test]
    fn test_parse_rejects_markup_errors() {
        assert!(Document::parse("<svg><g></svg>").is_err());
        assert!(Document::parse("no markup at all").is_err());
        assert!(Document::parse("").is_err());
    }
}

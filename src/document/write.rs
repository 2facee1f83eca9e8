//! Document-tree to XML serialization.

use super::{Document, NodeId, NodeKind};
use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use std::io::Cursor;

impl Document {
    /// Serialize the whole document. Elements without children come out
    /// self-closing; text is re-escaped on the way out.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        if let Some(decl) = self.decl() {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }
        for &child in self.children(Self::DOCUMENT) {
            self.write_node(&mut writer, child)?;
        }

        Ok(writer.into_inner().into_inner())
    }

    fn write_node(&self, writer: &mut Writer<Cursor<Vec<u8>>>, node: NodeId) -> Result<()> {
        match self.kind(node) {
            NodeKind::Document => {
                for &child in self.children(node) {
                    self.write_node(writer, child)?;
                }
            }
            NodeKind::Element { name, attrs } => {
                let mut start = BytesStart::new(name.as_str());
                for attr in attrs {
                    start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                }
                let children = self.children(node);
                if children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                }
            }
            NodeKind::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            NodeKind::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
            NodeKind::CData(data) => {
                writer.write_event(Event::CData(BytesCData::new(data.as_str())))?;
            }
            NodeKind::ProcInst(pi) => {
                writer.write_event(Event::PI(BytesPI::new(pi.as_str())))?;
            }
            NodeKind::Doctype(dt) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(dt.as_str())))?;
            }
            NodeKind::Raw(markup) => {
                writer.write_event(Event::Text(BytesText::from_escaped(markup.as_str())))?;
            }
        }
        Ok(())
    }
}

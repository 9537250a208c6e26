//! XML Parser
//!
//! Streams quick-xml events into a `fos_dom` document. Element names are
//! kept verbatim (no lowercasing) and carry no namespace.

use fos_dom::{Document, DomTree, NodeId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ParseError;

/// XML parser
pub struct XmlParser;

impl XmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a well-formed XML document
    pub fn parse(&self, xml: &str) -> Result<Document, ParseError> {
        self.parse_with_url(xml, "about:blank")
    }

    pub fn parse_with_url(&self, xml: &str, url: &str) -> Result<Document, ParseError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut document = Document::empty(url);
        let root = document.root();
        let tree = document.tree_mut();
        let mut stack = vec![root];
        let mut has_root_element = false;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| ParseError::Xml {
                position,
                message: e.to_string(),
            })?;

            let parent = stack.last().copied().unwrap_or(root);
            match event {
                Event::Start(e) => {
                    if parent == root && has_root_element {
                        return Err(second_root(position));
                    }
                    let id = self.element(tree, parent, &e, position)?;
                    has_root_element = true;
                    stack.push(id);
                }
                Event::Empty(e) => {
                    if parent == root && has_root_element {
                        return Err(second_root(position));
                    }
                    self.element(tree, parent, &e, position)?;
                    has_root_element = true;
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        return Err(ParseError::Xml { position, message: "unexpected end tag".into() });
                    }
                    stack.pop();
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| ParseError::Xml {
                        position,
                        message: e.to_string(),
                    })?;
                    if parent == root {
                        // Whitespace between top-level nodes is not content
                        if text.trim().is_empty() {
                            continue;
                        }
                        return Err(text_outside_root(position));
                    }
                    let id = tree.create_text(&text);
                    append(tree, parent, id, position)?;
                }
                Event::CData(e) => {
                    if parent == root {
                        return Err(text_outside_root(position));
                    }
                    let id = tree.create_text(&String::from_utf8_lossy(&e));
                    append(tree, parent, id, position)?;
                }
                Event::Comment(e) => {
                    let id = tree.create_comment(&String::from_utf8_lossy(&e));
                    append(tree, parent, id, position)?;
                }
                Event::DocType(e) => {
                    let decl = String::from_utf8_lossy(&e);
                    let name = decl.split_whitespace().next().unwrap_or_default();
                    let id = tree.create_doctype(name, "", "");
                    append(tree, parent, id, position)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() > 1 {
            let open = stack.last().and_then(|&id| tree.tag_name(id)).unwrap_or_default();
            return Err(ParseError::UnclosedTag { tag: open.to_string() });
        }
        if !has_root_element {
            return Err(ParseError::Xml {
                position: reader.buffer_position() as u64,
                message: "no root element".into(),
            });
        }

        document.finalize();
        tracing::debug!("Parsed XML document with {} nodes", document.tree().len());
        Ok(document)
    }

    fn element(&self, tree: &mut DomTree, parent: NodeId, start: &BytesStart<'_>, position: u64) -> Result<NodeId, ParseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let id = tree.create_element_ns("", &name);

        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::Xml { position, message: e.to_string() })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| ParseError::Xml {
                position,
                message: e.to_string(),
            })?;
            tree.set_attribute(id, &key, &value)?;
        }

        append(tree, parent, id, position)?;
        Ok(id)
    }
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn append(tree: &mut DomTree, parent: NodeId, child: NodeId, position: u64) -> Result<(), ParseError> {
    tree.append_child(parent, child).map_err(|e| ParseError::Xml {
        position,
        message: e.to_string(),
    })?;
    Ok(())
}

fn second_root(position: u64) -> ParseError {
    ParseError::Xml { position, message: "more than one root element".into() }
}

fn text_outside_root(position: u64) -> ParseError {
    ParseError::Xml { position, message: "text outside the root element".into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xml_document() {
        let xml = r#"<?xml version="1.0"?>
<feed lang="en">
  <Entry id="1">First &amp; best</Entry>
  <Entry id="2"><![CDATA[<raw>]]></Entry>
  <empty/>
</feed>"#;
        let doc = XmlParser::new().parse(xml).unwrap();
        let tree = doc.tree();

        let feed = doc.document_element();
        assert_eq!(tree.tag_name(feed), Some("feed"));
        assert_eq!(tree.get_attribute(feed, "lang"), Some("en"));

        let entries: Vec<_> = tree.element_children(feed).collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(tree.tag_name(entries[0]), Some("Entry"));
        assert_eq!(tree.text_content(entries[0]).as_deref(), Some("First & best"));
        assert_eq!(tree.text_content(entries[1]).as_deref(), Some("<raw>"));
    }

    #[test]
    fn test_attribute_names_keep_case() {
        let doc = XmlParser::new().parse(r#"<feed><entry itemId="7"/></feed>"#).unwrap();
        let tree = doc.tree();
        let entry = tree.element_children(doc.document_element()).next().unwrap();

        assert_eq!(tree.attributes(entry), vec![("itemId", "7")]);
        assert_eq!(tree.get_attribute(entry, "itemId"), Some("7"));
        assert_eq!(tree.get_attribute(entry, "itemid"), None);
    }

    #[test]
    fn test_single_root_element() {
        let parser = XmlParser::new();
        assert!(matches!(parser.parse("<a/><b/>"), Err(ParseError::Xml { .. })));
        assert!(matches!(parser.parse("<a></a>\n<b></b>"), Err(ParseError::Xml { .. })));
        assert!(parser.parse("<!-- lead -->\n<a/>\n<!-- tail -->").is_ok());
    }

    #[test]
    fn test_text_outside_root_element() {
        let parser = XmlParser::new();
        assert!(matches!(parser.parse("<a/>trailing"), Err(ParseError::Xml { .. })));
        assert!(matches!(parser.parse("lead<a/>"), Err(ParseError::Xml { .. })));
        assert!(matches!(parser.parse("<a/><![CDATA[x]]>"), Err(ParseError::Xml { .. })));
        assert!(parser.parse("\n  <a/>\n").is_ok());
    }

    #[test]
    fn test_mismatched_end_tag() {
        assert!(XmlParser::new().parse("<a><b></a>").is_err());
    }

    #[test]
    fn test_unclosed_tag() {
        assert!(XmlParser::new().parse("<a><b>").is_err());
    }

    #[test]
    fn test_text_without_root_element() {
        assert!(XmlParser::new().parse("just text").is_err());
        assert!(XmlParser::new().parse("").is_err());
    }
}

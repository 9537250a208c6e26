//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into a `fos_dom` tree.

use fos_dom::{Document, DomTree, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        let root = document.root();
        self.convert_node(&dom.document, document.tree_mut(), root);
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse `markup` the way `innerHTML` does, with `parent` as the
    /// context element, and append the resulting nodes to `parent`.
    /// Returns the appended top-level nodes.
    ///
    /// A parent outside the HTML namespace, or the document itself, is
    /// parsed as if it were `<body>`.
    pub fn parse_fragment_into(&self, tree: &mut DomTree, parent: NodeId, markup: &str) -> Vec<NodeId> {
        let context = match tree.tag_name(parent) {
            Some(tag) if tree.is_html(parent) => LocalName::from(tag),
            _ => LocalName::from("body"),
        };
        let name = QualName::new(None, ns!(html), context);
        let dom = parse_fragment(RcDom::default(), Default::default(), name, Vec::new(), false)
            .one(markup);

        let mut appended = Vec::new();
        for root in dom.document.children.borrow().iter() {
            for child in root.children.borrow().iter() {
                if let Some(id) = self.convert_node(child, tree, parent) {
                    appended.push(id);
                }
            }
        }

        tracing::trace!(nodes = appended.len(), "Parsed HTML fragment");
        appended
    }

    /// Convert an RcDom node (and its subtree) into `tree` under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Option<NodeId> {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return None;
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                tree.create_doctype(name, public_id, system_id)
            }
            RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::ProcessingInstruction { target, contents } => {
                tree.create_processing_instruction(target, contents)
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element_ns(&name.ns, &name.local);
                for attr in attrs.borrow().iter() {
                    if let Err(err) = tree.set_attribute(id, &attr.name.local, &attr.value) {
                        tracing::warn!("Dropping attribute {}: {}", &*attr.name.local, err);
                    }
                }
                id
            }
        };

        if let Err(err) = tree.append_child(parent, id) {
            tracing::warn!("Dropping parsed node: {}", err);
            return None;
        }

        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, id);
        }
        Some(id)
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

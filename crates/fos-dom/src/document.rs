//! Document - High-level document API

use crate::{DomTree, EventHandler, EventListeners, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    listeners: EventListeners,
}

impl Document {
    /// Create a new document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let tree = &mut doc.tree;

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under a document or element never violate hierarchy rules
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        doc.finalize();
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            listeners: EventListeners::new(),
        }
    }

    /// Refresh the cached html/head/body references after the tree was built
    pub fn finalize(&mut self) {
        self.html_element = self.tree.element_children(self.tree.root())
            .next()
            .unwrap_or(NodeId::NONE);
        self.head_element = self.find_child_tag(self.html_element, "head");
        self.body_element = self.find_child_tag(self.html_element, "body");
    }

    fn find_child_tag(&self, parent: NodeId, tag: &str) -> NodeId {
        self.tree.element_children(parent)
            .find(|&id| self.tree.tag_name(id) == Some(tag))
            .unwrap_or(NodeId::NONE)
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }

        let title = self.find_child_tag(self.head_element, "title");
        self.tree.text_content(title)
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }

    /// Document root node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Get the root element (<html> for HTML documents)
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .find(|&node| self.tree.get_attribute(node, "id") == Some(id))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    pub fn add_event_listener(&mut self, node: NodeId, event_type: &str, handler: &EventHandler) -> bool {
        self.listeners.add(node, event_type, handler)
    }

    pub fn remove_event_listener(&mut self, node: NodeId, event_type: &str, handler: &EventHandler) -> bool {
        self.listeners.remove(node, event_type, handler)
    }

    /// Target followed by its ancestors, each paired with its handlers for `event_type`
    pub fn event_path(&self, target: NodeId, event_type: &str) -> Vec<(NodeId, Vec<EventHandler>)> {
        let mut path = Vec::new();
        let mut cur = Some(target);
        while let Some(node) = cur {
            path.push((node, self.listeners.get(node, event_type)));
            cur = self.tree.parent(node);
        }
        path
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree: nodes, attributes, class lists and event listeners.

mod classlist;
mod document;
mod dom_events;
mod interner;
mod node;
mod tree;

pub use classlist::{split_tokens, ClassList};
pub use document::Document;
pub use dom_events::{dispatch, DomEvent, EventHandler, EventListeners};
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Node, NodeData, NodeType, TextData};
pub use tree::{Children, Descendants, DomTree};

/// The XHTML namespace html5ever places HTML elements in
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for a missing link
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Qualified name: interned namespace URL + local name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualName {
    pub ns: InternedString,
    pub local: InternedString,
}

impl QualName {
    pub fn new(ns: InternedString, local: InternedString) -> Self {
        Self { ns, local }
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found")]
    NotFound,
    #[error("Hierarchy request error")]
    HierarchyRequest,
    #[error("Invalid node type")]
    InvalidNodeType,
    #[error("Node is not a child")]
    NotAChild,
}

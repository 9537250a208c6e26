//! Nodes
//!
//! Nodes live in the tree arena and link to each other through `NodeId`
//! (4 bytes) instead of pointers.

use crate::{ClassList, InternedString, NodeId, QualName};

/// Kind of a node, as exposed to callers that only need to branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
    ProcessingInstruction,
}

/// One arena slot. Links are `NodeId`s, `NodeId::NONE` when absent.
#[derive(Debug)]
pub struct Node {
    /// `NONE` for the root and for detached nodes
    pub parent: NodeId,
    pub first_child: NodeId,
    /// Kept so appends don't walk the sibling chain
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn element(name: QualName) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(name)))
    }

    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(TextData { content }))
    }

    pub fn comment(content: String) -> Self {
        Self::with_data(NodeData::Comment(content))
    }

    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    pub fn doctype(name: InternedString, public_id: String, system_id: String) -> Self {
        Self::with_data(NodeData::Doctype { name, public_id, system_id })
    }

    pub fn processing_instruction(target: InternedString, data: String) -> Self {
        Self::with_data(NodeData::ProcessingInstruction { target, data })
    }

    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype { .. } => NodeType::Doctype,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Contents of a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// What a node is, with the payload for that kind
#[derive(Debug)]
pub enum NodeData {
    Document,
    Doctype {
        name: InternedString,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(TextData),
    Comment(String),
    ProcessingInstruction {
        target: InternedString,
        data: String,
    },
}

/// Payload of an element node
#[derive(Debug)]
pub struct ElementData {
    /// Namespace and local name
    pub name: QualName,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Parsed `class` attribute, kept in sync by the tree
    pub classes: ClassList,
}

impl ElementData {
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            classes: ClassList::new(),
        }
    }

    /// Get an attribute value by interned local name
    pub fn get_attr(&self, name: InternedString) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name.local == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value in place
    pub fn set_attr(&mut self, name: QualName, value: String) {
        for attr in self.attrs.iter_mut() {
            if attr.name.local == name.local {
                attr.value = value;
                return;
            }
        }
        self.attrs.push(Attribute { name, value });
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: InternedString) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name.local == name)?;
        Some(self.attrs.remove(pos).value)
    }
}

#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Name/value pair on an element
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(local: u32) -> QualName {
        QualName::new(InternedString::EMPTY, InternedString(local))
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut elem = ElementData::new(name(1));
        elem.set_attr(name(7), "a".into());
        elem.set_attr(name(7), "b".into());

        assert_eq!(elem.attrs.len(), 1);
        assert_eq!(elem.get_attr(InternedString(7)), Some("b"));
    }

    #[test]
    fn test_remove_attr() {
        let mut elem = ElementData::new(name(1));
        elem.set_attr(name(7), "a".into());

        assert_eq!(elem.remove_attr(InternedString(7)), Some("a".to_string()));
        assert_eq!(elem.remove_attr(InternedString(7)), None);
    }

    #[test]
    fn test_node_type() {
        assert_eq!(Node::document().node_type(), NodeType::Document);
        assert_eq!(Node::text("x".into()).node_type(), NodeType::Text);
        assert_eq!(Node::element(name(1)).node_type(), NodeType::Element);
        assert_eq!(Node::comment("c".into()).node_type(), NodeType::Comment);
    }
}

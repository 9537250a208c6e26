//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: a removed node is only unlinked, so a `NodeId`
//! held elsewhere keeps pointing at the detached subtree.

use crate::{
    ClassList, DomError, DomResult, InternedString, Node, NodeData, NodeId, NodeType, QualName,
    StringInterner, HTML_NAMESPACE,
};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Resolve an interned string
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create an HTML element; the tag name is lowercased
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let ns = self.interner.intern(HTML_NAMESPACE);
        let local = self.interner.intern(&tag.to_ascii_lowercase());
        self.push(Node::element(QualName::new(ns, local)))
    }

    /// Create an element in an explicit namespace; the name is kept verbatim
    pub fn create_element_ns(&mut self, ns: &str, local: &str) -> NodeId {
        let ns = self.interner.intern(ns);
        let local = self.interner.intern(local);
        self.push(Node::element(QualName::new(ns, local)))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        let name = self.interner.intern(name);
        self.push(Node::doctype(name, public_id.to_string(), system_id.to_string()))
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        let target = self.interner.intern(target);
        self.push(Node::processing_instruction(target, data.to_string()))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Parent, but only when it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.get(p).is_some_and(Node::is_element))
    }

    /// True when `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = node;
        while cur.is_valid() {
            if cur == ancestor {
                return true;
            }
            cur = match self.get(cur) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let parent_type = self.node_type(parent).ok_or(DomError::NotFound)?;
        let child_type = self.node_type(child).ok_or(DomError::NotFound)?;

        if !matches!(parent_type, NodeType::Element | NodeType::Document) {
            return Err(DomError::HierarchyRequest);
        }
        if child_type == NodeType::Document || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.unlink(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;

        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let node = self.get(child).ok_or(DomError::NotFound)?;
        if node.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.unlink(child);
        Ok(child)
    }

    /// Detach a node from its parent. Returns false if it had none.
    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(_) => {
                self.unlink(id);
                true
            }
            None => false,
        }
    }

    /// Detach every child of `id`
    pub fn remove_children(&mut self, id: NodeId) {
        for child in self.child_ids(id) {
            self.unlink(child);
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Iterate direct children as (id, node)
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let next = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|(id, _)| id).collect()
    }

    /// Element children only
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .filter(|(_, n)| n.is_element())
            .map(|(id, _)| id)
    }

    /// Pre-order (document order) walk of the subtree below `id`, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants { tree: self, root: id, next }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Local tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| self.resolve(e.name.local))
    }

    /// True for elements in the HTML namespace
    pub fn is_html(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| self.resolve(e.name.ns) == HTML_NAMESPACE)
    }

    /// HTML attribute names are case-insensitive and stored lowercased
    fn attribute_key<'n>(&self, id: NodeId, name: &'n str) -> std::borrow::Cow<'n, str> {
        if self.is_html(id) && name.bytes().any(|b| b.is_ascii_uppercase()) {
            std::borrow::Cow::Owned(name.to_ascii_lowercase())
        } else {
            std::borrow::Cow::Borrowed(name)
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let key = self.attribute_key(id, name);
        let atom = self.interner.lookup(&key)?;
        self.get(id)?.as_element()?.get_attr(atom)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let key = self.attribute_key(id, name).into_owned();
        let local = self.interner.intern(&key);
        let elem = self.get_mut(id)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;

        if key == "class" {
            elem.classes = ClassList::parse(value);
        }
        elem.set_attr(QualName::new(InternedString::EMPTY, local), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let key = self.attribute_key(id, name).into_owned();
        let atom = self.interner.lookup(&key);
        let elem = self.get_mut(id)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;

        let Some(atom) = atom else {
            return Ok(None);
        };
        if key == "class" {
            elem.classes = ClassList::new();
        }
        Ok(elem.remove_attr(atom))
    }

    /// All attributes of an element in source order
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        match self.get(id).and_then(Node::as_element) {
            Some(elem) => elem.attrs.iter()
                .map(|a| (self.resolve(a.name.local), a.value.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn class_list(&self, id: NodeId) -> Option<&ClassList> {
        self.get(id)?.as_element().map(|e| &e.classes)
    }

    /// Mutate an element's class list and reflect it into the `class` attribute
    pub fn update_class_list<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut ClassList) -> R,
    ) -> DomResult<R> {
        let class_atom = self.interner.intern("class");
        let elem = self.get_mut(id)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;

        let result = f(&mut elem.classes);

        let had_attr = elem.get_attr(class_atom).is_some();
        if had_attr || !elem.classes.is_empty() {
            let value = elem.classes.to_string();
            elem.set_attr(QualName::new(InternedString::EMPTY, class_atom), value);
        }
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// DOM `textContent`: `None` for the document and doctypes
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let node = self.get(id)?;
        match &node.data {
            NodeData::Document | NodeData::Doctype { .. } => None,
            NodeData::Text(t) => Some(t.content.clone()),
            NodeData::Comment(c) => Some(c.clone()),
            NodeData::ProcessingInstruction { data, .. } => Some(data.clone()),
            NodeData::Element(_) => {
                let mut out = String::new();
                for desc in self.descendants(id) {
                    if let Some(text) = self.get(desc).and_then(Node::as_text) {
                        out.push_str(text);
                    }
                }
                Some(out)
            }
        }
    }

    /// DOM `textContent` setter. A no-op on the document node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::NotFound)?;
        match &mut node.data {
            NodeData::Document | NodeData::Doctype { .. } => Ok(()),
            NodeData::Text(t) => {
                t.content = text.to_string();
                Ok(())
            }
            NodeData::Comment(c) => {
                *c = text.to_string();
                Ok(())
            }
            NodeData::ProcessingInstruction { data, .. } => {
                *data = text.to_string();
                Ok(())
            }
            NodeData::Element(_) => {
                self.remove_children(id);
                if !text.is_empty() {
                    let child = self.create_text(text);
                    self.append_child(id, child)?;
                }
                Ok(())
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cur = current;
            loop {
                let Some(n) = self.tree.get(cur) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cur = n.parent;
                if cur == self.root || !cur.is_valid() {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("DIV");
        let a = tree.create_element("span");
        let b = tree.create_element("span");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();
        (tree, div, a, b)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, div, a, b) = sample();
        assert_eq!(tree.child_ids(div), vec![a, b]);
        assert_eq!(tree.parent(a), Some(div));
        assert_eq!(tree.tag_name(div), Some("div"));
    }

    #[test]
    fn test_descendants_document_order() {
        let (mut tree, div, a, b) = sample();
        let inner = tree.create_text("x");
        tree.append_child(a, inner).unwrap();

        let order: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![div, a, inner, b]);

        let below_a: Vec<_> = tree.descendants(a).collect();
        assert_eq!(below_a, vec![inner]);
    }

    #[test]
    fn test_remove_child_relinks_siblings() {
        let (mut tree, div, a, b) = sample();
        tree.remove_child(div, a).unwrap();

        assert_eq!(tree.child_ids(div), vec![b]);
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.remove_child(div, a), Err(DomError::NotAChild));
    }

    #[test]
    fn test_detach_without_parent_is_noop() {
        let mut tree = DomTree::new();
        let orphan = tree.create_element("p");
        assert!(!tree.detach(orphan));
    }

    #[test]
    fn test_append_moves_node() {
        let (mut tree, div, a, b) = sample();
        tree.append_child(b, a).unwrap();
        assert_eq!(tree.child_ids(div), vec![b]);
        assert_eq!(tree.child_ids(b), vec![a]);
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut tree, div, a, _) = sample();
        assert_eq!(tree.append_child(a, div), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(a, a), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_attributes_case_insensitive_for_html() {
        let (mut tree, div, _, _) = sample();
        tree.set_attribute(div, "Data-X", "1").unwrap();
        assert_eq!(tree.get_attribute(div, "data-x"), Some("1"));
        assert_eq!(tree.get_attribute(div, "DATA-X"), Some("1"));
    }

    #[test]
    fn test_attributes_keep_case_outside_html() {
        let mut tree = DomTree::new();
        let entry = tree.create_element_ns("", "entry");
        tree.set_attribute(entry, "itemId", "7").unwrap();

        assert!(!tree.is_html(entry));
        assert_eq!(tree.attributes(entry), vec![("itemId", "7")]);
        assert_eq!(tree.get_attribute(entry, "itemid"), None);
    }

    #[test]
    fn test_class_attribute_sync() {
        let (mut tree, div, _, _) = sample();
        tree.set_attribute(div, "class", "a b").unwrap();
        assert!(tree.class_list(div).unwrap().contains("b"));

        tree.update_class_list(div, |c| c.add(&["c"])).unwrap();
        assert_eq!(tree.get_attribute(div, "class"), Some("a b c"));

        tree.update_class_list(div, |c| c.remove(&["a", "b", "c"])).unwrap();
        assert_eq!(tree.get_attribute(div, "class"), Some(""));
    }

    #[test]
    fn test_class_list_noop_does_not_create_attribute() {
        let (mut tree, _, a, _) = sample();
        tree.update_class_list(a, |c| c.remove(&["x"])).unwrap();
        assert_eq!(tree.get_attribute(a, "class"), None);
    }

    #[test]
    fn test_text_content() {
        let (mut tree, div, a, b) = sample();
        let t1 = tree.create_text("Hello ");
        let t2 = tree.create_text("World");
        tree.append_child(a, t1).unwrap();
        tree.append_child(b, t2).unwrap();

        assert_eq!(tree.text_content(div).as_deref(), Some("Hello World"));
        assert_eq!(tree.text_content(tree.root()), None);

        tree.set_text_content(div, "<b>").unwrap();
        assert_eq!(tree.child_ids(div).len(), 1);
        assert_eq!(tree.text_content(div).as_deref(), Some("<b>"));
    }
}

//! Selection
//!
//! A non-empty, ordered handle over elements of a shared document. Every
//! per-element operation goes through [`Selection::each`].

use std::cell::RefCell;
use std::rc::Rc;

use fos_css::StyleDeclaration;
use fos_dom::{dispatch, split_tokens, Document, DomEvent, DomTree, EventHandler, Node, NodeId};
use fos_html::{inner_html, HtmlParser};

use crate::{Mode, QueryError};

/// Return value of an [`each`](Selection::each) visitor.
///
/// `false` counts as a negative pass, everything else as a positive one.
pub trait Visit {
    fn tally(self) -> isize;
}

impl Visit for () {
    fn tally(self) -> isize {
        1
    }
}

impl Visit for bool {
    fn tally(self) -> isize {
        if self { 1 } else { -1 }
    }
}

/// Matched elements of a document, in document order
#[derive(Clone)]
pub struct Selection {
    document: Rc<RefCell<Document>>,
    elements: Vec<NodeId>,
    mode: Mode,
}

impl Selection {
    pub(crate) fn new(document: Rc<RefCell<Document>>, elements: Vec<NodeId>, mode: Mode) -> Self {
        debug_assert!(!elements.is_empty());
        Self { document, elements, mode }
    }

    /// Number of matched elements (never zero)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false: a selection is never empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    /// Visit every element with its index. Returns positives minus negatives.
    ///
    /// The document is mutably borrowed during each visit, so a visitor
    /// must read and write through the `&mut Document` it is given. Calling
    /// a getter of any selection over the same document from inside the
    /// visitor panics, as the document `RefCell` is already borrowed.
    pub fn each<F, R>(&self, mut visit: F) -> isize
    where
        F: FnMut(&mut Document, NodeId, usize) -> R,
        R: Visit,
    {
        let mut tally = 0;
        for (index, &node) in self.elements.iter().enumerate() {
            let mut doc = self.document.borrow_mut();
            tally += visit(&mut doc, node, index).tally();
        }
        tally
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// True iff every token is on every element
    pub fn has_class(&self, classes: &str) -> Result<bool, QueryError> {
        let tokens = class_tokens(classes)?;
        let tally = self.each(|doc, node, _| {
            doc.tree().class_list(node).is_some_and(|list| list.contains_all(&tokens))
        });
        Ok(tally == self.len() as isize)
    }

    pub fn add_class(&self, classes: &str) -> Result<&Self, QueryError> {
        let tokens = class_tokens(classes)?;
        self.each(|doc, node, _| {
            if is_element(doc.tree(), node) {
                if let Err(err) = doc.tree_mut().update_class_list(node, |list| list.add(&tokens)) {
                    tracing::warn!("Could not add classes to {:?}: {}", node, err);
                }
            }
        });
        Ok(self)
    }

    pub fn remove_class(&self, classes: &str) -> Result<&Self, QueryError> {
        let tokens = class_tokens(classes)?;
        self.each(|doc, node, _| {
            if is_element(doc.tree(), node) {
                if let Err(err) = doc.tree_mut().update_class_list(node, |list| list.remove(&tokens)) {
                    tracing::warn!("Could not remove classes from {:?}: {}", node, err);
                }
            }
        });
        Ok(self)
    }

    /// Flip one class on each element independently
    pub fn toggle_class(&self, class: &str) -> Result<&Self, QueryError> {
        if class.is_empty() {
            return Err(QueryError::InvalidArgument("class token is empty".into()));
        }
        if class.chars().any(char::is_whitespace) {
            return Err(QueryError::InvalidArgument(format!("class token '{}' contains whitespace", class)));
        }
        self.each(|doc, node, _| {
            if is_element(doc.tree(), node) {
                if let Err(err) = doc.tree_mut().update_class_list(node, |list| list.toggle(class)) {
                    tracing::warn!("Could not toggle class on {:?}: {}", node, err);
                }
            }
        });
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Single-element selection at `index`; negative counts from the end
    pub fn nth(&self, index: isize) -> Result<Option<Selection>, QueryError> {
        let len = self.len() as isize;
        let pos = if index < 0 { len + index } else { index };
        if !(0..len).contains(&pos) {
            let err = QueryError::InvalidSelector(format!("index {} out of range for {} elements", index, len));
            return self.mode.settle(err);
        }
        Ok(Some(self.single(self.elements[pos as usize])))
    }

    pub fn first(&self) -> Selection {
        self.single(self.elements[0])
    }

    pub fn last(&self) -> Selection {
        self.single(self.elements[self.elements.len() - 1])
    }

    fn single(&self, node: NodeId) -> Selection {
        Selection::new(Rc::clone(&self.document), vec![node], self.mode)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Detach every element from its parent
    pub fn remove(&self) -> &Self {
        self.each(|doc, node, _| doc.tree_mut().detach(node));
        self
    }

    pub fn show(&self) -> &Self {
        self.edit_style(|style| {
            style.remove_property("display");
        })
    }

    pub fn hide(&self) -> &Self {
        self.edit_style(|style| style.set_property("display", "none"))
    }

    /// Replace each element's inline style. An empty string does nothing.
    pub fn css(&self, style_text: &str) -> &Self {
        if style_text.is_empty() {
            return self;
        }
        self.edit_style(|style| *style = StyleDeclaration::parse(style_text))
    }

    fn edit_style(&self, edit: impl Fn(&mut StyleDeclaration)) -> &Self {
        self.each(|doc, node, _| {
            let tree = doc.tree_mut();
            if !is_element(tree, node) {
                return;
            }
            let mut style = StyleDeclaration::parse(tree.get_attribute(node, "style").unwrap_or_default());
            edit(&mut style);

            let written = if style.is_empty() {
                tree.remove_attribute(node, "style").map(drop)
            } else {
                tree.set_attribute(node, "style", &style.css_text())
            };
            if let Err(err) = written {
                tracing::warn!("Could not write style of {:?}: {}", node, err);
            }
        });
        self
    }

    // ------------------------------------------------------------------
    // Attributes and content
    // ------------------------------------------------------------------

    /// Attribute of the first element
    pub fn attr(&self, name: &str) -> Option<String> {
        let doc = self.document.borrow();
        doc.tree().get_attribute(self.elements[0], name).map(str::to_string)
    }

    pub fn set_attr(&self, name: &str, value: &str) -> Result<&Self, QueryError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(QueryError::InvalidArgument(format!("'{}' is not an attribute name", name)));
        }
        self.each(|doc, node, _| {
            if is_element(doc.tree(), node) {
                if let Err(err) = doc.tree_mut().set_attribute(node, name, value) {
                    tracing::warn!("Could not set attribute {} on {:?}: {}", name, node, err);
                }
            }
        });
        Ok(self)
    }

    /// Inner markup of the first element
    pub fn html(&self) -> String {
        let doc = self.document.borrow();
        inner_html(doc.tree(), self.elements[0])
    }

    /// Replace each element's children with the parsed `markup`
    pub fn set_html(&self, markup: &str) -> &Self {
        let parser = HtmlParser::new();
        self.each(|doc, node, _| {
            let tree = doc.tree_mut();
            if is_element(tree, node) {
                tree.remove_children(node);
                parser.parse_fragment_into(tree, node, markup);
            }
        });
        self
    }

    /// Text content of the first element; `None` for the document
    pub fn text(&self) -> Option<String> {
        let doc = self.document.borrow();
        doc.tree().text_content(self.elements[0])
    }

    pub fn set_text(&self, content: &str) -> &Self {
        self.each(|doc, node, _| {
            if let Err(err) = doc.tree_mut().set_text_content(node, content) {
                tracing::warn!("Could not set text of {:?}: {}", node, err);
            }
        });
        self
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register `handler` for each space-separated event type
    pub fn on(&self, events: &str, handler: &EventHandler) -> Result<&Self, QueryError> {
        let types = event_types(events)?;
        self.each(|doc, node, _| {
            for event_type in &types {
                doc.add_event_listener(node, event_type, handler);
            }
        });
        Ok(self)
    }

    pub fn off(&self, events: &str, handler: &EventHandler) -> Result<&Self, QueryError> {
        let types = event_types(events)?;
        self.each(|doc, node, _| {
            for event_type in &types {
                doc.remove_event_listener(node, event_type, handler);
            }
        });
        Ok(self)
    }

    pub fn click(&self, handler: &EventHandler) -> &Self {
        self.each(|doc, node, _| doc.add_event_listener(node, "click", handler));
        self
    }

    /// Dispatch a bubbling `event` at each element, in order.
    ///
    /// Listeners run with no borrow of the document held, so they may use it.
    pub fn trigger(&self, event: &str) -> Result<&Self, QueryError> {
        let types = event_types(event)?;
        for &node in &self.elements {
            for event_type in &types {
                let path = self.document.borrow().event_path(node, event_type);
                dispatch(path, &mut DomEvent::new(event_type, node));
            }
        }
        Ok(self)
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("elements", &self.elements)
            .field("mode", &self.mode)
            .finish()
    }
}

fn is_element(tree: &DomTree, node: NodeId) -> bool {
    tree.get(node).is_some_and(Node::is_element)
}

fn class_tokens(classes: &str) -> Result<Vec<&str>, QueryError> {
    let tokens = split_tokens(classes);
    if tokens.is_empty() {
        return Err(QueryError::InvalidArgument("class list is empty".into()));
    }
    Ok(tokens)
}

fn event_types(events: &str) -> Result<Vec<&str>, QueryError> {
    let types = split_tokens(events);
    if types.is_empty() {
        return Err(QueryError::InvalidArgument("event list is empty".into()));
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(html: &str, tag: &str) -> Selection {
        let doc = HtmlParser::new().parse(html);
        let nodes = fos_css::query_selector_all(doc.tree(), doc.root(), tag).unwrap();
        Selection::new(Rc::new(RefCell::new(doc)), nodes, Mode::Strict)
    }

    #[test]
    fn test_each_passes_position_and_tallies() {
        let sel = selection("<p>a</p><p>b</p><p>c</p>", "p");
        let mut seen = Vec::new();
        let tally = sel.each(|_, _, index| {
            seen.push(index);
            index != 1
        });
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(tally, 1);

        assert_eq!(sel.each(|_, _, _| ()), 3);
    }

    #[test]
    fn test_class_arguments_are_validated() {
        let sel = selection("<p>a</p>", "p");
        assert!(matches!(sel.has_class("  "), Err(QueryError::InvalidArgument(_))));
        assert!(matches!(sel.add_class(""), Err(QueryError::InvalidArgument(_))));
        assert!(matches!(sel.toggle_class("a b"), Err(QueryError::InvalidArgument(_))));
    }

    #[test]
    fn test_hide_and_show_keep_other_styles() {
        let sel = selection(r#"<p style="color: red">a</p>"#, "p");
        sel.hide();
        assert_eq!(sel.attr("style").as_deref(), Some("color: red; display: none;"));
        sel.show();
        assert_eq!(sel.attr("style").as_deref(), Some("color: red;"));
    }

    #[test]
    fn test_nth_out_of_range() {
        let sel = selection("<p>a</p><p>b</p>", "p");
        assert!(matches!(sel.nth(2), Err(QueryError::InvalidSelector(_))));
        assert!(matches!(sel.nth(-3), Err(QueryError::InvalidSelector(_))));
    }
}

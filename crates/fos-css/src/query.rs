//! Selector queries over a DOM subtree
//!
//! `querySelectorAll`-style lookup: parse once, walk the subtree in document
//! order, keep the elements the selector group matches.

use fos_dom::{DomTree, NodeId};

use crate::parser::parse_selector_list;
use crate::selectors::SelectorList;
use crate::CssError;

/// All elements below `root` matching `selector`, in document order
pub fn query_selector_all(tree: &DomTree, root: NodeId, selector: &str) -> Result<Vec<NodeId>, CssError> {
    let list = parse_selector_list(selector)?;
    let found = select_all(tree, root, &list);
    tracing::debug!(selector, matched = found.len(), "query_selector_all");
    Ok(found)
}

/// First element below `root` matching `selector`
pub fn query_selector(tree: &DomTree, root: NodeId, selector: &str) -> Result<Option<NodeId>, CssError> {
    let list = parse_selector_list(selector)?;
    Ok(tree.descendants(root).find(|&node| list.matches(tree, node)))
}

/// Run an already-parsed selector group over a subtree
pub fn select_all(tree: &DomTree, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
    tree.descendants(root)
        .filter(|&node| list.matches(tree, node))
        .collect()
}

/// Whether `node` itself matches `selector`
pub fn matches(tree: &DomTree, node: NodeId, selector: &str) -> Result<bool, CssError> {
    Ok(parse_selector_list(selector)?.matches(tree, node))
}

/// Nearest inclusive ancestor element matching `selector`
pub fn closest(tree: &DomTree, node: NodeId, selector: &str) -> Result<Option<NodeId>, CssError> {
    let list = parse_selector_list(selector)?;
    let mut cur = Some(node);
    while let Some(id) = cur {
        if list.matches(tree, id) {
            return Ok(Some(id));
        }
        cur = tree.parent_element(id);
    }
    Ok(None)
}

//! Selector input

use fos_dom::NodeId;

/// What a selection is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// An element or the document root
    Node(NodeId),
    /// A CSS selector group, matched across the whole document
    Pattern(String),
    /// Nothing, e.g. a failed id lookup
    Absent,
}

impl From<NodeId> for Selector {
    fn from(id: NodeId) -> Self {
        Selector::Node(id)
    }
}

impl From<&str> for Selector {
    fn from(pattern: &str) -> Self {
        Selector::Pattern(pattern.to_string())
    }
}

impl From<String> for Selector {
    fn from(pattern: String) -> Self {
        Selector::Pattern(pattern)
    }
}

impl From<&String> for Selector {
    fn from(pattern: &String) -> Self {
        Selector::Pattern(pattern.clone())
    }
}

impl<T: Into<Selector>> From<Option<T>> for Selector {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selector::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Selector::from("p"), Selector::Pattern("p".into()));
        assert_eq!(Selector::from(NodeId::ROOT), Selector::Node(NodeId::ROOT));
        assert_eq!(Selector::from(None::<NodeId>), Selector::Absent);
        assert_eq!(Selector::from(Some("li")), Selector::Pattern("li".into()));
    }
}

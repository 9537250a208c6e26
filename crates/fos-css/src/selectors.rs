//! CSS Selectors Module
//!
//! Selector model (compound/complex selectors, pseudo-classes, attribute
//! matchers) and matching against elements of a `fos_dom::DomTree`.

use fos_dom::{DomTree, NodeId, NodeType};

/// Pseudo-class type
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    // Link pseudo-classes
    Link,
    AnyLink,

    // User action pseudo-classes. A static tree has no interaction state,
    // so these parse but never match.
    Hover,
    Active,
    Focus,
    Visited,

    // Input pseudo-classes (attribute-backed)
    Enabled,
    Disabled,
    Checked,
    Required,
    Optional,

    // Tree-structural pseudo-classes
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),

    // Logical pseudo-classes
    Not(Vec<CompoundSelector>),
    Is(Vec<CompoundSelector>),
    Where(Vec<CompoundSelector>),
}

impl PseudoClass {
    /// Look up an argument-less pseudo-class by name
    pub fn from_name(name: &str) -> Option<Self> {
        let pseudo = match name.to_ascii_lowercase().as_str() {
            "link" => Self::Link,
            "any-link" => Self::AnyLink,
            "hover" => Self::Hover,
            "active" => Self::Active,
            "focus" => Self::Focus,
            "visited" => Self::Visited,
            "enabled" => Self::Enabled,
            "disabled" => Self::Disabled,
            "checked" => Self::Checked,
            "required" => Self::Required,
            "optional" => Self::Optional,
            "root" => Self::Root,
            "empty" => Self::Empty,
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "only-child" => Self::OnlyChild,
            "first-of-type" => Self::FirstOfType,
            "last-of-type" => Self::LastOfType,
            "only-of-type" => Self::OnlyOfType,
            _ => return None,
        };
        Some(pseudo)
    }
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, PartialEq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create "odd" expression (2n+1)
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// Create "even" expression (2n)
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Create a simple index (0n+b)
    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::index(n));
        }

        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        let n_pos = s.find('n')?;
        let a_str = &s[..n_pos];
        let a = match a_str {
            "" | "+" => 1,
            "-" => -1,
            _ => a_str.parse().ok()?,
        };

        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else {
            rest.strip_prefix('+').unwrap_or(rest).parse().ok()?
        };

        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }

        let diff = n - self.b;
        if self.a > 0 {
            diff >= 0 && diff % self.a == 0
        } else {
            diff <= 0 && diff % self.a == 0
        }
    }
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :first-child, :nth-child(), etc.
    PseudoClass(PseudoClass),
}

/// Sequence of components that all apply to one element, e.g. `div.card[open]`
pub type CompoundSelector = Vec<SelectorComponent>;

/// Relationship between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
}

/// Compound selectors joined by combinators, stored left to right.
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

/// Comma-separated selector group
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// True if any selector in the group matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.0.iter().any(|sel| sel.matches(tree, node))
    }
}

impl ComplexSelector {
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(tree, n - 1, node),
        }
    }

    fn matches_at(&self, tree: &DomTree, idx: usize, node: NodeId) -> bool {
        let element = ElementContext::new(tree, node);
        if !match_compound(&self.compounds[idx], &element) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|p| self.matches_at(tree, idx - 1, p)),
            Combinator::Descendant => {
                let mut cur = tree.parent_element(node);
                while let Some(p) = cur {
                    if self.matches_at(tree, idx - 1, p) {
                        return true;
                    }
                    cur = tree.parent_element(p);
                }
                false
            }
            Combinator::NextSibling => element
                .previous_element_siblings()
                .next()
                .is_some_and(|s| self.matches_at(tree, idx - 1, s)),
            Combinator::SubsequentSibling => element
                .previous_element_siblings()
                .any(|s| self.matches_at(tree, idx - 1, s)),
        }
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (matcher, val) = match (&self.matcher, value) {
            (None, found) => return found.is_some(),
            (Some(_), None) => return false,
            (Some(matcher), Some(val)) => (matcher, val),
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            // Empty operands never match for the substring family
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

/// Element view used during matching. Sibling positions are computed on demand.
pub struct ElementContext<'a> {
    tree: &'a DomTree,
    node: NodeId,
}

impl<'a> ElementContext<'a> {
    pub fn new(tree: &'a DomTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    pub fn is_element(&self) -> bool {
        self.tree.node_type(self.node) == Some(NodeType::Element)
    }

    pub fn tag_name(&self) -> &'a str {
        self.tree.tag_name(self.node).unwrap_or("")
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tree.get_attribute(self.node, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.tree.class_list(self.node).is_some_and(|c| c.contains(class))
    }

    fn siblings(&self) -> impl Iterator<Item = NodeId> + 'a {
        let tree = self.tree;
        self.tree.parent(self.node)
            .into_iter()
            .flat_map(move |p| tree.element_children(p))
    }

    /// Element siblings before this one, nearest first
    pub fn previous_element_siblings(&self) -> impl Iterator<Item = NodeId> + 'a {
        let mut before: Vec<NodeId> = self.siblings()
            .take_while(|&s| s != self.node)
            .collect();
        before.reverse();
        before.into_iter()
    }

    /// (1-based index, count) among element siblings, optionally same-type only
    fn position(&self, same_type: bool) -> (usize, usize) {
        let tag = self.tag_name();
        let mut index = 0;
        let mut count = 0;
        for sibling in self.siblings() {
            if same_type && self.tree.tag_name(sibling) != Some(tag) {
                continue;
            }
            count += 1;
            if sibling == self.node {
                index = count;
            }
        }
        if count == 0 {
            // Parentless element: it is its own only sibling
            (1, 1)
        } else {
            (index, count)
        }
    }

    fn is_root(&self) -> bool {
        self.tree.parent(self.node)
            .is_some_and(|p| self.tree.node_type(p) == Some(NodeType::Document))
    }

    fn is_empty(&self) -> bool {
        !self.tree.children(self.node).any(|(_, n)| {
            n.is_element() || n.as_text().is_some_and(|t| !t.is_empty())
        })
    }
}

/// Match every component of a compound selector
pub fn match_compound(compound: &[SelectorComponent], element: &ElementContext) -> bool {
    element.is_element() && compound.iter().all(|c| match_component(c, element))
}

/// Match a selector component against an element
pub fn match_component(component: &SelectorComponent, element: &ElementContext) -> bool {
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => element.tag_name().eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => element.attribute("id") == Some(id.as_str()),
        SelectorComponent::Class(class) => element.has_class(class),
        SelectorComponent::Attribute(attr) => attr.matches(element.attribute(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, element),
    }
}

/// Match a pseudo-class against an element
pub fn match_pseudo_class(pseudo: &PseudoClass, element: &ElementContext) -> bool {
    let form_control = || {
        matches!(
            element.tag_name().to_ascii_lowercase().as_str(),
            "input" | "button" | "select" | "textarea" | "option" | "fieldset"
        )
    };

    match pseudo {
        PseudoClass::Link | PseudoClass::AnyLink => {
            matches!(element.tag_name(), "a" | "area") && element.attribute("href").is_some()
        }

        PseudoClass::Hover | PseudoClass::Active | PseudoClass::Focus | PseudoClass::Visited => false,

        PseudoClass::Enabled => form_control() && element.attribute("disabled").is_none(),
        PseudoClass::Disabled => form_control() && element.attribute("disabled").is_some(),
        PseudoClass::Checked => {
            element.attribute("checked").is_some() || element.attribute("selected").is_some()
        }
        PseudoClass::Required => form_control() && element.attribute("required").is_some(),
        PseudoClass::Optional => form_control() && element.attribute("required").is_none(),

        PseudoClass::Root => element.is_root(),
        PseudoClass::Empty => element.is_empty(),
        PseudoClass::FirstChild => element.position(false).0 == 1,
        PseudoClass::LastChild => {
            let (index, count) = element.position(false);
            index == count
        }
        PseudoClass::OnlyChild => element.position(false).1 == 1,
        PseudoClass::FirstOfType => element.position(true).0 == 1,
        PseudoClass::LastOfType => {
            let (index, count) = element.position(true);
            index == count
        }
        PseudoClass::OnlyOfType => element.position(true).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(element.position(false).0 as i32),
        PseudoClass::NthLastChild(expr) => {
            let (index, count) = element.position(false);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(element.position(true).0 as i32),
        PseudoClass::NthLastOfType(expr) => {
            let (index, count) = element.position(true);
            expr.matches((count - index + 1) as i32)
        }

        PseudoClass::Not(list) => !list.iter().any(|c| match_compound(c, element)),
        PseudoClass::Is(list) | PseudoClass::Where(list) => {
            list.iter().any(|c| match_compound(c, element))
        }
    }
}

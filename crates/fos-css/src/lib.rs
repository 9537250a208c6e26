//! fOS CSS - Selectors & Inline Style
//!
//! Selector parsing and matching against `fos_dom` trees, plus the inline
//! `style` attribute model.

mod parser;
mod query;
mod selectors;
mod style;

pub use parser::{parse_selector_list, SelectorParser};
pub use query::{closest, matches, query_selector, query_selector_all, select_all};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    ElementContext, NthExpression, PseudoClass, SelectorComponent, SelectorList,
};
pub use style::{Declaration, StyleDeclaration};

/// CSS errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    #[error("Invalid selector '{selector}' at {position}: {message}")]
    InvalidSelector {
        selector: String,
        position: usize,
        message: String,
    },
}

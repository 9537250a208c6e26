//! Query errors

use fos_css::CssError;

/// Selection errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Absent or empty selector, or an out-of-range `nth`
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A node that is neither an element nor the document
    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    #[error("No element matches '{0}'")]
    NoMatch(String),

    #[error(transparent)]
    SelectorSyntax(#[from] CssError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

//! fOS Query
//!
//! Chainable selections over a shared [`Document`] and a one-call
//! asynchronous request helper.
//!
//! # Example
//! ```rust,ignore
//! use fos_query::{Query, QueryConfig};
//!
//! let query = Query::from_html("<ul><li>a</li><li>b</li></ul>", QueryConfig::default());
//! if let Some(items) = query.select("ul > li")? {
//!     items.add_class("item")?.last().hide();
//! }
//! ```

mod config;
mod error;
mod selection;
mod selector;

use std::cell::RefCell;
use std::rc::Rc;

pub use config::{Mode, QueryConfig};
pub use error::QueryError;
pub use selection::{Selection, Visit};
pub use selector::Selector;

pub use fos_dom::{Document, DomEvent, EventHandler, NodeId};
pub use fos_net::{
    EventLoop, MockBackend, Payload, RequestData, RequestHelper, RequestSettings, Response, XhrError,
    XmlHttpRequest,
};

use fos_dom::NodeType;

/// Library entry point: a document, a mode and an optional request helper
pub struct Query {
    document: Rc<RefCell<Document>>,
    config: QueryConfig,
    requests: Option<RequestHelper>,
}

impl Query {
    pub fn new(document: Rc<RefCell<Document>>, config: QueryConfig) -> Self {
        Self {
            document,
            config,
            requests: None,
        }
    }

    /// Parse `html` into a fresh document and wrap it
    pub fn from_html(html: &str, config: QueryConfig) -> Self {
        let document = fos_html::parse(html);
        Self::new(Rc::new(RefCell::new(document)), config)
    }

    pub fn with_request_helper(mut self, helper: RequestHelper) -> Self {
        self.requests = Some(helper);
        self
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Build a selection. In lenient mode a failure is logged and yields `Ok(None)`.
    pub fn select(&self, selector: impl Into<Selector>) -> Result<Option<Selection>, QueryError> {
        let selector = selector.into();
        match self.resolve(&selector) {
            Ok(elements) => {
                tracing::debug!(?selector, count = elements.len(), "Selection created");
                Ok(Some(Selection::new(Rc::clone(&self.document), elements, self.config.mode)))
            }
            Err(err) => self.config.mode.settle(err),
        }
    }

    fn resolve(&self, selector: &Selector) -> Result<Vec<NodeId>, QueryError> {
        let doc = self.document.borrow();
        let tree = doc.tree();

        match selector {
            Selector::Absent => Err(QueryError::InvalidSelector("no selector given".into())),
            Selector::Pattern(pattern) if pattern.is_empty() => {
                Err(QueryError::InvalidSelector("empty selector".into()))
            }
            Selector::Pattern(pattern) => {
                let found = fos_css::query_selector_all(tree, tree.root(), pattern)?;
                if found.is_empty() {
                    return Err(QueryError::NoMatch(pattern.clone()));
                }
                Ok(found)
            }
            Selector::Node(node) => match tree.node_type(*node) {
                Some(NodeType::Element | NodeType::Document) => Ok(vec![*node]),
                Some(other) => Err(QueryError::UnsupportedSelector(format!("{:?} node", other))),
                None => Err(QueryError::UnsupportedSelector(format!("{:?} is not in the document", node))),
            },
        }
    }

    /// Issue a request through the configured helper. Without one the call
    /// does nothing and returns false.
    pub fn ajax(&self, settings: RequestSettings) -> bool {
        match &self.requests {
            Some(helper) => helper.request(settings),
            None => {
                tracing::debug!("No request helper configured, dropping request to {}", settings.url);
                false
            }
        }
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("config", &self.config)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

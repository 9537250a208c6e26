//! fOS Networking
//!
//! XHR-style transport over pluggable HTTP backends, a single-threaded
//! event loop for completions, and the one-call [`RequestHelper`].

mod ajax;
mod backend;
mod event_loop;
mod loader;
mod xhr;

pub use ajax::{
    Context, ErrorCallback, Payload, RequestData, RequestHelper, RequestSettings, SuccessCallback,
    TimeoutCallback, ERROR, SUCCESS, TIMEOUT,
};
pub use backend::{BackendBuilder, ClientConfig, HttpBackend, MockBackend, ReqwestBackend};
pub use event_loop::EventLoop;
pub use loader::{Method, Request, Response};
pub use url::Url;
pub use xhr::{is_forbidden_header, ReadyState, XhrError, XmlHttpRequest};

/// Network error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out")]
    Timeout,
}

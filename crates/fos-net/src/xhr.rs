//! XMLHttpRequest
//!
//! One request/response exchange over an [`HttpBackend`], with the XHR
//! ready-state lifecycle and header rules.

use url::Url;

use crate::loader::find_header;
use crate::{HttpBackend, Method, NetError, Request};

/// Lifecycle of one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReadyState {
    #[default]
    Unsent = 0,
    Opened = 1,
    /// Status line and headers are in
    HeadersReceived = 2,
    /// Body is being read
    Loading = 3,
    Done = 4,
}

/// Request state plus the response once it arrives
#[derive(Debug, Default)]
pub struct XmlHttpRequest {
    pub ready_state: ReadyState,
    pub status: u16,
    pub status_text: String,
    pub response_text: String,
    pub response_headers: Vec<(String, String)>,

    method: Method,
    url: String,
    request_headers: Vec<(String, String)>,
    send_flag: bool,
    error_flag: bool,
}

impl XmlHttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the request. The URL must be absolute.
    pub fn open(&mut self, method: &str, url: &str) -> Result<(), XhrError> {
        let method = Method::parse(method)
            .ok_or_else(|| XhrError::UnsupportedMethod(method.to_string()))?;
        Url::parse(url).map_err(|e| XhrError::InvalidUrl(format!("{}: {}", url, e)))?;

        self.method = method;
        self.url = url.to_string();
        self.ready_state = ReadyState::Opened;
        self.send_flag = false;
        self.error_flag = false;
        self.request_headers.clear();
        Ok(())
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add a request header. Allowed only between `open` and `send`; a
    /// repeated name is joined onto the earlier value.
    pub fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), XhrError> {
        if self.ready_state != ReadyState::Opened || self.send_flag {
            return Err(XhrError::InvalidState);
        }

        if is_forbidden_header(&name.to_ascii_lowercase()) {
            return Err(XhrError::ForbiddenHeader(name.to_string()));
        }

        match self.request_headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.request_headers.push((name.to_string(), value.to_string())),
        }

        Ok(())
    }

    /// Headers set so far, in order
    pub fn request_headers(&self) -> &[(String, String)] {
        &self.request_headers
    }

    /// Response header by case-insensitive name
    pub fn get_response_header(&self, name: &str) -> Option<&str> {
        find_header(&self.response_headers, name)
    }

    /// Every response header as `name: value` lines, CRLF terminated
    pub fn get_all_response_headers(&self) -> String {
        self.response_headers
            .iter()
            .map(|(name, value)| format!("{}: {}\r\n", name, value))
            .collect()
    }

    /// Send the request and wait for the complete response
    pub async fn send(&mut self, backend: &dyn HttpBackend, body: Option<Vec<u8>>) -> Result<(), XhrError> {
        if self.ready_state != ReadyState::Opened || self.send_flag {
            return Err(XhrError::InvalidState);
        }
        self.send_flag = true;

        let request = Request {
            method: self.method,
            url: self.url.clone(),
            headers: self.request_headers.clone(),
            body,
        };
        tracing::info!("HTTP {} {}", self.method.as_str(), self.url);

        match backend.execute(request).await {
            Ok(response) => {
                self.ready_state = ReadyState::HeadersReceived;
                self.status = response.status;
                self.status_text = reqwest::StatusCode::from_u16(response.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown")
                    .to_string();
                self.response_headers = response.headers;

                self.ready_state = ReadyState::Loading;
                self.response_text = String::from_utf8_lossy(&response.body).into_owned();
                self.ready_state = ReadyState::Done;
                Ok(())
            }
            Err(e) => {
                self.error_flag = true;
                self.ready_state = ReadyState::Done;
                Err(e.into())
            }
        }
    }

    /// Abandon an exchange that is in flight. Anything else is left alone.
    pub fn abort(&mut self) {
        let in_flight = match self.ready_state {
            ReadyState::Opened => self.send_flag,
            ReadyState::HeadersReceived | ReadyState::Loading => true,
            ReadyState::Unsent | ReadyState::Done => false,
        };
        if !in_flight {
            return;
        }

        self.ready_state = ReadyState::Done;
        self.send_flag = false;
        self.error_flag = true;
        self.status = 0;
        self.status_text.clear();
        self.response_text.clear();
        self.response_headers.clear();
    }

    /// True once the exchange failed or was aborted
    pub fn has_error(&self) -> bool {
        self.error_flag
    }

    /// Deserialize the response body
    pub fn response_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, XhrError> {
        serde_json::from_str(&self.response_text)
            .map_err(|e| XhrError::ParseError(e.to_string()))
    }
}

/// Header names a caller may not set (lowercase input)
pub fn is_forbidden_header(name: &str) -> bool {
    matches!(name,
        "accept-charset" | "accept-encoding" | "access-control-request-headers" |
        "access-control-request-method" | "connection" | "content-length" |
        "cookie" | "cookie2" | "date" | "dnt" | "expect" | "host" |
        "keep-alive" | "origin" | "referer" | "te" | "trailer" |
        "transfer-encoding" | "upgrade" | "via"
    ) || name.starts_with("proxy-") || name.starts_with("sec-")
}

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XhrError {
    #[error("Request is not in a state that allows this call")]
    InvalidState,

    #[error("Forbidden header: {0}")]
    ForbiddenHeader(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<NetError> for XhrError {
    fn from(err: NetError) -> Self {
        match err {
            NetError::Timeout => XhrError::Timeout,
            NetError::InvalidUrl(url) => XhrError::InvalidUrl(url),
            other => XhrError::Network(other.to_string()),
        }
    }
}

//! Request Helper
//!
//! One-call asynchronous requests: settings over defaults, a transport per
//! call, and exactly one of the success / error / timeout callbacks.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fos_dom::Document;
use fos_html::XmlParser;
use url::Url;

use crate::{ClientConfig, EventLoop, HttpBackend, ReqwestBackend, XhrError, XmlHttpRequest};

/// Status marker passed to the success callback
pub const SUCCESS: &str = "success";
/// Status marker passed to the error callback
pub const ERROR: &str = "error";
/// Status marker passed to the timeout callback
pub const TIMEOUT: &str = "timeout";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Value every callback receives first
pub type Context = Option<Rc<dyn Any>>;

pub type SuccessCallback = Box<dyn FnOnce(&Context, Payload, &str, &XmlHttpRequest)>;
pub type ErrorCallback = Box<dyn FnOnce(&Context, &XmlHttpRequest, &str, Option<XhrError>)>;
pub type TimeoutCallback = Box<dyn FnOnce(&Context, &XmlHttpRequest, &str)>;

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestData {
    #[default]
    Empty,
    /// Sent as-is
    Text(String),
    /// Sent url-encoded
    Form(Vec<(String, String)>),
}

impl RequestData {
    pub fn form(pairs: &[(&str, &str)]) -> Self {
        RequestData::Form(
            pairs.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn into_body(self) -> Option<Vec<u8>> {
        match self {
            RequestData::Empty => None,
            RequestData::Text(text) => Some(text.into_bytes()),
            RequestData::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish();
                Some(encoded.into_bytes())
            }
        }
    }
}

/// Decoded response body
#[derive(Debug)]
pub enum Payload {
    Json(serde_json::Value),
    Xml(Document),
    Text(String),
}

/// Per-call request configuration
pub struct RequestSettings {
    pub url: String,
    /// `false` appends a `_=<unix millis>` query parameter
    pub cache: bool,
    pub data: RequestData,
    pub headers: BTreeMap<String, String>,
    pub context: Context,
    pub method: String,
    /// Milliseconds, 0 = none
    pub timeout: u64,
    pub on_success: SuccessCallback,
    pub on_error: ErrorCallback,
    pub on_timeout: TimeoutCallback,
}

impl RequestSettings {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            cache: true,
            data: RequestData::Empty,
            headers: BTreeMap::new(),
            context: None,
            method: "GET".to_string(),
            timeout: 0,
            on_success: Box::new(|_, _, _, _| {}),
            on_error: Box::new(|_, _, _, _| {}),
            on_timeout: Box::new(|_, _, _| {}),
        }
    }
}

impl std::fmt::Debug for RequestSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSettings")
            .field("url", &self.url)
            .field("cache", &self.cache)
            .field("data", &self.data)
            .field("headers", &self.headers)
            .field("method", &self.method)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Issues requests on an [`EventLoop`]
pub struct RequestHelper {
    backend: Option<Rc<dyn HttpBackend>>,
    event_loop: Rc<EventLoop>,
}

impl RequestHelper {
    pub fn new(backend: Rc<dyn HttpBackend>, event_loop: Rc<EventLoop>) -> Self {
        Self {
            backend: Some(backend),
            event_loop,
        }
    }

    /// Helper over a reqwest backend. If the client cannot be built every
    /// request is silently dropped.
    pub fn with_config(config: ClientConfig, event_loop: Rc<EventLoop>) -> Self {
        let backend = match ReqwestBackend::with_config(config) {
            Ok(backend) => Some(Rc::new(backend) as Rc<dyn HttpBackend>),
            Err(err) => {
                tracing::warn!("HTTP transport unavailable: {}", err);
                None
            }
        };
        Self { backend, event_loop }
    }

    pub fn event_loop(&self) -> &Rc<EventLoop> {
        &self.event_loop
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Queue one request. Returns false, and does nothing, when there is no
    /// transport. Callbacks run from [`EventLoop::run`].
    pub fn request(&self, settings: RequestSettings) -> bool {
        let Some(backend) = self.backend.clone() else {
            tracing::debug!("No HTTP transport, dropping request to {}", settings.url);
            return false;
        };

        let RequestSettings {
            url,
            cache,
            data,
            headers,
            context,
            method,
            timeout,
            on_success,
            on_error,
            on_timeout,
        } = settings;

        let mut xhr = XmlHttpRequest::new();
        let prepared = prepare(&mut xhr, &url, cache, &method, headers);

        self.event_loop.spawn(async move {
            if let Err(err) = prepared {
                on_error(&context, &xhr, ERROR, Some(err));
                return Ok(());
            }

            let body = data.into_body();
            let outcome = if timeout > 0 {
                let deadline = Duration::from_millis(timeout);
                smol::future::or(
                    async { Some(xhr.send(&*backend, body).await) },
                    async move {
                        smol::Timer::after(deadline).await;
                        None
                    },
                )
                .await
            } else {
                Some(xhr.send(&*backend, body).await)
            };

            match outcome {
                None => {
                    tracing::debug!("Request to {} timed out after {}ms", xhr.url(), timeout);
                    xhr.abort();
                    on_timeout(&context, &xhr, TIMEOUT);
                }
                Some(Err(err)) => on_error(&context, &xhr, ERROR, Some(err)),
                Some(Ok(())) if is_success(xhr.status) => {
                    let payload = decode(&xhr)?;
                    on_success(&context, payload, SUCCESS, &xhr);
                }
                Some(Ok(())) => on_error(&context, &xhr, ERROR, None),
            }
            Ok::<(), XhrError>(())
        });
        true
    }
}

impl std::fmt::Debug for RequestHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHelper")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Open the transport and apply headers
fn prepare(
    xhr: &mut XmlHttpRequest,
    url: &str,
    cache: bool,
    method: &str,
    mut headers: BTreeMap<String, String>,
) -> Result<(), XhrError> {
    let url = if cache { url.to_string() } else { cache_busted(url)? };
    xhr.open(method, &url)?;

    if method == "POST" {
        force_header(&mut headers, "X-Requested-With", "XMLHttpRequest");
        force_header(&mut headers, "Content-Type", FORM_CONTENT_TYPE);
    }

    for (name, value) in &headers {
        if let Err(err) = xhr.set_request_header(name, value) {
            tracing::warn!("Skipping header {}: {}", name, err);
        }
    }
    Ok(())
}

/// Replace any case variant of `name` with `name: value`
fn force_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

fn cache_busted(url: &str) -> Result<String, XhrError> {
    let mut parsed = Url::parse(url).map_err(|e| XhrError::InvalidUrl(format!("{}: {}", url, e)))?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    parsed.query_pairs_mut().append_pair("_", &millis.to_string());
    Ok(parsed.into())
}

fn is_success(status: u16) -> bool {
    (200..400).contains(&status) || status == 304
}

/// Decode the body by content type
fn decode(xhr: &XmlHttpRequest) -> Result<Payload, XhrError> {
    let content_type = xhr.get_response_header("content-type")
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.contains("json") {
        xhr.response_json().map(Payload::Json)
    } else if content_type.contains("xml") {
        XmlParser::new()
            .parse_with_url(&xhr.response_text, xhr.url())
            .map(Payload::Xml)
            .map_err(|e| XhrError::ParseError(e.to_string()))
    } else {
        Ok(Payload::Text(xhr.response_text.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_is_url_encoded() {
        let data = RequestData::form(&[("q", "a b&c"), ("page", "2")]);
        assert_eq!(data.into_body(), Some(b"q=a+b%26c&page=2".to_vec()));
        assert_eq!(RequestData::Empty.into_body(), None);
    }

    #[test]
    fn test_force_header_replaces_case_variants() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "*/*".to_string());

        force_header(&mut headers, "Content-Type", FORM_CONTENT_TYPE);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_cache_busted_appends_timestamp() {
        let busted = cache_busted("https://api.test/items?sort=asc").unwrap();
        let url = Url::parse(&busted).unwrap();
        let pairs: Vec<_> = url.query_pairs().collect();

        assert_eq!(pairs[0].0, "sort");
        assert_eq!(pairs[1].0, "_");
        assert!(pairs[1].1.parse::<u128>().is_ok());
    }

    #[test]
    fn test_success_range() {
        assert!(is_success(200));
        assert!(is_success(304));
        assert!(is_success(399));
        assert!(!is_success(199));
        assert!(!is_success(404));
    }

    #[test]
    fn test_unavailable_transport_is_noop() {
        let helper = RequestHelper {
            backend: None,
            event_loop: Rc::new(EventLoop::new()),
        };
        assert!(!helper.request(RequestSettings::new("https://api.test/")));
        assert_eq!(helper.event_loop().pending(), 0);
    }
}

//! HTTP Backends
//!
//! The transport below [`XmlHttpRequest`](crate::XmlHttpRequest): a reqwest
//! client for real traffic and a scripted mock for tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use smol::future::BoxedLocal;

use crate::{NetError, Request, Response};

/// Executes one request. The returned future must not borrow the backend.
pub trait HttpBackend {
    fn execute(&self, request: Request) -> BoxedLocal<Result<Response, NetError>>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: u32,
    /// Headers sent with every request
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("fOS-Query/", env!("CARGO_PKG_VERSION")).into(),
            connect_timeout: Duration::from_secs(30),
            max_redirects: 10,
            default_headers: Vec::new(),
        }
    }
}

/// Builder for [`ReqwestBackend`]
pub struct BackendBuilder {
    config: ClientConfig,
}

impl BackendBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.config.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Result<ReqwestBackend, NetError> {
        ReqwestBackend::with_config(self.config)
    }
}

impl Default for BackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// reqwest's blocking client, driven from smol's blocking thread pool
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::blocking::Client,
    config: ClientConfig,
}

impl ReqwestBackend {
    pub fn new() -> Result<Self, NetError> {
        Self::builder().build()
    }

    pub fn builder() -> BackendBuilder {
        BackendBuilder::new()
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, NetError> {
        let redirect = match config.max_redirects {
            0 => reqwest::redirect::Policy::none(),
            n => reqwest::redirect::Policy::limited(n as usize),
        };
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .redirect(redirect)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl HttpBackend for ReqwestBackend {
    fn execute(&self, request: Request) -> BoxedLocal<Result<Response, NetError>> {
        let client = self.client.clone();
        let defaults = self.config.default_headers.clone();
        Box::pin(smol::unblock(move || send_blocking(&client, &defaults, request)))
    }
}

fn send_blocking(
    client: &reqwest::blocking::Client,
    defaults: &[(String, String)],
    request: Request,
) -> Result<Response, NetError> {
    let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
        .map_err(|e| NetError::Network(e.to_string()))?;
    let mut builder = client.request(method, request.url.as_str());

    for (name, value) in defaults {
        if request.header(name).is_none() {
            builder = builder.header(name.as_str(), value.as_str());
        }
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().map_err(|e| {
        if e.is_timeout() {
            NetError::Timeout
        } else if e.is_builder() {
            NetError::InvalidUrl(e.to_string())
        } else {
            NetError::Network(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    let headers = response.headers()
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    let body = response.bytes()
        .map_err(|e| NetError::Network(e.to_string()))?
        .to_vec();

    Ok(Response { status, headers, body })
}

/// Scripted reply for [`MockBackend`]
#[derive(Debug, Clone)]
struct MockRoute {
    url_prefix: String,
    reply: Result<Response, NetError>,
    delay: Duration,
}

/// In-memory backend: replies by URL prefix and records every request
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    routes: Rc<RefCell<Vec<MockRoute>>>,
    requests: Rc<RefCell<Vec<Request>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to URLs starting with `url_prefix`. Earlier routes win.
    pub fn respond(&self, url_prefix: &str, response: Response) -> &Self {
        self.route(url_prefix, Ok(response), Duration::ZERO)
    }

    /// Like [`respond`](Self::respond), after `delay`
    pub fn respond_after(&self, url_prefix: &str, response: Response, delay: Duration) -> &Self {
        self.route(url_prefix, Ok(response), delay)
    }

    /// Fail requests to `url_prefix` at the transport level
    pub fn fail(&self, url_prefix: &str, error: NetError) -> &Self {
        self.route(url_prefix, Err(error), Duration::ZERO)
    }

    fn route(&self, url_prefix: &str, reply: Result<Response, NetError>, delay: Duration) -> &Self {
        self.routes.borrow_mut().push(MockRoute {
            url_prefix: url_prefix.to_string(),
            reply,
            delay,
        });
        self
    }

    /// Every request executed so far
    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl HttpBackend for MockBackend {
    fn execute(&self, request: Request) -> BoxedLocal<Result<Response, NetError>> {
        let route = self.routes.borrow()
            .iter()
            .find(|r| request.url.starts_with(&r.url_prefix))
            .cloned();
        tracing::trace!(url = %request.url, routed = route.is_some(), "mock request");
        self.requests.borrow_mut().push(request);

        Box::pin(async move {
            let Some(route) = route else {
                return Ok(Response::new(404));
            };
            if !route.delay.is_zero() {
                smol::Timer::after(route.delay).await;
            }
            route.reply
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_routes_by_prefix() {
        let mock = MockBackend::new();
        mock.respond("https://api.test/users", Response::new(200).with_body("[]"))
            .fail("https://api.test/down", NetError::Network("refused".into()));

        let ok = smol::block_on(mock.execute(Request::get("https://api.test/users?page=2"))).unwrap();
        assert_eq!(ok.status, 200);
        assert_eq!(ok.body, b"[]");

        let err = smol::block_on(mock.execute(Request::get("https://api.test/down")));
        assert!(matches!(err, Err(NetError::Network(_))));

        let missing = smol::block_on(mock.execute(Request::get("https://other.test/"))).unwrap();
        assert_eq!(missing.status, 404);

        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.user_agent.starts_with("fOS-Query/"));
        assert_eq!(config.max_redirects, 10);
    }
}

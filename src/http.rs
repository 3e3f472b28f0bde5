//! HTTP transport for cached fetching
//!
//! Request options are passed through to the network unchanged. The
//! [`Transport`] trait is the seam between the fetcher and the network so the
//! fetcher can be driven by a scripted transport in tests.

use futures::future::BoxFuture;
use reqwest::{Client, Method};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::FetchError;

/// Request method, headers and body for a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Parses a method name such as `get` or `POST`
pub fn parse_method(name: &str) -> Result<Method, FetchError> {
    Method::from_bytes(name.to_ascii_uppercase().as_bytes())
        .map_err(|_| FetchError::InvalidOptions(format!("invalid method '{}'", name)))
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the 2xx range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and returns the raw response
///
/// Implementations must resolve to [`FetchError::Cancelled`] once `cancel`
/// fires, even if the exchange has not finished.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        url: &'a str,
        options: &'a FetchOptions,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<RawResponse, FetchError>>;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, url: &str, options: &FetchOptions) -> Result<RawResponse, FetchError> {
        let mut request = self.client.request(options.method.clone(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url, status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(
        &'a self,
        url: &'a str,
        options: &'a FetchOptions,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        Box::pin(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FetchError::Cancelled),
                result = self.execute(url, options) => result,
            }
        })
    }
}

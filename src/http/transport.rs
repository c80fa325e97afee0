//! The seam between request shaping and actual network I/O.
//!
//! [`Courier`](crate::Courier) never talks to the network itself. It builds an
//! [`HttpRequest`], hands it to a [`Transport`] and decodes whatever comes
//! back. The default transport is a thin wrapper over [`reqwest::Client`];
//! tests and embedders can plug in their own.

use super::common::HttpRequest;
use crate::errors::CourierError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client as ReqwestClient;
use std::fmt;
use std::time::Duration;

/// What a transport observed for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code, if the exchange produced an HTTP response at all.
    pub status: Option<u16>,
    /// Response body, if one was received.
    pub body: Option<Bytes>,
}

impl RawResponse {
    /// Convenience constructor for a response with a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// A response carrying only a status line.
    #[must_use]
    pub const fn status_only(status: u16) -> Self {
        Self {
            status: Some(status),
            body: None,
        }
    }

    /// Returns true when the status is present and outside `200..=299`.
    #[must_use]
    pub fn is_http_failure(&self) -> bool {
        self.status.is_some_and(|s| !(200..=299).contains(&s))
    }
}

/// Minimal async HTTP transport.
///
/// Implementations own connection management, TLS and timeouts. An `Err`
/// return is a transport-level failure (connectivity, timeout, TLS) and is
/// surfaced to the caller unmodified. Non-2xx statuses are *not* errors at
/// this layer and must come back as `Ok`.
///
/// Implementations are shared across concurrent requests.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use courier::{CourierError, HttpRequest, RawResponse, Transport};
///
/// #[derive(Debug)]
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn execute(&self, _request: HttpRequest) -> Result<RawResponse, CourierError> {
///         Ok(RawResponse::new(200, r#"{"ok":true}"#))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, CourierError>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: ReqwestClient,
}

impl ReqwestTransport {
    /// Builds a reqwest client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::ClientBuild`] if reqwest cannot initialize
    /// (typically a TLS backend failure).
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, CourierError> {
        let http_client = ReqwestClient::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| CourierError::ClientBuild(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Wraps a pre-configured reqwest client. Its own timeouts apply.
    #[must_use]
    pub const fn from_client(http_client: ReqwestClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, CourierError> {
        let mut builder = self
            .http_client
            .request(request.method.into(), request.url);

        // `header` appends, so repeated names are all sent
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status: Some(status),
            body: Some(body),
        })
    }
}

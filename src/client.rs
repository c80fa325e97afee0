use crate::callback::{CallbackExecutor, InlineExecutor};
use crate::errors::CourierError;
use crate::http::common::{
    CONTENT_TYPE_HEADER, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT, HttpMethod,
    HttpRequest, JSON_CONTENT_TYPE, Query, construct_url, pathify_query,
};
use crate::http::dispatch::{Completion, decode_delete, decode_typed};
use crate::http::loud_wire;
use crate::http::transport::{RawResponse, ReqwestTransport, Transport};
use crate::multipart::MultipartForm;
use bytes::Bytes;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// HTTP client bound to one base URL.
///
/// Cloning is cheap: clones share the base URL, transport and callback
/// executor, all of which are immutable and safe to use from many in-flight
/// requests at once.
#[derive(Debug, Clone)]
pub struct Courier {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    callback_executor: Arc<dyn CallbackExecutor>,
    normalize_server_errors: bool,
}

/// Builder for `Courier` instances.
///
/// # Example
///
/// ```
/// use courier::Courier;
/// use std::time::Duration;
///
/// let courier = Courier::builder("https://api.example.com/v1/")
///     .timeout(Duration::from_secs(10))
///     .normalize_server_errors(true)
///     .build();
/// assert_eq!(courier.base_url(), "https://api.example.com/v1/");
/// ```
#[derive(Debug)]
pub struct CourierBuilder {
    base_url: String,
    timeout: Duration,
    connect_timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
    callback_executor: Option<Arc<dyn CallbackExecutor>>,
    normalize_server_errors: bool,
}

impl CourierBuilder {
    /// Sets the total request timeout of the default transport.
    ///
    /// Defaults to 30 seconds. Ignored when a custom transport is supplied.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout of the default transport.
    ///
    /// Defaults to 30 seconds. Ignored when a custom transport is supplied.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Uses a pre-configured transport instead of building a reqwest one.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets where callbacks passed to the `*_with` methods run.
    ///
    /// Defaults to [`InlineExecutor`].
    #[must_use]
    pub fn callback_executor(mut self, executor: Arc<dyn CallbackExecutor>) -> Self {
        self.callback_executor = Some(executor);
        self
    }

    /// Runs non-2xx responses through the error normalizer.
    ///
    /// Off by default: a non-2xx response then completes with neither a
    /// value nor an error, and only [`Completion::status`] tells the caller
    /// what happened. When on, every verb (DELETE included) reports
    /// [`CourierError::Server`] for non-2xx responses.
    #[must_use]
    pub const fn normalize_server_errors(mut self, enabled: bool) -> Self {
        self.normalize_server_errors = enabled;
        self
    }

    /// Builds the `Courier`, reporting configuration problems as errors.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::InvalidBaseUrl`] if the base URL does not end
    /// in `/` or does not parse, and [`CourierError::ClientBuild`] if the
    /// default transport cannot be created.
    pub fn try_build(self) -> Result<Courier, CourierError> {
        if !self.base_url.ends_with('/') {
            return Err(CourierError::InvalidBaseUrl(format!(
                "{:?} must end in /",
                self.base_url
            )));
        }
        Url::parse(&self.base_url)
            .map_err(|e| CourierError::InvalidBaseUrl(format!("{:?}: {e}", self.base_url)))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.timeout, self.connect_timeout)?),
        };

        Ok(Courier {
            base_url: self.base_url.into(),
            transport,
            callback_executor: self
                .callback_executor
                .unwrap_or_else(|| Arc::new(InlineExecutor)),
            normalize_server_errors: self.normalize_server_errors,
        })
    }

    /// Builds the `Courier`.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not end in `/` or is not a valid URL.
    /// A misconfigured base URL is a programming error; use
    /// [`try_build`](Self::try_build) to handle it instead.
    #[must_use]
    pub fn build(self) -> Courier {
        match self.try_build() {
            Ok(courier) => courier,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Courier {
    /// Creates a new builder for `Courier` instances.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root every request path is appended to. Must end in `/`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> CourierBuilder {
        CourierBuilder {
            base_url: base_url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_RESOURCE_TIMEOUT,
            transport: None,
            callback_executor: None,
            normalize_server_errors: false,
        }
    }

    /// Creates a client with the default reqwest transport.
    ///
    /// # Panics
    ///
    /// Panics if `base_url` does not end in `/` or is not a valid URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request descriptor for a call without sending it.
    ///
    /// `Content-Type: application/json` is always the first header; caller
    /// headers follow and never replace it, so a caller-supplied
    /// `Content-Type` is sent in addition to the default.
    ///
    /// # Panics
    ///
    /// Panics if `path` (with its query) cannot be joined to the base URL
    /// into a valid URL.
    #[must_use]
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        headers: &[(&str, &str)],
        query: &Query,
        body: Option<Bytes>,
    ) -> HttpRequest {
        let url = construct_url(&self.base_url, &pathify_query(path, query));
        HttpRequest {
            method,
            url,
            headers: with_default_header(JSON_CONTENT_TYPE.to_string(), headers),
            body,
        }
    }

    /// Builds a multipart POST: the form's `multipart/form-data` content type
    /// stands in for the JSON default.
    fn build_multipart_request(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        form: MultipartForm,
    ) -> HttpRequest {
        let content_type = form.content_type();
        HttpRequest {
            method: HttpMethod::Post,
            url: construct_url(&self.base_url, path),
            headers: with_default_header(content_type, headers),
            body: Some(form.into_body()),
        }
    }

    // --- Async API ---

    /// Sends a GET and decodes the JSON response into `T`.
    ///
    /// # Panics
    ///
    /// Panics if the path and query do not form a valid URL.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        query: Query,
    ) -> Completion<T> {
        let request = self.build_request(HttpMethod::Get, path, headers, &query, None);
        self.dispatch(request, None).await
    }

    /// Sends a POST with a JSON body and decodes the JSON response into `T`.
    ///
    /// # Panics
    ///
    /// Panics if the path does not form a valid URL.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Completion<T> {
        let request = self.build_request(
            HttpMethod::Post,
            path,
            headers,
            &Query::new(),
            Some(body.into()),
        );
        self.dispatch(request, None).await
    }

    /// Uploads a multipart form and decodes the JSON response into `T`.
    ///
    /// # Panics
    ///
    /// Panics if the path does not form a valid URL.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        form: MultipartForm,
    ) -> Completion<T> {
        let field_count = form.field_count();
        let request = self.build_multipart_request(path, headers, form);
        self.dispatch(request, Some(field_count)).await
    }

    /// Sends a PATCH with a JSON body and decodes the JSON response into `T`.
    ///
    /// # Panics
    ///
    /// Panics if the path does not form a valid URL.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Completion<T> {
        let request = self.build_request(
            HttpMethod::Patch,
            path,
            headers,
            &Query::new(),
            Some(body.into()),
        );
        self.dispatch(request, None).await
    }

    /// Sends a DELETE. The response body is ignored.
    ///
    /// Returns `None` on success, and also for non-2xx responses unless
    /// server error normalization is enabled.
    ///
    /// # Panics
    ///
    /// Panics if the path does not form a valid URL.
    pub async fn delete(&self, path: &str, headers: &[(&str, &str)]) -> Option<CourierError> {
        let request = self.build_request(HttpMethod::Delete, path, headers, &Query::new(), None);
        let outcome = self.send(request, None).await;
        decode_delete(outcome, self.normalize_server_errors)
    }

    // --- Callback API ---

    /// Callback flavor of [`get`](Self::get).
    ///
    /// The request is spawned on the current tokio runtime and `callback`
    /// runs through the configured [`CallbackExecutor`]. The URL is built
    /// before spawning, so a bad path panics in the caller.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if the path and query do
    /// not form a valid URL.
    pub fn get_with<T, F>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        query: Query,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Option<T>, Option<CourierError>) + Send + 'static,
    {
        let request = self.build_request(HttpMethod::Get, path, headers, &query, None);
        self.spawn_typed(request, None, callback)
    }

    /// Callback flavor of [`post`](Self::post).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if the path does not
    /// form a valid URL.
    pub fn post_with<T, F>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Option<T>, Option<CourierError>) + Send + 'static,
    {
        let request = self.build_request(
            HttpMethod::Post,
            path,
            headers,
            &Query::new(),
            Some(body.into()),
        );
        self.spawn_typed(request, None, callback)
    }

    /// Callback flavor of [`post_form`](Self::post_form).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if the path does not
    /// form a valid URL.
    pub fn post_form_with<T, F>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        form: MultipartForm,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Option<T>, Option<CourierError>) + Send + 'static,
    {
        let field_count = form.field_count();
        let request = self.build_multipart_request(path, headers, form);
        self.spawn_typed(request, Some(field_count), callback)
    }

    /// Callback flavor of [`patch`](Self::patch).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if the path does not
    /// form a valid URL.
    pub fn patch_with<T, F>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Option<T>, Option<CourierError>) + Send + 'static,
    {
        let request = self.build_request(
            HttpMethod::Patch,
            path,
            headers,
            &Query::new(),
            Some(body.into()),
        );
        self.spawn_typed(request, None, callback)
    }

    /// Callback flavor of [`delete`](Self::delete).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if the path does not
    /// form a valid URL.
    pub fn delete_with<F>(&self, path: &str, headers: &[(&str, &str)], callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<CourierError>) + Send + 'static,
    {
        let request = self.build_request(HttpMethod::Delete, path, headers, &Query::new(), None);
        let courier = self.clone();
        tokio::spawn(async move {
            let outcome = courier.send(request, None).await;
            let error = decode_delete(outcome, courier.normalize_server_errors);
            courier
                .callback_executor
                .execute(Box::new(move || callback(error)));
        })
    }

    // --- Internals ---

    fn spawn_typed<T, F>(
        &self,
        request: HttpRequest,
        multipart_fields: Option<usize>,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Option<T>, Option<CourierError>) + Send + 'static,
    {
        let courier = self.clone();
        tokio::spawn(async move {
            let (value, error) = courier
                .dispatch::<T>(request, multipart_fields)
                .await
                .into_parts();
            courier
                .callback_executor
                .execute(Box::new(move || callback(value, error)));
        })
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        multipart_fields: Option<usize>,
    ) -> Completion<T> {
        let outcome = self.send(request, multipart_fields).await;
        decode_typed(outcome, self.normalize_server_errors)
    }

    async fn send(
        &self,
        request: HttpRequest,
        multipart_fields: Option<usize>,
    ) -> Result<RawResponse, CourierError> {
        let method = request.method;
        let url = request.url.to_string();

        tracing::debug!("{} {}", method, url);

        // LOUD_WIRE: Log outgoing request
        let request_id = loud_wire::next_request_id();
        match multipart_fields {
            Some(fields) => loud_wire::log_multipart(
                request_id,
                &url,
                fields,
                request.body.as_ref().map_or(0, Bytes::len),
            ),
            None => loud_wire::log_request(request_id, method.as_str(), &url, request.body.as_deref()),
        }

        let outcome = self.transport.execute(request).await;

        match &outcome {
            Ok(response) => {
                tracing::debug!("{} {} completed: status={:?}", method, url, response.status);
                // LOUD_WIRE: Log response
                loud_wire::log_response_status(request_id, response.status);
                if let Some(body) = &response.body {
                    loud_wire::log_response_body(request_id, body);
                }
            }
            Err(e) => {
                tracing::debug!("{} {} failed: {}", method, url, e);
                loud_wire::log_transport_error(request_id, e);
            }
        }

        outcome
    }
}

/// Puts `content_type` first, then appends caller headers as-is.
fn with_default_header(content_type: String, headers: &[(&str, &str)]) -> Vec<(String, String)> {
    std::iter::once((CONTENT_TYPE_HEADER.to_string(), content_type))
        .chain(
            headers
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string())),
        )
        .collect()
}

use thiserror::Error;

/// Client-side error shape for server failures.
///
/// Produced by the error normalizer from a non-2xx response: either the
/// server's own `message` list joined with `", "`, or a fallback
/// `"<status> A server error occurred."` when the body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenericError {
    /// Human readable description.
    pub message: String,
    /// Status code reported by the server body, or the HTTP status when the
    /// body was unusable.
    pub code: Option<i64>,
}

impl GenericError {
    /// Creates a new error with the given message and code.
    #[must_use]
    pub fn new(message: impl Into<String>, code: Option<i64>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Defines errors that can occur when making requests through a
/// [`Courier`](crate::Courier).
///
/// Transport failures are passed through unmodified: reqwest errors land in
/// [`CourierError::Http`], errors from a custom [`Transport`](crate::Transport)
/// in [`CourierError::Transport`].
///
/// # Example: Handling errors
///
/// ```ignore
/// let (value, error) = courier.get::<User>("users/me", &[], Query::new()).await.into_parts();
/// match error {
///     Some(CourierError::Server(e)) => tracing::warn!("server said {} ({:?})", e.message, e.code),
///     Some(CourierError::Json(e)) => tracing::error!("unexpected payload: {e}"),
///     Some(other) => tracing::error!("request failed: {other}"),
///     None => {}
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourierError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    /// Error raised by a custom transport, kept as-is.
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Normalized non-2xx response.
    ///
    /// Only produced when the client was built with
    /// `normalize_server_errors(true)`.
    #[error("Server error: {0}")]
    Server(#[from] GenericError),
    /// The base URL handed to `try_build()` was rejected.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    /// Failed to build the underlying HTTP client.
    ///
    /// This typically only occurs in exceptional circumstances such as
    /// TLS backend initialization failures.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl CourierError {
    /// Wraps an error coming from a custom transport.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport(error.into())
    }

    /// Returns the status code associated with this error, if any.
    ///
    /// For [`CourierError::Server`] this is the code from the normalized
    /// error, which may differ from the HTTP status line.
    #[must_use]
    pub fn status_code(&self) -> Option<i64> {
        match self {
            Self::Server(e) => e.code,
            Self::Http(e) => e.status().map(|s| i64::from(s.as_u16())),
            Self::Transport(_)
            | Self::Json(_)
            | Self::InvalidBaseUrl(_)
            | Self::ClientBuild(_) => None,
        }
    }
}

//! Response decoding: turns what the transport observed into a [`Completion`].
//!
//! Typed calls (GET, POST, PATCH) follow these rules, in order:
//!
//! 1. A status outside `200..=299` completes with no value. The error slot
//!    holds the transport's error, which is empty for a well-formed HTTP
//!    error response, unless server error normalization is enabled, in
//!    which case it holds [`CourierError::Server`].
//! 2. A transport error, or an absent/empty body, completes with no value
//!    and that error (possibly empty).
//! 3. Otherwise the body is parsed as JSON into `T`.
//!
//! DELETE never parses a body and completes with an error slot only.

use super::error_helpers::{normalize_error, preview};
use super::transport::RawResponse;
use crate::errors::CourierError;
use serde::de::DeserializeOwned;

/// The outcome of a typed call.
///
/// At most one of value and error is populated. Both are empty when the
/// server answered with a non-2xx status and normalization is off, or when
/// a 2xx response carried no body.
#[derive(Debug)]
pub struct Completion<T> {
    value: Option<T>,
    error: Option<CourierError>,
    status: Option<u16>,
}

impl<T> Completion<T> {
    pub(crate) const fn success(value: T, status: Option<u16>) -> Self {
        Self {
            value: Some(value),
            error: None,
            status,
        }
    }

    pub(crate) const fn failure(error: Option<CourierError>, status: Option<u16>) -> Self {
        Self {
            value: None,
            error,
            status,
        }
    }

    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub const fn error(&self) -> Option<&CourierError> {
        self.error.as_ref()
    }

    /// HTTP status of the response, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.value.is_some()
    }

    /// The `(value, error)` pair handed to completion callbacks.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Option<CourierError>) {
        (self.value, self.error)
    }

    /// Converts to a `Result`. `Ok(None)` is a completion with neither a
    /// value nor an error.
    ///
    /// # Errors
    ///
    /// Returns the completion's error, if it has one.
    pub fn into_result(self) -> Result<Option<T>, CourierError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

/// Decodes the outcome of a GET, POST or PATCH.
pub(crate) fn decode_typed<T: DeserializeOwned>(
    outcome: Result<RawResponse, CourierError>,
    normalize_server_errors: bool,
) -> Completion<T> {
    let response = match outcome {
        Ok(response) => response,
        Err(error) => return Completion::failure(Some(error), None),
    };
    let status = response.status;

    if let Some(error) = http_failure(&response, normalize_server_errors) {
        return Completion::failure(error, status);
    }

    let Some(body) = response.body.filter(|b| !b.is_empty()) else {
        tracing::debug!("Response has no body; completing without a value");
        return Completion::failure(None, status);
    };

    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Completion::success(value, status),
        Err(e) => {
            tracing::warn!(
                "Failed to decode response body as {}: {} | Context: {}",
                std::any::type_name::<T>(),
                e,
                preview(&body)
            );
            Completion::failure(Some(e.into()), status)
        }
    }
}

/// Decodes the outcome of a DELETE.
pub(crate) fn decode_delete(
    outcome: Result<RawResponse, CourierError>,
    normalize_server_errors: bool,
) -> Option<CourierError> {
    match outcome {
        Ok(response) => http_failure(&response, normalize_server_errors).flatten(),
        Err(error) => Some(error),
    }
}

/// `Some(error slot)` when the response status is outside `200..=299`.
fn http_failure(
    response: &RawResponse,
    normalize_server_errors: bool,
) -> Option<Option<CourierError>> {
    if !response.is_http_failure() {
        return None;
    }
    let status = response.status?;

    tracing::debug!("Request failed with HTTP {}", status);

    if normalize_server_errors {
        let error = normalize_error(response.body.as_deref(), status);
        Some(Some(CourierError::Server(error)))
    } else {
        Some(None)
    }
}

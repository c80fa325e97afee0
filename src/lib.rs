//! # courier
//!
//! A small HTTP client convenience layer. It builds requests, hands them to
//! an HTTP transport (reqwest by default), decodes JSON responses into typed
//! values and normalizes server error bodies into one error shape.
//!
//! Connection management, TLS and timeouts belong to the transport; courier
//! only shapes requests and interprets responses.
//!
//! # Quick start
//!
//! ```no_run
//! use courier::{Courier, MultipartForm, Query};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let courier = Courier::builder("https://api.example.com/v1/")
//!     .normalize_server_errors(true)
//!     .build();
//!
//! // GET users?name=Ada+Lovelace
//! let users = courier
//!     .get::<Vec<User>>("users", &[("Authorization", "Bearer token")], Query::new().param("name", "Ada Lovelace"))
//!     .await
//!     .into_result()?;
//!
//! // Multipart upload
//! let mut form = MultipartForm::new();
//! form.add_text_field("caption", "profile picture");
//! form.add_data_field("avatar", &std::fs::read("avatar.png")?);
//! let user = courier.post_form::<User>("users/1/avatar", &[], form).await.into_result()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Completion semantics
//!
//! Every typed call resolves to a [`Completion`]: a value, an error, or
//! neither, never both. By default a non-2xx response yields neither, so
//! callers check [`Completion::status`]; enable
//! [`CourierBuilder::normalize_server_errors`] to receive
//! [`CourierError::Server`] instead.
//!
//! # Callbacks
//!
//! The `*_with` methods spawn the request and deliver `(value, error)` to a
//! callback through a [`CallbackExecutor`], e.g. a [`CallbackQueue`] drained
//! by a single designated task.
//!
//! # Debugging
//!
//! Set `LOUD_WIRE=1` to print every request and response to stderr.

mod callback;
mod client;
mod errors;
mod http;
mod multipart;

pub use callback::{Callback, CallbackExecutor, CallbackQueue, InlineExecutor, QueueExecutor};
pub use client::{Courier, CourierBuilder};
pub use errors::{CourierError, GenericError};
pub use http::common::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT, HttpMethod, HttpRequest, Query,
};
pub use http::dispatch::Completion;
pub use http::error_helpers::{ApiError, normalize_error};
pub use http::transport::{RawResponse, ReqwestTransport, Transport};
pub use multipart::{MultipartForm, mime_type_for};

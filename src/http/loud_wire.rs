//! Wire-level debugging via LOUD_WIRE environment variable.
//!
//! When `LOUD_WIRE` is set to any value, prints requests and responses to
//! stderr with pretty formatting and colors.
//!
//! # Usage
//!
//! ```bash
//! LOUD_WIRE=1 cargo test --test client_tests
//! ```
//!
//! # Output Format
//!
//! - Green `>>>` for outgoing requests
//! - Red `<<<` for incoming responses
//! - Timestamps and request IDs for correlation
//!
//! Multipart bodies are summarized rather than dumped, and long JSON string
//! values are truncated to keep output readable.

use super::error_helpers::truncate_for_context;
use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Request ID counter for correlating requests with responses
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Cached check for whether LOUD_WIRE is enabled
static ENABLED: OnceLock<bool> = OnceLock::new();

/// Maximum length of a JSON string value before truncation.
const TRUNCATE_THRESHOLD: usize = 200;

/// Maximum length of a non-JSON body before truncation.
const RAW_BODY_LIMIT: usize = 1000;

/// Check if LOUD_WIRE debugging is enabled.
///
/// The result is cached after first check. `LOUD_WIRE` must be set before
/// the first request is made.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Truncate long string values anywhere in a JSON value.
fn truncate_long_strings(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) if s.len() > TRUNCATE_THRESHOLD => {
            *s = truncate_for_context(s, TRUNCATE_THRESHOLD);
        }
        serde_json::Value::Object(map) => {
            for val in map.values_mut() {
                truncate_long_strings(val);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                truncate_long_strings(item);
            }
        }
        _ => {}
    }
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Log prefix with timestamp and request ID.
fn prefix(request_id: usize) -> String {
    let ts = timestamp().dimmed();
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        ts,
        format!("[REQ#{}]", request_id).cyan()
    )
}

/// Pretty-prints a body under `label`, JSON when possible.
fn print_body(prefix: &str, label: &str, body: &[u8]) {
    if let Ok(mut parsed) = serde_json::from_slice::<serde_json::Value>(body) {
        truncate_long_strings(&mut parsed);
        eprintln!("{prefix} {label}:");
        let rendered = colored_json::to_colored_json_auto(&parsed)
            .ok()
            .or_else(|| serde_json::to_string_pretty(&parsed).ok());
        if let Some(rendered) = rendered {
            for line in rendered.lines() {
                eprintln!("{prefix} {line}");
            }
        }
    } else {
        let text = String::from_utf8_lossy(body);
        eprintln!(
            "{prefix} {label}: {}",
            truncate_for_context(&text, RAW_BODY_LIMIT)
        );
    }
}

/// Log an outgoing HTTP request.
pub fn log_request(request_id: usize, method: &str, url: &str, body: Option<&[u8]>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();

    eprintln!("{prefix} {direction} {method} {url}");

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        print_body(&prefix, &"Body".green().to_string(), body);
    }
}

/// Log an outgoing multipart upload as a one-line summary.
pub fn log_multipart(request_id: usize, url: &str, field_count: usize, size: usize) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();

    eprintln!(
        "{prefix} {direction} {} {url} ({field_count} fields, {size} bytes)",
        "POST multipart".green().bold()
    );
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: Option<u16>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = "<<<".red().bold();
    let status_text = match status {
        Some(status) if (200..=299).contains(&status) => format!("{status} OK").green(),
        Some(status) => format!("{status} ERROR").red(),
        None => "(no status)".yellow(),
    };

    eprintln!("{prefix} {direction} {status_text}");
}

/// Log an incoming HTTP response body.
pub fn log_response_body(request_id: usize, body: &[u8]) {
    if !is_enabled() || body.is_empty() {
        return;
    }

    let prefix = prefix(request_id);
    print_body(&prefix, &"Response".red().to_string(), body);
}

/// Log a transport-level failure.
pub fn log_transport_error(request_id: usize, error: &dyn std::fmt::Display) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = "<<<".red().bold();

    eprintln!("{prefix} {direction} {} {error}", "FAILED".red().bold());
}

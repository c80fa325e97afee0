//! Normalization of server error bodies and error context formatting.

use crate::errors::GenericError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum characters to include from a body in log context
const BODY_PREVIEW_LENGTH: usize = 200;

/// The server's own error shape.
///
/// On the wire `message` is either a single string or an array of strings:
///
/// ```json
/// {"statusCode": 400, "message": "email is required"}
/// {"statusCode": 400, "message": ["email is required", "name is too long"]}
/// ```
///
/// Both decode to a non-empty, ordered `message` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status_code: i64,
    #[serde(deserialize_with = "one_or_many")]
    pub message: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(message) => Ok(vec![message]),
        OneOrMany::Many(messages) if messages.is_empty() => {
            Err(D::Error::custom("message array must not be empty"))
        }
        OneOrMany::Many(messages) => Ok(messages),
    }
}

impl From<ApiError> for GenericError {
    fn from(error: ApiError) -> Self {
        Self::new(error.message.join(", "), Some(error.status_code))
    }
}

/// Maps a non-2xx response body to a [`GenericError`].
///
/// If the body decodes as an [`ApiError`], its messages are joined with
/// `", "` and its `statusCode` is used as the code, even when it disagrees
/// with `status`. Otherwise the message is `"<status> A server error
/// occurred."` and the code is `status`.
#[must_use]
pub fn normalize_error(body: Option<&[u8]>, status: u16) -> GenericError {
    let decoded = body.map(|bytes| serde_json::from_slice::<ApiError>(bytes));

    match decoded {
        Some(Ok(api_error)) => api_error.into(),
        Some(Err(e)) => {
            tracing::debug!(
                "Error body is not an API error ({}): {}",
                e,
                preview(body.unwrap_or_default())
            );
            fallback_error(status)
        }
        None => fallback_error(status),
    }
}

fn fallback_error(status: u16) -> GenericError {
    GenericError::new(
        format!("{status} A server error occurred."),
        Some(i64::from(status)),
    )
}

/// Lossy UTF-8 preview of a body, truncated for log context.
pub(crate) fn preview(body: &[u8]) -> String {
    truncate_for_context(&String::from_utf8_lossy(body), BODY_PREVIEW_LENGTH)
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_single_message() {
        let error: ApiError =
            serde_json::from_str(r#"{"statusCode": 400, "message": "x"}"#).unwrap();
        assert_eq!(error.status_code, 400);
        assert_eq!(error.message, vec!["x"]);
    }

    #[test]
    fn test_api_error_message_array() {
        let error: ApiError =
            serde_json::from_str(r#"{"statusCode": 422, "message": ["x", "y"]}"#).unwrap();
        assert_eq!(error.status_code, 422);
        assert_eq!(error.message, vec!["x", "y"]);
    }

    #[test]
    fn test_api_error_ignores_extra_fields() {
        let error: ApiError = serde_json::from_str(
            r#"{"statusCode": 401, "message": "Unauthorized", "error": "Unauthorized"}"#,
        )
        .unwrap();
        assert_eq!(error.message, vec!["Unauthorized"]);
    }

    #[test]
    fn test_api_error_rejects_empty_array() {
        let result = serde_json::from_str::<ApiError>(r#"{"statusCode": 400, "message": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_api_error_rejects_wrong_shapes() {
        for body in [
            r#"{"message": "missing status"}"#,
            r#"{"statusCode": 400}"#,
            r#"{"statusCode": 400, "message": 12}"#,
            r#"{"statusCode": "400", "message": "x"}"#,
            r#"{"statusCode": 400, "message": ["x", 1]}"#,
        ] {
            assert!(
                serde_json::from_str::<ApiError>(body).is_err(),
                "expected failure for {body}"
            );
        }
    }

    #[test]
    fn test_normalize_joins_messages_and_trusts_body_status() {
        let body = br#"{"statusCode": 409, "message": ["email taken", "name taken"]}"#;
        let error = normalize_error(Some(body), 400);
        assert_eq!(error.message, "email taken, name taken");
        assert_eq!(error.code, Some(409));
    }

    #[test]
    fn test_normalize_single_message() {
        let body = br#"{"statusCode": 403, "message": "Forbidden resource"}"#;
        let error = normalize_error(Some(body), 403);
        assert_eq!(error.message, "Forbidden resource");
        assert_eq!(error.code, Some(403));
    }

    #[test]
    fn test_normalize_absent_body() {
        let error = normalize_error(None, 404);
        assert_eq!(error.message, "404 A server error occurred.");
        assert_eq!(error.code, Some(404));
    }

    #[test]
    fn test_normalize_unparseable_body() {
        let error = normalize_error(Some(b"<html>Bad Gateway</html>"), 502);
        assert_eq!(error.message, "502 A server error occurred.");
        assert_eq!(error.code, Some(502));
    }

    #[test]
    fn test_normalize_empty_body() {
        let error = normalize_error(Some(b""), 500);
        assert_eq!(error.message, "500 A server error occurred.");
        assert_eq!(error.code, Some(500));
    }

    #[test]
    fn test_truncate_for_context_short_string() {
        assert_eq!(truncate_for_context("Short", 100), "Short");
    }

    #[test]
    fn test_truncate_for_context_long_string() {
        let long_str = "a".repeat(300);
        let result = truncate_for_context(&long_str, 200);
        assert_eq!(result.len(), 203); // 200 + "..."
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_for_context_utf8_boundary() {
        let emoji_str = "x".repeat(198) + "🎉"; // 198 + 4 = 202 bytes total
        let result = truncate_for_context(&emoji_str, 200);
        assert_eq!(result.len(), 201);
        assert!(!result.contains("🎉"));
    }

    #[test]
    fn test_preview_handles_invalid_utf8() {
        let result = preview(&[0xff, 0xfe, b'o', b'k']);
        assert!(result.ends_with("ok"));
    }
}

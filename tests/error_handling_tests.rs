// Tests for server error normalization
use courier::{ApiError, CourierError, GenericError, normalize_error};
use proptest::prelude::*;

#[test]
fn test_single_string_message_becomes_one_element_list() {
    let error: ApiError = serde_json::from_str(r#"{"statusCode":400,"message":"x"}"#).unwrap();
    assert_eq!(error.message, vec!["x".to_string()]);
}

#[test]
fn test_array_message_is_kept_in_order() {
    let error: ApiError =
        serde_json::from_str(r#"{"statusCode":400,"message":["x","y"]}"#).unwrap();
    assert_eq!(error.message, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn test_absent_body_404() {
    let error = normalize_error(None, 404);
    assert_eq!(error, GenericError::new("404 A server error occurred.", Some(404)));
}

#[test]
fn test_unparseable_body_404() {
    let error = normalize_error(Some(b"Not Found"), 404);
    assert_eq!(error.message, "404 A server error occurred.");
    assert_eq!(error.code, Some(404));
}

#[test]
fn test_body_status_code_wins_over_http_status() {
    let error = normalize_error(Some(br#"{"statusCode":418,"message":"teapot"}"#), 500);
    assert_eq!(error.code, Some(418));
    assert_eq!(error.message, "teapot");
}

#[test]
fn test_generic_error_converts_into_courier_error() {
    let error: CourierError = GenericError::new("boom", Some(500)).into();
    assert!(matches!(error, CourierError::Server(_)));
    assert_eq!(error.to_string(), "Server error: boom");
}

proptest! {
    #[test]
    fn array_messages_join_with_comma_space(
        status in 400i64..600,
        messages in prop::collection::vec("[a-zA-Z0-9 .]{0,20}", 1..5),
    ) {
        let body = serde_json::json!({"statusCode": status, "message": messages}).to_string();
        let error = normalize_error(Some(body.as_bytes()), 500);
        prop_assert_eq!(error.message, messages.join(", "));
        prop_assert_eq!(error.code, Some(status));
    }

    #[test]
    fn single_message_is_used_verbatim(status in 400i64..600, message in ".{0,40}") {
        let body = serde_json::json!({"statusCode": status, "message": message}).to_string();
        let error = normalize_error(Some(body.as_bytes()), 500);
        prop_assert_eq!(error.message, message);
        prop_assert_eq!(error.code, Some(status));
    }

    #[test]
    fn non_api_bodies_fall_back(status in 400u16..600, body in "[a-z <>/]{0,40}") {
        let error = normalize_error(Some(body.as_bytes()), status);
        prop_assert_eq!(error.message, format!("{status} A server error occurred."));
        prop_assert_eq!(error.code, Some(i64::from(status)));
    }
}

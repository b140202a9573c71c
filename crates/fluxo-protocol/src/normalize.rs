//! Turning a failed HTTP response into an [`ApiError`].
//!
//! The backend reports errors in a few different shapes:
//!
//! ```text
//! 422  {"detail": [{"loc": ["body", "email"], "msg": "invalid", ...}]}
//! 4xx  {"detail": "Incorrect email or password"}
//! 4xx  {"message": "..."}
//! 5xx  <html>Internal Server Error</html>
//! ```
//!
//! [`normalize_error`] collapses all of them into one message string.

use serde_json::{Map, Value};

use crate::ApiError;

/// The status the backend uses for request validation failures.
const VALIDATION_STATUS: u16 = 422;

const VALIDATION_PREFIX: &str = "Validation error: ";

/// Builds the [`ApiError`] for a response with a failure status.
///
/// `body` is the raw response body. If it isn't a JSON object it is
/// treated as `{}`, so the status code alone decides the message.
///
/// Resolution order:
/// 1. 422 with a non-empty `detail` list → `"Validation error: a.b: msg, ..."`
/// 2. any other non-null `detail` → the detail text (prefixed only on 422)
/// 3. a string `message` field
/// 4. `"HTTP error! status: <code>"`
pub fn normalize_error(status: u16, body: &[u8]) -> ApiError {
    let object = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let validation = status == VALIDATION_STATUS;

    let err = match object.get("detail") {
        Some(Value::Array(items)) if validation && !items.is_empty() => {
            let joined = items
                .iter()
                .map(render_field_error)
                .collect::<Vec<_>>()
                .join(", ");
            ApiError::new(format!("{VALIDATION_PREFIX}{joined}"))
                .with_detail(Value::Array(items.clone()).to_string())
        }
        Some(Value::Null) | None => fallback(status, &object),
        Some(Value::Array(items)) if items.is_empty() => {
            fallback(status, &object)
        }
        Some(detail) => {
            let text = render_value(detail);
            let message = if validation {
                format!("{VALIDATION_PREFIX}{text}")
            } else {
                text
            };
            let err = ApiError::new(message);
            if detail.is_string() {
                err
            } else {
                err.with_detail(detail.to_string())
            }
        }
    };

    err.with_status(status)
}

/// `message` field, else the generic status line.
fn fallback(status: u16, object: &Map<String, Value>) -> ApiError {
    match object.get("message") {
        Some(Value::String(message)) => ApiError::new(message.clone()),
        _ => ApiError::new(format!("HTTP error! status: {status}")),
    }
}

/// Renders one entry of a 422 `detail` list as `"<loc path>: <msg>"`.
fn render_field_error(item: &Value) -> String {
    let msg = item.get("msg").map(render_value);
    let loc = item.get("loc").and_then(Value::as_array).map(|parts| {
        parts.iter().map(render_value).collect::<Vec<_>>().join(".")
    });

    match (loc, msg) {
        (Some(loc), Some(msg)) if !loc.is_empty() => format!("{loc}: {msg}"),
        (_, Some(msg)) => msg,
        (_, None) => render_value(item),
    }
}

/// Strings without quotes; everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    // =====================================================================
    // 422 detail lists
    // =====================================================================

    #[test]
    fn test_normalize_422_single_field_error() {
        let raw = body(serde_json::json!({
            "detail": [{"loc": ["body", "email"], "msg": "invalid"}]
        }));

        let err = normalize_error(422, &raw);

        assert_eq!(err.message, "Validation error: body.email: invalid");
        assert_eq!(err.status, Some(422));
        assert!(err.detail.is_some(), "raw list kept for logs");
    }

    #[test]
    fn test_normalize_422_multiple_field_errors_comma_joined() {
        let raw = body(serde_json::json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
                {"loc": ["body", "password"], "msg": "ensure this value has at least 8 characters"}
            ]
        }));

        let err = normalize_error(422, &raw);

        assert_eq!(
            err.message,
            "Validation error: body.email: value is not a valid email address, \
             body.password: ensure this value has at least 8 characters"
        );
    }

    #[test]
    fn test_normalize_422_numeric_loc_segments() {
        let raw = body(serde_json::json!({
            "detail": [{"loc": ["query", "limit", 0], "msg": "bad"}]
        }));

        let err = normalize_error(422, &raw);

        assert_eq!(err.message, "Validation error: query.limit.0: bad");
    }

    #[test]
    fn test_normalize_422_item_without_loc_uses_msg() {
        let raw = body(serde_json::json!({"detail": [{"msg": "bad input"}]}));

        let err = normalize_error(422, &raw);

        assert_eq!(err.message, "Validation error: bad input");
    }

    #[test]
    fn test_normalize_422_string_detail_is_prefixed() {
        let raw = body(serde_json::json!({"detail": "code expired"}));

        let err = normalize_error(422, &raw);

        assert_eq!(err.message, "Validation error: code expired");
    }

    #[test]
    fn test_normalize_422_empty_list_falls_back() {
        let raw = body(serde_json::json!({"detail": []}));

        let err = normalize_error(422, &raw);

        assert_eq!(err.message, "HTTP error! status: 422");
    }

    // =====================================================================
    // Other statuses
    // =====================================================================

    #[test]
    fn test_normalize_string_detail_used_as_is() {
        let raw =
            body(serde_json::json!({"detail": "Incorrect email or password"}));

        let err = normalize_error(401, &raw);

        assert_eq!(err.message, "Incorrect email or password");
        assert!(err.is_unauthorized());
        assert_eq!(err.detail, None);
    }

    #[test]
    fn test_normalize_object_detail_rendered_as_json() {
        let raw = body(serde_json::json!({"detail": {"reason": "quota"}}));

        let err = normalize_error(429, &raw);

        assert_eq!(err.message, r#"{"reason":"quota"}"#);
    }

    #[test]
    fn test_normalize_list_detail_outside_422_rendered_as_json() {
        let raw = body(serde_json::json!({"detail": ["a"]}));

        let err = normalize_error(400, &raw);

        assert_eq!(err.message, r#"["a"]"#);
    }

    #[test]
    fn test_normalize_message_field_fallback() {
        let raw = body(serde_json::json!({"message": "maintenance"}));

        let err = normalize_error(503, &raw);

        assert_eq!(err.message, "maintenance");
    }

    #[test]
    fn test_normalize_null_detail_falls_back_to_message() {
        let raw =
            body(serde_json::json!({"detail": null, "message": "try later"}));

        let err = normalize_error(500, &raw);

        assert_eq!(err.message, "try later");
    }

    #[test]
    fn test_normalize_non_json_body_uses_status_line() {
        let err = normalize_error(500, b"<html>Internal Server Error</html>");

        assert_eq!(err.message, "HTTP error! status: 500");
        assert_eq!(err.status, Some(500));
    }

    #[test]
    fn test_normalize_empty_body_uses_status_line() {
        let err = normalize_error(404, b"");

        assert_eq!(err.message, "HTTP error! status: 404");
    }

    #[test]
    fn test_normalize_json_array_body_treated_as_empty_object() {
        let err = normalize_error(400, b"[1, 2]");

        assert_eq!(err.message, "HTTP error! status: 400");
    }
}

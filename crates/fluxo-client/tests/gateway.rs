//! Integration tests for `ApiClient` against an in-process mock backend.
//!
//! Each test starts a tiny axum app on a random port, points a real
//! `ApiClient` at it, and checks both what the client sent and how it
//! interpreted the reply.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use fluxo_client::{ApiClient, ClientConfig, Method};
use fluxo_protocol::{
    ChangePasswordRequest, ConfirmEmailRequest, HistoryQuery, LoginRequest,
    StyleId, UNEXPECTED_ERROR,
};
use serde_json::{Value, json};

// =========================================================================
// Helpers
// =========================================================================

/// Serves `app` on 127.0.0.1:0 and returns a client pointed at it.
async fn serve(app: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    ApiClient::new(&ClientConfig::with_base_url(format!("http://{addr}")))
        .expect("client should build")
}

/// Serves one connection with `head` followed by the first bytes of a
/// body that is longer than `Content-Length` promises, then hangs up.
async fn serve_truncated(head: &'static str) -> ApiClient {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind raw backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let reply = format!(
            "{head}\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{{\"det"
        );
        let _ = socket.write_all(reply.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    ApiClient::new(&ClientConfig::with_base_url(format!("http://{addr}")))
        .expect("client should build")
}

fn user_body(email: &str) -> Value {
    json!({
        "id": 1,
        "email": email,
        "name": "Ada",
        "is_email_confirmed": true,
        "daily_limit": 10,
        "requests_today": 2,
        "last_request_date": null,
        "created_at": "2024-04-01T09:00:00",
        "updated_at": "2024-04-01T09:00:00"
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn credentials() -> LoginRequest {
    LoginRequest {
        email: "ada@example.com".into(),
        password: "secret123".into(),
    }
}

// =========================================================================
// Request shape
// =========================================================================

#[tokio::test]
async fn test_login_sends_json_body_and_returns_token() {
    let app = Router::new().route(
        "/auth/login",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(
                headers.get("content-type").unwrap(),
                "application/json"
            );
            assert!(headers.get("authorization").is_none());
            assert_eq!(body["email"], "ada@example.com");
            Json(json!({"access_token": "tok-1", "token_type": "bearer"}))
        }),
    );
    let client = serve(app).await;

    let auth = client.login(&credentials()).await.expect("login");

    assert_eq!(auth.access_token, "tok-1");
    assert_eq!(auth.token_type, "bearer");
}

#[tokio::test]
async fn test_current_user_sends_bearer_token() {
    let app = Router::new().route(
        "/auth/me",
        get(|headers: HeaderMap| async move {
            match bearer(&headers).as_deref() {
                Some("tok-1") => {
                    (StatusCode::OK, Json(user_body("ada@example.com")))
                }
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Could not validate credentials"})),
                ),
            }
        }),
    );
    let client = serve(app).await;

    let user = client.current_user("tok-1").await.expect("profile");
    assert_eq!(user.email, "ada@example.com");

    let err = client.current_user("stale").await.unwrap_err();
    assert_eq!(err.message, "Could not validate credentials");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_prompt_history_passes_pagination() {
    let app = Router::new().route(
        "/prompts/history",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!([{
                "id": 3,
                "user_id": 1,
                "original_prompt": format!(
                    "limit={} offset={}", params["limit"], params["offset"]
                ),
                "style_id": 2,
                "generated_prompt": "done",
                "created_at": "2024-04-01T09:00:00"
            }]))
        }),
    );
    let client = serve(app).await;

    let records = client
        .prompt_history(HistoryQuery { limit: 5, offset: 10 }, "tok")
        .await
        .expect("history");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].original_prompt, "limit=5 offset=10");
    assert_eq!(records[0].style_id, Some(StyleId(2)));
}

#[tokio::test]
async fn test_styles_and_limits_and_health() {
    let app = Router::new()
        .route(
            "/prompts/styles",
            get(|| async {
                Json(json!({
                    "1": {"name": "Professional", "description": "Expert"},
                    "2": {"name": "Creative", "description": "Bold"}
                }))
            }),
        )
        .route(
            "/prompts/limits",
            get(|| async {
                Json(json!({
                    "daily_limit": 10,
                    "requests_today": 4,
                    "remaining_requests": 6,
                    "last_request_date": "2024-05-01"
                }))
            }),
        )
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }));
    let client = serve(app).await;

    let styles = client.prompt_styles("tok").await.expect("styles");
    assert_eq!(styles.len(), 2);
    assert_eq!(styles.get(StyleId(2)).unwrap().name, "Creative");

    let limits = client.usage_limits("tok").await.expect("limits");
    assert_eq!(limits.remaining_requests, 6);

    assert!(client.health().await.expect("health").is_ok());
}

#[tokio::test]
async fn test_change_password_posts_with_token() {
    let app = Router::new().route(
        "/auth/change-password",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(bearer(&headers).as_deref(), Some("tok"));
            assert_eq!(body["current_password"], "old-password");
            assert_eq!(body["new_password"], "new-password");
            Json(json!({"message": "Password changed"}))
        }),
    );
    let client = serve(app).await;

    let resp = client
        .change_password(
            &ChangePasswordRequest {
                current_password: "old-password".into(),
                new_password: "new-password".into(),
            },
            "tok",
        )
        .await
        .expect("change password");

    assert_eq!(resp.message, "Password changed");
}

#[tokio::test]
async fn test_generic_request_contract() {
    let app = Router::new().route(
        "/custom",
        axum::routing::put(|Json(body): Json<Value>| async move {
            Json(json!({"echo": body}))
        }),
    );
    let client = serve(app).await;

    let value: Value = client
        .request(Method::PUT, "/custom", Some(&json!({"a": 1})), None)
        .await
        .expect("custom request");

    assert_eq!(value, json!({"echo": {"a": 1}}));
}

// =========================================================================
// Error normalization
// =========================================================================

#[tokio::test]
async fn test_422_field_errors_become_one_message() {
    let app = Router::new().route(
        "/auth/confirm-email",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [{"loc": ["body", "email"], "msg": "invalid"}]
                })),
            )
        }),
    );
    let client = serve(app).await;

    let err = client
        .confirm_email(&ConfirmEmailRequest {
            email: "nope".into(),
            code: "123456".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.message, "Validation error: body.email: invalid");
    assert_eq!(err.status, Some(422));
}

#[tokio::test]
async fn test_500_with_html_body_uses_status_line() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "<html>Internal Server Error</html>",
            )
        }),
    );
    let client = serve(app).await;

    let err = client.health().await.unwrap_err();

    assert_eq!(err.message, "HTTP error! status: 500");
}

#[tokio::test]
async fn test_500_with_truncated_body_uses_status_line() {
    let client = serve_truncated("HTTP/1.1 500 Internal Server Error").await;

    let err = client.health().await.unwrap_err();

    assert_eq!(err.message, "HTTP error! status: 500");
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn test_200_with_truncated_body_is_unexpected_error() {
    let client = serve_truncated("HTTP/1.1 200 OK").await;

    let err = client.health().await.unwrap_err();

    assert_eq!(err.message, UNEXPECTED_ERROR);
    assert_eq!(err.status, Some(200));
}

#[tokio::test]
async fn test_message_field_used_when_no_detail() {
    let app = Router::new().route(
        "/prompts/limits",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"message": "down for maintenance"})),
            )
        }),
    );
    let client = serve(app).await;

    let err = client.usage_limits("tok").await.unwrap_err();

    assert_eq!(err.message, "down for maintenance");
}

#[tokio::test]
async fn test_success_with_wrong_shape_is_unexpected_error() {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"healthy": true})) }));
    let client = serve(app).await;

    let err = client.health().await.unwrap_err();

    assert_eq!(err.message, UNEXPECTED_ERROR);
    assert_eq!(err.status, Some(200));
}

#[tokio::test]
async fn test_connection_refused_is_unexpected_error() {
    // Grab a free port, then close the listener so nothing answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client =
        ApiClient::new(&ClientConfig::with_base_url(format!("http://{addr}")))
            .expect("client");

    let err = client.health().await.unwrap_err();

    assert_eq!(err.message, UNEXPECTED_ERROR);
    assert!(err.is_transport());
    assert!(err.detail.is_some());
}

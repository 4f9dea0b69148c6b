//! Webhook receiver signature checks and acknowledgements

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use ocr_sync::webhook::{build_webhook_routes, sign, WebhookState, WebhookVerifier, SIGNATURE_HEADER};
use secrecy::SecretString;
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "webhook-test-secret";

fn routes(secret: Option<&str>) -> Router {
    build_webhook_routes(WebhookState {
        verifier: Arc::new(WebhookVerifier::new(
            secret.map(|s| SecretString::new(s.to_string())),
        )),
    })
}

async fn deliver(
    app: Router,
    event: &str,
    body: &str,
    signature: Option<String>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("X-GitHub-Event", event);
    if let Some(signature) = signature {
        request = request.header(SIGNATURE_HEADER, signature);
    }

    let response = app
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_pull_request_opened() {
    let body = r#"{"action":"opened","pull_request":{"number":42,"title":"Add OCR retries"},"repository":{"full_name":"octocat/scans"}}"#;

    let (status, ack) = deliver(routes(Some(SECRET)), "pull_request", body, Some(sign(SECRET, body.as_bytes()).unwrap())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "success");
    assert_eq!(ack["message"], "Pull request #42 opened: Add OCR retries");
}

#[tokio::test]
async fn test_issue_created() {
    let body = r#"{"action":"created","issue":{"number":7,"title":"Blurry scans"}}"#;

    let (status, ack) = deliver(routes(Some(SECRET)), "issues", body, Some(sign(SECRET, body.as_bytes()).unwrap())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], "Issue #7 created: Blurry scans");
}

#[tokio::test]
async fn test_push_is_acknowledged() {
    let body = r#"{"ref":"refs/heads/main","commits":[{"id":"abc"}]}"#;

    let (status, ack) = deliver(routes(Some(SECRET)), "push", body, Some(sign(SECRET, body.as_bytes()).unwrap())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], "Webhook received");
}

#[tokio::test]
async fn test_bad_or_missing_signature() {
    let body = r#"{"action":"opened"}"#;

    let (status, ack) = deliver(routes(Some(SECRET)), "pull_request", body, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ack["status"], "error");

    let forged = sign("wrong-secret", body.as_bytes()).unwrap();
    let (status, _) = deliver(routes(Some(SECRET)), "pull_request", body, Some(forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json() {
    let body = "{not json";

    let (status, ack) = deliver(routes(Some(SECRET)), "push", body, Some(sign(SECRET, body.as_bytes()).unwrap())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ack["status"], "error");
}

#[tokio::test]
async fn test_refused_without_secret() {
    let body = r#"{"action":"opened"}"#;

    let (status, _) = deliver(routes(None), "pull_request", body, Some(sign(SECRET, body.as_bytes()).unwrap())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

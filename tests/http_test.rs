// Router tests: pre-flight handling, JSON report, error responses

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use nexgo_seeder::backend::{memory::Operation, MemoryBackend};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

fn assert_cors_headers(headers: &axum::http::HeaderMap) {
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    let allowed = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        allowed,
        "authorization, x-client-info, apikey, content-type, x-supabase-client-platform, \
         x-supabase-client-platform-version, x-supabase-client-runtime, \
         x-supabase-client-runtime-version"
    );
}

#[tokio::test]
async fn test_preflight_returns_ok_without_backend_calls() {
    let backend = Arc::new(MemoryBackend::new());
    let app = common::create_test_app(&backend);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/")
                .header("Origin", "http://localhost:5173")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(response.headers());
    assert_eq!(common::body_string(response).await, "ok");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_post_runs_seeding_and_returns_json() {
    let backend = Arc::new(MemoryBackend::new().with_signup_balance(0.0));
    let app = common::create_test_app(&backend);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(response.headers());
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let json = common::body_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 6);

    assert_eq!(results[0]["email"], common::STUDENT);
    assert_eq!(results[0]["status"], "created");
    assert!(results[0]["id"].is_string());
    assert!(results[0].get("error").is_none());

    assert_eq!(results[4]["status"], "created with 5 menu items");
    assert!(results[4]["restaurant"].is_string());

    assert_eq!(results[5], serde_json::json!({"wallet": "topped up to ₦10,000"}));
}

#[tokio::test]
async fn test_any_method_and_function_path_accepted() {
    let backend = Arc::new(MemoryBackend::new());
    let app = common::create_test_app(&backend);

    for method in ["GET", "PUT"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/seed-test-users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", method);
    }

    // Second call found everything from the first
    assert_eq!(backend.identities().len(), 4);
    assert_eq!(backend.store_count(), 1);
}

#[tokio::test]
async fn test_business_failures_still_return_success() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail_identity(common::VENDOR, "Database error creating new user");
    let app = common::create_test_app(&backend);

    let response = app
        .oneshot(Request::builder().method("POST").uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(
        results[1],
        serde_json::json!({
            "email": common::VENDOR,
            "status": "error",
            "error": "Database error creating new user"
        })
    );
}

#[tokio::test]
async fn test_directory_failure_returns_bad_gateway() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail(Operation::ListIdentities, "Invalid API key");
    let app = common::create_test_app(&backend);

    let response = app
        .oneshot(Request::builder().method("POST").uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_cors_headers(response.headers());

    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Backend unavailable: Invalid API key");
}

#[tokio::test]
async fn test_health_does_not_touch_backend() {
    let backend = Arc::new(MemoryBackend::new());
    let app = common::create_test_app(&backend);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, "ok");
    assert_eq!(backend.call_count(), 0);
}

//! Route-level tests driving the axum router directly, no socket.

use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use snipe::server::{router, AppState};
use snipe::Engine;

fn app() -> axum::Router {
    router(Arc::new(AppState {
        engine: Engine::new(),
    }))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_analyze_roundtrip() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("core.c"), "int arr[10];\n").unwrap();

    let response = app()
        .oneshot(post_json(
            "/analyze",
            json!({
                "content": "int x = arr[12];",
                "file_path": "main.c",
                "repo_path": temp.path().to_string_lossy(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["file"], "main.c");
    let diags = body["diagnostics"].as_array().unwrap();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0]["code"], "SNIPE_ARRAY_BOUNDS");
    assert_eq!(diags[0]["severity"], "ERROR");
    assert_eq!(diags[0]["line"], 1);
}

#[tokio::test]
async fn test_analyze_with_open_buffers() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("core.c"), "int arr[10];\n").unwrap();

    let response = app()
        .oneshot(post_json(
            "/analyze",
            json!({
                "content": "int x = arr[5];",
                "file_path": "main.c",
                "repo_path": temp.path().to_string_lossy(),
                "open_buffers": [
                    {"content": "int arr[3];", "file_path": "core.c"}
                ],
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let diags = body["diagnostics"].as_array().unwrap();
    assert_eq!(diags.len(), 1);
    assert!(diags[0]["message"]
        .as_str()
        .unwrap()
        .contains("declared size 3"));
}

#[tokio::test]
async fn test_invalid_repo_path_is_400() {
    let response = app()
        .oneshot(post_json(
            "/analyze",
            json!({
                "content": "x = 1",
                "file_path": "a.py",
                "repo_path": "/definitely/not/a/real/path",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_symbols_and_graph() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.py"), "balance: int = 0\n").unwrap();
    fs::write(temp.path().join("b.py"), "balance: int = 1\n").unwrap();

    let state = Arc::new(AppState {
        engine: Engine::new(),
    });
    let repo = temp.path().to_string_lossy().to_string();

    let response = router(state.clone())
        .oneshot(post_json("/refresh", json!({"repo_path": repo})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["symbol_count"], 2);

    let uri = format!("/symbols?repo_path={}", temp.path().to_string_lossy());
    let response = router(state.clone())
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["symbols"].as_array().unwrap().len(), 2);

    let uri = format!("/graph?repo_path={}", temp.path().to_string_lossy());
    let response = router(state)
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    let nodes = body["nodes"].as_array().unwrap();
    // two file nodes + two symbol nodes
    assert_eq!(nodes.len(), 4);
    let edges = body["edges"].as_array().unwrap();
    assert!(edges
        .iter()
        .any(|e| e["type"] == "BELONGS_TO"));
    assert!(edges
        .iter()
        .any(|e| e["type"] == "REFERENCES"));
}

#[tokio::test]
async fn test_save_diagnostics() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.py"), "x = 1\n").unwrap();

    let response = app()
        .oneshot(post_json(
            "/save_diagnostics",
            json!({
                "repo_path": temp.path().to_string_lossy(),
                "diagnostics": [
                    {
                        "file": "a.py",
                        "line": 1,
                        "severity": "ERROR",
                        "code": "SNIPE_TYPE_MISMATCH",
                        "message": "test entry"
                    }
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["saved"], 1);
    assert!(temp.path().join(".snipe").join("diagnostics.json").exists());
}

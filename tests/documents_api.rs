mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use tower::ServiceExt;

use common::spawn_app;
use folio::create_api_router;

const BOUNDARY: &str = "folio-test-boundary";

fn multipart(field: &str, filename: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::post("/api/v1/documents/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn text_upload_is_analysed() {
    let app = spawn_app().await;

    let response = app
        .send(multipart(
            "file",
            "notes.txt",
            "text/plain",
            b"The quick fox. It jumped over the dog.",
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(
        response.body,
        json!({
            "success": true,
            "filename": "notes.txt",
            "size_bytes": 38,
            "content_type": "text/plain",
            "analysis": {
                "word_count": 8,
                "sentence_count": 3,
                "character_count": 38
            }
        })
    );
}

#[tokio::test]
async fn binary_upload_succeeds_without_analysis() {
    let app = spawn_app().await;

    let response = app
        .send(multipart(
            "file",
            "image.bin",
            "application/octet-stream",
            &[0xff, 0xd8, 0xff, 0x00],
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["size_bytes"], 4);
    assert!(response.body.get("analysis").is_none());
}

#[tokio::test]
async fn missing_file_field_is_reported_in_payload() {
    let app = spawn_app().await;

    let response = app
        .send(multipart("attachment", "notes.txt", "text/plain", b"hello"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "Missing multipart field 'file'");
}

#[tokio::test]
async fn non_multipart_body_is_reported_in_payload() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/v1/documents/process", None, json!({ "file": "nope" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], false);
    assert!(response.body["error"].as_str().is_some());
}

#[tokio::test]
async fn health_reports_database_and_version() {
    let app = spawn_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"]["status"], "ok");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_document_lists_the_api() {
    let app = spawn_app().await;

    let response = app.get("/api-doc/openapi.json", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let paths = response.body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/auth/token"));
    assert!(paths.contains_key("/api/v1/admin/user/{id}"));
    assert!(paths.contains_key("/api/v1/documents/process"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = spawn_app().await;

    let request = Request::get("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers["x-request-id"], "trace-me-123");

    let response = app.get("/health", None).await;
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn metrics_route_only_exists_with_a_handle() {
    let app = spawn_app().await;
    assert_eq!(app.get("/metrics", None).await.status, StatusCode::NOT_FOUND);

    let handle = PrometheusBuilder::new().build_recorder().handle();
    let router = create_api_router(app.state.clone(), Some(handle));
    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

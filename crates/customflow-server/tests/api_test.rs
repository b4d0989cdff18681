//! End-to-end tests of the router over in-memory storage.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use customflow_core::ai::Tone;
use customflow_core::auth::StaticAuthenticator;
use customflow_core::config::AiSettings;
use customflow_infrastructure::{FsImageStore, InMemoryAuditRepository, InMemoryOrderRepository};
use customflow_interaction::OpenAiGateway;
use customflow_interaction::fallback::fallback_reply;
use customflow_server::{AppState, build_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "customflow-test-boundary";

async fn create_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let images = FsImageStore::new(temp_dir.path()).await.unwrap();
    let gateway = OpenAiGateway::new(AiSettings::default()).unwrap();
    let state = AppState::new(
        Arc::new(InMemoryOrderRepository::new()),
        Arc::new(InMemoryAuditRepository::new()),
        Arc::new(images),
        Arc::new(gateway),
        Arc::new(StaticAuthenticator::default()),
    );
    (build_router(state), temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn order_body(order_id: &str) -> Value {
    json!({
        "order_id": order_id,
        "customer_name": "Acme Dining",
        "length": 120.5,
        "width": 80,
    })
}

fn multipart_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_create_then_duplicate_conflicts() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, json_request("POST", "/api/v1/orders", order_body("ORD-100"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order created successfully");
    assert_eq!(body["order"]["order_id"], "ORD-100");
    assert_eq!(body["order"]["status"], "new");
    assert_eq!(body["order"]["thickness"], "3mm");
    assert_eq!(body["order"]["source"], "amazon");
    assert_eq!(body["order"]["created_by"], 1);
    let id = body["order"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, json_request("POST", "/api/v1/orders", order_body("ORD-100"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Order ID 'ORD-100' already exists");
    assert_eq!(body["existing_order"]["id"], id);
    assert_eq!(body["existing_order"]["status"], "new");
}

#[tokio::test]
async fn test_out_of_range_fields_are_rejected_before_storage() {
    let (app, _temp_dir) = create_test_app().await;

    let cases = [
        ("length", json!(0.001)),
        ("width", json!(1e9)),
        ("customer_name", json!("N".repeat(256))),
        ("phone_number", json!("5".repeat(51))),
    ];
    for (field, value) in cases {
        let mut body = order_body("ORD-400");
        body[field] = value;
        let (status, body) = send(&app, json_request("POST", "/api/v1/orders", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        assert_eq!(body["field"], field);
    }

    let mut body = order_body("ORD-400");
    body["length"] = json!(40.129);
    let (status, body) = send(&app, json_request("POST", "/api/v1/orders", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["length"], 40.13);
}

#[tokio::test]
async fn test_validation_errors_name_the_field() {
    let (app, _temp_dir) = create_test_app().await;

    let mut body = order_body("ORD-7");
    body["thickness"] = json!("4mm");
    let (status, body) = send(&app, json_request("POST", "/api/v1/orders", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "thickness");

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_update_status_and_delete() {
    let (app, _temp_dir) = create_test_app().await;
    let (_, created) = send(&app, json_request("POST", "/api/v1/orders", order_body("ORD-200"))).await;
    let id = created["order"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/orders/{id}");

    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["customer_name"], "Acme Dining");

    let mut update = order_body("ORD-200");
    update["customer_name"] = json!("Acme Bistro");
    update["corner_style"] = json!("rounded");
    let (status, body) = send(&app, json_request("PUT", &uri, update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["customer_name"], "Acme Bistro");
    assert_eq!(body["order"]["corner_style"], "rounded");

    let (status, body) = send(
        &app,
        json_request("PUT", &format!("{uri}/status"), json!({ "status": "in-progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "in-progress");

    let (status, body) = send(
        &app,
        json_request("PUT", &format!("{uri}/status"), json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "status");

    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully");

    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (app, _temp_dir) = create_test_app().await;
    let (status, body) = send(&app, get("/api/v1/orders/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "id");
}

#[tokio::test]
async fn test_list_paginates_and_filters() {
    let (app, _temp_dir) = create_test_app().await;
    for i in 0..5 {
        send(
            &app,
            json_request("POST", "/api/v1/orders", order_body(&format!("ORD-{i:03}"))),
        )
        .await;
    }

    let (status, body) = send(&app, get("/api/v1/orders?page=2&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 3);
    assert_eq!(body["pagination"]["has_next"], true);
    assert_eq!(body["pagination"]["has_prev"], true);

    let (_, body) = send(&app, get("/api/v1/orders?search=ORD-004")).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["orders"][0]["order_id"], "ORD-004");

    let (status, _) = send(&app, get("/api/v1/orders?status=archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_then_attach_and_serve() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(
        &app,
        multipart_request(&[
            ("files", "cover.png", &b"png-bytes"[..]),
            ("files", "notes.pdf", &b"pdf"[..]),
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Processed 2 files");
    assert_eq!(body["uploaded_count"], 1);
    assert_eq!(body["failed_count"], 1);
    assert_eq!(body["failed_files"][0], "notes.pdf (invalid type)");
    let filename = body["files"][0]["filename"].as_str().unwrap().to_string();
    let url = body["files"][0]["url"].as_str().unwrap().to_string();
    assert_eq!(url, format!("/uploads/{filename}"));

    let mut order = order_body("ORD-300");
    order["image_files"] = json!([filename, "missing.png"]);
    let (status, body) = send(&app, json_request("POST", "/api/v1/orders", order)).await;
    assert_eq!(status, StatusCode::CREATED);
    let images = body["order"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["path"], url);
    assert_eq!(images[0]["mime_type"], "image/png");

    let response = app.clone().oneshot(get(&url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], &b"png-bytes"[..]);

    let (status, _) = send(&app, get("/uploads/nope.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_valid_files_is_bad_request() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, multipart_request(&[("files", "a.exe", &b"mz"[..])])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["uploaded_count"], 0);
    assert_eq!(body["failed_files"][0], "a.exe (invalid type)");

    let (status, _) = send(&app, multipart_request(&[("other", "a.png", &b"png"[..])])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reply_falls_back_without_api_key() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/ai/reply",
            json!({ "message": "Do you ship to Leeds?", "tone": "formal" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tone"], "formal");
    assert_eq!(body["fallback"], true);
    assert!(!body["reply"].as_str().unwrap().is_empty());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/ai/reply", json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "message");
}

#[tokio::test]
async fn test_fallback_reply_uses_message_as_sent() {
    let (app, _temp_dir) = create_test_app().await;

    for message in [" hi", "hi", "hi  "] {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/ai/reply", json!({ "message": message })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tone"], "friendly");
        assert_eq!(body["reply"], fallback_reply(message, Tone::Friendly));
    }
}

#[tokio::test]
async fn test_ocr_without_api_key_is_unavailable() {
    let (app, temp_dir) = create_test_app().await;
    std::fs::write(temp_dir.path().join("shot.png"), b"png").unwrap();

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/ai/ocr", json!({ "images": ["shot.png"] })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/ai/ocr", json!({ "images": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "images");
}

#[tokio::test]
async fn test_model_parameters_are_clamped() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/v1/ai/parameters",
            json!({ "temperature": 5.0, "max_tokens": 999999 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperature"], 2.0);
    assert_eq!(body["max_tokens"], 4000);

    let (_, body) = send(&app, get("/api/v1/ai/model")).await;
    assert_eq!(body["temperature"], 2.0);
    assert_eq!(body["has_api_key"], false);
}

#[tokio::test]
async fn test_health_and_fallback_route() {
    let (app, _temp_dir) = create_test_app().await;

    let response = app.clone().oneshot(get("/api/v1/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = send(&app, get("/api/v1/health")).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["ai_service"], "fallback");

    let (status, body) = send(&app, get("/api/v1/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}

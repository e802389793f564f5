//! Router tests.
//!
//! Tests use `tower::ServiceExt::oneshot()` to drive the axum router in-process,
//! with a `wiremock` server standing in for the host that serves the specs.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use specdocs_telemetry::MetricsRegistry;

use crate::api::{create_router, AppState};
use crate::fetch::SpecFetcher;
use crate::pipeline::DocsPipeline;
use crate::templates::Templates;

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

fn make_app() -> (Router, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = DocsPipeline::new(SpecFetcher::new().unwrap(), Arc::clone(&metrics));
    let templates = Arc::new(Templates::load().unwrap());
    let state = AppState::new(templates, pipeline, Arc::clone(&metrics));
    (create_router(state), metrics)
}

/// Send one GET through the router and return status, content type and body.
async fn get(app: Router, uri: &str) -> (StatusCode, String, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp: Response = app.oneshot(req).await.expect("router returned error");
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

/// Pull the base64 payload out of a rendered page and decode it as JSON.
fn embedded_spec(page: &str) -> Value {
    let start = page.find("const encoded = \"").expect("no payload in page") + 17;
    let end = start + page[start..].find('"').unwrap();
    let bytes = STANDARD.decode(&page[start..end]).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn serve_spec(server: &MockServer, spec_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(spec_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

const PETSTORE_YAML: &str = "openapi: 3.0.3
info:
  title: Petstore
  version: '1.0.0'
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: A list of pets
";

// ---------------------------------------------------------------------------
// Health and metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_200() {
    let (app, _) = make_app();
    let (status, _, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let j: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(j["status"], "healthy");
    assert!(j["version"].is_string());
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let (app, metrics) = make_app();
    metrics.record_outcome("openapi", "rendered");
    let (status, content_type, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/plain"));
    assert!(body.contains("specdocs_docs_requests_total"));
}

// ---------------------------------------------------------------------------
// Documentation pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_type_is_rejected_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let (app, _) = make_app();
    let (status, content_type, body) =
        get(app, &format!("/docs/swagger/{}/spec.json", server.uri())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, "Unsupported specification type");
}

#[tokio::test]
async fn yaml_openapi_with_query_is_forwarded_and_rendered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/petstore.yaml"))
        .and(query_param("token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PETSTORE_YAML))
        .expect(1)
        .mount(&server)
        .await;

    let (app, metrics) = make_app();
    let (status, content_type, body) = get(
        app,
        &format!("/docs/openapi/{}/petstore.yaml?token=abc", server.uri()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));

    let spec = embedded_spec(&body);
    assert_eq!(spec["openapi"], "3.0.3");
    assert_eq!(spec["paths"]["/pets"]["get"]["operationId"], "listPets");

    let exposition = render(&metrics);
    assert!(exposition.contains("outcome=\"rendered\""));
}

#[tokio::test]
async fn json_asyncapi_2_is_embedded_byte_for_byte() {
    let server = MockServer::start().await;
    let spec = r#"{"asyncapi":"2.6.0","info":{"title":"Streetlights","version":"1.0.0"},"channels":{}}"#;
    serve_spec(&server, "/streetlights.json", spec).await;

    let (app, _) = make_app();
    let (status, _, body) = get(
        app,
        &format!("/docs/asyncapi/{}/streetlights.json", server.uri()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("\"{}\"", STANDARD.encode(spec))));
}

#[tokio::test]
async fn asyncapi_3_renders_unsupported_version_page() {
    let server = MockServer::start().await;
    serve_spec(&server, "/events.yaml", "asyncapi: 3.0.0\ninfo:\n  title: Events\n").await;

    let (app, metrics) = make_app();
    let (status, content_type, body) =
        get(app, &format!("/docs/asyncapi/{}/events.yaml", server.uri())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("Unsupported specification version"));
    assert!(!body.contains("const encoded"));
    assert!(render(&metrics).contains("outcome=\"rejected\""));
}

#[tokio::test]
async fn invalid_openapi_renders_invalid_schema_page() {
    let server = MockServer::start().await;
    serve_spec(
        &server,
        "/broken.json",
        r#"{"openapi":"3.0.3","info":{"title":"Broken","version":"1"},"paths":{"/pets/{id}":{"get":{"responses":{"200":{"description":"ok"}}}}}}"#,
    )
    .await;

    let (app, _) = make_app();
    let (status, _, body) =
        get(app, &format!("/docs/openapi/{}/broken.json", server.uri())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Invalid specification"));
}

#[tokio::test]
async fn yaml_with_integer_keys_is_a_conversion_failure() {
    let server = MockServer::start().await;
    serve_spec(
        &server,
        "/spec.yml",
        "openapi: 3.0.3\npaths:\n  /pets:\n    get:\n      responses:\n        200:\n          description: ok\n",
    )
    .await;

    let (app, metrics) = make_app();
    let (status, content_type, body) =
        get(app, &format!("/docs/openapi/{}/spec.yml", server.uri())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.starts_with("text/plain"));
    assert!(body.starts_with("Failed to convert YAML to JSON: "), "got: {}", body);
    assert!(render(&metrics).contains("outcome=\"normalize_failed\""));
}

#[tokio::test]
async fn non_json_asyncapi_is_a_parse_failure() {
    let server = MockServer::start().await;
    serve_spec(&server, "/spec", "<html>not found</html>").await;

    let (app, _) = make_app();
    let (status, _, body) = get(app, &format!("/docs/asyncapi/{}/spec", server.uri())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("Failed to parse JSON: "), "got: {}", body);
}

#[tokio::test]
async fn malformed_openapi_is_a_load_failure() {
    let server = MockServer::start().await;
    serve_spec(&server, "/spec.json", r#"{"openapi":"3.0.3","paths":"none"}"#).await;

    let (app, _) = make_app();
    let (status, _, body) =
        get(app, &format!("/docs/openapi/{}/spec.json", server.uri())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with("Failed to load OpenAPI document: "), "got: {}", body);
}

#[tokio::test]
async fn encoded_spec_path_reaches_the_host_undecoded() {
    let server = MockServer::start().await;
    let spec = r#"{"asyncapi":"2.6.0","info":{"title":"Grouped","version":"1.0.0"},"channels":{}}"#;
    Mock::given(method("GET"))
        .and(path("/files/group%2Fproject/spec%3Fv%3D1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(spec))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = make_app();
    let (status, _, body) = get(
        app,
        &format!(
            "/docs/asyncapi/{}/files/group%2Fproject/spec%3Fv%3D1.json",
            server.uri()
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "got: {}", body);
    assert_eq!(embedded_spec(&body)["info"]["title"], "Grouped");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/files/group%2Fproject/spec%3Fv%3D1.json");
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn truncated_body_is_a_read_failure() {
    let addr = crate::test_support::serve_truncated_body().await;

    let (app, metrics) = make_app();
    let (status, content_type, body) =
        get(app, &format!("/docs/openapi/http://{}/spec.json", addr)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, "Failed to read the specification");
    assert!(render(&metrics).contains("outcome=\"fetch_failed\""));
}

#[tokio::test]
async fn unreachable_host_is_a_retrieval_failure() {
    let (app, metrics) = make_app();
    // Port 9 (discard) on localhost is not expected to accept connections.
    let (status, content_type, body) =
        get(app, "/docs/openapi/http://127.0.0.1:9/spec.json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, "Failed to retrieve the specification");
    assert!(render(&metrics).contains("outcome=\"fetch_failed\""));
}

fn render(metrics: &MetricsRegistry) -> String {
    specdocs_telemetry::prometheus::render_metrics(metrics)
}

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use document_content_api::config::GatewayConfig;
use document_content_api::services::converter::KreuzbergConverter;
use document_content_api::{AppState, create_app};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

/// Collects formatted log output so tests can assert on span fields.
#[derive(Clone)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn gateway_app() -> Router {
    let state = AppState {
        converter: Arc::new(KreuzbergConverter::new()),
        config: GatewayConfig::default(),
    };
    create_app(state)
}

fn multipart_request(filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        {content}\r\n\
        --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_extract_plain_text_file() {
    let app = gateway_app();

    let response = app
        .oneshot(multipart_request("hello.txt", "hello world"))
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    if status != StatusCode::OK {
        panic!(
            "Extraction failed with status {}: {:?}",
            status,
            String::from_utf8_lossy(&body)
        );
    }

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["filename"], "hello.txt");
    assert_eq!(json["content"], "hello world");
    assert_eq!(json["format"], "text/plain");
}

#[tokio::test]
async fn test_extract_same_file_twice_is_idempotent() {
    let app = gateway_app();

    let first = app
        .clone()
        .oneshot(multipart_request("note.txt", "the same bytes"))
        .await
        .unwrap();
    let second = app
        .oneshot(multipart_request("note.txt", "the same bytes"))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let first: Value =
        serde_json::from_slice(&first.into_body().collect().await.unwrap().to_bytes()).unwrap();
    let second: Value =
        serde_json::from_slice(&second.into_body().collect().await.unwrap().to_bytes()).unwrap();

    assert_eq!(first["content"], "the same bytes");
    assert_eq!(first["content"], second["content"]);
    assert_eq!(first["filename"], second["filename"]);
}

#[tokio::test]
async fn test_extract_flattens_traversal_filenames() {
    let app = gateway_app();

    let response = app
        .oneshot(multipart_request("../../etc/passwd.txt", "root:x:0:0:root"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["filename"], "passwd.txt");
    assert!(json["content"].as_str().unwrap().contains("root:x"));
}

#[tokio::test]
async fn test_client_content_type_is_advisory_only() {
    let app = gateway_app();

    // The part claims to be a PDF; the bytes and name say plain text. The
    // claimed type must not pick the parser.
    let body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"data.txt\"\r\n\
        Content-Type: application/pdf\r\n\r\n\
        just words\r\n\
        --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["content"], "just words");
}

#[tokio::test]
async fn test_extra_form_fields_are_ignored() {
    let app = gateway_app();

    let body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"language\"\r\n\r\n\
        en\r\n\
        --{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"doc.txt\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        body of the document\r\n\
        --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["filename"], "doc.txt");
    assert_eq!(json["content"], "body of the document");
}

#[tokio::test]
async fn test_health_always_ok() {
    let app = gateway_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"status": "ok"}));

    // A failed extraction must not change the answer
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/extract")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(format!("--{BOUNDARY}--\r\n")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_service_descriptor() {
    let app = gateway_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["name"], "Document Content API");
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(json["endpoints"]["/extract"]["method"], "POST");
    assert_eq!(
        json["endpoints"]["/extract"]["params"],
        "file (multipart/form-data)"
    );
    assert_eq!(json["endpoints"]["/health"]["method"], "GET");
    assert!(json["endpoints"]["/health"].get("params").is_none());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = gateway_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    assert!(json["paths"]["/extract"].is_object());
    assert!(json["paths"]["/health"].is_object());
}

#[tokio::test]
async fn test_trace_span_carries_generated_request_id() {
    let sink = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(CaptureWriter(sink.clone()))
        .with_ansi(false)
        .finish();
    // Thread-local default, so parallel tests do not write into the sink
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = gateway_app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let logs = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("http_request"));
    assert!(logs.contains("request_id="));
    // A client that sends no id still gets a generated one into the span
    assert!(!logs.contains("request_id=unknown"));

    // An inbound id shows up in the span verbatim
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "trace-99")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let logs = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("request_id=trace-99"));
}

#[tokio::test]
async fn test_request_id_round_trip() {
    let app = gateway_app();

    // Inbound ids are honored
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-42");

    // Absent ids are generated
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!response.headers().get("x-request-id").unwrap().is_empty());
}

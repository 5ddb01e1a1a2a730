pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::GatewayConfig;
use crate::services::converter::DocumentConverter;
use axum::{
    Json, Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::info::api_info,
        api::handlers::extract::extract_content,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::info::ServiceInfo,
            api::handlers::info::EndpointInfo,
            api::handlers::extract::ExtractResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "extraction", description = "Document content extraction"),
        (name = "system", description = "Service discovery and liveness")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<dyn DocumentConverter>,
    pub config: GatewayConfig,
}

pub fn create_app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get(api::middleware::request_id::REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            tracing::info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                tracing::info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    // The id middleware sits outside the trace layer, so the span always
    // opens on a request that already carries an id
    Router::new()
        .route("/", get(api::handlers::info::api_info))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_spec))
        .route(
            "/extract",
            post(api::handlers::extract::extract_content).layer(
                axum::extract::DefaultBodyLimit::max(
                    state.config.max_file_size + 10 * 1024 * 1024, // Add 10MB buffer for multipart overhead
                ),
            ),
        )
        .layer(trace_layer)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

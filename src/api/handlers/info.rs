use axum::{Json, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: BTreeMap<String, EndpointInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct EndpointInfo {
    pub method: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
}

/// Static service descriptor for discovery
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service descriptor", body = ServiceInfo)
    ),
    tag = "system"
)]
pub async fn api_info() -> impl IntoResponse {
    tracing::info!("API information requested");

    let mut endpoints = BTreeMap::new();
    endpoints.insert(
        "/extract".to_string(),
        EndpointInfo {
            method: "POST".to_string(),
            description: "Extract content from an uploaded document".to_string(),
            params: Some("file (multipart/form-data)".to_string()),
        },
    );
    endpoints.insert(
        "/health".to_string(),
        EndpointInfo {
            method: "GET".to_string(),
            description: "API health check".to_string(),
            params: None,
        },
    );

    Json(ServiceInfo {
        name: "Document Content API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Extract content from various document formats".to_string(),
        endpoints,
    })
}

//! # Brand OS Catalog - Registry Service
//!
//! Read-only HTTP surface over the workflow core for the dashboard. Responsible for:
//! - Serving the port type registry to the canvas
//! - Serving the node catalog to the marketplace
//! - Validating workflows on save
//!
//! Nothing here is mutable: the registries are built once at startup from the
//! built-in declaration or the file named by `BRANDOS_REGISTRY`.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use brandos_libs::{
    load_registry_config, AppError, NodeDefinition, PortTypeDescriptor, RegistryConfig,
    ValidationOutcome, WorkflowDocument, WorkflowValidator,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Main application state shared across all handlers
#[derive(Clone)]
struct AppState {
    /// Validator, holding both registries
    validator: WorkflowValidator,
}

// === API Handlers ===

/// Response structure for GET /ports
#[derive(Debug, Serialize)]
struct PortTypesResponse {
    port_types: Vec<PortTypeDescriptor>,
}

/// Response structure for GET /nodes/registry
#[derive(Debug, Serialize)]
struct NodeRegistryResponse {
    nodes: Vec<NodeDefinition>,
    /// Ids that are always installed
    core_node_ids: Vec<String>,
}

/// Handler for GET /health - Simple health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Handler for GET /ports - All port types in declaration order
async fn get_port_types(State(state): State<AppState>) -> Json<PortTypesResponse> {
    Json(PortTypesResponse {
        port_types: state.validator.ports().types().to_vec(),
    })
}

/// Handler for GET /nodes/registry - Full marketplace catalog
async fn get_node_registry(State(state): State<AppState>) -> Json<NodeRegistryResponse> {
    let catalog = state.validator.catalog();
    Json(NodeRegistryResponse {
        nodes: catalog.all_nodes().to_vec(),
        core_node_ids: catalog
            .core_node_ids()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Handler for GET /nodes/{node_id} - One catalog entry
async fn get_node_info(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<NodeDefinition>, AppError> {
    let node = state.validator.catalog().find_by_id(&node_id)?;
    Ok(Json(node.clone()))
}

/// Handler for POST /workflows/validate - Validate-on-save
///
/// The body is taken as raw bytes and parsed here, rather than by the `Json`
/// or `String` extractors, so that any malformed document (including one that
/// is not UTF-8) is reported as `malformed_document`.
async fn validate_workflow(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ValidationOutcome>, AppError> {
    let document = WorkflowDocument::from_slice(&body, "request body")?;
    let outcome = state.validator.validate(&document);

    if !outcome.is_valid() {
        info!(
            "Rejected workflow with {} failures",
            outcome.failures().len()
        );
    }

    Ok(Json(outcome))
}

/// Create the main HTTP router with all endpoints
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ports", get(get_port_types))
        .route("/nodes/registry", get(get_node_registry))
        .route("/nodes/:node_id", get(get_node_info))
        .route("/workflows/validate", post(validate_workflow))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the validator from `BRANDOS_REGISTRY`, or the built-in declaration
fn load_validator() -> Result<WorkflowValidator> {
    let config = match std::env::var("BRANDOS_REGISTRY") {
        Ok(path) => {
            info!("Loading registry declaration from {}", path);
            load_registry_config(&path)
                .with_context(|| format!("failed to load registry {}", path))?
        }
        Err(_) => {
            info!("Using built-in registry declaration");
            RegistryConfig::builtin()
        }
    };

    WorkflowValidator::from_config(&config).context("inconsistent registry declaration")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandos_catalog=info,tower_http=info".into()),
        )
        .init();

    info!("Starting Brand OS Catalog");

    let validator = load_validator()?;
    info!(
        "Registry ready: {} port types, {} catalog nodes",
        validator.ports().len(),
        validator.catalog().len()
    );

    for node in validator.catalog().all_nodes() {
        info!("  - {} ({}): {}", node.label, node.id, node.category);
    }

    let app = create_router(AppState { validator });

    // Get port from environment or use default
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting catalog API server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState {
            validator: WorkflowValidator::builtin().unwrap(),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_port_types() {
        let (status, body) = send(get("/ports")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["port_types"][0]["key"], "text");
    }

    #[tokio::test]
    async fn test_node_registry() {
        let (status, body) = send(get("/nodes/registry")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nodes"][0]["id"], "brand-kit");
        assert!(body["core_node_ids"]
            .as_array()
            .unwrap()
            .contains(&Value::from("brand-kit")));
    }

    #[tokio::test]
    async fn test_node_info() {
        let (status, body) = send(get("/nodes/upscaler")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "utility");

        let (status, body) = send(get("/nodes/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_validate_workflow() {
        let (status, body) = send(post_json(
            "/workflows/validate",
            r#"{"nodes": [{"id": "a", "type": "text"}, {"id": "b", "type": "image"}], "edges": [{"source": "a", "target": "b"}]}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "valid"}));

        let (status, body) = send(post_json(
            "/workflows/validate",
            r#"{"nodes": [{"id": "a", "type": "bogus"}], "edges": []}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "invalid");
        assert_eq!(body["failures"][0]["kind"], "invalid_node_type");
        assert_eq!(body["failures"][0]["node_type"], "bogus");
    }

    #[tokio::test]
    async fn test_validate_malformed_workflow() {
        let (status, body) = send(post_json("/workflows/validate", r#"{"nodes": 3}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "malformed_document");
    }

    #[tokio::test]
    async fn test_validate_non_utf8_workflow() {
        let request = Request::builder()
            .method("POST")
            .uri("/workflows/validate")
            .header("content-type", "application/json")
            .body(Body::from(&b"{\xff\xfe}"[..]))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "malformed_document");
    }
}

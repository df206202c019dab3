use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::error::StatdashError;
use crate::interface::DashboardInterface;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

fn failure(message: String) -> Response {
    warn!(%message, "request failed");
    let body = ErrorResponse { status: "error".into(), error: message };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Scalars become their string form; null, arrays and objects are dropped.
pub fn flatten_params(body: Map<String, Value>) -> HashMap<String, String> {
    body.into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key, text))
        })
        .collect()
}

async fn dashboard(
    State(interface): State<Arc<DashboardInterface>>,
    body: Option<Json<Map<String, Value>>>,
) -> Response {
    let params = flatten_params(body.map(|Json(b)| b).unwrap_or_default());
    // the engine is synchronous, so it gets a blocking thread
    let outcome = tokio::task::spawn_blocking(move || interface.run_params(&params)).await;
    match outcome {
        Ok(Ok(dashboard)) => (StatusCode::OK, Json(dashboard)).into_response(),
        Ok(Err(e)) => failure(e.to_string()),
        Err(e) => failure(StatdashError::Server(e.to_string()).to_string()),
    }
}

async fn filters(State(interface): State<Arc<DashboardInterface>>) -> Response {
    let outcome = tokio::task::spawn_blocking(move || interface.filter_options()).await;
    match outcome {
        Ok(Ok(options)) => (StatusCode::OK, Json(options)).into_response(),
        Ok(Err(e)) => failure(e.to_string()),
        Err(e) => failure(StatdashError::Server(e.to_string()).to_string()),
    }
}

pub fn router(interface: Arc<DashboardInterface>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/api/dashboard", post(dashboard))
        .route("/api/filters", get(filters))
        .layer(cors)
        .with_state(interface)
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::storage::Database;

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: String,
}

/// Storage connectivity probe
pub(crate) async fn health(State(db): State<Database>) -> Response {
    match db.ping().await {
        Ok(()) => {
            let body = HealthResponse {
                status: "OK",
                database: "Conectado",
                error: None,
                timestamp: timestamp(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            let body = HealthResponse {
                status: "ERROR",
                database: "Desconectado",
                error: Some(e.to_string()),
                timestamp: timestamp(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

pub(crate) async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": "API de Artículos funcionando correctamente",
        "documentation": "/api-docs",
        "endpoints": {
            "articulos": "/api/articulos",
            "listas": "/api/listas",
        },
        "timestamp": timestamp(),
    }))
}

pub(crate) async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Ruta no encontrada" })),
    )
}

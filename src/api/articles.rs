use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::storage::{Article, ArticleChanges, ArticleRecord, Database, PageRequest, UpsertReport};

const NOT_FOUND: &str = "Artículo no encontrado";

// ============================================================================
// Request / Response Shapes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticleListResponse {
    articulos: Vec<Article>,
    total: i64,
    pagina: i64,
    total_paginas: i64,
    message: String,
}

/// Body of both upsert endpoints. Elements stay raw JSON until
/// [`UpsertRequest::into_records`].
#[derive(Debug, Deserialize)]
pub struct UpsertRequest {
    pub articulos: Vec<serde_json::Value>,
}

impl UpsertRequest {
    /// Read every element as an article record, naming the first one that fails
    pub fn into_records(self) -> Result<Vec<ArticleRecord>, ApiError> {
        self.articulos
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<ArticleRecord>(value).map_err(|e| {
                    ApiError::Validation(format!("Artículo inválido en la posición {index}: {e}"))
                })
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpsertResponse {
    message: &'static str,
    #[serde(flatten)]
    report: UpsertReport,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkUpsertResponse {
    message: &'static str,
    total: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    message: &'static str,
}

// ============================================================================
// CRUD Handlers
// ============================================================================

pub(crate) async fn list(
    State(db): State<Database>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let page = PageRequest::new(
        params.page.unwrap_or(PageRequest::DEFAULT_PAGE),
        params.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
    )
    .ok_or_else(|| {
        ApiError::Validation("page y limit deben ser enteros positivos".to_string())
    })?;

    let result = db.list_articles(page).await?;
    tracing::debug!(
        page = result.page,
        found = result.articles.len(),
        total = result.total,
        "Listed articles"
    );

    let (status, message) = if result.articles.is_empty() {
        (StatusCode::NOT_FOUND, "No hay artículos disponibles".to_string())
    } else {
        let found = result.articles.len();
        (StatusCode::OK, format!("{found} artículos encontrados"))
    };

    let body = ArticleListResponse {
        articulos: result.articles,
        total: result.total,
        pagina: result.page,
        total_paginas: result.total_pages,
        message,
    };
    Ok((status, Json(body)).into_response())
}

pub(crate) async fn get(
    State(db): State<Database>,
    codart: Result<Path<i64>, PathRejection>,
) -> Result<Json<Article>, ApiError> {
    let Path(codart) = codart?;
    db.get_article(codart)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

pub(crate) async fn create(
    State(db): State<Database>,
    payload: Result<Json<ArticleRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let Json(record) = payload?;
    let article = record.to_article().ok_or_else(|| {
        ApiError::Validation("El código del artículo es requerido".to_string())
    })?;

    let stored = db.insert_article(&article).await?;
    tracing::info!(codart = stored.codart, "Created article");
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn update(
    State(db): State<Database>,
    codart: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ArticleChanges>, JsonRejection>,
) -> Result<Json<Article>, ApiError> {
    let Path(codart) = codart?;
    let Json(changes) = payload?;

    let updated = db
        .update_article(codart, &changes)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    tracing::info!(codart, "Updated article");
    Ok(Json(updated))
}

pub(crate) async fn delete(
    State(db): State<Database>,
    codart: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(codart) = codart?;
    if !db.delete_article(codart).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }

    tracing::info!(codart, "Deleted article");
    Ok(Json(MessageResponse {
        message: "Artículo eliminado exitosamente",
    }))
}

// ============================================================================
// Upsert Handlers
// ============================================================================

/// Shape errors mean `articulos` is missing or not an array; anything else
/// (bad syntax, wrong content type) passes through unchanged
fn expected_array(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => ApiError::Validation(format!(
            "Se esperaba un array de artículos en la propiedad \"articulos\" ({})",
            e.body_text()
        )),
        other => other.into(),
    }
}

/// Row-by-row upsert: per-record outcomes, failures isolated
pub(crate) async fn upsert(
    State(db): State<Database>,
    payload: Result<Json<UpsertRequest>, JsonRejection>,
) -> Result<Json<UpsertResponse>, ApiError> {
    let Json(request) = payload.map_err(expected_array)?;
    let records = request.into_records()?;
    let report = db.upsert_row_by_row(&records).await?;

    Ok(Json(UpsertResponse {
        message: "Procesamiento completado",
        report,
    }))
}

/// Batch-atomic upsert: one transaction, all or nothing
pub(crate) async fn upsert_bulk(
    State(db): State<Database>,
    payload: Result<Json<UpsertRequest>, JsonRejection>,
) -> Result<Json<BulkUpsertResponse>, ApiError> {
    let Json(request) = payload.map_err(expected_array)?;
    let records = request.into_records()?;
    let total = db.upsert_batch_atomic(&records).await?;

    Ok(Json(BulkUpsertResponse {
        message: "Procesamiento masivo completado",
        total,
    }))
}

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use super::error::ApiError;
use crate::storage::{Database, PriceList};

pub(crate) async fn list(State(db): State<Database>) -> Result<Json<Vec<PriceList>>, ApiError> {
    let lists = db.list_price_lists().await?;
    tracing::debug!(count = lists.len(), "Listed price lists");
    Ok(Json(lists))
}

pub(crate) async fn get(
    State(db): State<Database>,
    codlis: Result<Path<i16>, PathRejection>,
) -> Result<Json<PriceList>, ApiError> {
    let Path(codlis) = codlis?;
    db.get_price_list(codlis)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Lista no encontrada"))
}

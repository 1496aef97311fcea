use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use models::CategoryCreate;

use crate::{
    error::ApiError,
    handlers::{deleted, RepositoryState},
    Result,
};

/// GET /api/categories
pub async fn get_categories(State(repo): State<RepositoryState>) -> Result<impl IntoResponse> {
    let categories = repo.list_categories().await?;
    Ok(Json(categories))
}

/// POST /api/categories
/// Names are not required to be unique
pub async fn create_category(
    State(repo): State<RepositoryState>,
    payload: std::result::Result<Json<CategoryCreate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let category = repo.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories/:id
pub async fn get_category(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    let category = repo
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::category_not_found(id))?;
    Ok(Json(category))
}

/// PUT /api/categories/:id
/// Expenses and budgets keep referring to the old name after a rename
pub async fn update_category(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
    payload: std::result::Result<Json<CategoryCreate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let category = repo
        .update_category(id, payload)
        .await?
        .ok_or_else(|| ApiError::category_not_found(id))?;
    Ok(Json(category))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    if !repo.delete_category(id).await? {
        return Err(ApiError::category_not_found(id));
    }
    Ok(deleted("Category"))
}

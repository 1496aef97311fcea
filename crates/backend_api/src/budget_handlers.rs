use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use models::BudgetCreate;

use crate::{
    error::ApiError,
    handlers::{deleted, PeriodQuery, RepositoryState},
    Result,
};

/// GET /api/budgets?year=&month=
/// With `month` only monthly budgets are listed, with `year` alone only yearly ones
pub async fn get_budgets(
    State(repo): State<RepositoryState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse> {
    let budgets = repo.list_budgets(query.period()?).await?;
    Ok(Json(budgets))
}

/// POST /api/budgets
pub async fn create_budget(
    State(repo): State<RepositoryState>,
    payload: std::result::Result<Json<BudgetCreate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let budget = repo.create_budget(payload).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET /api/budgets/:id
pub async fn get_budget(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    let budget = repo
        .get_budget(id)
        .await?
        .ok_or_else(|| ApiError::budget_not_found(id))?;
    Ok(Json(budget))
}

/// PUT /api/budgets/:id
pub async fn update_budget(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
    payload: std::result::Result<Json<BudgetCreate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let budget = repo
        .update_budget(id, payload)
        .await?
        .ok_or_else(|| ApiError::budget_not_found(id))?;
    Ok(Json(budget))
}

/// DELETE /api/budgets/:id
pub async fn delete_budget(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    if !repo.delete_budget(id).await? {
        return Err(ApiError::budget_not_found(id));
    }
    Ok(deleted("Budget"))
}

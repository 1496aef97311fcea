use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use models::ExpenseCreate;

use crate::{
    error::ApiError,
    handlers::{deleted, PeriodQuery, RepositoryState},
    Result,
};

/// GET /api/expenses?year=&month=
/// Lists expenses, newest first
pub async fn get_expenses(
    State(repo): State<RepositoryState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse> {
    let expenses = repo.list_expenses(query.period()?).await?;
    Ok(Json(expenses))
}

/// POST /api/expenses
pub async fn create_expense(
    State(repo): State<RepositoryState>,
    payload: std::result::Result<Json<ExpenseCreate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let expense = repo.create_expense(payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/:id
pub async fn get_expense(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    let expense = repo
        .get_expense(id)
        .await?
        .ok_or_else(|| ApiError::expense_not_found(id))?;
    Ok(Json(expense))
}

/// PUT /api/expenses/:id
/// Replaces every field; `id` and `created_at` are kept
pub async fn update_expense(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
    payload: std::result::Result<Json<ExpenseCreate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let expense = repo
        .update_expense(id, payload)
        .await?
        .ok_or_else(|| ApiError::expense_not_found(id))?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/:id
pub async fn delete_expense(
    State(repo): State<RepositoryState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    if !repo.delete_expense(id).await? {
        return Err(ApiError::expense_not_found(id));
    }
    tracing::debug!("Deleted expense {}", id);
    Ok(deleted("Expense"))
}

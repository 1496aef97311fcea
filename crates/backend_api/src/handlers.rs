use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use budget_engine::Period;
use serde::Deserialize;
use std::sync::Arc;

use crate::{csv_io, error::ApiError, reports, repository::Repository, Result};

pub type RepositoryState = Arc<dyn Repository>;

/// Optional `year` / `month` query parameters used by list and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PeriodQuery {
    pub fn period(&self) -> Result<Period> {
        if let Some(month) = self.month {
            check_month(month)?;
        }
        Ok(Period::from_query(self.year, self.month))
    }
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "month must be between 1 and 12 (got {})",
            month
        )))
    }
}

/// Deletion acknowledgement.
pub fn deleted(what: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("{} deleted", what),
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "expense-api"
    }))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub year: i32,
    pub month: u32,
}

/// GET /api/reports/monthly?year=&month=
/// Totals, utilization and per-category breakdown for one month
pub async fn get_monthly_report(
    State(repo): State<RepositoryState>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<impl IntoResponse> {
    check_month(query.month)?;
    let report = reports::monthly_report(repo.as_ref(), query.year, query.month).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct BudgetSummaryQuery {
    pub year: i32,
    pub month: Option<u32>,
}

/// GET /api/reports/budget-summary?year=[&month=]
/// Budget-vs-actual per budget
pub async fn get_budget_summary(
    State(repo): State<RepositoryState>,
    Query(query): Query<BudgetSummaryQuery>,
) -> Result<impl IntoResponse> {
    if let Some(month) = query.month {
        check_month(month)?;
    }
    let summary = reports::budget_summary(repo.as_ref(), query.year, query.month).await?;
    Ok(Json(summary))
}

/// GET /api/expenses/export
/// Downloads the (optionally period-scoped) expenses as CSV
pub async fn export_expenses(
    State(repo): State<RepositoryState>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse> {
    let period = query.period()?;
    let expenses = repo.list_expenses(period).await?;
    let bytes = csv_io::write_expenses_csv(&expenses)?;
    let disposition = format!(
        "attachment; filename={}",
        csv_io::export_filename(period)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// POST /api/expenses/import
/// Multipart upload; the `file` field must be a `.csv` file
pub async fn import_expenses(
    State(repo): State<RepositoryState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_csv = field
            .file_name()
            .map(|name| name.to_ascii_lowercase().ends_with(".csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ApiError::BadRequest("Please upload a .csv file".to_string()));
        }

        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?;
        let summary = csv_io::import_expenses(repo.as_ref(), &content).await?;
        return Ok(Json(summary));
    }

    Err(ApiError::BadRequest(
        "Missing 'file' field in upload".to_string(),
    ))
}

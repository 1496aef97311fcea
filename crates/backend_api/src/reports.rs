use budget_engine::{build_monthly_report, summarize, Period};
use models::{BudgetSummary, MonthlyReport};

use crate::{repository::Repository, Result};

/// Budget-vs-actual for every budget in the period.
///
/// Without a month only yearly budgets are summarized, against the whole year's expenses.
pub async fn budget_summary(
    repo: &dyn Repository,
    year: i32,
    month: Option<u32>,
) -> Result<Vec<BudgetSummary>> {
    let data = repo.period_data(Period::from_query(Some(year), month)).await?;
    Ok(summarize(&data.budgets, &data.expenses, &data.categories))
}

/// Totals and per-budget breakdown for one month, all taken from a single read.
pub async fn monthly_report(repo: &dyn Repository, year: i32, month: u32) -> Result<MonthlyReport> {
    let data = repo.period_data(Period::Month { year, month }).await?;
    let summaries = summarize(&data.budgets, &data.expenses, &data.categories);

    Ok(build_monthly_report(year, month, &data.expenses, summaries))
}

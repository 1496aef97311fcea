use std::collections::HashMap;

use models::{Budget, BudgetSummary, Category, Expense, DEFAULT_CATEGORY_COLOR};

/// Maps category names to colors. With duplicate names the last category wins.
pub fn color_lookup(categories: &[Category]) -> HashMap<&str, &str> {
    categories
        .iter()
        .map(|c| (c.name.as_str(), c.color.as_str()))
        .collect()
}

/// Sums amounts, sticking at the `i64` bounds instead of overflowing.
pub fn saturating_total(amounts: impl IntoIterator<Item = i64>) -> i64 {
    amounts.into_iter().fold(0i64, i64::saturating_add)
}

/// Joins each budget with the expenses of its category.
///
/// `budgets` and `expenses` are expected to be scoped to the same period already.
/// Output follows budget order. Category names match exactly. Two budgets for the
/// same category each count the full set of matching expenses.
pub fn summarize(
    budgets: &[Budget],
    expenses: &[Expense],
    categories: &[Category],
) -> Vec<BudgetSummary> {
    let colors = color_lookup(categories);

    budgets
        .iter()
        .map(|budget| {
            let used = saturating_total(
                expenses
                    .iter()
                    .filter(|e| e.category == budget.category)
                    .map(|e| e.amount),
            );

            let percentage = if budget.amount > 0 {
                used as f64 * 100.0 / budget.amount as f64
            } else {
                0.0
            };

            BudgetSummary {
                category: budget.category.clone(),
                budget: budget.amount,
                used,
                remaining: budget.amount.saturating_sub(used),
                percentage: percentage.min(100.0),
                color: colors
                    .get(budget.category.as_str())
                    .copied()
                    .unwrap_or(DEFAULT_CATEGORY_COLOR)
                    .to_string(),
                is_over_budget: used > budget.amount,
            }
        })
        .collect()
}

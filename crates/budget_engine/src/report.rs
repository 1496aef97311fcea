use models::{BudgetSummary, Expense, MonthlyReport};

use crate::summary::saturating_total;

/// Human-readable label for a report month, e.g. `2024年5月`.
pub fn month_label(year: i32, month: u32) -> String {
    format!("{}年{}月", year, month)
}

/// Assembles the monthly report from the month's expenses and budget summaries.
///
/// `total_budget` adds up every summary, so duplicated budgets count twice.
pub fn build_monthly_report(
    year: i32,
    month: u32,
    expenses: &[Expense],
    summaries: Vec<BudgetSummary>,
) -> MonthlyReport {
    let total_expenses = saturating_total(expenses.iter().map(|e| e.amount));
    let total_budget = saturating_total(summaries.iter().map(|s| s.budget));
    let budget_utilization = if total_budget > 0 {
        total_expenses as f64 * 100.0 / total_budget as f64
    } else {
        0.0
    };

    MonthlyReport {
        month: month_label(year, month),
        year,
        total_expenses,
        total_budget,
        budget_utilization,
        categories: summaries,
        expense_count: expenses.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{summarize, Period, Store};
    use models::{BudgetCreate, ExpenseCreate, PeriodType, MAX_AMOUNT};

    fn add_expense(store: &mut Store, date: &str, category: &str, amount: i64) {
        store
            .create_expense(ExpenseCreate {
                date: date.to_string(),
                category: category.to_string(),
                amount,
                user: "kato".to_string(),
                description: None,
            })
            .unwrap();
    }

    fn add_budget(
        store: &mut Store,
        category: &str,
        amount: i64,
        period: PeriodType,
        month: Option<u32>,
    ) {
        store
            .create_budget(BudgetCreate {
                category: category.to_string(),
                amount,
                period,
                year: 2024,
                month,
            })
            .unwrap();
    }

    fn report_for(store: &Store, year: i32, month: u32) -> MonthlyReport {
        let period = Period::Month { year, month };
        let expenses = store.list_expenses(period);
        let summaries = summarize(
            &store.list_budgets(period),
            &expenses,
            &store.list_categories(),
        );
        build_monthly_report(year, month, &expenses, summaries)
    }

    #[test]
    fn label_uses_unpadded_month() {
        assert_eq!(month_label(2024, 5), "2024年5月");
        assert_eq!(month_label(2024, 12), "2024年12月");
    }

    #[test]
    fn zero_total_budget_means_zero_utilization() {
        let mut store = Store::new();
        add_expense(&mut store, "2024-05-01", "食費", 1500);

        let report = report_for(&store, 2024, 5);
        assert_eq!(report.total_budget, 0);
        assert_eq!(report.total_expenses, 1500);
        assert_eq!(report.budget_utilization, 0.0);
        assert!(report.categories.is_empty());
        assert_eq!(report.expense_count, 1);
    }

    #[test]
    fn report_totals_cover_the_month_only() {
        let mut store = Store::new();
        add_budget(&mut store, "食費", 20000, PeriodType::Monthly, Some(5));
        add_budget(&mut store, "交通費", 5000, PeriodType::Monthly, Some(5));
        add_budget(&mut store, "食費", 240000, PeriodType::Yearly, None);
        add_expense(&mut store, "2024-05-03", "食費", 6000);
        add_expense(&mut store, "2024-05-20", "交通費", 4000);
        add_expense(&mut store, "2024-04-30", "食費", 9999);

        let report = report_for(&store, 2024, 5);
        assert_eq!(report.month, "2024年5月");
        assert_eq!(report.year, 2024);
        assert_eq!(report.total_expenses, 10000);
        assert_eq!(report.total_budget, 25000);
        assert_eq!(report.budget_utilization, 40.0);
        assert_eq!(report.expense_count, 2);

        let categories: Vec<(&str, i64)> = report
            .categories
            .iter()
            .map(|s| (s.category.as_str(), s.used))
            .collect();
        assert_eq!(categories, vec![("食費", 6000), ("交通費", 4000)]);
    }

    #[test]
    fn month_scope_returns_only_the_monthly_budget() {
        let mut store = Store::new();
        assert_eq!(store.list_categories().len(), 5);
        add_budget(&mut store, "食費", 30000, PeriodType::Monthly, Some(6));
        add_budget(&mut store, "食費", 300000, PeriodType::Yearly, None);

        let report = report_for(&store, 2024, 6);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].budget, 30000);
        assert_eq!(report.categories[0].color, "#10B981");
    }

    #[test]
    fn duplicated_monthly_budgets_double_the_total_budget() {
        let mut store = Store::new();
        add_budget(&mut store, "食費", 10000, PeriodType::Monthly, Some(7));
        add_budget(&mut store, "食費", 10000, PeriodType::Monthly, Some(7));
        add_expense(&mut store, "2024-07-07", "食費", 5000);

        let report = report_for(&store, 2024, 7);
        assert_eq!(report.total_budget, 20000);
        assert_eq!(report.total_expenses, 5000);
        assert_eq!(report.budget_utilization, 25.0);
        assert!(report.categories.iter().all(|s| s.used == 5000));
    }

    #[test]
    fn large_totals_do_not_overflow() {
        let mut store = Store::new();
        for day in 1..=20 {
            add_expense(&mut store, &format!("2024-08-{:02}", day), "食費", MAX_AMOUNT);
        }
        add_budget(&mut store, "食費", MAX_AMOUNT, PeriodType::Monthly, Some(8));

        let report = report_for(&store, 2024, 8);
        assert_eq!(report.total_expenses, MAX_AMOUNT * 20);
        assert_eq!(report.categories[0].used, MAX_AMOUNT * 20);
        assert_eq!(report.budget_utilization, 2000.0);
        assert!(report.categories[0].is_over_budget);
    }

    #[test]
    fn saturated_totals_stay_positive() {
        let huge = i64::MAX / 2 + 1;
        let expenses: Vec<Expense> = (1..=2)
            .map(|id| Expense {
                id,
                date: "2024-09-01".to_string(),
                category: "食費".to_string(),
                amount: huge,
                user: "kato".to_string(),
                description: None,
                created_at: Default::default(),
            })
            .collect();

        let report = build_monthly_report(2024, 9, &expenses, Vec::new());
        assert_eq!(report.total_expenses, i64::MAX);
        assert_eq!(report.expense_count, 2);
    }
}

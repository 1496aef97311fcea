use chrono::Datelike;
use models::{parse_date, Budget, Expense, PeriodType};

/// Reporting scope applied to expenses and budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    All,
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Period {
    /// Builds a period from optional query parameters.
    ///
    /// A month is only meaningful together with a year; `month` alone yields [`Period::All`].
    pub fn from_query(year: Option<i32>, month: Option<u32>) -> Self {
        match (year, month) {
            (Some(year), Some(month)) => Period::Month { year, month },
            (Some(year), None) => Period::Year(year),
            (None, _) => Period::All,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            Period::All => None,
            Period::Year(year) | Period::Month { year, .. } => Some(*year),
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            Period::Month { month, .. } => Some(*month),
            _ => None,
        }
    }

    /// Whether an ISO `YYYY-MM-DD` date falls inside the period.
    ///
    /// Dates that do not parse never match a year or month scope.
    pub fn contains_date(&self, date: &str) -> bool {
        match self {
            Period::All => true,
            Period::Year(year) => parse_date(date).is_some_and(|d| d.year() == *year),
            Period::Month { year, month } => {
                parse_date(date).is_some_and(|d| d.year() == *year && d.month() == *month)
            }
        }
    }

    /// Monthly budgets only match month scopes and yearly budgets only match year scopes.
    pub fn matches_budget(&self, budget: &Budget) -> bool {
        match self {
            Period::All => true,
            Period::Year(year) => budget.period == PeriodType::Yearly && budget.year == *year,
            Period::Month { year, month } => {
                budget.period == PeriodType::Monthly
                    && budget.year == *year
                    && budget.month == Some(*month)
            }
        }
    }

    /// Keeps the expenses dated inside the period, preserving input order.
    pub fn filter_expenses<'a, I>(&self, expenses: I) -> Vec<Expense>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        expenses
            .into_iter()
            .filter(|e| self.contains_date(&e.date))
            .cloned()
            .collect()
    }

    pub fn filter_budgets<'a, I>(&self, budgets: I) -> Vec<Budget>
    where
        I: IntoIterator<Item = &'a Budget>,
    {
        budgets
            .into_iter()
            .filter(|b| self.matches_budget(b))
            .cloned()
            .collect()
    }
}

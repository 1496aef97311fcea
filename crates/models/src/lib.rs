use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Date format used by expense dates, CSV files and query periods.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Color reported for a budget whose category has no registered color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#64748B";

/// Largest accepted expense or budget amount (one trillion yen).
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

// Settings models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// JSON snapshot file; the store stays in memory when absent.
	#[serde(default)]
	pub data_file: Option<PathBuf>,
	#[serde(default)]
	pub log_filter: Option<String>,
}

fn default_host() -> String {
	"127.0.0.1".to_string()
}

fn default_port() -> u16 {
	8000
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
			data_file: None,
			log_filter: None,
		}
	}
}

// Validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("{field} must be greater than 0 (got {value})")]
	NonPositiveAmount { field: &'static str, value: i64 },

	#[error("{field} must be at most {max} (got {value})")]
	AmountTooLarge {
		field: &'static str,
		value: i64,
		max: i64,
	},

	#[error("{field} must be a YYYY-MM-DD date (got '{value}')")]
	InvalidDate { field: &'static str, value: String },

	#[error("{field} must not be empty")]
	EmptyField { field: &'static str },

	#[error("month must be between 1 and 12 (got {0})")]
	MonthOutOfRange(u32),

	#[error("month is required for monthly budgets")]
	MissingMonth,

	#[error("month must be omitted for yearly budgets")]
	UnexpectedMonth,
}

impl ValidationError {
	/// Name of the payload field that failed validation.
	pub fn field(&self) -> &'static str {
		match self {
			ValidationError::NonPositiveAmount { field, .. }
			| ValidationError::AmountTooLarge { field, .. }
			| ValidationError::InvalidDate { field, .. }
			| ValidationError::EmptyField { field } => *field,
			ValidationError::MonthOutOfRange(_)
			| ValidationError::MissingMonth
			| ValidationError::UnexpectedMonth => "month",
		}
	}
}

fn require_amount(field: &'static str, value: i64) -> Result<(), ValidationError> {
	if value <= 0 {
		Err(ValidationError::NonPositiveAmount { field, value })
	} else if value > MAX_AMOUNT {
		Err(ValidationError::AmountTooLarge {
			field,
			value,
			max: MAX_AMOUNT,
		})
	} else {
		Ok(())
	}
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		Err(ValidationError::EmptyField { field })
	} else {
		Ok(())
	}
}

/// Parses an ISO `YYYY-MM-DD` date, returning `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

// Expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCreate {
	pub date: String,
	pub category: String,
	/// Whole yen.
	pub amount: i64,
	pub user: String,
	#[serde(default)]
	pub description: Option<String>,
}

impl ExpenseCreate {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if parse_date(&self.date).is_none() {
			return Err(ValidationError::InvalidDate {
				field: "date",
				value: self.date.clone(),
			});
		}
		require_text("category", &self.category)?;
		require_amount("amount", self.amount)?;
		require_text("user", &self.user)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
	pub id: u64,
	pub date: String,
	pub category: String,
	pub amount: i64,
	pub user: String,
	#[serde(default)]
	pub description: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl Expense {
	pub fn from_payload(id: u64, payload: ExpenseCreate, created_at: DateTime<Utc>) -> Self {
		Self {
			id,
			date: payload.date,
			category: payload.category,
			amount: payload.amount,
			user: payload.user,
			description: payload.description,
			created_at,
		}
	}
}

// Budgets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
	#[default]
	Monthly,
	Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCreate {
	pub category: String,
	pub amount: i64,
	#[serde(default)]
	pub period: PeriodType,
	pub year: i32,
	#[serde(default)]
	pub month: Option<u32>,
}

impl BudgetCreate {
	pub fn validate(&self) -> Result<(), ValidationError> {
		require_text("category", &self.category)?;
		require_amount("amount", self.amount)?;
		match (self.period, self.month) {
			(PeriodType::Monthly, None) => Err(ValidationError::MissingMonth),
			(PeriodType::Monthly, Some(month)) if !(1..=12).contains(&month) => {
				Err(ValidationError::MonthOutOfRange(month))
			}
			(PeriodType::Yearly, Some(_)) => Err(ValidationError::UnexpectedMonth),
			_ => Ok(()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
	pub id: u64,
	pub category: String,
	pub amount: i64,
	pub period: PeriodType,
	pub year: i32,
	#[serde(default)]
	pub month: Option<u32>,
}

impl Budget {
	pub fn from_payload(id: u64, payload: BudgetCreate) -> Self {
		Self {
			id,
			category: payload.category,
			amount: payload.amount,
			period: payload.period,
			year: payload.year,
			month: payload.month,
		}
	}
}

// Categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
	pub name: String,
	pub color: String,
}

impl CategoryCreate {
	pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			color: color.into(),
		}
	}

	pub fn validate(&self) -> Result<(), ValidationError> {
		require_text("name", &self.name)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
	pub id: u64,
	pub name: String,
	pub color: String,
}

impl Category {
	pub fn from_payload(id: u64, payload: CategoryCreate) -> Self {
		Self {
			id,
			name: payload.name,
			color: payload.color,
		}
	}
}

// Report models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
	pub category: String,
	pub budget: i64,
	pub used: i64,
	/// `budget - used`; negative once over budget.
	pub remaining: i64,
	/// Capped at 100 for display; see `is_over_budget` for the real comparison.
	pub percentage: f64,
	pub color: String,
	pub is_over_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
	pub month: String,
	pub year: i32,
	pub total_expenses: i64,
	pub total_budget: i64,
	pub budget_utilization: f64,
	pub categories: Vec<BudgetSummary>,
	pub expense_count: usize,
}

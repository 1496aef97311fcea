//! CSV export and import of expenses.
//!
//! The column headers are the Japanese labels used by the spreadsheets this
//! data comes from. Exports start with a UTF-8 byte-order mark so that Excel
//! picks the right encoding.

use budget_engine::Period;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use models::{Expense, ExpenseCreate};
use serde::Serialize;

use crate::{error::ApiError, repository::Repository, Result};

pub const UTF8_BOM: &str = "\u{feff}";

/// 日付 (date), 科目 (category), 金額 (amount), 使用者 (user), 説明 (description).
pub const CSV_HEADER: [&str; 5] = ["日付", "科目", "金額", "使用者", "説明"];

pub const REQUIRED_COLUMNS: [&str; 4] = ["日付", "科目", "金額", "使用者"];
const DESCRIPTION_COLUMN: &str = "説明";

/// Only the first errors are reported back to the client.
pub const MAX_REPORTED_ERRORS: usize = 10;

/// `expenses.csv`, `expenses-2024.csv` or `expenses-2024-05.csv`.
pub fn export_filename(period: Period) -> String {
    match period {
        Period::All => "expenses.csv".to_string(),
        Period::Year(year) => format!("expenses-{}.csv", year),
        Period::Month { year, month } => format!("expenses-{}-{:02}.csv", year, month),
    }
}

/// Serializes expenses as BOM-prefixed CSV.
pub fn write_expenses_csv(expenses: &[Expense]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(UTF8_BOM.as_bytes().to_vec());
    writer.write_record(CSV_HEADER)?;

    for expense in expenses {
        let amount = expense.amount.to_string();
        writer.write_record([
            expense.date.as_str(),
            expense.category.as_str(),
            amount.as_str(),
            expense.user.as_str(),
            expense.description.as_deref().unwrap_or(""),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("Flushing CSV output: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported_count: usize,
    pub errors: Vec<String>,
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    category: usize,
    amount: usize,
    user: usize,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            date: position(REQUIRED_COLUMNS[0]).unwrap_or_default(),
            category: position(REQUIRED_COLUMNS[1]).unwrap_or_default(),
            amount: position(REQUIRED_COLUMNS[2]).unwrap_or_default(),
            user: position(REQUIRED_COLUMNS[3]).unwrap_or_default(),
            description: position(DESCRIPTION_COLUMN),
        })
    }

    fn parse_row(&self, record: &StringRecord) -> std::result::Result<ExpenseCreate, String> {
        let field = |index: usize| record.get(index).unwrap_or("");

        let description = self
            .description
            .map(field)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(ExpenseCreate {
            date: field(self.date).to_string(),
            category: field(self.category).to_string(),
            amount: parse_amount(field(self.amount))?,
            user: field(self.user).to_string(),
            description,
        })
    }
}

/// Whole yen; `1200.0` is accepted, `1200.5` and `abc` are not.
fn parse_amount(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(amount) = raw.parse::<i64>() {
        return Ok(amount);
    }
    match raw.parse::<f64>() {
        Ok(value) if !value.is_finite() || value.fract() != 0.0 => {
            Err(format!("amount '{}' is not a whole number", raw))
        }
        Ok(value) if (i64::MIN as f64..i64::MAX as f64).contains(&value) => Ok(value as i64),
        Ok(_) => Err(format!("amount '{}' is out of range", raw)),
        Err(_) => Err(format!("amount '{}' is not a whole number", raw)),
    }
}

/// Creates one expense per CSV row.
///
/// The header row must carry every column in [`REQUIRED_COLUMNS`]; otherwise
/// nothing is imported. After that each row stands on its own: a row that does
/// not parse or validate is skipped and reported as `行 {n}: {error}`, where `n`
/// is the line number in the file (the header is line 1).
pub async fn import_expenses(repo: &dyn Repository, content: &[u8]) -> Result<ImportSummary> {
    let text = std::str::from_utf8(content)
        .map_err(|_| ApiError::BadRequest("CSV file must be UTF-8 encoded".to_string()))?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::BadRequest(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut imported_count = 0;
    let mut errors = Vec::new();
    let mut skipped = 0;

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let outcome = match record {
            Ok(record) => columns.parse_row(&record),
            Err(e) => Err(e.to_string()),
        };

        let failure = match outcome {
            Ok(payload) => match repo.create_expense(payload).await {
                Ok(_) => {
                    imported_count += 1;
                    continue;
                }
                Err(ApiError::Validation(e)) => e.to_string(),
                Err(other) => return Err(other),
            },
            Err(message) => message,
        };

        tracing::warn!("Skipping CSV line {}: {}", line, failure);
        skipped += 1;
        if errors.len() < MAX_REPORTED_ERRORS {
            errors.push(format!("行 {}: {}", line, failure));
        }
    }

    tracing::info!("Imported {} expenses from CSV ({} skipped)", imported_count, skipped);

    Ok(ImportSummary {
        message: format!("Imported {} expenses", imported_count),
        imported_count,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    fn expense(id: u64, date: &str, amount: i64, description: Option<&str>) -> Expense {
        Expense {
            id,
            date: date.to_string(),
            category: "食費".to_string(),
            amount,
            user: "mori".to_string(),
            description: description.map(str::to_string),
            created_at: Default::default(),
        }
    }

    fn body(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn filenames_follow_the_period() {
        assert_eq!(export_filename(Period::All), "expenses.csv");
        assert_eq!(export_filename(Period::Year(2024)), "expenses-2024.csv");
        assert_eq!(
            export_filename(Period::Month { year: 2024, month: 5 }),
            "expenses-2024-05.csv"
        );
    }

    #[test]
    fn empty_export_is_bom_and_header_only() {
        let bytes = write_expenses_csv(&[]).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(body(&bytes).lines().count(), 1);
        assert_eq!(body(&bytes).trim_end(), "\u{feff}日付,科目,金額,使用者,説明");
    }

    #[test]
    fn export_writes_one_row_per_expense() {
        let expenses = vec![
            expense(2, "2024-05-20", 1200, Some("弁当, 2個")),
            expense(1, "2024-05-01", 800, None),
        ];
        let bytes = write_expenses_csv(&expenses).unwrap();
        let lines: Vec<&str> = body(&bytes).lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2024-05-20,食費,1200,mori,\"弁当, 2個\"");
        assert_eq!(lines[2], "2024-05-01,食費,800,mori,");
    }

    #[test]
    fn amounts_must_be_whole_numbers() {
        assert_eq!(parse_amount("1500"), Ok(1500));
        assert_eq!(parse_amount("1500.0"), Ok(1500));
        assert!(parse_amount("1500.5").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn oversized_amounts_are_rejected_not_clamped() {
        assert_eq!(parse_amount("1e20"), Err("amount '1e20' is out of range".to_string()));
        assert!(parse_amount("-1e19").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
        assert_eq!(parse_amount("1e3"), Ok(1000));
    }

    #[tokio::test]
    async fn out_of_range_amounts_are_row_errors() {
        let repo = MemoryRepository::new();
        let csv = "日付,科目,金額,使用者\n2024-05-01,食費,1e20,mori\n2024-05-02,食費,2000000000000,mori\n";

        let summary = import_expenses(&repo, csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported_count, 0);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors[0].contains("out of range"));
        assert!(summary.errors[1].starts_with("行 3: "));
        assert!(repo.list_expenses(Period::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_rows_are_skipped_and_reported() {
        let repo = MemoryRepository::new();
        let csv = "日付,科目,金額,使用者,説明\n\
                   2024-05-01,食費,1200,mori,lunch\n\
                   2024-05-02,食費,abc,mori,\n\
                   2024-05-03,交通費,300,mori,\n";

        let summary = import_expenses(&repo, csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported_count, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("行 3: "), "{:?}", summary.errors);

        let stored = repo.list_expenses(Period::All).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].date, "2024-05-03");
        assert_eq!(stored[0].description, None);
        assert_eq!(stored[1].description.as_deref(), Some("lunch"));
    }

    #[tokio::test]
    async fn validation_failures_count_as_row_errors() {
        let repo = MemoryRepository::new();
        let csv = "日付,科目,金額,使用者\n2024/05/01,食費,100,mori\n2024-05-01,食費,0,mori\n";

        let summary = import_expenses(&repo, csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported_count, 0);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors[0].starts_with("行 2: "));
        assert!(summary.errors[1].contains("amount"));
    }

    #[tokio::test]
    async fn error_list_is_capped() {
        let repo = MemoryRepository::new();
        let mut csv = String::from("日付,科目,金額,使用者\n");
        for _ in 0..15 {
            csv.push_str("2024-05-01,食費,x,mori\n");
        }
        csv.push_str("2024-05-01,食費,10,mori\n");

        let summary = import_expenses(&repo, csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported_count, 1);
        assert_eq!(summary.errors.len(), MAX_REPORTED_ERRORS);
        assert!(summary.errors[9].starts_with("行 11: "));
    }

    #[tokio::test]
    async fn missing_columns_reject_the_whole_file() {
        let repo = MemoryRepository::new();
        let csv = "日付,金額\n2024-05-01,100\n";

        let err = import_expenses(&repo, csv.as_bytes()).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m.contains("科目") && m.contains("使用者")));
        assert!(repo.list_expenses(Period::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exported_file_imports_back() {
        let source = MemoryRepository::new();
        let csv = "日付,科目,金額,使用者,説明\n2024-06-01,食費,450,mori,coffee\n";
        import_expenses(&source, csv.as_bytes()).await.unwrap();

        let exported = write_expenses_csv(&source.list_expenses(Period::All).await.unwrap()).unwrap();
        let target = MemoryRepository::new();
        let summary = import_expenses(&target, &exported).await.unwrap();
        assert_eq!(summary.imported_count, 1);
        assert!(summary.errors.is_empty());
    }
}

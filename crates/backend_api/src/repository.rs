use async_trait::async_trait;
use budget_engine::{Period, PeriodData, Store};
use models::{Budget, BudgetCreate, Category, CategoryCreate, Expense, ExpenseCreate};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::Result;

/// Repository trait for expenses, budgets and categories.
///
/// Lookups by id return `Ok(None)` / `Ok(false)` for unknown ids; turning that
/// into a 404 is the caller's job. Payloads are validated before anything is stored.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_expense(&self, payload: ExpenseCreate) -> Result<Expense>;
    async fn get_expense(&self, id: u64) -> Result<Option<Expense>>;
    /// Expenses in `period`, newest date first.
    async fn list_expenses(&self, period: Period) -> Result<Vec<Expense>>;
    async fn update_expense(&self, id: u64, payload: ExpenseCreate) -> Result<Option<Expense>>;
    async fn delete_expense(&self, id: u64) -> Result<bool>;

    async fn create_budget(&self, payload: BudgetCreate) -> Result<Budget>;
    async fn get_budget(&self, id: u64) -> Result<Option<Budget>>;
    async fn list_budgets(&self, period: Period) -> Result<Vec<Budget>>;
    async fn update_budget(&self, id: u64, payload: BudgetCreate) -> Result<Option<Budget>>;
    async fn delete_budget(&self, id: u64) -> Result<bool>;

    async fn create_category(&self, payload: CategoryCreate) -> Result<Category>;
    async fn get_category(&self, id: u64) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn update_category(&self, id: u64, payload: CategoryCreate) -> Result<Option<Category>>;
    async fn delete_category(&self, id: u64) -> Result<bool>;

    /// Budgets, expenses and categories for `period`, read in one go so that
    /// reports never mix data from before and after a write.
    async fn period_data(&self, period: Period) -> Result<PeriodData>;
}

/// Keeps everything in memory; lost when the process exits.
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    /// A repository seeded with the default categories.
    pub fn new() -> Self {
        Self::with_store(Store::new())
    }

    pub fn with_store(store: Store) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Copy of the current store contents.
    pub async fn snapshot(&self) -> Store {
        self.store.read().await.clone()
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_expense(&self, payload: ExpenseCreate) -> Result<Expense> {
        let expense = self.store.write().await.create_expense(payload)?;
        tracing::debug!("Created expense {}", expense.id);
        Ok(expense)
    }

    async fn get_expense(&self, id: u64) -> Result<Option<Expense>> {
        Ok(self.store.read().await.get_expense(id))
    }

    async fn list_expenses(&self, period: Period) -> Result<Vec<Expense>> {
        Ok(self.store.read().await.list_expenses(period))
    }

    async fn update_expense(&self, id: u64, payload: ExpenseCreate) -> Result<Option<Expense>> {
        Ok(self.store.write().await.update_expense(id, payload)?)
    }

    async fn delete_expense(&self, id: u64) -> Result<bool> {
        Ok(self.store.write().await.delete_expense(id))
    }

    async fn create_budget(&self, payload: BudgetCreate) -> Result<Budget> {
        let budget = self.store.write().await.create_budget(payload)?;
        tracing::debug!("Created budget {}", budget.id);
        Ok(budget)
    }

    async fn get_budget(&self, id: u64) -> Result<Option<Budget>> {
        Ok(self.store.read().await.get_budget(id))
    }

    async fn list_budgets(&self, period: Period) -> Result<Vec<Budget>> {
        Ok(self.store.read().await.list_budgets(period))
    }

    async fn update_budget(&self, id: u64, payload: BudgetCreate) -> Result<Option<Budget>> {
        Ok(self.store.write().await.update_budget(id, payload)?)
    }

    async fn delete_budget(&self, id: u64) -> Result<bool> {
        Ok(self.store.write().await.delete_budget(id))
    }

    async fn create_category(&self, payload: CategoryCreate) -> Result<Category> {
        let category = self.store.write().await.create_category(payload)?;
        tracing::debug!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }

    async fn get_category(&self, id: u64) -> Result<Option<Category>> {
        Ok(self.store.read().await.get_category(id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.read().await.list_categories())
    }

    async fn update_category(&self, id: u64, payload: CategoryCreate) -> Result<Option<Category>> {
        Ok(self.store.write().await.update_category(id, payload)?)
    }

    async fn delete_category(&self, id: u64) -> Result<bool> {
        Ok(self.store.write().await.delete_category(id))
    }

    async fn period_data(&self, period: Period) -> Result<PeriodData> {
        Ok(self.store.read().await.period_data(period))
    }
}

/// File-based implementation that keeps the store in a JSON snapshot.
///
/// Reads are served from memory. Every mutation that changes the store rewrites
/// the whole file while the write lock is held, and memory is only updated once
/// that write succeeded, so the file always matches what readers see.
pub struct FileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl FileRepository {
    /// Loads `path` if it exists, otherwise creates it from a freshly seeded store.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let store = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let mut store: Store = serde_json::from_str(&content)?;
            store.repair_counters();
            tracing::info!("Loaded store from {}", path.display());
            store
        } else {
            let store = Store::new();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            save_store(&path, &store).await?;
            tracing::info!("Initialized new store at {}", path.display());
            store
        };

        Ok(Self {
            path,
            inner: MemoryRepository::with_store(store),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the store and swaps it in once it is on disk.
    ///
    /// Nothing is written when `change` leaves the store as it was, e.g. a
    /// rejected payload or an unknown id.
    async fn mutate<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Store) -> T + Send,
        T: Send,
    {
        let mut store = self.inner.store.write().await;
        let mut next = store.clone();
        let outcome = change(&mut next);

        if next != *store {
            save_store(&self.path, &next).await?;
            *store = next;
        }
        Ok(outcome)
    }
}

async fn save_store(path: &Path, store: &Store) -> Result<()> {
    let content = serde_json::to_string_pretty(store)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

#[async_trait]
impl Repository for FileRepository {
    async fn create_expense(&self, payload: ExpenseCreate) -> Result<Expense> {
        let expense = self.mutate(|s| s.create_expense(payload)).await??;
        tracing::debug!("Created expense {}", expense.id);
        Ok(expense)
    }

    async fn get_expense(&self, id: u64) -> Result<Option<Expense>> {
        self.inner.get_expense(id).await
    }

    async fn list_expenses(&self, period: Period) -> Result<Vec<Expense>> {
        self.inner.list_expenses(period).await
    }

    async fn update_expense(&self, id: u64, payload: ExpenseCreate) -> Result<Option<Expense>> {
        Ok(self.mutate(|s| s.update_expense(id, payload)).await??)
    }

    async fn delete_expense(&self, id: u64) -> Result<bool> {
        self.mutate(|s| s.delete_expense(id)).await
    }

    async fn create_budget(&self, payload: BudgetCreate) -> Result<Budget> {
        let budget = self.mutate(|s| s.create_budget(payload)).await??;
        tracing::debug!("Created budget {}", budget.id);
        Ok(budget)
    }

    async fn get_budget(&self, id: u64) -> Result<Option<Budget>> {
        self.inner.get_budget(id).await
    }

    async fn list_budgets(&self, period: Period) -> Result<Vec<Budget>> {
        self.inner.list_budgets(period).await
    }

    async fn update_budget(&self, id: u64, payload: BudgetCreate) -> Result<Option<Budget>> {
        Ok(self.mutate(|s| s.update_budget(id, payload)).await??)
    }

    async fn delete_budget(&self, id: u64) -> Result<bool> {
        self.mutate(|s| s.delete_budget(id)).await
    }

    async fn create_category(&self, payload: CategoryCreate) -> Result<Category> {
        let category = self.mutate(|s| s.create_category(payload)).await??;
        tracing::debug!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }

    async fn get_category(&self, id: u64) -> Result<Option<Category>> {
        self.inner.get_category(id).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.inner.list_categories().await
    }

    async fn update_category(&self, id: u64, payload: CategoryCreate) -> Result<Option<Category>> {
        Ok(self.mutate(|s| s.update_category(id, payload)).await??)
    }

    async fn delete_category(&self, id: u64) -> Result<bool> {
        self.mutate(|s| s.delete_category(id)).await
    }

    async fn period_data(&self, period: Period) -> Result<PeriodData> {
        self.inner.period_data(period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::PeriodType;

    fn expense(date: &str, amount: i64) -> ExpenseCreate {
        ExpenseCreate {
            date: date.to_string(),
            category: "交通費".to_string(),
            amount,
            user: "ito".to_string(),
            description: Some("taxi".to_string()),
        }
    }

    #[tokio::test]
    async fn memory_repository_starts_seeded() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.list_categories().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn memory_repository_rejects_invalid_payloads() {
        let repo = MemoryRepository::new();
        let err = repo.create_expense(expense("2024-01-01", 0)).await.unwrap_err();
        assert!(matches!(err, crate::ApiError::Validation(_)));
        assert!(repo.list_expenses(Period::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_memory_repository_is_isolated() {
        let first = MemoryRepository::new();
        let second = MemoryRepository::new();
        first.create_expense(expense("2024-01-01", 100)).await.unwrap();
        assert!(second.list_expenses(Period::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_repository_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.json");

        {
            let repo = FileRepository::open(&path).await.unwrap();
            assert!(path.exists());
            let created = repo.create_expense(expense("2024-02-10", 1500)).await.unwrap();
            let deleted = repo.create_expense(expense("2024-02-11", 900)).await.unwrap();
            assert!(repo.delete_expense(deleted.id).await.unwrap());
            repo.create_budget(BudgetCreate {
                category: "交通費".to_string(),
                amount: 10000,
                period: PeriodType::Yearly,
                year: 2024,
                month: None,
            })
            .await
            .unwrap();
            assert_eq!(created.id, 1);
        }

        let reopened = FileRepository::open(&path).await.unwrap();
        let expenses = reopened.list_expenses(Period::All).await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 1500);
        assert_eq!(reopened.list_budgets(Period::Year(2024)).await.unwrap().len(), 1);
        assert_eq!(reopened.list_categories().await.unwrap().len(), 5);

        // Id 2 was used by the deleted expense.
        let next = reopened.create_expense(expense("2024-02-12", 300)).await.unwrap();
        assert_eq!(next.id, 3);
    }

    #[tokio::test]
    async fn file_repository_reports_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, "{ broken").await.unwrap();

        let result = FileRepository::open(&path).await;
        assert!(matches!(result, Err(crate::ApiError::JsonError(_))));
    }

    #[tokio::test]
    async fn failed_save_leaves_the_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let repo = FileRepository::open(&path).await.unwrap();
        repo.create_expense(expense("2024-02-10", 1500)).await.unwrap();

        // A directory in place of the snapshot makes every write fail.
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        let err = repo.create_expense(expense("2024-02-11", 900)).await.unwrap_err();
        assert!(matches!(err, crate::ApiError::IoError(_)));
        assert!(repo.delete_expense(1).await.is_err());

        let expenses = repo.list_expenses(Period::All).await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 1500);

        // Once the file is writable again the failed id is not skipped.
        tokio::fs::remove_dir(&path).await.unwrap();
        let next = repo.create_expense(expense("2024-02-12", 300)).await.unwrap();
        assert_eq!(next.id, 2);

        let reopened = FileRepository::open(&path).await.unwrap();
        assert_eq!(reopened.list_expenses(Period::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unchanged_store_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let repo = FileRepository::open(&path).await.unwrap();

        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        // Neither call changes anything, so neither touches the broken path.
        assert!(!repo.delete_budget(42).await.unwrap());
        let err = repo.create_expense(expense("2024-02-10", 0)).await.unwrap_err();
        assert!(matches!(err, crate::ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn period_data_reads_one_consistent_view() {
        let repo = MemoryRepository::new();
        repo.create_expense(expense("2024-02-10", 1500)).await.unwrap();
        repo.create_expense(expense("2023-02-10", 700)).await.unwrap();
        repo.create_budget(BudgetCreate {
            category: "交通費".to_string(),
            amount: 10000,
            period: PeriodType::Yearly,
            year: 2024,
            month: None,
        })
        .await
        .unwrap();

        let data = repo.period_data(Period::Year(2024)).await.unwrap();
        assert_eq!(data.expenses.len(), 1);
        assert_eq!(data.budgets.len(), 1);
        assert_eq!(data.categories.len(), 5);
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use models::{
    Budget, BudgetCreate, Category, CategoryCreate, Expense, ExpenseCreate, ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::period::Period;

/// Categories every fresh store starts with.
pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("交通費", "#2563EB"),
    ("食費", "#10B981"),
    ("接待費", "#EF4444"),
    ("オフィス用品", "#F59E0B"),
    ("その他", "#64748B"),
];

/// Keyed collections of expenses, budgets and categories.
///
/// Each entity type has its own id counter. Ids start at 1 and are never
/// handed out twice, even after the entity holding them is deleted.
/// The whole store serializes to JSON, counters included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    expenses: BTreeMap<u64, Expense>,
    #[serde(default)]
    budgets: BTreeMap<u64, Budget>,
    #[serde(default)]
    categories: BTreeMap<u64, Category>,
    #[serde(default = "first_id")]
    next_expense_id: u64,
    #[serde(default = "first_id")]
    next_budget_id: u64,
    #[serde(default = "first_id")]
    next_category_id: u64,
}

/// Everything a budget report needs, scoped to one period and read at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodData {
    pub budgets: Vec<Budget>,
    pub expenses: Vec<Expense>,
    pub categories: Vec<Category>,
}

fn first_id() -> u64 {
    1
}

fn next_free_id<T>(counter: &mut u64, existing: &BTreeMap<u64, T>) -> u64 {
    let id = *counter;
    *counter += 1;
    debug_assert!(!existing.contains_key(&id));
    id
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// A store seeded with [`DEFAULT_CATEGORIES`].
    pub fn new() -> Self {
        let mut store = Self::empty();
        for (name, color) in DEFAULT_CATEGORIES {
            // Seed data is known to be valid.
            let category = CategoryCreate::new(name, color);
            let id = next_free_id(&mut store.next_category_id, &store.categories);
            store
                .categories
                .insert(id, Category::from_payload(id, category));
        }
        store
    }

    /// A store without any entity, not even the default categories.
    pub fn empty() -> Self {
        Self {
            expenses: BTreeMap::new(),
            budgets: BTreeMap::new(),
            categories: BTreeMap::new(),
            next_expense_id: first_id(),
            next_budget_id: first_id(),
            next_category_id: first_id(),
        }
    }

    /// Moves every counter past the highest stored id.
    ///
    /// Needed after loading a snapshot that was edited by hand.
    pub fn repair_counters(&mut self) {
        fn past_last<T>(counter: &mut u64, map: &BTreeMap<u64, T>) {
            if let Some(last) = map.keys().next_back() {
                *counter = (*counter).max(last + 1);
            }
        }
        past_last(&mut self.next_expense_id, &self.expenses);
        past_last(&mut self.next_budget_id, &self.budgets);
        past_last(&mut self.next_category_id, &self.categories);
    }

    // Expenses

    pub fn create_expense(&mut self, payload: ExpenseCreate) -> Result<Expense, ValidationError> {
        self.create_expense_at(payload, Utc::now())
    }

    pub fn create_expense_at(
        &mut self,
        payload: ExpenseCreate,
        created_at: DateTime<Utc>,
    ) -> Result<Expense, ValidationError> {
        payload.validate()?;
        let id = next_free_id(&mut self.next_expense_id, &self.expenses);
        let expense = Expense::from_payload(id, payload, created_at);
        self.expenses.insert(id, expense.clone());
        Ok(expense)
    }

    pub fn get_expense(&self, id: u64) -> Option<Expense> {
        self.expenses.get(&id).cloned()
    }

    /// Expenses inside `period`, newest date first.
    ///
    /// Dates compare as strings; equal dates keep insertion order.
    pub fn list_expenses(&self, period: Period) -> Vec<Expense> {
        let mut expenses = period.filter_expenses(self.expenses.values());
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        expenses
    }

    /// Replaces every field except `id` and `created_at`.
    pub fn update_expense(
        &mut self,
        id: u64,
        payload: ExpenseCreate,
    ) -> Result<Option<Expense>, ValidationError> {
        payload.validate()?;
        let Some(existing) = self.expenses.get_mut(&id) else {
            return Ok(None);
        };
        *existing = Expense::from_payload(id, payload, existing.created_at);
        Ok(Some(existing.clone()))
    }

    pub fn delete_expense(&mut self, id: u64) -> bool {
        self.expenses.remove(&id).is_some()
    }

    // Budgets

    pub fn create_budget(&mut self, payload: BudgetCreate) -> Result<Budget, ValidationError> {
        payload.validate()?;
        let id = next_free_id(&mut self.next_budget_id, &self.budgets);
        let budget = Budget::from_payload(id, payload);
        self.budgets.insert(id, budget.clone());
        Ok(budget)
    }

    pub fn get_budget(&self, id: u64) -> Option<Budget> {
        self.budgets.get(&id).cloned()
    }

    /// Budgets matching `period`, in creation order.
    pub fn list_budgets(&self, period: Period) -> Vec<Budget> {
        period.filter_budgets(self.budgets.values())
    }

    pub fn update_budget(
        &mut self,
        id: u64,
        payload: BudgetCreate,
    ) -> Result<Option<Budget>, ValidationError> {
        payload.validate()?;
        let Some(existing) = self.budgets.get_mut(&id) else {
            return Ok(None);
        };
        *existing = Budget::from_payload(id, payload);
        Ok(Some(existing.clone()))
    }

    pub fn delete_budget(&mut self, id: u64) -> bool {
        self.budgets.remove(&id).is_some()
    }

    // Categories

    /// Duplicate names are accepted.
    pub fn create_category(
        &mut self,
        payload: CategoryCreate,
    ) -> Result<Category, ValidationError> {
        payload.validate()?;
        let id = next_free_id(&mut self.next_category_id, &self.categories);
        let category = Category::from_payload(id, payload);
        self.categories.insert(id, category.clone());
        Ok(category)
    }

    pub fn get_category(&self, id: u64) -> Option<Category> {
        self.categories.get(&id).cloned()
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.values().cloned().collect()
    }

    /// Renaming does not touch expenses or budgets that use the old name.
    pub fn update_category(
        &mut self,
        id: u64,
        payload: CategoryCreate,
    ) -> Result<Option<Category>, ValidationError> {
        payload.validate()?;
        let Some(existing) = self.categories.get_mut(&id) else {
            return Ok(None);
        };
        *existing = Category::from_payload(id, payload);
        Ok(Some(existing.clone()))
    }

    pub fn delete_category(&mut self, id: u64) -> bool {
        self.categories.remove(&id).is_some()
    }

    /// Budgets and expenses of `period` together with every category.
    pub fn period_data(&self, period: Period) -> PeriodData {
        PeriodData {
            budgets: self.list_budgets(period),
            expenses: self.list_expenses(period),
            categories: self.list_categories(),
        }
    }
}

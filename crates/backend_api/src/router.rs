use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    budget_handlers, category_handlers, expense_handlers, handlers, repository::Repository,
};

/// Create the main application router with all API endpoints
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Expense endpoints (static paths before `:id`)
        .route(
            "/api/expenses",
            get(expense_handlers::get_expenses).post(expense_handlers::create_expense),
        )
        .route("/api/expenses/export", get(handlers::export_expenses))
        .route("/api/expenses/import", post(handlers::import_expenses))
        .route(
            "/api/expenses/:id",
            get(expense_handlers::get_expense)
                .put(expense_handlers::update_expense)
                .delete(expense_handlers::delete_expense),
        )
        // Budget endpoints
        .route(
            "/api/budgets",
            get(budget_handlers::get_budgets).post(budget_handlers::create_budget),
        )
        .route(
            "/api/budgets/:id",
            get(budget_handlers::get_budget)
                .put(budget_handlers::update_budget)
                .delete(budget_handlers::delete_budget),
        )
        // Category endpoints
        .route(
            "/api/categories",
            get(category_handlers::get_categories).post(category_handlers::create_category),
        )
        .route(
            "/api/categories/:id",
            get(category_handlers::get_category)
                .put(category_handlers::update_category)
                .delete(category_handlers::delete_category),
        )
        // Reports
        .route("/api/reports/monthly", get(handlers::get_monthly_report))
        .route(
            "/api/reports/budget-summary",
            get(handlers::get_budget_summary),
        )
        // Add shared state
        .with_state(repo)
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

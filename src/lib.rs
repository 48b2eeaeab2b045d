//! Expense Tracker is a small web app for recording expenses and grouping
//! them into categories.
//!
//! This library provides a JSON REST API under `/api` and a set of
//! server-rendered HTML pages for browsing and editing the same data.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod pagination;
mod patch;
mod routing;
mod seed;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{
    Category, CategoryId, CategoryStatistics, CategoryUpdate, NewCategory,
    categories_with_expense_counts, category_statistics, create_category, delete_category,
    get_category, get_category_by_name, list_categories, update_category,
};
pub use db::initialize as initialize_db;
pub use error::{Entity, Error};
pub use expense::{
    CategorySpending, Expense, ExpenseId, ExpenseStatistics, ExpenseUpdate, MonthlySpending,
    NewExpense, create_expense, delete_expense, expense_statistics, expenses_by_category,
    expenses_by_date_range, get_expense, list_expenses, monthly_spending, recent_expenses,
    search_expenses, spending_by_category, total_expense_amount, update_expense,
};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::seed_database;
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

//! JSON handlers for expenses and spending reports.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, Duration};

use crate::{
    api::{ApiError, ApiState, deleted_response},
    category::{CategoryId, get_category, list_categories},
    error::Error,
    expense::{
        CategorySpending, Expense, ExpenseId, ExpenseUpdate, MonthlySpending, NewExpense,
        create_expense, delete_expense, expense_statistics, expenses_by_category,
        expenses_by_date_range, get_expense, list_expenses, monthly_spending, recent_expenses,
        search_expenses, spending_by_category, total_expense_amount, update_expense,
    },
    timezone::local_today,
};

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_RECENT_LIMIT: u64 = 10;
const MAX_RECENT_LIMIT: u64 = 50;
/// How many expenses a search with no criteria returns.
const UNFILTERED_SEARCH_LIMIT: u64 = 50;
/// How far back the monthly report looks.
const MONTHLY_REPORT_DAYS: i64 = 365;
const UNCATEGORIZED: &str = "Uncategorized";

/// An expense with the name of its category.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    #[serde(flatten)]
    expense: Expense,
    category_name: String,
}

#[derive(Debug, Serialize)]
pub struct ExpenseSummary {
    total_expenses: u64,
    total_amount: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<u64>,
    size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    keyword: Option<String>,
    start_date: Option<Date>,
    end_date: Option<Date>,
}

/// Get a page of expenses in the order they were created.
///
/// `page` starts at 1 and `size` is between 1 and 100.
pub async fn get_expenses_api(
    State(state): State<ApiState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let page = query.page.unwrap_or(1);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(Error::invalid("page", "must be at least 1").into());
    }

    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(Error::invalid("size", format!("must be between 1 and {MAX_PAGE_SIZE}")).into());
    }

    let offset = (page - 1)
        .checked_mul(size)
        .ok_or_else(|| Error::invalid("page", "is too large"))?;

    let connection = state.connection()?;
    let expenses = list_expenses(offset, size, &connection)?;

    Ok(Json(with_category_names(expenses, &connection)?))
}

/// Get the most recent expenses by date, at most 50.
pub async fn get_recent_expenses_api(
    State(state): State<ApiState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);

    if !(1..=MAX_RECENT_LIMIT).contains(&limit) {
        return Err(
            Error::invalid("limit", format!("must be between 1 and {MAX_RECENT_LIMIT}")).into(),
        );
    }

    let connection = state.connection()?;
    let expenses = recent_expenses(limit, &connection)?;

    Ok(Json(with_category_names(expenses, &connection)?))
}

pub async fn get_expense_summary_api(
    State(state): State<ApiState>,
) -> Result<Json<ExpenseSummary>, ApiError> {
    let connection = state.connection()?;

    Ok(Json(ExpenseSummary {
        total_expenses: expense_statistics(&connection)?.total_expenses,
        total_amount: total_expense_amount(&connection)?,
    }))
}

pub async fn get_category_analytics_api(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CategorySpending>>, ApiError> {
    let connection = state.connection()?;

    Ok(Json(spending_by_category(&connection)?))
}

/// Get the total spent per month over the last year.
pub async fn get_monthly_analytics_api(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MonthlySpending>>, ApiError> {
    let since = local_today(&state.local_timezone)? - Duration::days(MONTHLY_REPORT_DAYS);
    let connection = state.connection()?;

    Ok(Json(monthly_spending(since, &connection)?))
}

/// Search by description keyword or by date range.
///
/// A keyword takes precedence over dates. A start date without an end date
/// searches up to today. With no criteria the first 50 expenses are returned.
pub async fn search_expenses_api(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let keyword = query.keyword.filter(|keyword| !keyword.is_empty());
    let today = local_today(&state.local_timezone)?;
    let connection = state.connection()?;

    let expenses = match (keyword, query.start_date, query.end_date) {
        (Some(keyword), _, _) => search_expenses(&keyword, &connection)?,
        (None, Some(start), Some(end)) => expenses_by_date_range(start, end, &connection)?,
        (None, Some(start), None) => expenses_by_date_range(start, today, &connection)?,
        (None, None, _) => list_expenses(0, UNFILTERED_SEARCH_LIMIT, &connection)?,
    };

    Ok(Json(with_category_names(expenses, &connection)?))
}

/// Get every expense in a category. An unknown category has no expenses.
pub async fn get_expenses_by_category_api(
    State(state): State<ApiState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let connection = state.connection()?;
    let expenses = expenses_by_category(category_id, &connection)?;

    Ok(Json(with_category_names(expenses, &connection)?))
}

pub async fn get_expense_api(
    State(state): State<ApiState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let connection = state.connection()?;
    let expense = get_expense(expense_id, &connection)?;

    Ok(Json(with_category_name(expense, &connection)?))
}

pub async fn create_expense_api(
    State(state): State<ApiState>,
    Json(new_expense): Json<NewExpense>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let today = local_today(&state.local_timezone)?;
    let connection = state.connection()?;
    let expense = create_expense(new_expense, today, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(with_category_name(expense, &connection)?),
    ))
}

/// Apply a partial update. Fields missing from the body are left unchanged.
pub async fn update_expense_api(
    State(state): State<ApiState>,
    Path(expense_id): Path<ExpenseId>,
    Json(update): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let today = local_today(&state.local_timezone)?;
    let connection = state.connection()?;
    let expense = update_expense(expense_id, update, today, &connection)?;

    Ok(Json(with_category_name(expense, &connection)?))
}

pub async fn delete_expense_api(
    State(state): State<ApiState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Value>, ApiError> {
    let connection = state.connection()?;
    delete_expense(expense_id, &connection)?;

    Ok(deleted_response(format!(
        "Expense {expense_id} deleted successfully"
    )))
}

fn with_category_names(
    expenses: Vec<Expense>,
    connection: &Connection,
) -> Result<Vec<ExpenseResponse>, Error> {
    let names = list_categories(connection)?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect::<HashMap<_, _>>();

    Ok(expenses
        .into_iter()
        .map(|expense| ExpenseResponse {
            category_name: names
                .get(&expense.category_id)
                .cloned()
                .unwrap_or_else(|| UNCATEGORIZED.to_owned()),
            expense,
        })
        .collect())
}

fn with_category_name(expense: Expense, connection: &Connection) -> Result<ExpenseResponse, Error> {
    let category_name = match get_category(expense.category_id, connection) {
        Ok(category) => category.name,
        Err(Error::NotFound { .. }) => UNCATEGORIZED.to_owned(),
        Err(error) => return Err(error),
    };

    Ok(ExpenseResponse {
        expense,
        category_name,
    })
}

//! The business rules for reading and changing expenses.
//!
//! Checks run in a fixed order: the records that an expense refers to must
//! exist before its values are looked at, so an expense with a bad amount in a
//! missing category is reported as [Error::NotFound].

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::CategoryId,
    error::Entity,
    expense::{
        CategorySpending, Expense, ExpenseFilter, ExpenseId, ExpenseStatistics, ExpenseUpdate,
        MonthlySpending, NewExpense,
        db::{
            count_expenses, count_filtered_expenses, delete_expense_row, insert_expense,
            select_expense, select_expenses, select_expenses_by_category,
            select_expenses_by_date_range, select_expenses_by_keyword, select_filtered_expenses,
            select_monthly_spending, select_recent_expenses, select_spending_by_category,
            sum_expenses, update_expense_row,
        },
        domain::{validate_amount_sign, validate_expense_date},
    },
};

/// Get up to `limit` expenses, skipping the first `skip`.
pub fn list_expenses(skip: u64, limit: u64, connection: &Connection) -> Result<Vec<Expense>, Error> {
    tracing::debug!("Listing expenses (skip={skip}, limit={limit})");
    select_expenses(skip, limit, connection)
}

/// Get the expense with `expense_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such expense.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    tracing::debug!("Getting expense {expense_id}");

    select_expense(expense_id, connection)?.ok_or(Error::NotFound {
        entity: Entity::Expense,
        id: expense_id,
    })
}

/// Create an expense.
///
/// `today` is the current date in the server's timezone.
///
/// # Errors
/// Returns, in order of precedence, [Error::NotFound] if the category does
/// not exist, then [Error::Validation] if the amount is not positive, the date
/// is after `today` or another field is malformed.
pub fn create_expense(
    new_expense: NewExpense,
    today: Date,
    connection: &Connection,
) -> Result<Expense, Error> {
    tracing::debug!("Creating expense {:?}", new_expense.description);

    let transaction = connection.unchecked_transaction()?;

    ensure_category_exists(new_expense.category_id, &transaction)?;
    validate_amount_sign(new_expense.amount)
        .and_then(|_| validate_expense_date(new_expense.expense_date, today))
        .and_then(|_| new_expense.validate())
        .inspect_err(|error| tracing::warn!("Rejected new expense: {error}"))?;

    let expense = insert_expense(&new_expense, OffsetDateTime::now_utc(), &transaction)?;
    transaction.commit()?;

    tracing::info!("Created expense {} for {}", expense.id, expense.amount);

    Ok(expense)
}

/// Apply the fields present in `update` to the expense with `expense_id`.
///
/// Only the fields present in `update` are checked, in the same order as
/// [create_expense].
///
/// # Errors
/// Returns [Error::NotFound] if the expense or the new category does not
/// exist, otherwise [Error::Validation] if a present field breaks a rule.
pub fn update_expense(
    expense_id: ExpenseId,
    update: ExpenseUpdate,
    today: Date,
    connection: &Connection,
) -> Result<Expense, Error> {
    tracing::debug!("Updating expense {expense_id}");

    let transaction = connection.unchecked_transaction()?;

    let mut expense = select_expense(expense_id, &transaction)?.ok_or_else(|| {
        tracing::warn!("Cannot update missing expense {expense_id}");
        Error::NotFound {
            entity: Entity::Expense,
            id: expense_id,
        }
    })?;

    if let Some(category_id) = update.category_id {
        ensure_category_exists(category_id, &transaction)?;
    }

    update
        .amount
        .map_or(Ok(()), validate_amount_sign)
        .and_then(|_| {
            update
                .expense_date
                .map_or(Ok(()), |expense_date| validate_expense_date(expense_date, today))
        })
        .and_then(|_| update.validate())
        .inspect_err(|error| tracing::warn!("Rejected update to expense {expense_id}: {error}"))?;

    update.apply_to(&mut expense);
    expense.updated_at = OffsetDateTime::now_utc();

    update_expense_row(&expense, &transaction)?;
    transaction.commit()?;

    Ok(expense)
}

/// Delete the expense with `expense_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such expense.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    tracing::debug!("Deleting expense {expense_id}");

    let transaction = connection.unchecked_transaction()?;

    if delete_expense_row(expense_id, &transaction)? == 0 {
        tracing::warn!("Cannot delete missing expense {expense_id}");
        return Err(Error::NotFound {
            entity: Entity::Expense,
            id: expense_id,
        });
    }

    transaction.commit()?;

    Ok(())
}

/// Get the expenses in a category, newest first.
///
/// An unknown category has no expenses.
pub fn expenses_by_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    tracing::debug!("Listing expenses in category {category_id}");
    select_expenses_by_category(category_id, connection)
}

/// Get the expenses dated from `start` to `end`, including both days.
pub fn expenses_by_date_range(
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    tracing::debug!("Listing expenses from {start} to {end}");
    select_expenses_by_date_range(start, end, connection)
}

/// The sum of every expense, zero if there are none.
pub fn total_expense_amount(connection: &Connection) -> Result<Decimal, Error> {
    tracing::debug!("Summing expenses");
    sum_expenses(connection)
}

/// Get the expenses whose description contains `keyword`, ignoring case.
pub fn search_expenses(keyword: &str, connection: &Connection) -> Result<Vec<Expense>, Error> {
    tracing::debug!("Searching expenses for {keyword:?}");
    select_expenses_by_keyword(keyword, connection)
}

/// Count the expenses.
pub fn expense_statistics(connection: &Connection) -> Result<ExpenseStatistics, Error> {
    tracing::debug!("Getting expense statistics");

    Ok(ExpenseStatistics {
        total_expenses: count_expenses(connection)?,
    })
}

/// Get the `limit` most recent expenses by date.
pub fn recent_expenses(limit: u64, connection: &Connection) -> Result<Vec<Expense>, Error> {
    tracing::debug!("Listing the {limit} most recent expenses");
    select_recent_expenses(limit, connection)
}

/// Get the number of expenses and their sum for every category, including empty ones.
pub fn spending_by_category(connection: &Connection) -> Result<Vec<CategorySpending>, Error> {
    tracing::debug!("Getting spending by category");
    select_spending_by_category(connection)
}

/// Get the total spent in each month, for expenses on or after `since`.
pub fn monthly_spending(since: Date, connection: &Connection) -> Result<Vec<MonthlySpending>, Error> {
    tracing::debug!("Getting monthly spending since {since}");
    select_monthly_spending(since, connection)
}

/// Get a page of the expenses that match `filter`, newest first, and the
/// total number of matching expenses.
pub fn filter_expenses(
    filter: &ExpenseFilter,
    skip: u64,
    limit: u64,
    connection: &Connection,
) -> Result<(Vec<Expense>, u64), Error> {
    tracing::debug!("Filtering expenses with {filter:?} (skip={skip}, limit={limit})");

    let expenses = select_filtered_expenses(filter, skip, limit, connection)?;
    let count = count_filtered_expenses(filter, connection)?;

    Ok((expenses, count))
}

fn ensure_category_exists(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let exists = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1)",
        [category_id],
        |row| row.get::<_, bool>(0),
    )?;

    if !exists {
        tracing::warn!("Category {category_id} does not exist");
        return Err(Error::NotFound {
            entity: Entity::Category,
            id: category_id,
        });
    }

    Ok(())
}

//! Database operations for expenses.
//!
//! Amounts are stored as whole cents so that sums are exact.

use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::CategoryId,
    expense::{
        CategorySpending, Expense, ExpenseFilter, ExpenseId, MonthlySpending, NewExpense,
        domain::{from_cents, to_cents},
    },
};

const SELECT_COLUMNS: &str =
    "id, amount_cents, description, expense_date, category_id, notes, created_at, updated_at";

/// SQLite integers are signed, so counts past `i64::MAX` are capped there.
fn sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Initialize the expense table and indexes.
///
/// The category table must exist first.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
            description TEXT NOT NULL,
            expense_date TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(expense_date);
        CREATE INDEX IF NOT EXISTS idx_expense_category_id ON expense(category_id);",
    )?;

    Ok(())
}

/// Insert an expense and return it with its generated ID.
pub fn insert_expense(
    new_expense: &NewExpense,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO expense
                (amount_cents, description, expense_date, category_id, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {SELECT_COLUMNS};"
        ))?
        .query_row(
            (
                to_cents(new_expense.amount),
                &new_expense.description,
                new_expense.expense_date,
                new_expense.category_id,
                &new_expense.notes,
                now,
            ),
            map_row,
        )
        .map_err(Error::from)
}

/// Retrieve a single expense by ID, `None` if it does not exist.
pub fn select_expense(
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<Option<Expense>, Error> {
    connection
        .prepare(&format!("SELECT {SELECT_COLUMNS} FROM expense WHERE id = :id;"))?
        .query_row(&[(":id", &expense_id)], map_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve up to `limit` expenses in insertion order, skipping the first `offset`.
pub fn select_expenses(
    offset: u64,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    query_expenses(
        &format!("SELECT {SELECT_COLUMNS} FROM expense ORDER BY id ASC LIMIT ?1 OFFSET ?2;"),
        params![sql_count(limit), sql_count(offset)],
        connection,
    )
}

/// Retrieve up to `limit` expenses, newest first.
pub fn select_recent_expenses(limit: u64, connection: &Connection) -> Result<Vec<Expense>, Error> {
    query_expenses(
        &format!(
            "SELECT {SELECT_COLUMNS} FROM expense
            ORDER BY expense_date DESC, id DESC
            LIMIT ?1;"
        ),
        params![sql_count(limit)],
        connection,
    )
}

/// Retrieve every expense in a category, newest first.
pub fn select_expenses_by_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    query_expenses(
        &format!(
            "SELECT {SELECT_COLUMNS} FROM expense
            WHERE category_id = ?1
            ORDER BY expense_date DESC, id DESC;"
        ),
        params![category_id],
        connection,
    )
}

/// Retrieve every expense dated between `start` and `end`, both inclusive, oldest first.
pub fn select_expenses_by_date_range(
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    query_expenses(
        &format!(
            "SELECT {SELECT_COLUMNS} FROM expense
            WHERE expense_date BETWEEN ?1 AND ?2
            ORDER BY expense_date ASC, id ASC;"
        ),
        params![start, end],
        connection,
    )
}

/// Retrieve every expense whose description contains `keyword`, newest first.
///
/// Matching ignores ASCII case.
pub fn select_expenses_by_keyword(
    keyword: &str,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    query_expenses(
        &format!(
            "SELECT {SELECT_COLUMNS} FROM expense
            WHERE description LIKE ?1 ESCAPE '\\'
            ORDER BY expense_date DESC, id DESC;"
        ),
        params![like_pattern(keyword)],
        connection,
    )
}

/// Retrieve a page of the expenses that match `filter`, newest first.
pub fn select_filtered_expenses(
    filter: &ExpenseFilter,
    offset: u64,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let (where_clause, mut query_params) = filter_clause(filter);
    query_params.push(Box::new(sql_count(limit)));
    query_params.push(Box::new(sql_count(offset)));

    let query = format!(
        "SELECT {SELECT_COLUMNS} FROM expense
        {where_clause}
        ORDER BY expense_date DESC, id DESC
        LIMIT ? OFFSET ?;"
    );
    let query_params = query_params
        .iter()
        .map(|param| param.as_ref())
        .collect::<Vec<_>>();

    query_expenses(&query, &query_params, connection)
}

/// Count the expenses that match `filter`.
pub fn count_filtered_expenses(
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, query_params) = filter_clause(filter);
    let query_params = query_params
        .iter()
        .map(|param| param.as_ref())
        .collect::<Vec<_>>();

    connection
        .query_row(
            &format!("SELECT COUNT(*) FROM expense {where_clause};"),
            query_params.as_slice(),
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as u64)
        .map_err(Error::from)
}

/// Overwrite every column of an existing expense.
///
/// Returns the number of rows changed.
pub fn update_expense_row(expense: &Expense, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "UPDATE expense
            SET amount_cents = ?1, description = ?2, expense_date = ?3, category_id = ?4,
                notes = ?5, updated_at = ?6
            WHERE id = ?7",
            (
                to_cents(expense.amount),
                &expense.description,
                expense.expense_date,
                expense.category_id,
                &expense.notes,
                expense.updated_at,
                expense.id,
            ),
        )
        .map_err(Error::from)
}

/// Delete an expense by ID and return the number of rows deleted.
pub fn delete_expense_row(expense_id: ExpenseId, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM expense WHERE id = ?1", [expense_id])
        .map_err(Error::from)
}

/// Delete every expense in a category and return the number of rows deleted.
pub fn delete_expenses_in_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM expense WHERE category_id = ?1", [category_id])
        .map_err(Error::from)
}

/// The total number of expenses.
pub fn count_expenses(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM expense;", [], |row| row.get::<_, i64>(0))
        .map(|count| count as u64)
        .map_err(Error::from)
}

/// The number of expenses in a category.
pub fn count_expenses_in_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<u64, Error> {
    count_filtered_expenses(
        &ExpenseFilter {
            category_id: Some(category_id),
            keyword: None,
        },
        connection,
    )
}

/// The sum of all expenses, zero if there are none.
pub fn sum_expenses(connection: &Connection) -> Result<Decimal, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expense;",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(from_cents)
        .map_err(Error::from)
}

/// The count and sum of expenses for every category, including empty ones.
pub fn select_spending_by_category(connection: &Connection) -> Result<Vec<CategorySpending>, Error> {
    connection
        .prepare(
            "SELECT c.id, c.name, c.color, COUNT(e.id), COALESCE(SUM(e.amount_cents), 0)
            FROM category c
            LEFT JOIN expense e ON e.category_id = c.id
            GROUP BY c.id
            ORDER BY c.id ASC;",
        )?
        .query_map([], |row| {
            Ok(CategorySpending {
                category_id: row.get(0)?,
                category: row.get(1)?,
                color: row.get(2)?,
                count: row.get::<_, i64>(3)? as u64,
                total: from_cents(row.get(4)?),
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// The sum of expenses per calendar month for expenses on or after `since`, oldest first.
pub fn select_monthly_spending(
    since: Date,
    connection: &Connection,
) -> Result<Vec<MonthlySpending>, Error> {
    connection
        .prepare(
            "SELECT
                CAST(strftime('%Y', expense_date) AS INTEGER) AS year,
                CAST(strftime('%m', expense_date) AS INTEGER) AS month,
                SUM(amount_cents)
            FROM expense
            WHERE expense_date >= ?1
            GROUP BY year, month
            ORDER BY year ASC, month ASC;",
        )?
        .query_map([since], |row| {
            Ok(MonthlySpending {
                year: row.get(0)?,
                month: row.get(1)?,
                total: from_cents(row.get(2)?),
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

fn query_expenses(
    query: &str,
    params: &[&dyn ToSql],
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(query)?
        .query_map(params, map_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

fn filter_clause(filter: &ExpenseFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = Vec::new();
    let mut query_params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(category_id) = filter.category_id {
        conditions.push("category_id = ?");
        query_params.push(Box::new(category_id));
    }

    if let Some(keyword) = &filter.keyword {
        conditions.push("description LIKE ? ESCAPE '\\'");
        query_params.push(Box::new(like_pattern(keyword)));
    }

    if conditions.is_empty() {
        (String::new(), query_params)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), query_params)
    }
}

/// Wrap `keyword` in wildcards, escaping the characters that `LIKE` treats specially.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');

    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: from_cents(row.get(1)?),
        description: row.get(2)?,
        expense_date: row.get(3)?,
        category_id: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        expense::{ExpenseFilter, NewExpense},
        test_utils::{get_test_connection, insert_test_category},
    };

    use super::{
        count_filtered_expenses, insert_expense, like_pattern, select_expenses,
        select_expenses_by_keyword, select_filtered_expenses, select_monthly_spending, sum_expenses,
    };

    fn insert(
        description: &str,
        amount: rust_decimal::Decimal,
        expense_date: time::Date,
        category_id: i64,
        connection: &Connection,
    ) {
        insert_expense(
            &NewExpense {
                amount,
                description: description.to_owned(),
                expense_date,
                category_id,
                notes: None,
            },
            OffsetDateTime::now_utc(),
            connection,
        )
        .unwrap();
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn keyword_search_treats_wildcards_literally() {
        let connection = get_test_connection();
        let category = insert_test_category("Food", &connection);
        insert("50% off pizza", dec!(10), date!(2025 - 01 - 01), category.id, &connection);
        insert("500 grams of rice", dec!(3), date!(2025 - 01 - 02), category.id, &connection);

        let found = select_expenses_by_keyword("50%", &connection).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "50% off pizza");
    }

    #[test]
    fn foreign_key_rejects_unknown_category() {
        let connection = get_test_connection();

        let result = insert_expense(
            &NewExpense {
                amount: dec!(1),
                description: "Orphan".to_owned(),
                expense_date: date!(2025 - 01 - 01),
                category_id: 99,
                notes: None,
            },
            OffsetDateTime::now_utc(),
            &connection,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn sum_is_exact() {
        let connection = get_test_connection();
        let category = insert_test_category("Food", &connection);
        for _ in 0..10 {
            insert("Coffee", dec!(0.10), date!(2025 - 01 - 01), category.id, &connection);
        }

        assert_eq!(sum_expenses(&connection), Ok(dec!(1.00)));
    }

    #[test]
    fn filter_combines_category_and_keyword() {
        let connection = get_test_connection();
        let food = insert_test_category("Food", &connection);
        let transport = insert_test_category("Transport", &connection);
        insert("Lunch", dec!(12), date!(2025 - 01 - 01), food.id, &connection);
        insert("Late lunch", dec!(15), date!(2025 - 01 - 03), food.id, &connection);
        insert("Dinner", dec!(30), date!(2025 - 01 - 02), food.id, &connection);
        insert("Lunch bus", dec!(2), date!(2025 - 01 - 02), transport.id, &connection);
        let filter = ExpenseFilter {
            category_id: Some(food.id),
            keyword: Some("LUNCH".to_owned()),
        };

        let expenses = select_filtered_expenses(&filter, 0, 10, &connection).unwrap();

        let descriptions = expenses
            .iter()
            .map(|expense| expense.description.as_str())
            .collect::<Vec<_>>();
        assert_eq!(descriptions, ["Late lunch", "Lunch"]);
        assert_eq!(count_filtered_expenses(&filter, &connection), Ok(2));
        assert_eq!(
            count_filtered_expenses(&ExpenseFilter::default(), &connection),
            Ok(4)
        );
    }

    #[test]
    fn offset_past_i64_max_returns_nothing() {
        let connection = get_test_connection();
        let category = insert_test_category("Food", &connection);
        insert("Lunch", dec!(12), date!(2025 - 01 - 01), category.id, &connection);

        let filtered =
            select_filtered_expenses(&ExpenseFilter::default(), u64::MAX, u64::MAX, &connection)
                .unwrap();
        let paged = select_expenses(u64::MAX, 10, &connection).unwrap();

        assert!(filtered.is_empty());
        assert!(paged.is_empty());
    }

    #[test]
    fn monthly_spending_groups_by_calendar_month() {
        let connection = get_test_connection();
        let category = insert_test_category("Food", &connection);
        insert("Old", dec!(100), date!(2024 - 12 - 31), category.id, &connection);
        insert("A", dec!(1.25), date!(2025 - 01 - 05), category.id, &connection);
        insert("B", dec!(2.50), date!(2025 - 01 - 20), category.id, &connection);
        insert("C", dec!(4), date!(2025 - 03 - 01), category.id, &connection);

        let months = select_monthly_spending(date!(2025 - 01 - 01), &connection)
            .unwrap()
            .into_iter()
            .map(|month| (month.year, month.month, month.total))
            .collect::<Vec<_>>();

        assert_eq!(months, [(2025, 1, dec!(3.75)), (2025, 3, dec!(4.00))]);
    }
}

/*! This module sets up the application's database schema. */

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, category::create_category_table, expense::create_expense_table};

/// Create the tables and indexes for the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection` so that deleting a
/// category also deletes its expenses.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Pragmas are no-ops inside a transaction, so this has to come first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    tracing::debug!("Database schema is up to date");

    Ok(())
}

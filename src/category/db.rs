//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryId, NewCategory},
    error::Entity,
};

const SELECT_COLUMNS: &str = "id, name, description, icon, color, created_at, updated_at";

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            icon TEXT,
            color TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

/// Insert a category and return it with its generated ID.
pub fn insert_category(
    new_category: &NewCategory,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO category (name, description, icon, color, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {SELECT_COLUMNS};"
        ))?
        .query_row(
            (
                &new_category.name,
                &new_category.description,
                &new_category.icon,
                &new_category.color,
                now,
            ),
            map_row,
        )
        .map_err(|error| map_unique_name_error(error, &new_category.name))
}

/// Retrieve a single category by ID, `None` if it does not exist.
pub fn select_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM category WHERE id = :id;"
        ))?
        .query_row(&[(":id", &category_id)], map_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve a single category by its exact name, `None` if it does not exist.
pub fn select_category_by_name(
    name: &str,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM category WHERE name = :name;"
        ))?
        .query_row(&[(":name", &name)], map_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve every category in insertion order.
pub fn select_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!("SELECT {SELECT_COLUMNS} FROM category ORDER BY id ASC;"))?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Retrieve every category alongside the number of expenses that reference it.
pub fn select_categories_with_expense_counts(
    connection: &Connection,
) -> Result<Vec<(Category, u64)>, Error> {
    connection
        .prepare(
            "SELECT c.id, c.name, c.description, c.icon, c.color, c.created_at, c.updated_at,
                COUNT(e.id)
            FROM category c
            LEFT JOIN expense e ON e.category_id = c.id
            GROUP BY c.id
            ORDER BY c.id ASC;",
        )?
        .query_map([], |row| {
            let category = map_row(row)?;
            let count: i64 = row.get(7)?;

            Ok((category, count as u64))
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// Overwrite every column of an existing category.
///
/// Returns the number of rows changed.
pub fn update_category_row(category: &Category, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "UPDATE category
            SET name = ?1, description = ?2, icon = ?3, color = ?4, updated_at = ?5
            WHERE id = ?6",
            (
                &category.name,
                &category.description,
                &category.icon,
                &category.color,
                category.updated_at,
                category.id,
            ),
        )
        .map_err(|error| map_unique_name_error(error, &category.name))
}

/// Delete a category by ID and return the number of rows deleted.
pub fn delete_category_row(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM category WHERE id = ?1", [category_id])
        .map_err(Error::from)
}

/// The total number of categories.
pub fn count_categories(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM category;", [], |row| row.get::<_, i64>(0))
        .map(|count| count as u64)
        .map_err(Error::from)
}

pub(crate) fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        color: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_unique_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.contains("category.name") =>
        {
            Error::Duplicate {
                entity: Entity::Category,
                field: "name",
                value: name.to_owned(),
            }
        }
        error => error.into(),
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Error,
        category::NewCategory,
        error::Entity,
        test_utils::get_test_connection,
    };

    use super::{
        count_categories, delete_category_row, insert_category, select_all_categories,
        select_category, select_category_by_name,
    };

    fn insert(name: &str, connection: &Connection) {
        let new_category = NewCategory {
            name: name.to_owned(),
            ..Default::default()
        };
        insert_category(&new_category, OffsetDateTime::now_utc(), connection).unwrap();
    }

    #[test]
    fn insert_returns_row_with_id_and_timestamps() {
        let connection = get_test_connection();
        let now = OffsetDateTime::now_utc();
        let new_category = NewCategory {
            name: "Food".to_owned(),
            description: Some("Meals".to_owned()),
            icon: None,
            color: Some("#FF6B6B".to_owned()),
        };

        let category = insert_category(&new_category, now, &connection).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.name, "Food");
        assert_eq!(category.description.as_deref(), Some("Meals"));
        assert_eq!(category.icon, None);
        assert_eq!(category.created_at, now);
        assert_eq!(category.updated_at, now);
        assert_eq!(
            select_category(category.id, &connection).unwrap(),
            Some(category)
        );
    }

    #[test]
    fn unique_constraint_maps_to_duplicate() {
        let connection = get_test_connection();
        insert("Food", &connection);

        let result = insert_category(
            &NewCategory {
                name: "Food".to_owned(),
                ..Default::default()
            },
            OffsetDateTime::now_utc(),
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::Duplicate {
                entity: Entity::Category,
                field: "name",
                value: "Food".to_owned(),
            })
        );
    }

    #[test]
    fn select_by_name_is_case_sensitive() {
        let connection = get_test_connection();
        insert("Food", &connection);

        assert!(select_category_by_name("Food", &connection).unwrap().is_some());
        assert!(select_category_by_name("food", &connection).unwrap().is_none());
    }

    #[test]
    fn select_missing_returns_none() {
        let connection = get_test_connection();

        assert_eq!(select_category(42, &connection), Ok(None));
    }

    #[test]
    fn delete_and_count() {
        let connection = get_test_connection();
        insert("Food", &connection);
        insert("Transport", &connection);
        assert_eq!(count_categories(&connection), Ok(2));

        let first_id = select_all_categories(&connection).unwrap()[0].id;

        assert_eq!(delete_category_row(first_id, &connection), Ok(1));
        assert_eq!(delete_category_row(first_id, &connection), Ok(0));
        assert_eq!(count_categories(&connection), Ok(1));
    }
}

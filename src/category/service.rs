//! The business rules for reading and changing categories.
//!
//! Every function takes the connection to use for the call. Functions that
//! change data run inside a transaction that is only committed once all checks
//! have passed.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    category::{
        Category, CategoryId, CategoryStatistics, CategoryUpdate, NewCategory,
        db::{
            count_categories, delete_category_row, insert_category,
            select_all_categories, select_categories_with_expense_counts, select_category,
            select_category_by_name, update_category_row,
        },
    },
    error::Entity,
    expense::delete_expenses_in_category,
};

/// Get every category.
pub fn list_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    tracing::debug!("Listing categories");
    select_all_categories(connection)
}

/// Get the category with `category_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    tracing::debug!("Getting category {category_id}");

    select_category(category_id, connection)?.ok_or(Error::NotFound {
        entity: Entity::Category,
        id: category_id,
    })
}

/// Get the category whose name is exactly `name`, if there is one.
pub fn get_category_by_name(
    name: &str,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    tracing::debug!("Getting category named {name:?}");
    select_category_by_name(name, connection)
}

/// Create a category.
///
/// # Errors
/// Returns [Error::Validation] if a field is malformed, or [Error::Duplicate]
/// if another category already has the same name.
pub fn create_category(
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    tracing::debug!("Creating category {:?}", new_category.name);

    new_category
        .validate()
        .inspect_err(|error| tracing::warn!("Rejected new category: {error}"))?;

    let transaction = connection.unchecked_transaction()?;

    if select_category_by_name(&new_category.name, &transaction)?.is_some() {
        tracing::warn!("Category {:?} already exists", new_category.name);
        return Err(Error::Duplicate {
            entity: Entity::Category,
            field: "name",
            value: new_category.name,
        });
    }

    let category = insert_category(&new_category, OffsetDateTime::now_utc(), &transaction)?;
    transaction.commit()?;

    tracing::info!("Created category {} ({})", category.id, category.name);

    Ok(category)
}

/// Apply the fields present in `update` to the category with `category_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such category, [Error::Validation]
/// if a present field is malformed, or [Error::Duplicate] if the new name
/// belongs to a different category.
pub fn update_category(
    category_id: CategoryId,
    update: CategoryUpdate,
    connection: &Connection,
) -> Result<Category, Error> {
    tracing::debug!("Updating category {category_id}");

    let transaction = connection.unchecked_transaction()?;

    let mut category = select_category(category_id, &transaction)?.ok_or_else(|| {
        tracing::warn!("Cannot update missing category {category_id}");
        Error::NotFound {
            entity: Entity::Category,
            id: category_id,
        }
    })?;

    update
        .validate()
        .inspect_err(|error| tracing::warn!("Rejected update to category {category_id}: {error}"))?;

    if let Some(name) = &update.name {
        let existing = select_category_by_name(name, &transaction)?;

        if existing.is_some_and(|existing| existing.id != category_id) {
            tracing::warn!("Category {name:?} already exists");
            return Err(Error::Duplicate {
                entity: Entity::Category,
                field: "name",
                value: name.clone(),
            });
        }
    }

    update.apply_to(&mut category);
    category.updated_at = OffsetDateTime::now_utc();

    update_category_row(&category, &transaction)?;
    transaction.commit()?;

    Ok(category)
}

/// Delete the category with `category_id` along with all of its expenses.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    tracing::debug!("Deleting category {category_id}");

    let transaction = connection.unchecked_transaction()?;

    if select_category(category_id, &transaction)?.is_none() {
        tracing::warn!("Cannot delete missing category {category_id}");
        return Err(Error::NotFound {
            entity: Entity::Category,
            id: category_id,
        });
    }

    let expense_count = delete_expenses_in_category(category_id, &transaction)?;
    delete_category_row(category_id, &transaction)?;
    transaction.commit()?;

    tracing::info!("Deleted category {category_id} and {expense_count} expense(s)");

    Ok(())
}

/// Count the categories.
pub fn category_statistics(connection: &Connection) -> Result<CategoryStatistics, Error> {
    tracing::debug!("Getting category statistics");

    Ok(CategoryStatistics {
        total_categories: count_categories(connection)?,
    })
}

/// Get every category with the number of expenses in it, including empty categories.
pub fn categories_with_expense_counts(
    connection: &Connection,
) -> Result<Vec<(Category, u64)>, Error> {
    tracing::debug!("Listing categories with expense counts");
    select_categories_with_expense_counts(connection)
}

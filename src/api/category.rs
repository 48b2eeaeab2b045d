//! JSON handlers for categories.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    api::{ApiError, ApiState, deleted_response},
    category::{
        Category, CategoryId, CategoryStatistics, CategoryUpdate, NewCategory,
        categories_with_expense_counts, category_statistics, create_category, delete_category,
        get_category, get_category_by_name, update_category,
    },
    error::Error,
    expense::count_expenses_in_category,
};

/// A category with the number of expenses filed under it.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    #[serde(flatten)]
    category: Category,
    expense_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct CategorySearchQuery {
    #[serde(default)]
    name: String,
}

/// List every category with its expense count.
pub async fn get_categories_api(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let connection = state.connection()?;

    let categories = categories_with_expense_counts(&connection)?
        .into_iter()
        .map(|(category, expense_count)| CategoryResponse {
            category,
            expense_count,
        })
        .collect();

    Ok(Json(categories))
}

pub async fn get_category_stats_api(
    State(state): State<ApiState>,
) -> Result<Json<CategoryStatistics>, ApiError> {
    let connection = state.connection()?;

    Ok(Json(category_statistics(&connection)?))
}

/// Look up a category by its exact name.
pub async fn search_category_api(
    State(state): State<ApiState>,
    Query(query): Query<CategorySearchQuery>,
) -> Result<Json<CategoryResponse>, ApiError> {
    if query.name.is_empty() {
        return Err(Error::invalid("name", "must not be empty").into());
    }

    let connection = state.connection()?;

    match get_category_by_name(&query.name, &connection)? {
        Some(category) => Ok(Json(with_expense_count(category, &connection)?)),
        None => Err(ApiError::not_found(
            format!("Category with name '{}' not found.", query.name),
            json!({ "entity": "Category", "name": query.name }),
        )),
    }
}

pub async fn get_category_api(
    State(state): State<ApiState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let connection = state.connection()?;
    let category = get_category(category_id, &connection)?;

    Ok(Json(with_expense_count(category, &connection)?))
}

pub async fn create_category_api(
    State(state): State<ApiState>,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let connection = state.connection()?;
    let category = create_category(new_category, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            category,
            expense_count: 0,
        }),
    ))
}

/// Apply a partial update. Fields missing from the body are left unchanged.
pub async fn update_category_api(
    State(state): State<ApiState>,
    Path(category_id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let connection = state.connection()?;
    let category = update_category(category_id, update, &connection)?;

    Ok(Json(with_expense_count(category, &connection)?))
}

/// Delete a category and every expense in it.
pub async fn delete_category_api(
    State(state): State<ApiState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Value>, ApiError> {
    let connection = state.connection()?;
    delete_category(category_id, &connection)?;

    Ok(deleted_response(format!(
        "Category {category_id} deleted successfully"
    )))
}

fn with_expense_count(
    category: Category,
    connection: &rusqlite::Connection,
) -> Result<CategoryResponse, Error> {
    let expense_count = count_expenses_in_category(category.id, connection)?;

    Ok(CategoryResponse {
        category,
        expense_count,
    })
}

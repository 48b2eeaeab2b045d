//! Category editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{
        CategoryId,
        form::{CategoryFormData, FormMethod, category_form_view},
        get_category, update_category,
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the edit category page and the update endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, &connection)?;

    Ok(edit_category_view(category_id, &CategoryFormData::from(&category)).into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, form.clone().into(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::Validation { .. } | Error::Duplicate { .. })) => {
            edit_category_form_view(category_id, &form, Some(&format!("Error: {error}")))
                .into_response()
        }
        Err(error @ Error::NotFound { .. }) => {
            tracing::warn!("Could not update category {category_id}: {error}");
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(category_id: CategoryId, values: &CategoryFormData) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category_id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = edit_category_form_view(category_id, values, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Category" }
            (form)
        }
    };

    base("Edit Category", &content)
}

fn edit_category_form_view(
    category_id: CategoryId,
    values: &CategoryFormData,
    error_message: Option<&str>,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    category_form_view(
        FormMethod::Put,
        &update_endpoint,
        values,
        error_message,
        "Save Changes",
    )
}

#[cfg(test)]
mod edit_category_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use crate::{
        Error,
        category::{edit::EditCategoryState, get_edit_category_page},
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html,
            get_test_connection, insert_test_category, must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page_with_current_values() {
        let connection = get_test_connection();
        let category = insert_test_category("Food", &connection);
        let state = EditCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_category_page(Path(category.id), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::PUT_CATEGORY, category.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Food");
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let state = EditCategoryState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let result = get_edit_category_page(Path(42), State(state)).await;

        assert!(matches!(result, Err(Error::NotFound { id: 42, .. })));
    }
}

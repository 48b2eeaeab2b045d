//! Category creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
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
        create_category,
        form::{CategoryFormData, FormMethod, category_form_view},
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(form.clone().into(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::Validation { .. } | Error::Duplicate { .. })) => {
            new_category_form_view(&form, Some(&format!("Error: {error}"))).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view(&CategoryFormData::default(), None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Create Category" }
            (form)
        }
    };

    base("Create Category", &content)
}

fn new_category_form_view(values: &CategoryFormData, error_message: Option<&str>) -> Markup {
    category_form_view(
        FormMethod::Post,
        endpoints::POST_CATEGORY,
        values,
        error_message,
        "Create Category",
    )
}

#[cfg(test)]
mod new_category_page_tests {
    use axum::http::StatusCode;

    use crate::{
        category::get_new_category_page,
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_required_input, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_category_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_CATEGORY, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_required_input(&form, "name");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "icon", "text");
        assert_form_input(&form, "color", "text");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;

    use crate::{
        category::{
            create::CreateCategoryEndpointState, create_category_endpoint, form::CategoryFormData,
            get_category_by_name, list_categories,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html,
            get_test_connection, insert_test_category, must_get_form, parse_html_fragment,
        },
    };

    fn get_category_state() -> CreateCategoryEndpointState {
        CreateCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn can_create_category() {
        let state = get_category_state();
        let form = CategoryFormData {
            name: "Food".to_owned(),
            color: Some("#FF6B6B".to_owned()),
            ..Default::default()
        };

        let response = create_category_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let category = get_category_by_name("Food", &state.db_connection.lock().unwrap())
            .unwrap()
            .expect("category was not created");
        assert_eq!(category.color.as_deref(), Some("#FF6B6B"));
    }

    #[tokio::test]
    async fn duplicate_name_rerenders_form_with_error() {
        let state = get_category_state();
        insert_test_category("Food", &state.db_connection.lock().unwrap());
        let form = CategoryFormData {
            name: "Food".to_owned(),
            ..Default::default()
        };

        let response = create_category_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: Duplicate Category: name 'Food' already exists.",
        );
        assert_eq!(
            list_categories(&state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn empty_name_rerenders_form_with_error() {
        let state = get_category_state();

        let response = create_category_endpoint(State(state), Form(CategoryFormData::default()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: Invalid data for field 'name': must be between 1 and 100 characters.",
        );
    }
}

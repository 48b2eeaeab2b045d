//! Expense creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of failing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, list_categories},
    endpoints,
    expense::{
        NewExpense, create_expense,
        form::{ExpenseFormData, ExpenseFormView, FormMethod},
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed to show the new expense page or create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the expense creation page.
pub async fn get_new_expense_page(
    State(state): State<CreateExpenseState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let categories = list_categories(&connection)?;

    Ok(new_expense_view(&ExpenseFormData::empty(today), &categories, today).into_response())
}

/// Handle expense creation form submission, redirecting to the expenses page on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = NewExpense::try_from(form.clone())
        .and_then(|new_expense| create_expense(new_expense, today, &connection));

    match result {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::Validation { .. }) => match list_categories(&connection) {
            Ok(categories) => new_expense_form_view(
                &form,
                &categories,
                today,
                Some(&format!("Error: {error}")),
            )
            .into_response(),
            Err(error) => error.into_alert_response(),
        },
        Err(error @ Error::NotFound { .. }) => {
            tracing::warn!("Could not create expense: {error}");
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");

            error.into_alert_response()
        }
    }
}

fn new_expense_view(values: &ExpenseFormData, categories: &[Category], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = new_expense_form_view(values, categories, today, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Expense" }
            (form)
        }
    };

    base("New Expense", &content)
}

fn new_expense_form_view(
    values: &ExpenseFormData,
    categories: &[Category],
    today: Date,
    error_message: Option<&str>,
) -> Markup {
    ExpenseFormView {
        method: FormMethod::Post,
        endpoint: endpoints::POST_EXPENSE,
        values,
        categories,
        max_date: today,
        error_message,
        submit_label: "Add Expense",
    }
    .into_html()
}

#[cfg(test)]
mod new_expense_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        endpoints,
        expense::{create::CreateExpenseState, get_new_expense_page},
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_required_input, assert_valid_html, get_test_connection,
            insert_test_category, must_get_form, must_get_input, parse_html_document,
        },
        timezone::local_today,
    };

    fn state_with_category() -> CreateExpenseState {
        let connection = get_test_connection();
        insert_test_category("Food", &connection);

        CreateExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_expense_page(State(state_with_category()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_EXPENSE, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "expense_date", "date");
        for name in ["amount", "description", "expense_date", "category_id"] {
            assert_required_input(&form, name);
        }
        assert_form_submit_button(&form);

        let today = local_today("Etc/UTC").unwrap().to_string();
        let date_input = must_get_input(&form, "expense_date");
        assert_eq!(date_input.value().attr("max"), Some(today.as_str()));

        let options = form
            .select(&Selector::parse("select[name=category_id] option").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(options, ["Select a category", "Food"]);
    }

    #[tokio::test]
    async fn page_without_categories_links_to_category_form() {
        let state = CreateExpenseState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_new_expense_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(html.select(&Selector::parse("form").unwrap()).count(), 0);
        let link = html
            .select(&Selector::parse("a").unwrap())
            .find(|link| link.value().attr("href") == Some(endpoints::NEW_CATEGORY_VIEW));
        assert!(link.is_some(), "want a link to the new category page");
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = CreateExpenseState {
            local_timezone: "Not/A_Timezone".to_owned(),
            ..state_with_category()
        };

        let result = get_new_expense_page(State(state)).await;

        assert!(result.is_err());
    }
}

//! Expense editing page and endpoint.

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
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, list_categories},
    endpoints::{self, format_endpoint},
    expense::{
        ExpenseId, ExpenseUpdate,
        form::{ExpenseFormData, ExpenseFormView, FormMethod},
        get_expense, update_expense,
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the edit expense page and the update endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the expense editing page.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, &connection)?;
    let categories = list_categories(&connection)?;

    Ok(edit_expense_view(
        expense_id,
        &ExpenseFormData::from(&expense),
        &categories,
        today,
    )
    .into_response())
}

/// Handle expense update form submission.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
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

    let result = ExpenseUpdate::try_from(form.clone())
        .and_then(|update| update_expense(expense_id, update, today, &connection));

    match result {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::Validation { .. }) => match list_categories(&connection) {
            Ok(categories) => edit_expense_form_view(
                expense_id,
                &form,
                &categories,
                today,
                Some(&format!("Error: {error}")),
            )
            .into_response(),
            Err(error) => error.into_alert_response(),
        },
        Err(error @ Error::NotFound { .. }) => {
            tracing::warn!("Could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_expense_view(
    expense_id: ExpenseId,
    values: &ExpenseFormData,
    categories: &[Category],
    today: Date,
) -> Markup {
    let edit_endpoint = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = edit_expense_form_view(expense_id, values, categories, today, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Expense" }
            (form)
        }
    };

    base("Edit Expense", &content)
}

fn edit_expense_form_view(
    expense_id: ExpenseId,
    values: &ExpenseFormData,
    categories: &[Category],
    today: Date,
    error_message: Option<&str>,
) -> Markup {
    let update_endpoint = format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    ExpenseFormView {
        method: FormMethod::Put,
        endpoint: &update_endpoint,
        values,
        categories,
        max_date: today,
        error_message,
        submit_label: "Save Changes",
    }
    .into_html()
}

#[cfg(test)]
mod edit_expense_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        endpoints::{self, format_endpoint},
        expense::{edit::EditExpenseState, get_edit_expense_page},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_selected_option,
            assert_valid_html, get_test_connection, insert_test_category, insert_test_expense,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page_with_current_values() {
        let connection = get_test_connection();
        insert_test_category("Bills", &connection);
        let food = insert_test_category("Food", &connection);
        let expense = insert_test_expense(food.id, &connection);
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_edit_expense_page(Path(expense.id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::PUT_EXPENSE, expense.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "12.50");
        assert_form_input_with_value(&form, "description", "text", "Lunch");
        assert_form_input_with_value(&form, "expense_date", "date", "2025-06-01");
        assert_selected_option(&form, "category_id", &food.id.to_string());
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_edit_expense_page(Path(42), State(state)).await;

        assert!(matches!(result, Err(Error::NotFound { id: 42, .. })));
    }
}

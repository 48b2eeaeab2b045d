#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use rusqlite::Connection;
use rust_decimal_macros::dec;
use time::{OffsetDateTime, macros::date};

use crate::{
    AppState,
    category::{Category, CategoryId, NewCategory, create_category},
    db::initialize,
    expense::{Expense, NewExpense, create_expense},
    pagination::PaginationConfig,
    routing::build_router,
};

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, assert_hx_endpoint, assert_required_input, assert_selected_option,
    must_get_form, must_get_input,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok};

/// An empty in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

pub(crate) fn insert_test_category(name: &str, connection: &Connection) -> Category {
    create_category(
        NewCategory {
            name: name.to_owned(),
            ..Default::default()
        },
        connection,
    )
    .expect("Could not create test category")
}

/// A $12.50 lunch dated 2025-06-01.
pub(crate) fn insert_test_expense(category_id: CategoryId, connection: &Connection) -> Expense {
    create_expense(
        NewExpense {
            amount: dec!(12.50),
            description: "Lunch".to_owned(),
            expense_date: date!(2025 - 06 - 01),
            category_id,
            notes: None,
        },
        OffsetDateTime::now_utc().date(),
        connection,
    )
    .expect("Could not create test expense")
}

/// A server running the full router over an empty in-memory database, and
/// a handle to that database for arranging test data.
pub(crate) fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    let state = AppState::new(connection, "Etc/UTC", PaginationConfig::default())
        .expect("Could not create app state");
    let db_connection = state.db_connection.clone();
    let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

    (server, db_connection)
}

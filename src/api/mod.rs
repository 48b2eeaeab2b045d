//! The JSON REST API under `/api`.
//!
//! Handlers share [ApiState] and turn every failure into an [ApiError] so that
//! clients always get a JSON body, never an HTML page.

mod category;
mod expense;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{AppState, Error};

pub use category::{
    create_category_api, delete_category_api, get_categories_api, get_category_api,
    get_category_stats_api, search_category_api, update_category_api,
};
pub use expense::{
    create_expense_api, delete_expense_api, get_category_analytics_api, get_expense_api,
    get_expense_summary_api, get_expenses_api, get_expenses_by_category_api,
    get_monthly_analytics_api, get_recent_expenses_api, search_expenses_api, update_expense_api,
};

/// The state shared by the API handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl ApiState {
    fn connection(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError.into())
    }
}

/// An error response with the body
/// `{"success": false, "error": <kind>, "message": ..., "detail": ...}`.
#[derive(Debug, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    detail: Option<Value>,
}

impl ApiError {
    /// A 404 for a lookup by something other than an ID.
    fn not_found(message: String, detail: Value) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "NOT_FOUND",
            message,
            detail: Some(detail),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        if !error.is_domain_error() {
            tracing::error!("An unexpected error occurred while handling an API request: {error}");

            return Self {
                status: error.status_code(),
                kind: error.kind(),
                message: "An unexpected error occurred.".to_owned(),
                detail: None,
            };
        }

        Self {
            status: error.status_code(),
            kind: error.kind(),
            message: error.to_string(),
            detail: error.detail(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.kind,
            "message": self.message,
            "detail": self.detail,
        });

        (self.status, Json(body)).into_response()
    }
}

/// The body returned after a successful delete.
fn deleted_response(message: String) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
    }))
}

/// Report that the server is up.
pub async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

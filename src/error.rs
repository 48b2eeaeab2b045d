//! Defines the app level error type and conversions to rendered HTML pages and alerts.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The kinds of records that domain errors can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A [crate::Category].
    Category,
    /// An [crate::Expense].
    Expense,
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Category => write!(f, "Category"),
            Entity::Expense => write!(f, "Expense"),
        }
    }
}

/// The errors that may occur in the application.
///
/// The first three variants are the domain errors raised by the category and
/// expense services. The rest are unexpected failures that should only be
/// logged on the server.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested record, or a record it refers to, is not in the database.
    #[error("{entity} with id {id} not found.")]
    NotFound {
        /// The kind of record that was looked up.
        entity: Entity,
        /// The ID that was looked up.
        id: i64,
    },

    /// Writing the record would violate a uniqueness rule, e.g. two
    /// categories with the same name.
    #[error("Duplicate {entity}: {field} '{value}' already exists.")]
    Duplicate {
        /// The kind of record being written.
        entity: Entity,
        /// The field that must be unique.
        field: &'static str,
        /// The value that is already taken.
        value: String,
    },

    /// A field failed a business rule, e.g. a negative amount or a date in
    /// the future.
    #[error("Invalid data for field '{field}': {reason}.")]
    Validation {
        /// The name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl Error {
    /// Shorthand for [Error::Validation].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// The error code sent to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Duplicate { .. } => "DUPLICATE",
            Error::Validation { .. } => "VALIDATION_ERROR",
            Error::SqlError(_) | Error::DatabaseLockError | Error::InvalidTimezoneError(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// The structured details for a domain error, `None` for anything else.
    pub fn detail(&self) -> Option<Value> {
        match self {
            Error::NotFound { entity, id } => Some(json!({
                "entity": entity.to_string(),
                "id": id,
            })),
            Error::Duplicate {
                entity,
                field,
                value,
            } => Some(json!({
                "entity": entity.to_string(),
                "field": field,
                "value": value,
            })),
            Error::Validation { field, reason } => Some(json!({
                "field": field,
                "reason": reason,
            })),
            _ => None,
        }
    }

    /// The HTTP status code that corresponds to this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Duplicate { .. } => StatusCode::CONFLICT,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is one of the errors raised by the service layer.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::Duplicate { .. } | Error::Validation { .. }
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound { .. } => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match self {
            Error::NotFound { entity, .. } => Alert::Error {
                message: format!("{entity} not found"),
                details: format!(
                    "{self} Try refreshing the page to see if the {} has been deleted.",
                    entity.to_string().to_lowercase()
                ),
            },
            Error::Duplicate { entity, .. } => Alert::Error {
                message: format!("Duplicate {entity}"),
                details: self.to_string(),
            },
            Error::Validation { .. } => Alert::Error {
                message: "Invalid input".to_owned(),
                details: self.to_string(),
            },
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            },
            error => {
                tracing::error!("An unexpected error occurred: {error}");

                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                }
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

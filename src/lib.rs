//! Finsight is a web service for tracking personal finances.
//!
//! Users record income and expense transactions through a JSON REST API and
//! the service derives monthly reports, spending trends, overspending alerts,
//! savings plans and short insights from that history.
//!
//! The analytics live in [analytics] as pure functions over a slice of
//! [Transaction]s, so they can be used without the HTTP server.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub mod analytics;
mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod date_format;
mod db;
pub mod endpoints;
mod json_body;
mod logging;
mod notification;
mod recurring_transaction;
mod routing;
mod savings_goal;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use analytics::CategoryScope;
pub use app_state::{AnalyticsConfig, AppState};
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use category::{EXPENSE_CATEGORIES, INCOME_CATEGORY, TransactionType};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, create_transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing, could not be decrypted or has expired.
    #[error("not logged in")]
    Unauthenticated,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string used to register a user is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email used to register a user already belongs to another user.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// A transaction or recurring transaction payload failed validation.
    #[error("Invalid transaction payload")]
    InvalidTransactionPayload,

    /// The frequency of a recurring transaction is not one of the supported labels.
    #[error("\"{0}\" is not a supported frequency")]
    InvalidFrequency(String),

    /// A savings plan request is malformed or its target amount is not a positive, finite number.
    #[error("invalid savings plan request: targetAmount must be a positive number")]
    InvalidSavingsTarget,

    /// A budget has no category or its limit is not a positive, finite number.
    #[error("invalid budget: category must be set and limit must be a positive number")]
    InvalidBudget,

    /// A savings goal has no name, a target that is not positive, a negative
    /// current amount or a deadline that is not a date.
    #[error("invalid savings goal")]
    InvalidSavingsGoal,

    /// A stored transaction amount is NaN or infinite.
    #[error("{0} is not a finite amount")]
    NonFiniteAmount(f64),

    /// A stored category type is neither "income" nor "expense".
    #[error("\"{0}\" is not a transaction type")]
    InvalidTransactionType(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A cookie expiry date would be past the largest representable date.
    #[error("the cookie expiry date is out of range")]
    ExpiryOverflow,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist or belongs to another user.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or belongs to another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a recurring transaction that does not exist or belongs to another user.
    #[error("tried to delete a recurring transaction that is not in the database")]
    DeleteMissingRecurringTransaction,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::InvalidTransactionPayload
            | Error::InvalidFrequency(_)
            | Error::InvalidSavingsTarget
            | Error::InvalidBudget
            | Error::InvalidSavingsGoal => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail(_) => StatusCode::CONFLICT,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::DeleteMissingRecurringTransaction => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = Error::InvalidTransactionPayload.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_transactions_are_not_found() {
        assert_eq!(
            Error::DeleteMissingTransaction.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::UpdateMissingTransaction.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

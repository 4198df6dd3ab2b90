//! Route handlers for listing, creating and deleting recurring transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::RecurringTransactionId,
    json_body::json_or,
    recurring_transaction::core::{
        NewRecurringTransaction, RecurringTransaction, RecurringTransactionPayload,
        create_recurring_transaction, delete_recurring_transaction, get_recurring_transactions,
    },
};

/// The state needed to manage recurring transactions.
#[derive(Debug, Clone)]
pub struct RecurringTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with all of the user's recurring transactions.
pub async fn get_recurring_transactions_endpoint(
    State(state): State<RecurringTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<RecurringTransaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_recurring_transactions(user_id, &connection).map(Json)
}

/// Create a recurring transaction and respond with it.
///
/// # Errors
/// Responds with 400 if the frequency, amount or dates are invalid.
pub async fn create_recurring_transaction_endpoint(
    State(state): State<RecurringTransactionState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<RecurringTransactionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<RecurringTransaction>), Error> {
    let payload = json_or(payload, Error::InvalidTransactionPayload)?;
    let new_recurring = NewRecurringTransaction::try_from(payload)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let recurring = create_recurring_transaction(user_id, new_recurring, &connection)?;

    Ok((StatusCode::CREATED, Json(recurring)))
}

/// Delete a recurring transaction owned by the user.
pub async fn delete_recurring_transaction_endpoint(
    State(state): State<RecurringTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(id): Path<RecurringTransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_recurring_transaction(user_id, id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

//! Defines the endpoint for replacing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::TransactionId,
    json_body::json_or,
    transaction::{
        NewTransaction, Transaction,
        core::{TransactionPayload, update_transaction},
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that replaces the fields of the transaction `transaction_id`.
///
/// # Errors
/// Responds with 400 if the payload is invalid and 404 if the user does not
/// own the transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let payload = json_or(payload, Error::InvalidTransactionPayload)?;
    let new_transaction = NewTransaction::try_from(payload)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(user_id, transaction_id, new_transaction, &connection)
        .inspect_err(|error| {
            tracing::debug!("Could not update transaction {transaction_id}: {error}")
        })
        .map(Json)
}

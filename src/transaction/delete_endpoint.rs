//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, database_id::TransactionId, transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with 204 No Content on success.
///
/// # Errors
/// Responds with 404 if the user does not own the transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(user_id, transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::delete};
    use time::macros::date;

    use crate::{
        TransactionType,
        test_utils::{get_test_connection, get_test_server_as, insert_test_user},
        transaction::{NewTransaction, create_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn deletes_transaction_once() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let transaction = NewTransaction::new(
            "Electricity Bill",
            120.0,
            date!(2025 - 10 - 08),
            TransactionType::Expense,
            Some("Bills & Utilities"),
        )
        .unwrap();
        create_transaction(user.id, transaction, &conn).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let server = get_test_server_as(
            Router::new().route("/transactions/{id}", delete(delete_transaction_endpoint)),
            state.clone(),
            user.id,
        );

        server
            .delete("/transactions/1")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete("/transactions/1")
            .await
            .assert_status_not_found();

        let count: i64 = state
            .db_connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}

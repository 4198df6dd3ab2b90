//! Defines the endpoint for listing the logged-in user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    transaction::{Transaction, core::get_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with all of the user's transactions, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(user_id, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::get};
    use time::macros::date;

    use crate::{
        TransactionType,
        test_utils::{get_test_connection, get_test_server_as, insert_test_user},
        transaction::{NewTransaction, Transaction, create_transaction},
    };

    use super::{ListTransactionsState, get_transactions_endpoint};

    #[tokio::test]
    async fn lists_own_transactions() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let other = insert_test_user(&conn, "ravi@example.com");
        let new_transaction = NewTransaction::new(
            "Grocery Shopping",
            85.42,
            date!(2025 - 10 - 12),
            TransactionType::Expense,
            Some("Food & Dining"),
        )
        .unwrap();
        let want = create_transaction(user.id, new_transaction.clone(), &conn).unwrap();
        create_transaction(other.id, new_transaction, &conn).unwrap();
        let state = ListTransactionsState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let server = get_test_server_as(
            Router::new().route("/transactions", get(get_transactions_endpoint)),
            state,
            user.id,
        );

        let response = server.get("/transactions").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Transaction>>(), vec![want]);
    }
}

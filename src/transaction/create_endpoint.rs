//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    json_body::json_or,
    transaction::{
        NewTransaction, Transaction,
        core::{TransactionPayload, create_transaction},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction, responds with the stored transaction.
///
/// # Errors
/// Responds with 400 if the payload is invalid.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let payload = json_or(payload, Error::InvalidTransactionPayload)?;
    let new_transaction = NewTransaction::try_from(payload)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, new_transaction, &connection)?;
    tracing::debug!("User {user_id} created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        TransactionType,
        test_utils::{get_test_connection, get_test_server_as, insert_test_user},
        transaction::Transaction,
    };

    use super::{CreateTransactionState, create_transaction_endpoint};

    fn get_test_server() -> TestServer {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        get_test_server_as(
            Router::new().route("/transactions", post(create_transaction_endpoint)),
            state,
            user.id,
        )
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let server = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({
                "description": "Uber Ride",
                "amount": 22.5,
                "date": "2025-10-11",
                "type": "expense",
                "category": "Transportation"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction: Transaction = response.json();
        assert_eq!(transaction.id, "1");
        assert_eq!(transaction.description, "Uber Ride");
        assert_eq!(transaction.amount, 22.5);
        assert_eq!(transaction.date, date!(2025 - 10 - 11));
        assert_eq!(transaction.category, "Transportation");
        assert_eq!(transaction.kind, TransactionType::Expense);
    }

    #[tokio::test]
    async fn income_without_category_goes_to_income() {
        let server = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({
                "description": "Monthly Salary",
                "amount": 4500,
                "date": "2025-10-10",
                "type": "income"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction: Transaction = response.json();
        assert_eq!(transaction.category, "Income");
        assert_eq!(transaction.kind, TransactionType::Income);
    }

    #[tokio::test]
    async fn rejects_invalid_payload() {
        let server = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({"description": "", "amount": 10, "date": "2025-10-10"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Invalid transaction payload"}));
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({"description": "Lunch", "amount": "abc", "date": "2025-10-10"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Invalid transaction payload"}));
    }

    #[tokio::test]
    async fn non_json_body_is_bad_request() {
        let server = get_test_server();

        let response = server.post("/transactions").text("amount=10").await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Invalid transaction payload"}));
    }
}

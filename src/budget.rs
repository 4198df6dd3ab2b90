//! Monthly spending limits per expense category.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserID,
    analytics::{Budget, BudgetStatus, budget_statuses},
    category::{TransactionType, resolve_category_id},
    database_id::DatabaseId,
    json_body::json_or,
    timezone::local_today,
    transaction::get_transactions,
};

/// A stored budget with this month's spending against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetView {
    pub id: DatabaseId,
    #[serde(flatten)]
    pub status: BudgetStatus,
}

/// The JSON body for setting a budget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetPayload {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<f64>,
}

impl TryFrom<BudgetPayload> for Budget {
    type Error = Error;

    fn try_from(payload: BudgetPayload) -> Result<Self, Self::Error> {
        let category = payload
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .ok_or(Error::InvalidBudget)?;

        let limit = payload
            .limit
            .filter(|limit| limit.is_finite() && *limit > 0.0)
            .ok_or(Error::InvalidBudget)?;

        Ok(Budget {
            category: category.to_owned(),
            limit,
        })
    }
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            limit_amount REAL NOT NULL,
            UNIQUE(user_id, category_id),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Set the monthly limit for a category, replacing any earlier limit for it.
///
/// Returns the ID of the budget.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn set_budget(
    user_id: UserID,
    budget: &Budget,
    connection: &Connection,
) -> Result<DatabaseId, Error> {
    let category_id = resolve_category_id(
        user_id,
        &budget.category,
        TransactionType::Expense,
        connection,
    )?;

    let id = connection.query_row(
        "INSERT INTO budget (user_id, category_id, limit_amount) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, category_id) DO UPDATE SET limit_amount = excluded.limit_amount
         RETURNING id",
        (user_id.as_i64(), category_id, budget.limit),
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Get the user's budgets in the order they were first set.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_budgets(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<(DatabaseId, Budget)>, Error> {
    connection
        .prepare(
            "SELECT b.id, c.name, b.limit_amount FROM budget b
             INNER JOIN category c ON c.id = b.category_id
             WHERE b.user_id = ?1
             ORDER BY b.id",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok((
                row.get(0)?,
                Budget {
                    category: row.get(1)?,
                    limit: row.get(2)?,
                },
            ))
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// The state needed by the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to decide which month is current.
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Respond with each of the user's budgets and this month's spending against it.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<BudgetView>>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let (ids, budgets): (Vec<DatabaseId>, Vec<Budget>) =
        get_budgets(user_id, &connection)?.into_iter().unzip();
    let transactions = get_transactions(user_id, &connection)?;

    let views = ids
        .into_iter()
        .zip(budget_statuses(&budgets, &transactions, today))
        .map(|(id, status)| BudgetView { id, status })
        .collect();

    Ok(Json(views))
}

/// Set the monthly limit for a category and respond with its status.
///
/// # Errors
/// Responds with 400 if the category is blank or the limit is not a positive number.
pub async fn set_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<BudgetPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<BudgetView>), Error> {
    let budget = Budget::try_from(json_or(payload, Error::InvalidBudget)?)?;
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let id = set_budget(user_id, &budget, &connection)?;
    let transactions = get_transactions(user_id, &connection)?;

    let status = budget_statuses(std::slice::from_ref(&budget), &transactions, today)
        .pop()
        .ok_or(Error::NotFound)?;

    Ok((StatusCode::CREATED, Json(BudgetView { id, status })))
}

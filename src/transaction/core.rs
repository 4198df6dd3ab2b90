//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    category::{TransactionType, resolve_category_id},
    database_id::TransactionId,
    date_format::DATE_FORMAT,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// This is the shape the analytics and the API work with. Rows read from the
/// database go through [TransactionRow::normalize] to get here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction as a decimal string.
    pub id: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// The name of the category the transaction belongs to.
    pub category: String,
    /// When the transaction happened.
    #[serde(with = "crate::date_format")]
    pub date: Date,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// A transaction as it is stored in the database, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub transaction_id: TransactionId,
    pub amount: f64,
    pub description: Option<String>,
    pub date: Date,
    pub category_name: String,
    pub category_type: String,
}

/// The description given to transactions stored without one.
pub const MISSING_DESCRIPTION: &str = "No description";

impl TransactionRow {
    /// Convert the row into a [Transaction].
    ///
    /// A missing description becomes [MISSING_DESCRIPTION].
    ///
    /// # Errors
    /// Returns [Error::NonFiniteAmount] if the amount is NaN or infinite, or
    /// [Error::InvalidTransactionType] if the category type is not "income" or "expense".
    pub fn normalize(self) -> Result<Transaction, Error> {
        if !self.amount.is_finite() {
            return Err(Error::NonFiniteAmount(self.amount));
        }

        let kind = self.category_type.parse()?;

        Ok(Transaction {
            id: self.transaction_id.to_string(),
            description: self
                .description
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_owned()),
            amount: self.amount,
            category: self.category_name,
            date: self.date,
            kind,
        })
    }
}

/// The JSON body clients send to create or replace a transaction.
///
/// Every field is optional on the wire so that missing and malformed values
/// produce the same error.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct TransactionPayload {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A validated transaction that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A non-empty text description.
    pub description: String,
    /// A positive, finite amount.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// The name of the category, resolved to a category row on insert.
    pub category: String,
}

impl NewTransaction {
    /// Create a new transaction, checking the values the same way the API does.
    ///
    /// An empty `category` falls back to the default category for `kind`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionPayload] if the description is blank
    /// or the amount is not a positive, finite number.
    pub fn new(
        description: &str,
        amount: f64,
        date: Date,
        kind: TransactionType,
        category: Option<&str>,
    ) -> Result<Self, Error> {
        let description = description.trim();

        if description.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidTransactionPayload);
        }

        let category = match category.map(str::trim) {
            Some(category) if !category.is_empty() => category.to_owned(),
            _ => kind.default_category().to_owned(),
        };

        Ok(Self {
            description: description.to_owned(),
            amount,
            date,
            kind,
            category,
        })
    }
}

impl TryFrom<TransactionPayload> for NewTransaction {
    type Error = Error;

    /// Any `type` other than "income" is treated as an expense.
    fn try_from(payload: TransactionPayload) -> Result<Self, Self::Error> {
        let kind = match payload.kind.as_deref() {
            Some("income") => TransactionType::Income,
            _ => TransactionType::Expense,
        };

        let date = payload
            .date
            .as_deref()
            .map(str::trim)
            .and_then(|date| Date::parse(date, DATE_FORMAT).ok())
            .ok_or(Error::InvalidTransactionPayload)?;

        let amount = payload.amount.ok_or(Error::InvalidTransactionPayload)?;

        NewTransaction::new(
            payload.description.as_deref().unwrap_or_default(),
            amount,
            date,
            kind,
            payload.category.as_deref(),
        )
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION: &str = "SELECT t.id, t.amount, t.description, t.date, c.name, c.type
     FROM \"transaction\" t
     INNER JOIN category c ON c.id = t.category_id";

/// Create a new transaction owned by `user_id`.
///
/// The category is looked up by name and type, and created for the user if needed.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = resolve_category_id(
        user_id,
        &transaction.category,
        transaction.kind,
        connection,
    )?;

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_id, amount, description, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            category_id,
            transaction.amount,
            &transaction.description,
            transaction.date,
        ),
    )?;

    get_transaction(user_id, connection.last_insert_rowid(), connection)
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - [Error::NonFiniteAmount] or [Error::InvalidTransactionType] if the stored row is malformed,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = ?1 AND t.user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)?
        .normalize()
}

/// Get all of the transactions owned by `user_id`, newest first.
///
/// Transactions on the same date are ordered by descending ID.
///
/// # Errors
/// Returns an error if there is an SQL error or a stored row is malformed.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.user_id = ?1 ORDER BY t.date DESC, t.id DESC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|row| row.map_err(Error::from).and_then(TransactionRow::normalize))
        .collect()
}

/// Replace the transaction `id` owned by `user_id` with `transaction`.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if the user does not own a
/// transaction with `id`, or [Error::SqlError] for other SQL errors.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let is_owned = connection
        .query_row(
            "SELECT 1 FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    if !is_owned {
        return Err(Error::UpdateMissingTransaction);
    }

    let category_id = resolve_category_id(
        user_id,
        &transaction.category,
        transaction.kind,
        connection,
    )?;

    connection.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, amount = ?2, description = ?3, date = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            category_id,
            transaction.amount,
            &transaction.description,
            transaction.date,
            id,
            user_id.as_i64(),
        ),
    )?;

    get_transaction(user_id, id, connection)
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the user does not own a
/// transaction with `id`, or [Error::SqlError] for other SQL errors.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE
                )",
        (),
    )?;

    // Used when listing a user's transactions newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [TransactionRow].
///
/// Expects the columns of `SELECT_TRANSACTION`.
fn map_transaction_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        transaction_id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        category_name: row.get(4)?,
        category_type: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

//! Recurring transactions such as rent, salaries and subscriptions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    analytics::{Frequency, recurring_to_monthly},
    category::{TransactionType, resolve_category_id},
    database_id::RecurringTransactionId,
    date_format::DATE_FORMAT,
};

/// A transaction that repeats on a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransaction {
    /// The ID of the recurring transaction.
    pub id: RecurringTransactionId,
    /// What the transaction is for, may be empty.
    pub description: String,
    /// The amount of each occurrence.
    pub amount: f64,
    /// The name of the category the transaction belongs to.
    pub category: String,
    /// Whether money is earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// How often the transaction repeats.
    pub frequency: Frequency,
    /// The date of the first occurrence.
    #[serde(with = "crate::date_format")]
    pub start_date: Date,
    /// The last date the transaction may occur on, if it stops.
    #[serde(with = "crate::date_format::option")]
    pub end_date: Option<Date>,
}

/// The JSON body clients send to create a recurring transaction.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransactionPayload {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A validated recurring transaction that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringTransaction {
    pub description: String,
    pub amount: f64,
    pub kind: TransactionType,
    pub category: String,
    pub frequency: Frequency,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

impl TryFrom<RecurringTransactionPayload> for NewRecurringTransaction {
    type Error = Error;

    /// Any `type` other than "income" is treated as an expense.
    fn try_from(payload: RecurringTransactionPayload) -> Result<Self, Self::Error> {
        let amount = payload
            .amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(Error::InvalidTransactionPayload)?;

        let frequency: Frequency = payload.frequency.as_deref().unwrap_or_default().parse()?;

        let start_date = parse_date(payload.start_date.as_deref())
            .ok_or(Error::InvalidTransactionPayload)?;

        let end_date = match payload.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(end_date) => {
                Some(parse_date(Some(end_date)).ok_or(Error::InvalidTransactionPayload)?)
            }
        };

        if end_date.is_some_and(|end_date| end_date < start_date) {
            return Err(Error::InvalidTransactionPayload);
        }

        let kind = match payload.kind.as_deref() {
            Some("income") => TransactionType::Income,
            _ => TransactionType::Expense,
        };

        let category = match payload.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => category.to_owned(),
            _ => kind.default_category().to_owned(),
        };

        Ok(Self {
            description: payload.description.unwrap_or_default().trim().to_owned(),
            amount,
            kind,
            category,
            frequency,
            start_date,
            end_date,
        })
    }
}

fn parse_date(date: Option<&str>) -> Option<Date> {
    Date::parse(date?.trim(), DATE_FORMAT).ok()
}

/// Create the recurring transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_recurring_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                frequency TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new recurring transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_recurring_transaction(
    user_id: UserID,
    recurring: NewRecurringTransaction,
    connection: &Connection,
) -> Result<RecurringTransaction, Error> {
    let category_id =
        resolve_category_id(user_id, &recurring.category, recurring.kind, connection)?;

    connection.execute(
        "INSERT INTO recurring_transaction
            (user_id, category_id, amount, description, frequency, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_i64(),
            category_id,
            recurring.amount,
            &recurring.description,
            recurring.frequency.as_str(),
            recurring.start_date,
            recurring.end_date,
        ),
    )?;

    Ok(RecurringTransaction {
        id: connection.last_insert_rowid(),
        description: recurring.description,
        amount: recurring.amount,
        category: recurring.category,
        kind: recurring.kind,
        frequency: recurring.frequency,
        start_date: recurring.start_date,
        end_date: recurring.end_date,
    })
}

/// Get all of the recurring transactions owned by `user_id`, oldest start date first.
///
/// # Errors
/// Returns an error if there is an SQL error or a stored row is malformed.
pub fn get_recurring_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecurringTransaction>, Error> {
    connection
        .prepare(
            "SELECT rt.id, rt.description, rt.amount, c.name, c.type, rt.frequency, rt.start_date, rt.end_date
             FROM recurring_transaction rt
             INNER JOIN category c ON c.id = rt.category_id
             WHERE rt.user_id = ?1
             ORDER BY rt.start_date, rt.id",
        )?
        .query_map([user_id.as_i64()], map_recurring_row)?
        .map(|row| row.map_err(Error::from).and_then(|row| row))
        .collect()
}

/// Delete the recurring transaction `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingRecurringTransaction] if the user does not own
/// a recurring transaction with `id`, or [Error::SqlError] for other SQL errors.
pub fn delete_recurring_transaction(
    user_id: UserID,
    id: RecurringTransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM recurring_transaction WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecurringTransaction);
    }

    Ok(())
}

/// The expected monthly cost of the user's recurring expenses that are still active on `today`.
///
/// Recurring income is ignored, as are rows with an unknown frequency.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_recurring_monthly_spend(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    let mut statement = connection.prepare(
        "SELECT rt.amount, rt.frequency
         FROM recurring_transaction rt
         INNER JOIN category c ON c.id = rt.category_id
         WHERE rt.user_id = ?1
            AND c.type = 'expense'
            AND (rt.end_date IS NULL OR rt.end_date >= ?2)",
    )?;

    let rows = statement.query_map((user_id.as_i64(), today), |row| {
        Ok((row.get::<_, f64>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut total = 0.0;
    for row in rows {
        let (amount, frequency) = row?;
        total += recurring_to_monthly(amount, &frequency);
    }

    Ok(total)
}

type RecurringRow = Result<RecurringTransaction, Error>;

/// Map a row to a recurring transaction, keeping parse errors for the caller.
fn map_recurring_row(row: &Row) -> Result<RecurringRow, rusqlite::Error> {
    let kind: String = row.get(4)?;
    let frequency: String = row.get(5)?;

    let kind = match kind.parse::<TransactionType>() {
        Ok(kind) => kind,
        Err(error) => return Ok(Err(error)),
    };
    let frequency = match frequency.parse::<Frequency>() {
        Ok(frequency) => frequency,
        Err(error) => return Ok(Err(error)),
    };

    Ok(Ok(RecurringTransaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        kind,
        frequency,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
    }))
}


#[cfg(test)]
mod database_tests {
    use time::{Date, macros::date};

    use crate::{
        Error, TransactionType,
        analytics::Frequency,
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        NewRecurringTransaction, create_recurring_transaction, delete_recurring_transaction,
        get_recurring_monthly_spend, get_recurring_transactions,
    };

    fn recurring(
        amount: f64,
        kind: TransactionType,
        frequency: Frequency,
        end_date: Option<Date>,
    ) -> NewRecurringTransaction {
        NewRecurringTransaction {
            description: "Test".to_owned(),
            amount,
            kind,
            category: kind.default_category().to_owned(),
            frequency,
            start_date: date!(2025 - 01 - 01),
            end_date,
        }
    }

    #[test]
    fn create_and_list() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let other = insert_test_user(&conn, "ravi@example.com");
        let created = create_recurring_transaction(
            user.id,
            recurring(15.99, TransactionType::Expense, Frequency::Monthly, None),
            &conn,
        )
        .unwrap();

        assert_eq!(get_recurring_transactions(user.id, &conn), Ok(vec![created]));
        assert_eq!(get_recurring_transactions(other.id, &conn), Ok(vec![]));
    }

    #[test]
    fn monthly_spend_counts_active_expenses_only() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let today = date!(2025 - 10 - 12);
        for new_recurring in [
            recurring(100.0, TransactionType::Expense, Frequency::Weekly, None),
            recurring(1200.0, TransactionType::Expense, Frequency::Yearly, Some(today)),
            recurring(50.0, TransactionType::Expense, Frequency::Monthly, Some(date!(2025 - 10 - 11))),
            recurring(4500.0, TransactionType::Income, Frequency::Monthly, None),
        ] {
            create_recurring_transaction(user.id, new_recurring, &conn).unwrap();
        }

        let spend = get_recurring_monthly_spend(user.id, today, &conn).unwrap();

        assert!((spend - 533.0).abs() < 1e-9, "got {spend}");
    }

    #[test]
    fn delete_only_own_recurring_transaction() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "asha@example.com");
        let other = insert_test_user(&conn, "ravi@example.com");
        let created = create_recurring_transaction(
            user.id,
            recurring(15.99, TransactionType::Expense, Frequency::Monthly, None),
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_recurring_transaction(other.id, created.id, &conn),
            Err(Error::DeleteMissingRecurringTransaction)
        );
        assert_eq!(delete_recurring_transaction(user.id, created.id, &conn), Ok(()));
        assert_eq!(get_recurring_transactions(user.id, &conn), Ok(vec![]));
    }
}

//! Transaction categories and the category table.
//!
//! Categories are shared between users: the seeded categories have no owner
//! and any user may use them, while categories a user types in themselves
//! are created on demand and owned by that user.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{Error, UserID, database_id::CategoryId};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lower-case label used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The category used when a transaction is created without one.
    pub fn default_category(&self) -> &'static str {
        match self {
            TransactionType::Income => INCOME_CATEGORY,
            TransactionType::Expense => OTHER_CATEGORY,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

/// The category for all income.
pub const INCOME_CATEGORY: &str = "Income";

/// The catch-all expense category.
pub const OTHER_CATEGORY: &str = "Other";

/// The built-in expense categories in display order.
pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Travel",
    OTHER_CATEGORY,
];

/// Create the category table and seed the built-in categories.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_name_type ON category(name, type);",
    )?;

    let mut insert_if_missing = connection.prepare(
        "INSERT INTO category (user_id, name, type)
         SELECT NULL, ?1, ?2
         WHERE NOT EXISTS (
            SELECT 1 FROM category WHERE user_id IS NULL AND name = ?1 AND type = ?2
         )",
    )?;

    for name in EXPENSE_CATEGORIES {
        insert_if_missing.execute((name, TransactionType::Expense.as_str()))?;
    }
    insert_if_missing.execute((INCOME_CATEGORY, TransactionType::Income.as_str()))?;

    Ok(())
}

/// Find the category called `name` of type `kind` visible to `user_id`, or create it.
///
/// The user's own category wins over a built-in category with the same name.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn resolve_category_id(
    user_id: UserID,
    name: &str,
    kind: TransactionType,
    connection: &Connection,
) -> Result<CategoryId, Error> {
    let existing = connection
        .prepare(
            "SELECT id FROM category
             WHERE name = ?1 AND type = ?2 AND (user_id = ?3 OR user_id IS NULL)
             ORDER BY user_id IS NULL, id
             LIMIT 1",
        )?
        .query_row((name, kind.as_str(), user_id.as_i64()), |row| {
            row.get::<_, CategoryId>(0)
        })
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tracing::debug!("Creating {kind} category \"{name}\" for user {user_id}");
    connection.execute(
        "INSERT INTO category (user_id, name, type) VALUES (?1, ?2, ?3)",
        (user_id.as_i64(), name, kind.as_str()),
    )?;

    Ok(connection.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        category::{EXPENSE_CATEGORIES, TransactionType, resolve_category_id},
        db::initialize,
        test_utils::insert_test_user,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn count_categories(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn seeds_built_in_categories_once() {
        let conn = get_test_connection();
        initialize(&conn).unwrap();

        assert_eq!(count_categories(&conn), EXPENSE_CATEGORIES.len() as i64 + 1);
    }

    #[test]
    fn resolves_built_in_category() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "a@example.com");
        let before = count_categories(&conn);

        resolve_category_id(user.id, "Travel", TransactionType::Expense, &conn).unwrap();

        assert_eq!(count_categories(&conn), before);
    }

    #[test]
    fn creates_missing_category_once() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "a@example.com");
        let before = count_categories(&conn);

        let first = resolve_category_id(user.id, "Pets", TransactionType::Expense, &conn).unwrap();
        let second = resolve_category_id(user.id, "Pets", TransactionType::Expense, &conn).unwrap();

        assert_eq!(first, second);
        assert_eq!(count_categories(&conn), before + 1);
    }

    #[test]
    fn same_name_with_other_type_is_a_different_category() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "a@example.com");

        let expense =
            resolve_category_id(user.id, "Other", TransactionType::Expense, &conn).unwrap();
        let income = resolve_category_id(user.id, "Other", TransactionType::Income, &conn).unwrap();

        assert_ne!(expense, income);
    }

    #[test]
    fn user_categories_are_not_shared() {
        let conn = get_test_connection();
        let alice = insert_test_user(&conn, "alice@example.com");
        let bob = insert_test_user(&conn, "bob@example.com");

        let alices = resolve_category_id(alice.id, "Pets", TransactionType::Expense, &conn).unwrap();
        let bobs = resolve_category_id(bob.id, "Pets", TransactionType::Expense, &conn).unwrap();

        assert_ne!(alices, bobs);
    }

    #[test]
    fn parses_transaction_type() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}

//! Stored messages for the user, such as persisted overspending alerts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{AppState, Error, UserID, database_id::DatabaseId};

/// A message shown to the user in their notification list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DatabaseId,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create the notification table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_notification_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS notification (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_notification_user ON notification(user_id, created_at);",
    )
}

/// Store an unread notification for `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_notification(
    user_id: UserID,
    message: &str,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Notification, Error> {
    connection.execute(
        "INSERT INTO notification (user_id, message, is_read, created_at) VALUES (?1, ?2, 0, ?3)",
        (user_id.as_i64(), message, created_at),
    )?;

    Ok(Notification {
        id: connection.last_insert_rowid(),
        message: message.to_owned(),
        is_read: false,
        created_at,
    })
}

/// Store one unread notification per message, all or none.
///
/// # Errors
/// Returns [Error::SqlError] if any insert fails, in which case nothing is stored.
pub fn create_notifications<'a>(
    user_id: UserID,
    messages: impl IntoIterator<Item = &'a str>,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    let transaction = connection.unchecked_transaction()?;

    let notifications = messages
        .into_iter()
        .map(|message| create_notification(user_id, message, created_at, &transaction))
        .collect::<Result<Vec<_>, _>>()?;

    transaction.commit()?;

    Ok(notifications)
}

/// Get the user's notifications, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_notifications(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(
            "SELECT id, message, is_read, created_at FROM notification
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(Notification {
                id: row.get(0)?,
                message: row.get(1)?,
                is_read: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// The state needed to list notifications.
#[derive(Debug, Clone)]
pub struct NotificationState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NotificationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with the user's notifications, newest first.
pub async fn get_notifications_endpoint(
    State(state): State<NotificationState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Notification>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_notifications(user_id, &connection).map(Json)
}

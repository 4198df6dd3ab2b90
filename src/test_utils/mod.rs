//! Shared helpers for unit tests.

use axum::{Extension, Router};
use axum_test::TestServer;
use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    AnalyticsConfig, AppState, PasswordHash, User, UserID, ValidatedPassword, create_user,
    db::initialize,
};

/// The password of every user created with [insert_test_user].
pub(crate) const TEST_PASSWORD: &str = "test";

/// An in-memory database with all of the tables created.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&conn).expect("Could not initialize database");
    conn
}

/// Create a user with the password [TEST_PASSWORD].
///
/// Uses the minimum bcrypt cost to keep tests fast.
#[track_caller]
pub(crate) fn insert_test_user(conn: &Connection, email: &str) -> User {
    let email: EmailAddress = email.parse().expect("Invalid test email");
    let password_hash =
        PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap();

    create_user("", &email, password_hash, conn).expect("Could not create test user")
}

/// App state over `conn` using UTC as the local timezone.
pub(crate) fn get_test_app_state(conn: Connection) -> AppState {
    AppState::new(conn, "test-secret", "Etc/UTC", AnalyticsConfig::default())
        .expect("Could not create app state")
}

/// Serve `router` as if `user_id` had passed the auth guard.
pub(crate) fn get_test_server_as<S>(router: Router<S>, state: S, user_id: UserID) -> TestServer
where
    S: Clone + Send + Sync + 'static,
{
    let app = router.layer(Extension(user_id)).with_state(state);

    TestServer::new(app).expect("Could not create test server.")
}

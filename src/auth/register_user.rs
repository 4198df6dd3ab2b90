//! Route handlers for creating an account and fetching the logged-in user.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, User, UserID, ValidatedPassword, set_auth_cookie,
        user::{create_user, get_user_by_id},
    },
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data for registering a new account.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name shown in the app. Defaults to the local part of the email.
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Create a new user, log them in and respond with the new user as JSON.
///
/// # Errors
///
/// Responds with 400 for an invalid email or weak password, 409 if the email
/// is already registered and 500 for unexpected errors.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<RegisterForm>,
) -> Result<Response, Error> {
    let email = user_data.email.trim();
    let email: EmailAddress = email
        .parse()
        .map_err(|_| Error::InvalidEmail(email.to_owned()))?;

    let password = ValidatedPassword::new(
        &user_data.password,
        &[email.as_str(), user_data.name.as_str()],
    )?;

    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(&user_data.name, &email, password_hash, &connection)?
    };

    tracing::info!("Registered new user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json::<User>(user)).into_response())
}

/// Respond with the logged-in user as JSON.
pub async fn get_current_user(
    State(state): State<RegistrationState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(user_id, &connection).map(Json)
}

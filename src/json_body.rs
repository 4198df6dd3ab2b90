//! Turns rejected JSON request bodies into the API's own validation errors.

use axum::{Json, extract::rejection::JsonRejection};

use crate::Error;

/// Unwrap a JSON body, replacing axum's rejection with `error`.
///
/// Bodies that are not JSON, or whose fields have the wrong type, then get the
/// same 400 JSON error as bodies that fail validation.
pub(crate) fn json_or<T>(body: Result<Json<T>, JsonRejection>, error: Error) -> Result<T, Error> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(error)
        }
    }
}

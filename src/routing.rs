//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::{
    AppState, Error,
    analytics::{
        get_insights_endpoint, get_monthly_report_endpoint, get_overspending_alerts_endpoint,
        post_savings_plan_endpoint,
    },
    auth::{auth_guard, get_current_user, post_log_in, post_log_out, register_user},
    budget::{get_budgets_endpoint, set_budget_endpoint},
    endpoints,
    notification::get_notifications_endpoint,
    recurring_transaction::{
        create_recurring_transaction_endpoint, delete_recurring_transaction_endpoint,
        get_recurring_transactions_endpoint,
    },
    savings_goal::{create_savings_goal_endpoint, get_savings_goals_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(endpoints::USERS_ME, get(get_current_user))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::RECURRING_TRANSACTIONS,
            get(get_recurring_transactions_endpoint).post(create_recurring_transaction_endpoint),
        )
        .route(
            endpoints::RECURRING_TRANSACTION,
            delete(delete_recurring_transaction_endpoint),
        )
        .route(endpoints::MONTHLY_REPORT, get(get_monthly_report_endpoint))
        .route(endpoints::SAVINGS_PLAN, post(post_savings_plan_endpoint))
        .route(
            endpoints::OVERSPENDING_ALERTS,
            get(get_overspending_alerts_endpoint),
        )
        .route(endpoints::INSIGHTS, get(get_insights_endpoint))
        .route(endpoints::NOTIFICATIONS, get(get_notifications_endpoint))
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(set_budget_endpoint),
        )
        .route(
            endpoints::SAVINGS_GOALS,
            get(get_savings_goals_endpoint).post(create_savings_goal_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Check that the database can be queried.
async fn get_health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

    Ok(Json(json!({ "ok": true })))
}

async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no route for {}", uri.path()) })),
    )
        .into_response()
}

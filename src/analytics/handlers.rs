//! Route handlers that run the analytics over the logged-in user's data.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AnalyticsConfig, AppState, Error, UserID,
    analytics::{
        AiInsight, MonthlyReport, OverspendingAlert, SavingsGoal, SavingsPlan,
        build_savings_plan_from_input, build_savings_plan_from_transactions,
        detect_overspending, generate_insights, generate_monthly_report,
    },
    json_body::json_or,
    notification::create_notifications,
    recurring_transaction::get_recurring_monthly_spend,
    timezone::local_today,
    transaction::get_transactions,
};

/// The state needed by the analytics endpoints.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to decide what "today" is.
    pub local_timezone: String,
    /// Settings such as the overspending category scope.
    pub analytics_config: AnalyticsConfig,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            analytics_config: state.analytics_config,
        }
    }
}

/// Respond with the monthly report for the user's transactions.
pub async fn get_monthly_report_endpoint(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<MonthlyReport>, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_transactions(user_id, &connection)?
    };
    let today = local_today(&state.local_timezone)?;

    Ok(Json(generate_monthly_report(&transactions, today)))
}

/// Where the savings plan looks for spending to cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsSource {
    /// The user's recurring expenses that are still active.
    #[default]
    Recurring,
    /// Subscription-like expenses in the user's transactions.
    Transactions,
}

/// The JSON body for requesting a savings plan.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlanRequest {
    /// Defaults to "Trip".
    #[serde(default)]
    pub goal_name: Option<String>,
    /// Must be a positive, finite number.
    #[serde(default)]
    pub target_amount: Option<f64>,
    /// Defaults to one month.
    #[serde(default)]
    pub months: Option<f64>,
    #[serde(default)]
    pub source: SavingsSource,
}

const DEFAULT_GOAL_NAME: &str = "Trip";

impl TryFrom<SavingsPlanRequest> for SavingsGoal {
    type Error = Error;

    fn try_from(request: SavingsPlanRequest) -> Result<Self, Self::Error> {
        let target_amount = request
            .target_amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(Error::InvalidSavingsTarget)?;

        let name = match request.goal_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => DEFAULT_GOAL_NAME.to_owned(),
        };

        Ok(SavingsGoal {
            name,
            target_amount,
            months: request.months.unwrap_or(1.0),
        })
    }
}

/// Respond with a plan for reaching a savings goal.
///
/// # Errors
/// Responds with 400 if the target amount is missing, not finite or not positive.
pub async fn post_savings_plan_endpoint(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    request: Result<Json<SavingsPlanRequest>, JsonRejection>,
) -> Result<Json<SavingsPlan>, Error> {
    let request = json_or(request, Error::InvalidSavingsTarget)?;
    let source = request.source;
    let goal = SavingsGoal::try_from(request)?;

    let plan = match source {
        SavingsSource::Recurring => {
            let today = local_today(&state.local_timezone)?;
            let connection = state
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;
            let recurring_spend = get_recurring_monthly_spend(user_id, today, &connection)?;

            build_savings_plan_from_input(&goal, recurring_spend)
        }
        SavingsSource::Transactions => {
            let connection = state
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;
            let transactions = get_transactions(user_id, &connection)?;

            build_savings_plan_from_transactions(&goal, &transactions)
        }
    };

    Ok(Json(plan))
}

/// The query string for the overspending alerts endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverspendingQuery {
    /// Store each alert as a notification when this is "true".
    #[serde(default)]
    pub persist: Option<String>,
}

/// Respond with overspending alerts for the last week of expenses.
pub async fn get_overspending_alerts_endpoint(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<OverspendingQuery>,
) -> Result<Json<Vec<OverspendingAlert>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;
    let alerts = detect_overspending(&transactions, state.analytics_config.alert_scope);

    let persist = query
        .persist
        .is_some_and(|persist| persist.eq_ignore_ascii_case("true"));

    if persist && !alerts.is_empty() {
        create_notifications(
            user_id,
            alerts.iter().map(|alert| alert.message.as_str()),
            OffsetDateTime::now_utc(),
            &connection,
        )?;
        tracing::debug!("Stored {} overspending alerts for user {user_id}", alerts.len());
    }

    Ok(Json(alerts))
}

/// Respond with short insights about the user's spending.
pub async fn get_insights_endpoint(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<AiInsight>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;

    Ok(Json(generate_insights(&transactions, OffsetDateTime::now_utc())))
}

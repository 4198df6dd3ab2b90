//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The route for checking that the server and database are up.
pub const HEALTH: &str = "/api/health";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to get the logged-in user.
pub const USERS_ME: &str = "/api/users/me";
/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to access recurring transactions.
pub const RECURRING_TRANSACTIONS: &str = "/api/recurring_transactions";
/// The route to access a single recurring transaction.
pub const RECURRING_TRANSACTION: &str = "/api/recurring_transactions/{recurring_transaction_id}";
/// The route for the monthly spending report.
pub const MONTHLY_REPORT: &str = "/api/ai/monthly-report";
/// The route for building a savings plan.
pub const SAVINGS_PLAN: &str = "/api/ai/savings-plan";
/// The route for checking the last week for overspending.
pub const OVERSPENDING_ALERTS: &str = "/api/ai/overspending-alerts";
/// The route for short spending insights.
pub const INSIGHTS: &str = "/api/ai/insights";
/// The route to list the user's notifications.
pub const NOTIFICATIONS: &str = "/api/notifications";
/// The route to list and set monthly category budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to list and create savings goals.
pub const SAVINGS_GOALS: &str = "/api/savings_goals";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

//! Spending analytics derived from a user's transactions.
//!
//! Everything here except [handlers] is a pure function of its arguments.
//! Functions whose output depends on the clock take the current date or time
//! as an argument.

mod aggregation;
mod budget;
mod goals;
mod handlers;
mod insights;
mod overspending;
mod recurring;
mod regression;
mod report;
mod savings;

pub use aggregation::{CategoryTotal, group_by_category, month_key, month_label, sum_amounts};
pub use budget::{Budget, BudgetHealth, BudgetStatus, budget_status, budget_statuses};
pub use goals::{GoalProgress, goal_progress};
pub use handlers::{
    get_insights_endpoint, get_monthly_report_endpoint, get_overspending_alerts_endpoint,
    post_savings_plan_endpoint,
};
pub use insights::{AiInsight, InsightKind, generate_insights};
pub use overspending::{CategoryScope, OverspendingAlert, Severity, detect_overspending};
pub use recurring::{Frequency, recurring_to_monthly};
pub use regression::{Regression, TrendDirection, linear_regression};
pub use report::{
    BiggestCategory, ChangeDirection, MonthOverMonthChange, MonthlyReport, MonthlySpending,
    SpendingTrend, generate_monthly_report,
};
pub use savings::{
    SavingsGoal, SavingsPlan, build_savings_plan_from_input, build_savings_plan_from_transactions,
};

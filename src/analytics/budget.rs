//! Monthly category budgets and how much of each limit has been spent.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Transaction, TransactionType,
    analytics::aggregation::{month_key, sum_amounts},
};

/// Spending above this share of the limit is near the limit.
const NEAR_LIMIT_PERCENT: f64 = 80.0;

/// A spending limit for one expense category per calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The expense category the limit applies to.
    pub category: String,
    /// The most that should be spent in a month.
    pub limit: f64,
}

/// How close spending is to a budget's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetHealth {
    /// At most 80% of the limit has been spent.
    OnTrack,
    /// More than 80% and at most 100% of the limit has been spent.
    NearLimit,
    /// More than the limit has been spent.
    OverBudget,
}

/// A budget together with this month's spending against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub category: String,
    pub limit: f64,
    /// The amount spent in the category this month.
    pub spent: f64,
    /// `spent` as a percentage of `limit`.
    pub percentage: f64,
    pub health: BudgetHealth,
    /// What is left of the limit, negative once the budget is exceeded.
    pub remaining: f64,
    /// A short note for budgets near or over their limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Compare `spent` with the limit of `budget`.
///
/// A budget with a limit that is not positive reports 0% and is on track.
pub fn budget_status(budget: &Budget, spent: f64) -> BudgetStatus {
    let percentage = if budget.limit > 0.0 {
        spent / budget.limit * 100.0
    } else {
        0.0
    };

    let health = if percentage > 100.0 {
        BudgetHealth::OverBudget
    } else if percentage > NEAR_LIMIT_PERCENT {
        BudgetHealth::NearLimit
    } else {
        BudgetHealth::OnTrack
    };

    let remaining = budget.limit - spent;
    let message = match health {
        BudgetHealth::OverBudget => Some(format!("INR {:.2} over budget", to_cents(-remaining))),
        BudgetHealth::NearLimit => Some(format!("INR {:.2} remaining", to_cents(remaining))),
        BudgetHealth::OnTrack => None,
    };

    BudgetStatus {
        category: budget.category.clone(),
        limit: budget.limit,
        spent,
        percentage,
        health,
        remaining,
        message,
    }
}

/// The status of each budget using the expenses in the month `today` falls in.
///
/// Statuses are returned in the same order as `budgets`.
pub fn budget_statuses(
    budgets: &[Budget],
    transactions: &[Transaction],
    today: Date,
) -> Vec<BudgetStatus> {
    let current_month = month_key(today);

    budgets
        .iter()
        .map(|budget| {
            let spent = sum_amounts(transactions.iter().filter(|transaction| {
                transaction.kind == TransactionType::Expense
                    && transaction.category == budget.category
                    && month_key(transaction.date) == current_month
            }));

            budget_status(budget, spent)
        })
        .collect()
}

fn to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

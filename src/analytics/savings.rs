//! Savings plans: how much to put aside each month to reach a goal.

use serde::{Deserialize, Serialize};

use crate::{Transaction, TransactionType};

/// Words in a description that mark an expense as a subscription.
const SUBSCRIPTION_KEYWORDS: [&str; 5] = ["subscription", "netflix", "spotify", "prime", "membership"];

/// The share of the monthly saving that cutting recurring expenses is expected to cover.
const RECURRING_REDUCTION_SHARE: f64 = 0.3;

/// Something to save for.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoal {
    /// What the money is for, e.g. "Trip".
    pub name: String,
    /// The amount to save.
    pub target_amount: f64,
    /// How many months to save over.
    pub months: f64,
}

impl SavingsGoal {
    /// The number of months to save over, at least one.
    ///
    /// Non-finite values are treated as one month.
    fn clamped_months(&self) -> f64 {
        if self.months.is_finite() && self.months >= 1.0 {
            self.months
        } else {
            1.0
        }
    }
}

/// A monthly saving target and suggestions for how to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlan {
    /// What the money is for.
    pub goal_name: String,
    /// The amount to save.
    pub target_amount: f64,
    /// How many months to save over, at least one.
    pub months: f64,
    /// How much to save each month.
    pub monthly_saving: f64,
    /// Three suggestions, the first of which is the monthly target.
    pub suggestions: Vec<String>,
}

/// Build a plan using the expected monthly cost of the user's recurring expenses.
///
/// The suggested reduction is capped at 30% of the monthly saving.
pub fn build_savings_plan_from_input(goal: &SavingsGoal, recurring_monthly_spend: f64) -> SavingsPlan {
    let months = goal.clamped_months();
    let monthly_saving = goal.target_amount / months;

    let suggestions = vec![
        format!("Save INR {:.0} per month for {}.", monthly_saving.round(), goal.name),
        if recurring_monthly_spend > 0.0 {
            format!(
                "Reduce recurring expenses by INR {:.0} per month.",
                recurring_monthly_spend
                    .min(monthly_saving * RECURRING_REDUCTION_SHARE)
                    .round()
            )
        } else {
            "Cut one non-essential subscription and redirect that money to savings.".to_owned()
        },
        "Set up an automatic transfer on day 1 of every month.".to_owned(),
    ];

    SavingsPlan {
        goal_name: goal.name.clone(),
        target_amount: goal.target_amount,
        months,
        monthly_saving,
        suggestions,
    }
}

/// Build a plan using the subscriptions found among `transactions`.
///
/// An expense is a subscription if its description contains one of a few
/// keywords such as "netflix" or "membership", ignoring case.
pub fn build_savings_plan_from_transactions(
    goal: &SavingsGoal,
    transactions: &[Transaction],
) -> SavingsPlan {
    let months = goal.clamped_months();
    let monthly_saving = goal.target_amount / months;

    let subscription_spending: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionType::Expense && is_subscription(&transaction.description)
        })
        .map(|transaction| transaction.amount)
        .sum();

    let suggestions = vec![
        format!("Save INR {:.0} per month toward {}.", monthly_saving.round(), goal.name),
        if subscription_spending > 0.0 {
            format!(
                "Cut low-value subscriptions to unlock about INR {:.0} monthly.",
                subscription_spending.round()
            )
        } else {
            "Audit recurring expenses and cancel at least one non-essential subscription.".to_owned()
        },
        "Move your savings amount via auto-transfer right after income credits.".to_owned(),
    ];

    SavingsPlan {
        goal_name: goal.name.clone(),
        target_amount: goal.target_amount,
        months,
        monthly_saving,
        suggestions,
    }
}

fn is_subscription(description: &str) -> bool {
    let description = description.to_lowercase();

    SUBSCRIPTION_KEYWORDS
        .iter()
        .any(|keyword| description.contains(keyword))
}

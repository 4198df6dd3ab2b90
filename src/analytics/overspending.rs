//! Week-over-week overspending alerts.
//!
//! The windows are anchored to the latest expense rather than the clock, so
//! the same transactions always produce the same alerts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{Transaction, TransactionType, category::EXPENSE_CATEGORIES};

/// The number of days in each comparison window.
const WINDOW_DAYS: i64 = 7;

/// Spending at least this much in a category with no spending the week before raises an alert.
const NEW_SPENDING_THRESHOLD: f64 = 100.0;

/// The smallest week-over-week increase, in percent, that raises an alert.
const MEDIUM_CHANGE_PERCENT: f64 = 25.0;

/// Increases of at least this many percent raise a high severity alert.
const HIGH_CHANGE_PERCENT: f64 = 50.0;

/// Which categories the overspending detector checks, and in what order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CategoryScope {
    /// The built-in expense categories in their display order.
    #[default]
    Fixed,
    /// The categories of the given expenses in the order they first appear.
    Observed,
}

/// How urgent an alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Spending rose noticeably.
    Medium,
    /// Spending rose sharply or appeared out of nowhere.
    High,
}

/// A warning that spending in a category is higher than the week before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverspendingAlert {
    /// "alert-" followed by the category name.
    pub id: String,
    /// The category that is overspent.
    pub category: String,
    /// How urgent the alert is.
    pub severity: Severity,
    /// A sentence describing the increase.
    pub message: String,
    /// The week-over-week increase in percent, absent when there was no
    /// spending the week before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

/// Compare the last 7 days of expenses with the 7 days before, per category.
///
/// The last day is the date of the latest expense. A category gets an alert if
/// it had no spending the week before and at least INR 100 this week, or if its
/// spending grew by at least 25%.
pub fn detect_overspending(
    transactions: &[Transaction],
    scope: CategoryScope,
) -> Vec<OverspendingAlert> {
    let expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionType::Expense)
        .collect();

    let Some(latest_date) = expenses.iter().map(|expense| expense.date).max() else {
        return Vec::new();
    };

    let current_window = DateWindow::ending_at(latest_date);
    let previous_window = DateWindow::ending_at(latest_date.saturating_sub(Duration::days(WINDOW_DAYS)));

    categories_in_scope(&expenses, scope)
        .into_iter()
        .filter_map(|category| {
            let current = current_window.sum_for(&expenses, category);
            let previous = previous_window.sum_for(&expenses, category);

            check_category(category, current, previous)
        })
        .collect()
}

fn categories_in_scope<'a>(expenses: &[&'a Transaction], scope: CategoryScope) -> Vec<&'a str> {
    match scope {
        CategoryScope::Fixed => EXPENSE_CATEGORIES.to_vec(),
        CategoryScope::Observed => {
            let mut seen = HashSet::new();

            expenses
                .iter()
                .map(|expense| expense.category.as_str())
                .filter(|category| seen.insert(*category))
                .collect()
        }
    }
}

fn check_category(category: &str, current: f64, previous: f64) -> Option<OverspendingAlert> {
    if current <= 0.0 {
        return None;
    }

    if previous == 0.0 {
        if current < NEW_SPENDING_THRESHOLD {
            return None;
        }

        return Some(OverspendingAlert {
            id: format!("alert-{category}"),
            category: category.to_owned(),
            severity: Severity::High,
            message: format!(
                "You are spending more than usual on {category}. This week: INR {current:.2}."
            ),
            change_percent: None,
        });
    }

    let change_percent = (current - previous) / previous * 100.0;

    if change_percent < MEDIUM_CHANGE_PERCENT {
        return None;
    }

    let severity = if change_percent >= HIGH_CHANGE_PERCENT {
        Severity::High
    } else {
        Severity::Medium
    };

    Some(OverspendingAlert {
        id: format!("alert-{category}"),
        category: category.to_owned(),
        severity,
        message: format!(
            "You are spending {:.0}% more than usual on {category}.",
            change_percent.round()
        ),
        change_percent: Some(change_percent),
    })
}

/// An inclusive range of dates.
struct DateWindow {
    start: Date,
    end: Date,
}

impl DateWindow {
    /// The [WINDOW_DAYS] days up to and including `end`.
    fn ending_at(end: Date) -> Self {
        Self {
            start: end.saturating_sub(Duration::days(WINDOW_DAYS - 1)),
            end,
        }
    }

    fn sum_for(&self, expenses: &[&Transaction], category: &str) -> f64 {
        expenses
            .iter()
            .filter(|expense| {
                expense.category == category && expense.date >= self.start && expense.date <= self.end
            })
            .map(|expense| expense.amount)
            .sum()
    }
}

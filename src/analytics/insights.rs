//! Short insights about recent spending behaviour.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Transaction, TransactionType,
    analytics::{
        aggregation::{group_by_category, sum_amounts},
        regression::linear_regression,
    },
    category::OTHER_CATEGORY,
};

/// Daily spending rising faster than this many INR per day is flagged.
const RISING_SLOPE_PER_DAY: f64 = 2.0;

/// The latest day is unusual if it is this many times the average day.
const ANOMALY_FACTOR: f64 = 1.5;

/// A single category above this share of all spending, in percent, is flagged.
const CATEGORY_SHARE_ALERT_PERCENT: f64 = 40.0;

/// The tone of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Advice.
    Tip,
    /// Something the user should look at.
    Alert,
    /// Praise for good habits.
    Achievement,
}

/// One generated insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsight {
    /// A stable identifier for the kind of insight, e.g. "ai-trend-up".
    pub id: String,
    /// The tone of the insight.
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// The text shown to the user.
    pub message: String,
    /// When the insight was generated.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Generate three insights from the daily totals of the expenses in `transactions`.
///
/// The insights cover the trend of daily spending, how the latest day compares
/// with an average day and how concentrated spending is in one category.
/// Without any expenses a single tip asking for data is returned.
pub fn generate_insights(transactions: &[Transaction], now: OffsetDateTime) -> Vec<AiInsight> {
    let expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionType::Expense)
        .collect();

    if expenses.is_empty() {
        return vec![AiInsight {
            id: "ai-empty".to_owned(),
            kind: InsightKind::Tip,
            message: "Add transactions to generate personalized AI insights.".to_owned(),
            timestamp: now,
        }];
    }

    let mut daily_totals: BTreeMap<Date, f64> = BTreeMap::new();
    for expense in &expenses {
        *daily_totals.entry(expense.date).or_insert(0.0) += expense.amount;
    }
    let daily_series: Vec<f64> = daily_totals.into_values().collect();

    let slope = linear_regression(&daily_series).slope;
    let latest_spend = daily_series.last().copied().unwrap_or(0.0);
    let average_spend = daily_series.iter().sum::<f64>() / daily_series.len() as f64;

    let (top_category, top_amount) = group_by_category(expenses.iter().copied())
        .into_iter()
        .next()
        .map_or_else(
            || (OTHER_CATEGORY.to_owned(), 0.0),
            |total| (total.category, total.amount),
        );

    let trend_insight = if slope > RISING_SLOPE_PER_DAY {
        AiInsight {
            id: "ai-trend-up".to_owned(),
            kind: InsightKind::Alert,
            message: format!(
                "Regression detected a rising spend trend (+{slope:.2} INR/day). Watch {top_category} closely."
            ),
            timestamp: now,
        }
    } else {
        AiInsight {
            id: "ai-trend-stable".to_owned(),
            kind: InsightKind::Achievement,
            message: format!(
                "Spending trend is stable ({slope:.2} INR/day). Keep following your current plan."
            ),
            timestamp: now,
        }
    };

    let anomaly_insight = if latest_spend > average_spend * ANOMALY_FACTOR {
        AiInsight {
            id: "ai-anomaly".to_owned(),
            kind: InsightKind::Alert,
            message: format!(
                "Today looks higher than your normal pattern ({:.0} vs avg {:.0} INR).",
                latest_spend.round(),
                average_spend.round()
            ),
            timestamp: now - Duration::hours(1),
        }
    } else {
        AiInsight {
            id: "ai-tip".to_owned(),
            kind: InsightKind::Tip,
            message: format!(
                "Top expense category is {top_category}. Reducing it by 10% can improve monthly savings quickly."
            ),
            timestamp: now - Duration::hours(1),
        }
    };

    let total = sum_amounts(expenses.iter().copied());
    let category_share = if total > 0.0 {
        top_amount / total * 100.0
    } else {
        0.0
    };

    let category_insight = AiInsight {
        id: "ai-category".to_owned(),
        kind: if category_share > CATEGORY_SHARE_ALERT_PERCENT {
            InsightKind::Alert
        } else {
            InsightKind::Tip
        },
        message: format!(
            "{top_category} is {:.0}% of your expenses. Diversify spending to reduce risk of overspending in one area.",
            category_share.round()
        ),
        timestamp: now - Duration::hours(2),
    };

    vec![trend_insight, anomaly_insight, category_insight]
}

//! The monthly spending report.
//!
//! The report compares the latest month with expenses against the month
//! before it, fits a trend line through every month's total and turns the
//! results into a few sentences of advice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Transaction, TransactionType,
    analytics::{
        aggregation::{group_by_category, month_key, month_label, sum_amounts},
        regression::{TrendDirection, linear_regression},
    },
    category::OTHER_CATEGORY,
};

/// A summary of the latest month of spending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    /// The month being reported on, e.g. "Feb 2025".
    pub month_label: String,
    /// Total expenses in the month.
    pub total_spending: f64,
    /// The category with the most spending in the month.
    pub biggest_category: BiggestCategory,
    /// How the month's total compares to the month before.
    pub month_over_month_change: MonthOverMonthChange,
    /// One sentence summarizing the month.
    pub summary: String,
    /// Total expenses for every month with expenses, oldest first.
    pub monthly_series: Vec<MonthlySpending>,
    /// A line fit through `monthly_series`.
    pub trend: SpendingTrend,
    /// Advice on how to save more.
    pub ai_savings_tips: Vec<String>,
    /// Sentences describing the charts.
    pub graph_insights: Vec<String>,
}

/// The category with the most spending and its share of the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiggestCategory {
    /// The category name.
    pub name: String,
    /// The amount spent in the category.
    pub amount: f64,
    /// The percentage of the month's spending in this category, 0 to 100.
    pub share: f64,
}

/// Whether spending went up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    /// Spending increased.
    Up,
    /// Spending decreased.
    Down,
    /// Spending did not change, or there is nothing to compare against.
    Same,
}

/// The percentage change in spending between two months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOverMonthChange {
    /// The signed change as a percentage of the previous month.
    pub percent: f64,
    /// The sign of `percent`.
    pub direction: ChangeDirection,
}

/// Total spending in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySpending {
    /// The month, e.g. "Feb 2025".
    pub month: String,
    /// The total, rounded to cents.
    pub spending: f64,
}

/// The trend line through the monthly totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrend {
    /// Which way spending is heading.
    pub direction: TrendDirection,
    /// The change in spending per month.
    pub slope: f64,
    /// The forecast total for the month after the latest one, never negative.
    pub projected_next_month: f64,
}

/// Build the report for the latest month with expenses in `transactions`.
///
/// `today` is only used for the month label when there are no expenses at all.
pub fn generate_monthly_report(transactions: &[Transaction], today: Date) -> MonthlyReport {
    let expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionType::Expense)
        .collect();

    // Keyed by "YYYY-MM" so iteration is in chronological order.
    let mut months: BTreeMap<String, MonthBucket> = BTreeMap::new();
    for &expense in &expenses {
        months
            .entry(month_key(expense.date))
            .or_insert_with(|| MonthBucket {
                label: month_label(expense.date),
                expenses: Vec::new(),
            })
            .expenses
            .push(expense);
    }

    let mut latest_months = months.values().rev();
    let current_month = latest_months.next();
    let previous_month = latest_months.next();

    let current_expenses = current_month.map_or(&[][..], |month| &month.expenses[..]);
    let previous_expenses = previous_month.map_or(&[][..], |month| &month.expenses[..]);

    let total_spending = sum_amounts(current_expenses.iter().copied());
    let previous_spending = sum_amounts(previous_expenses.iter().copied());

    let biggest_category = group_by_category(current_expenses.iter().copied())
        .into_iter()
        .next()
        .map_or_else(
            || (OTHER_CATEGORY.to_owned(), 0.0),
            |total| (total.category, total.amount),
        );
    let (biggest_name, biggest_amount) = biggest_category;
    let share = if total_spending > 0.0 {
        biggest_amount / total_spending * 100.0
    } else {
        0.0
    };

    let percent_change = if previous_spending > 0.0 {
        (total_spending - previous_spending) / previous_spending * 100.0
    } else {
        0.0
    };
    let change_direction = if percent_change > 0.0 {
        ChangeDirection::Up
    } else if percent_change < 0.0 {
        ChangeDirection::Down
    } else {
        ChangeDirection::Same
    };

    let summary = if previous_spending > 0.0 {
        format!(
            "You spent {:.0}% {} this month than last month.",
            percent_change.abs().round(),
            if percent_change >= 0.0 { "more" } else { "less" }
        )
    } else {
        format!(
            "Top category this month is {biggest_name}. Add more months for stronger trend predictions."
        )
    };

    let monthly_series: Vec<MonthlySpending> = months
        .values()
        .map(|month| MonthlySpending {
            month: month.label.clone(),
            spending: round_to_cents(sum_amounts(month.expenses.iter().copied())),
        })
        .collect();

    let series_values: Vec<f64> = monthly_series.iter().map(|month| month.spending).collect();
    let regression = linear_regression(&series_values);
    let trend = SpendingTrend {
        direction: regression.direction(),
        slope: regression.slope,
        projected_next_month: regression.project(series_values.len()),
    };

    let ai_savings_tips = vec![
        format!(
            "Cap {biggest_name} weekly spending to INR {:.0}.",
            (biggest_amount / 4.0).round()
        ),
        if trend.slope > 0.0 {
            "Spending trend is rising. Move a fixed amount to savings at month start.".to_owned()
        } else {
            "Spending trend is stable. Increase monthly savings target by 5-10%.".to_owned()
        },
        "Review recurring subscriptions and pause low-value plans.".to_owned(),
    ];

    let graph_insights = vec![
        format!(
            "{biggest_name} is your top category at {:.0}% of this month spending.",
            share.round()
        ),
        format!(
            "Regression trend is {} ({:.2} INR per month), projected next month: INR {:.0}.",
            trend.direction.as_str(),
            trend.slope,
            trend.projected_next_month.round()
        ),
    ];

    MonthlyReport {
        month_label: current_month.map_or_else(|| month_label(today), |month| month.label.clone()),
        total_spending,
        biggest_category: BiggestCategory {
            name: biggest_name,
            amount: biggest_amount,
            share,
        },
        month_over_month_change: MonthOverMonthChange {
            percent: percent_change,
            direction: change_direction,
        },
        summary,
        monthly_series,
        trend,
        ai_savings_tips,
        graph_insights,
    }
}

struct MonthBucket<'a> {
    label: String,
    expenses: Vec<&'a Transaction>,
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::analytics::{
        regression::TrendDirection,
        test_utils::{expense, income},
    };

    use super::{ChangeDirection, MonthlySpending, generate_monthly_report};

    #[track_caller]
    fn assert_close(got: f64, want: f64) {
        assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
    }

    #[test]
    fn empty_report_uses_today() {
        let report = generate_monthly_report(&[], date!(2025 - 03 - 14));

        assert_eq!(report.month_label, "Mar 2025");
        assert_eq!(report.total_spending, 0.0);
        assert_eq!(report.biggest_category.name, "Other");
        assert_eq!(report.biggest_category.amount, 0.0);
        assert_eq!(report.biggest_category.share, 0.0);
        assert_eq!(
            report.month_over_month_change.direction,
            ChangeDirection::Same
        );
        assert!(report.monthly_series.is_empty());
        assert_eq!(report.trend.direction, TrendDirection::Flat);
        assert_eq!(report.trend.projected_next_month, 0.0);
    }

    #[test]
    fn feb_report_compares_with_january() {
        let transactions = [
            expense("Food & Dining", 50.0, date!(2025 - 01 - 05)),
            expense("Food & Dining", 50.0, date!(2025 - 02 - 05)),
            expense("Transportation", 20.0, date!(2025 - 02 - 10)),
        ];

        let report = generate_monthly_report(&transactions, date!(2025 - 06 - 01));

        assert_eq!(report.month_label, "Feb 2025");
        assert_close(report.total_spending, 70.0);
        assert_eq!(report.biggest_category.name, "Food & Dining");
        assert_close(report.biggest_category.amount, 50.0);
        assert_close(report.biggest_category.share, 500.0 / 7.0);
        assert_close(report.month_over_month_change.percent, 40.0);
        assert_eq!(report.month_over_month_change.direction, ChangeDirection::Up);
        assert_eq!(
            report.summary,
            "You spent 40% more this month than last month."
        );
        assert_eq!(
            report.monthly_series,
            vec![
                MonthlySpending {
                    month: "Jan 2025".to_owned(),
                    spending: 50.0
                },
                MonthlySpending {
                    month: "Feb 2025".to_owned(),
                    spending: 70.0
                },
            ]
        );
        assert_eq!(report.trend.direction, TrendDirection::Upward);
        assert_close(report.trend.slope, 20.0);
        assert_close(report.trend.projected_next_month, 90.0);
        assert_eq!(
            report.graph_insights,
            [
                "Food & Dining is your top category at 71% of this month spending.",
                "Regression trend is upward (20.00 INR per month), projected next month: INR 90.",
            ]
        );
        assert_eq!(
            report.ai_savings_tips[1],
            "Spending trend is rising. Move a fixed amount to savings at month start."
        );
        assert_eq!(
            report.ai_savings_tips[2],
            "Review recurring subscriptions and pause low-value plans."
        );
    }

    #[test]
    fn doubled_spending_is_a_hundred_percent_increase() {
        let transactions = [
            expense("Shopping", 80.0, date!(2025 - 04 - 02)),
            expense("Shopping", 160.0, date!(2025 - 05 - 02)),
        ];

        let report = generate_monthly_report(&transactions, date!(2025 - 05 - 31));

        assert_close(report.month_over_month_change.percent, 100.0);
        assert_eq!(report.month_over_month_change.direction, ChangeDirection::Up);
    }

    #[test]
    fn lower_spending_is_reported_as_less() {
        let transactions = [
            expense("Travel", 200.0, date!(2025 - 04 - 02)),
            expense("Travel", 140.0, date!(2025 - 05 - 02)),
        ];

        let report = generate_monthly_report(&transactions, date!(2025 - 05 - 31));

        assert_close(report.month_over_month_change.percent, -30.0);
        assert_eq!(
            report.month_over_month_change.direction,
            ChangeDirection::Down
        );
        assert_eq!(
            report.summary,
            "You spent 30% less this month than last month."
        );
        assert_eq!(
            report.ai_savings_tips[0],
            "Cap Travel weekly spending to INR 35."
        );
        assert_eq!(
            report.ai_savings_tips[1],
            "Spending trend is stable. Increase monthly savings target by 5-10%."
        );
    }

    #[test]
    fn single_month_uses_fallback_summary() {
        let transactions = [
            expense("Healthcare", 45.0, date!(2025 - 10 - 07)),
            income(4500.0, date!(2025 - 11 - 10)),
        ];

        let report = generate_monthly_report(&transactions, date!(2025 - 11 - 15));

        assert_eq!(report.month_label, "Oct 2025");
        assert_eq!(
            report.summary,
            "Top category this month is Healthcare. Add more months for stronger trend predictions."
        );
        assert_eq!(
            report.month_over_month_change.direction,
            ChangeDirection::Same
        );
    }

    #[test]
    fn months_are_ordered_across_years() {
        let transactions = [
            expense("Other", 10.0, date!(2025 - 01 - 15)),
            expense("Other", 30.0, date!(2024 - 12 - 15)),
            expense("Other", 20.0, date!(2024 - 11 - 15)),
        ];

        let report = generate_monthly_report(&transactions, date!(2025 - 01 - 31));

        let months: Vec<&str> = report
            .monthly_series
            .iter()
            .map(|month| month.month.as_str())
            .collect();
        assert_eq!(months, ["Nov 2024", "Dec 2024", "Jan 2025"]);
        assert_eq!(report.month_label, "Jan 2025");
        assert_close(report.total_spending, 10.0);
    }

    #[test]
    fn series_is_rounded_to_cents() {
        let transactions = [
            expense("Other", 33.333, date!(2025 - 01 - 15)),
            expense("Other", 33.333, date!(2025 - 01 - 16)),
        ];

        let report = generate_monthly_report(&transactions, date!(2025 - 01 - 31));

        assert_eq!(report.monthly_series[0].spending, 66.67);
    }

    #[test]
    fn weekly_cap_rounds_halves_up() {
        let transactions = [expense("Shopping", 10.0, date!(2025 - 03 - 02))];

        let report = generate_monthly_report(&transactions, date!(2025 - 03 - 14));

        assert_eq!(
            report.ai_savings_tips[0],
            "Cap Shopping weekly spending to INR 3."
        );
    }

    #[test]
    fn serializes_camel_case() {
        let report = generate_monthly_report(&[], date!(2025 - 03 - 14));

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["monthLabel"], "Mar 2025");
        assert_eq!(json["monthOverMonthChange"]["direction"], "same");
        assert_eq!(json["trend"]["direction"], "flat");
        assert_eq!(json["trend"]["projectedNextMonth"], 0.0);
        assert!(json["aiSavingsTips"].is_array());
        assert!(json["graphInsights"].is_array());
    }
}

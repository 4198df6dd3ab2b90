//! Bucketing transactions by month and totalling them by category.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Transaction, TransactionType};

/// The total amount spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The summed amount.
    pub amount: f64,
}

/// The zero-padded "YYYY-MM" key of the month `date` falls in, e.g. "2025-02".
///
/// Keys sort lexically in chronological order.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// A short human readable label for the month `date` falls in, e.g. "Feb 2025".
pub fn month_label(date: Date) -> String {
    format!("{} {}", month_abbreviation(date.month()), date.year())
}

fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// The sum of the amounts of `transactions`, zero if there are none.
pub fn sum_amounts<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    transactions
        .into_iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// Sum expense amounts per category, largest total first.
///
/// Income is ignored. Categories with equal totals keep the order in which
/// they first appear in `transactions`.
pub fn group_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionType::Expense {
            continue;
        }

        match index_of.get(transaction.category.as_str()) {
            Some(&index) => totals[index].amount += transaction.amount,
            None => {
                index_of.insert(&transaction.category, totals.len());
                totals.push(CategoryTotal {
                    category: transaction.category.clone(),
                    amount: transaction.amount,
                });
            }
        }
    }

    // `sort_by` is stable, so ties stay in first-seen order.
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals
}

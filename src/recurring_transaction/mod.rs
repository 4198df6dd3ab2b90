//! Transactions that repeat on a schedule.

mod core;
mod endpoints;

pub use core::{create_recurring_transaction_table, get_recurring_monthly_spend};
pub use endpoints::{
    create_recurring_transaction_endpoint, delete_recurring_transaction_endpoint,
    get_recurring_transactions_endpoint,
};

#[cfg(test)]
pub use core::{NewRecurringTransaction, create_recurring_transaction};

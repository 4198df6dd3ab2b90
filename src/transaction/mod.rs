//! Transactions: the model, the database functions and the JSON endpoints.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, Transaction, create_transaction, create_transaction_table, get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;

//! Transactions for the sales dashboard.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The month-scoped search and pagination query
//! - Loading the database from the product feed
//! - Route handlers for listing transactions and reloading the database

mod core;
mod populate_endpoint;
mod query;
mod seed;
mod transactions_endpoint;

pub use core::{
    Category, Transaction, TransactionBuilder, count_transactions, create_transaction,
    create_transaction_table,
};
pub use populate_endpoint::populate_database_endpoint;
pub use query::TransactionQuery;
pub use seed::{DEFAULT_FEED_URL, FeedClient, parse_feed, replace_all_transactions};
pub use transactions_endpoint::get_transactions_endpoint;

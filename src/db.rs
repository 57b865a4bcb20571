//! Database setup for the application.

use rusqlite::{
    Connection, Row, TransactionBehavior,
    functions::FunctionFlags,
    types::Type,
};

use crate::{Error, transaction::create_transaction_table};

/// The SQL function `unicode_contains(haystack, needle)`.
///
/// True when `haystack` contains `needle`, ignoring case for every script.
pub(crate) const UNICODE_CONTAINS: &str = "unicode_contains";

/// Create the application tables if they do not already exist and register
/// the SQL functions the queries rely on.
///
/// Functions are registered per connection, so call this on every new connection.
/// Safe to call on an existing database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    register_functions(connection)?;

    let transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

fn register_functions(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        UNICODE_CONTAINS,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let haystack = context.get::<String>(0)?;
            let needle = context.get::<String>(1)?;

            Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
        },
    )
}

/// Read a non-negative integer column such as the result of `COUNT`.
pub(crate) fn get_count(row: &Row, index: usize) -> Result<u64, rusqlite::Error> {
    let count: i64 = row.get(index)?;

    u64::try_from(count)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error)))
}

//! Number of transactions per category for a month.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Month;

use crate::{Error, db::get_count, transaction::Category};

/// The number of transactions in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category.
    pub category: Category,
    /// How many transactions in the month have this category.
    pub count: u64,
}

/// Count the transactions in `month` per category.
///
/// Only categories with at least one transaction in the month are returned.
/// Callers should not rely on the order of the result.
///
/// # Errors
/// Returns a:
/// - [Error::NoDataForMonth] if there are no transactions in `month`,
/// - or [Error::SqlError] if the query fails.
pub fn get_category_counts(
    month: Month,
    connection: &Connection,
) -> Result<Vec<CategoryCount>, Error> {
    let counts = connection
        .prepare_cached(
            "SELECT category, COUNT(id) FROM \"transaction\"
             WHERE month_of_sale = ?1
             GROUP BY category
             ORDER BY category",
        )?
        .query_map([month as u8], |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                count: get_count(row, 1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if counts.is_empty() {
        return Err(Error::NoDataForMonth(month));
    }

    Ok(counts)
}

//! Total sales and sold/unsold counts for a month.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Month;

use crate::{Error, db::get_count};

/// The sales summary for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatistics {
    /// The sum of the prices of every transaction in the month.
    pub total_sales: f64,
    /// The number of transactions that were sold.
    pub sold_items: u64,
    /// The number of transactions that were not sold.
    pub not_sold_items: u64,
}

/// Sum the prices and count the sold and unsold transactions in `month`.
///
/// The aggregation runs in SQL as a single pass over the month.
///
/// # Errors
/// Returns a:
/// - [Error::NoDataForMonth] if there are no transactions in `month`,
/// - or [Error::SqlError] if the query fails.
pub fn get_sale_statistics(month: Month, connection: &Connection) -> Result<SaleStatistics, Error> {
    let (count, statistics) = connection
        .prepare_cached(
            "SELECT COUNT(id),
                    COALESCE(SUM(price), 0.0),
                    COALESCE(SUM(CASE WHEN sold THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN sold THEN 0 ELSE 1 END), 0)
             FROM \"transaction\"
             WHERE month_of_sale = ?1",
        )?
        .query_row([month as u8], |row| {
            Ok((
                get_count(row, 0)?,
                SaleStatistics {
                    total_sales: row.get(1)?,
                    sold_items: get_count(row, 2)?,
                    not_sold_items: get_count(row, 3)?,
                },
            ))
        })?;

    if count == 0 {
        return Err(Error::NoDataForMonth(month));
    }

    Ok(statistics)
}

//! Month statistics for the dashboard.
//!
//! Three aggregations run over the transactions of one month:
//! - sales totals and sold/unsold counts,
//! - a histogram of prices over fixed ranges,
//! - the number of transactions per category.
//!
//! [get_monthly_statistics] combines them into one response.

mod category;
mod handlers;
mod histogram;
mod sales;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Month;

use crate::Error;

pub use category::{CategoryCount, get_category_counts};
pub use handlers::get_statistics_endpoint;
pub use histogram::{BucketCount, PRICE_BUCKETS, PriceBucket, PriceHistogram, get_price_histogram};
pub use sales::{SaleStatistics, get_sale_statistics};

/// Every statistic for a month, as returned by the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatistics {
    /// Sales totals.
    pub sale_statistics: SaleStatistics,
    /// Transaction counts for each price range, in range order.
    pub bar_chart_data: Vec<BucketCount>,
    /// Transaction counts for each category present in the month.
    pub pie_chart_data: Vec<CategoryCount>,
}

/// Compute every statistic for `month` from one snapshot of the database.
///
/// The aggregations run inside a single read transaction. The sales totals
/// run first and stop the pipeline if the month has no transactions, so a
/// partial result is never returned.
///
/// # Errors
/// Returns a:
/// - [Error::NoDataForMonth] if there are no transactions in `month`,
/// - or [Error::SqlError] if any of the queries fail.
pub fn get_monthly_statistics(
    month: Month,
    connection: &Connection,
) -> Result<MonthlyStatistics, Error> {
    let tx = connection.unchecked_transaction()?;

    let sale_statistics = get_sale_statistics(month, &tx)?;
    let histogram = get_price_histogram(month, &tx)?;
    let pie_chart_data = get_category_counts(month, &tx)?;

    tx.commit()?;

    Ok(MonthlyStatistics {
        sale_statistics,
        bar_chart_data: histogram.buckets,
        pie_chart_data,
    })
}

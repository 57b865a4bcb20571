//! Counts of transactions per price range for a month.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Month;

use crate::{Error, db::get_count};

/// A price range in the histogram.
///
/// A bucket covers every price above the previous bucket's upper bound, up to
/// and including its own `upper` bound. The first bucket starts at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBucket {
    /// The label shown for the bucket.
    pub label: &'static str,
    /// The largest price in the bucket, inclusive.
    pub upper: f64,
}

/// The histogram's price ranges, sorted by strictly increasing upper bound.
///
/// Prices on a boundary belong to the lower bucket, e.g. 100 is in "0 - 100"
/// while 100.5 is in "101 - 200".
pub const PRICE_BUCKETS: [PriceBucket; 10] = [
    PriceBucket { label: "0 - 100", upper: 100.0 },
    PriceBucket { label: "101 - 200", upper: 200.0 },
    PriceBucket { label: "201 - 300", upper: 300.0 },
    PriceBucket { label: "301 - 400", upper: 400.0 },
    PriceBucket { label: "401 - 500", upper: 500.0 },
    PriceBucket { label: "501 - 600", upper: 600.0 },
    PriceBucket { label: "601 - 700", upper: 700.0 },
    PriceBucket { label: "701 - 800", upper: 800.0 },
    PriceBucket { label: "801 - 900", upper: 900.0 },
    PriceBucket { label: "901 - above", upper: f64::INFINITY },
];

/// The number of transactions in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    /// The bucket's label.
    pub label: String,
    /// How many transactions fall in the bucket.
    pub count: u64,
}

/// The price histogram for a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceHistogram {
    /// One entry per bucket in [PRICE_BUCKETS] order, including empty buckets.
    pub buckets: Vec<BucketCount>,
    /// Transactions whose price fits no bucket.
    pub unclassified: u64,
}

impl PriceHistogram {
    /// The number of transactions counted, classified or not.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count).sum::<u64>() + self.unclassified
    }
}

/// A SQL expression giving the index in [PRICE_BUCKETS] of the `price` column.
///
/// Evaluates to NULL for negative prices and prices above every bound.
fn bucket_index_sql() -> String {
    let mut sql = String::from("CASE WHEN price < 0 THEN NULL");

    for (index, bucket) in PRICE_BUCKETS.iter().enumerate() {
        if bucket.upper.is_finite() {
            sql.push_str(&format!(" WHEN price <= {} THEN {index}", bucket.upper));
        } else {
            sql.push_str(&format!(" ELSE {index}"));
            break;
        }
    }

    sql.push_str(" END");
    sql
}

/// Build the price histogram for the transactions in `month`.
///
/// Prices are classified and counted by the database in one grouped query.
///
/// # Errors
/// Returns a:
/// - [Error::NoDataForMonth] if there are no transactions in `month`,
/// - or [Error::SqlError] if the query fails.
pub fn get_price_histogram(month: Month, connection: &Connection) -> Result<PriceHistogram, Error> {
    let rows = connection
        .prepare_cached(&format!(
            "SELECT {} AS bucket, COUNT(id) FROM \"transaction\"
             WHERE month_of_sale = ?1
             GROUP BY bucket",
            bucket_index_sql()
        ))?
        .query_map([month as u8], |row| {
            Ok((row.get::<_, Option<i64>>(0)?, get_count(row, 1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Err(Error::NoDataForMonth(month));
    }

    let mut counts = [0u64; PRICE_BUCKETS.len()];
    let mut unclassified = 0;

    for (bucket, count) in rows {
        match bucket
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < counts.len())
        {
            Some(index) => counts[index] += count,
            None => unclassified += count,
        }
    }

    if unclassified > 0 {
        tracing::warn!(
            "{unclassified} transactions in {month} have prices outside of every histogram bucket"
        );
    }

    let buckets = PRICE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount {
            label: bucket.label.to_owned(),
            count,
        })
        .collect();

    Ok(PriceHistogram {
        buckets,
        unclassified,
    })
}

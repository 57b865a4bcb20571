//! Sales dashboard is a JSON API over a month-scoped collection of product
//! sale transactions.
//!
//! For a given month the API returns a searchable, paginated list of
//! transactions and a set of derived statistics: total sales, sold and unsold
//! counts, a price histogram and a per-category breakdown.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Month;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod logging;
mod month;
mod pagination;
mod response;
mod routing;
mod statistics;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::parse_month;
pub use pagination::{Page, PaginationConfig};
pub use routing::build_router;
pub use statistics::{
    BucketCount, CategoryCount, MonthlyStatistics, PRICE_BUCKETS, PriceBucket, PriceHistogram,
    SaleStatistics, get_category_counts, get_monthly_statistics, get_price_histogram,
    get_sale_statistics,
};
pub use transaction::{
    Category, DEFAULT_FEED_URL, FeedClient, Transaction, TransactionBuilder, TransactionQuery,
    count_transactions, create_transaction, parse_feed, replace_all_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("could not listen for ctrl+c: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("could not install SIGTERM handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The month parameter was not an integer from 1 to 12.
    ///
    /// Detected before the database is touched.
    #[error("invalid month parameter \"{0}\", expected an integer from 1 to 12")]
    InvalidMonth(String),

    /// A month-scoped aggregation found no transactions.
    ///
    /// This is a successful query that legitimately found nothing, as opposed
    /// to [Error::SqlError] where the database could not be queried.
    #[error("no transactions found for {0}")]
    NoDataForMonth(Month),

    /// A category string outside of the closed set of product categories.
    #[error("\"{0}\" is not a valid product category")]
    InvalidCategory(String),

    /// A price that is negative, infinite or NaN.
    #[error("{0} is not a valid price, prices must be finite and non-negative")]
    InvalidPrice(f64),

    /// The transaction feed could not be fetched or decoded.
    #[error("could not load the transaction feed: {0}")]
    FeedUnavailable(String),

    /// An unhandled/unexpected SQL error.
    ///
    /// Route handlers log these where they occur, so the response only
    /// carries a generic message.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::SqlError(value)
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidMonth(_) => StatusCode::BAD_REQUEST,
            Error::NoDataForMonth(_) => StatusCode::NOT_FOUND,
            Error::InvalidCategory(_) | Error::InvalidPrice(_) | Error::FeedUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::SqlError(_) | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match &self {
            Error::SqlError(_) | Error::DatabaseLockError => {
                "Something went wrong, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (
            status_code,
            Json(response::ErrorBody::new(status_code, message)),
        )
            .into_response()
    }
}

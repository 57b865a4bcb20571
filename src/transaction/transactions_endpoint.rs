//! Defines the route handler for listing the transactions in a month.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    month::parse_month,
    pagination::{Page, PaginationConfig},
    response::ApiResponse,
};

use super::query::TransactionQuery;

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls page sizes.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string for the transactions list.
///
/// Values are kept as text so that malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsParams {
    /// The 1-indexed page number.
    pub page: Option<String>,
    /// The page size.
    pub limit: Option<String>,
    /// Free text to search titles, descriptions and prices for.
    pub search: Option<String>,
}

/// Route handler that returns a page of the transactions sold in a month.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Path(month): Path<String>,
    Query(params): Query<TransactionsParams>,
) -> Result<Response, Error> {
    let month = parse_month(&month)?;
    let page = Page::from_raw(
        params.page.as_deref(),
        params.limit.as_deref(),
        &state.pagination_config,
    );

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = TransactionQuery::new(month)
        .search(params.search.as_deref())
        .paginate(page)
        .execute(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions for {month}: {error}"))?;

    Ok(ApiResponse::list(transactions).into_response())
}

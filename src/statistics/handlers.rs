//! Statistics HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, month::parse_month, response::ApiResponse};

use super::get_monthly_statistics;

/// The state needed for computing statistics.
#[derive(Debug, Clone)]
pub struct StatisticsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatisticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler that returns every statistic for a month.
pub async fn get_statistics_endpoint(
    State(state): State<StatisticsState>,
    Path(month): Path<String>,
) -> Result<Response, Error> {
    let month = parse_month(&month)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let statistics = get_monthly_statistics(month, &connection).inspect_err(|error| match error {
        Error::NoDataForMonth(_) => tracing::debug!("{error}"),
        error => tracing::error!("could not compute statistics for {month}: {error}"),
    })?;

    Ok(ApiResponse::new(statistics).into_response())
}

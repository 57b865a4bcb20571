//! Defines the route handler that reloads the database from the product feed.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, response::ApiResponse};

use super::seed::{FeedClient, replace_all_transactions};

/// The state needed for reloading the database.
#[derive(Debug, Clone)]
pub struct PopulateState {
    /// The database connection for replacing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The client for the product feed.
    pub feed_client: FeedClient,
}

impl FromRef<AppState> for PopulateState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            feed_client: state.feed_client.clone(),
        }
    }
}

/// The result of reloading the database.
#[derive(Debug, Serialize, Deserialize)]
pub struct PopulateSummary {
    /// A human readable confirmation.
    pub message: String,
    /// The number of transactions now in the database.
    pub inserted: usize,
}

/// Route handler that replaces every transaction with the contents of the feed.
///
/// The feed is downloaded before the database is locked, so requests for
/// statistics are only blocked while the new rows are written.
pub async fn populate_database_endpoint(
    State(state): State<PopulateState>,
) -> Result<Response, Error> {
    let builders = state
        .feed_client
        .fetch()
        .await
        .inspect_err(|error| tracing::error!("could not fetch the transaction feed: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let inserted = replace_all_transactions(builders, &connection)
        .inspect_err(|error| tracing::error!("could not replace transactions: {error}"))?;

    Ok(ApiResponse::new(PopulateSummary {
        message: "Database populated successfully!".to_owned(),
        inserted,
    })
    .into_response())
}

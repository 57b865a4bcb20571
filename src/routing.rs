//! Application router configuration.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    AppState, endpoints,
    response::ErrorBody,
    statistics::get_statistics_endpoint,
    transaction::{get_transactions_endpoint, populate_database_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::POPULATE_DATABASE,
            get(populate_database_endpoint).post(populate_database_endpoint),
        )
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found(uri: Uri) -> Response {
    let path = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or_else(|| uri.path());

    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(
            StatusCode::NOT_FOUND,
            format!("Can't find {path} on this server!"),
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;
    use time::macros::datetime;

    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
        pagination::PaginationConfig,
        transaction::{Category, FeedClient, Transaction, create_transaction},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            PaginationConfig::default(),
            FeedClient::new("http://127.0.0.1:9/feed.json", Duration::from_millis(100)).unwrap(),
        )
        .expect("Could not create app state");

        create_transaction(
            Transaction::build(
                "Electric Kettle",
                123.0,
                Category::Electronics,
                datetime!(2022-05-01 12:00 UTC),
            ),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn routes_transactions_and_statistics() {
        let server = get_test_server();

        server
            .get(&format_endpoint(endpoints::TRANSACTIONS, 5))
            .await
            .assert_status_ok();
        server
            .get(&format_endpoint(endpoints::STATISTICS, 5))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn populate_route_is_not_a_month() {
        let server = get_test_server();

        // The feed is unreachable, so the route reports a gateway error rather
        // than treating "populateDatabase" as an invalid month.
        let response = server.get(endpoints::POPULATE_DATABASE).await;

        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/v1/nope").await;

        response.assert_status_not_found();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Can't find /api/v1/nope on this server!");
    }

    #[tokio::test]
    async fn not_found_message_keeps_query() {
        let server = get_test_server();

        let response = server
            .get("/api/v1/nope")
            .add_query_param("page", 2)
            .await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<Value>()["message"],
            "Can't find /api/v1/nope?page=2 on this server!"
        );
    }
}

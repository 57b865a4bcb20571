//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{month}', use [format_endpoint].

/// The route for listing the transactions in a month.
pub const TRANSACTIONS: &str = "/api/v1/transactions/{month}";
/// The route for the combined statistics of a month.
pub const STATISTICS: &str = "/api/v1/transactions/statistics/{month}";
/// The route that replaces all transactions with the contents of the feed.
pub const POPULATE_DATABASE: &str = "/api/v1/transactions/populateDatabase";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/transactions/{month}', '{month}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

//! The JSON envelopes shared by every API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The body of a successful response.
///
/// `results` is only set for list payloads, where it holds the number of items in `data`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    /// Always "success".
    pub status: String,
    /// The number of items in `data`, for list payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    /// The payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` in a success envelope.
    pub fn new(data: T) -> Self {
        Self {
            status: "success".to_owned(),
            results: None,
            data,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wrap a list in a success envelope with the `results` count filled in.
    pub fn list(data: Vec<T>) -> Self {
        Self {
            status: "success".to_owned(),
            results: Some(data.len()),
            data,
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// The body of an error response.
///
/// `status` is "fail" for client errors and "error" for server errors.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status_code: StatusCode, message: String) -> Self {
        let status = if status_code.is_client_error() {
            "fail"
        } else {
            "error"
        };

        Self {
            status: status.to_owned(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{ApiResponse, ErrorBody};

    #[test]
    fn list_sets_results_count() {
        let response = ApiResponse::list(vec![1, 2, 3]);

        assert_eq!(response.results, Some(3));
        assert_eq!(response.status, "success");
    }

    #[test]
    fn single_payload_omits_results() {
        let json = serde_json::to_value(ApiResponse::new("hello")).unwrap();

        assert!(json.get("results").is_none(), "got {json}");
        assert_eq!(json["data"], "hello");
    }

    #[test]
    fn error_status_depends_on_status_code() {
        assert_eq!(
            ErrorBody::new(StatusCode::NOT_FOUND, String::new()).status,
            "fail"
        );
        assert_eq!(
            ErrorBody::new(StatusCode::BAD_GATEWAY, String::new()).status,
            "error"
        );
    }
}

use axum::response::IntoResponse;
use axum::{body::Body, http::StatusCode, response::Response};
use serde::Serialize;

/// Pre-serialized JSON response body.
#[derive(Debug)]
pub struct JsonResponse {
    pub status_code: StatusCode,
    pub data: String,
}

impl JsonResponse {
    pub fn json<T: Serialize>(data: &T) -> Self {
        Self::json_with_status(StatusCode::OK, data)
    }

    pub fn json_with_status<T: Serialize>(status_code: StatusCode, data: &T) -> Self {
        JsonResponse {
            status_code,
            // Wire DTOs serialize infallibly
            data: serde_json::to_string(data).unwrap(),
        }
    }
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> Response<Body> {
        Response::builder()
            .status(self.status_code)
            .header("Content-Type", "application/json")
            .body(Body::from(self.data))
            .unwrap()
    }
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ledgerbus_core::BusError;

pub fn bus_error_to_response(err: BusError) -> axum::response::Response {
    match err {
        BusError::Closed => json_error(StatusCode::SERVICE_UNAVAILABLE, "bus_closed", err.to_string()),
        BusError::Serialization(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "serialization_error", msg)
        }
        BusError::WriteAborted(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "write_aborted", msg)
        }
        BusError::Poisoned(what) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            format!("{what} unavailable"),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Slice one stream of the ledger. Unknown streams read as empty.
pub async fn read_stream(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    Query(query): Query<dto::ReadStreamQuery>,
) -> axum::response::Response {
    let position = query.position();

    match services.read(&name, position, query.limit()) {
        Ok(events) => Json(dto::StreamPage {
            stream: name,
            position,
            events,
        })
        .into_response(),
        Err(e) => errors::bus_error_to_response(e),
    }
}

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use ledgerbus_events::new_event_metadata;
use ledgerbus_feedback::Feedback;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TraceContext;

/// Publish submitted feedback as a `SentFeedback` event on the feedback
/// stream.
pub async fn publish_feedback(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(trace): Extension<TraceContext>,
    Json(body): Json<Feedback>,
) -> axum::response::Response {
    let stream = services.stream();

    let mut metadata = new_event_metadata().with_origin_stream_name(stream);
    if let Some(trace_id) = trace.trace_id() {
        metadata = metadata.with_trace_id(trace_id);
    }

    let event = match body.to_event() {
        Ok(event) => event.with_metadata(metadata),
        Err(e) => return errors::bus_error_to_response(e),
    };

    let receipt = match services.write(stream, event).await {
        Ok(receipt) => receipt,
        Err(e) => return errors::bus_error_to_response(e),
    };

    info!(
        stream,
        transaction_id = %receipt.transaction_id,
        global_sequence_id = receipt.global_sequence_id,
        "feedback published"
    );

    (
        StatusCode::CREATED,
        Json(dto::FeedbackCreated {
            status: "created",
            data: body,
            receipt,
        }),
    )
        .into_response()
}

/// What the feedback service has applied so far.
pub async fn feedback_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let feedback = services.feedback();

    Json(dto::FeedbackSummary {
        stream: services.stream().to_string(),
        applied: feedback.applied_count(),
        last: feedback.last_feedback(),
    })
    .into_response()
}

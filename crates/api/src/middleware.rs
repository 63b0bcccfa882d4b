use axum::{
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};

use crate::context::TraceContext;

/// Request header carrying a client-supplied trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Attach a [`TraceContext`] to every request and echo the trace id back.
pub async fn trace_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let trace = TraceContext::new(extract_trace_id(req.headers()));
    let echoed = req.headers().get(TRACE_ID_HEADER).cloned();

    req.extensions_mut().insert(trace);
    let mut res = next.run(req).await;

    if let Some(value) = echoed {
        res.headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }
    res
}

fn extract_trace_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(TRACE_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn trace_id_is_trimmed_and_optional() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_trace_id(&headers), None);

        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("  t-1 "));
        assert_eq!(extract_trace_id(&headers).as_deref(), Some("t-1"));

        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(extract_trace_id(&headers), None);
    }
}

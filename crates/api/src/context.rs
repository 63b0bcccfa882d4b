/// Correlation context for a request.
///
/// Inserted by the trace middleware on every request; the trace id is absent
/// when the client sent no usable `x-trace-id` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: Option<String>) -> Self {
        Self { trace_id }
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

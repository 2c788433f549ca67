use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-request context threaded through every store and agent call.
///
/// Cloning shares the cancellation token, so cancelling any clone stops the
/// request's in-flight streaming.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Explicit cancel signal; streaming stops at the next event boundary.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

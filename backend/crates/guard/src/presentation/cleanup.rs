//! Deferred Context Cleanup
//!
//! The audit context for a request lives until its response body is dropped,
//! i.e. after the last frame has been written or the connection went away.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use audit::AuditContextStore;
use axum::body::{Body, Bytes};
use http_body::{Frame, SizeHint};
use kernel::id::RequestId;

/// Clears one request context when dropped
pub struct ContextCleanup {
    store: Arc<dyn AuditContextStore>,
    request_id: RequestId,
}

impl ContextCleanup {
    pub fn new(store: Arc<dyn AuditContextStore>, request_id: RequestId) -> Self {
        Self { store, request_id }
    }
}

impl Drop for ContextCleanup {
    fn drop(&mut self) {
        if self.store.clear(&self.request_id) {
            tracing::debug!(request_id = %self.request_id, "Cleared request context");
        }
    }
}

/// Response body that owns a [`ContextCleanup`]
pub struct CleanupBody {
    inner: Body,
    _cleanup: ContextCleanup,
}

impl CleanupBody {
    pub fn wrap(inner: Body, cleanup: ContextCleanup) -> Body {
        Body::new(Self {
            inner,
            _cleanup: cleanup,
        })
    }
}

impl http_body::Body for CleanupBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.get_mut().inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

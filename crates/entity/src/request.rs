//! Resetting a request without a native clone.
//!
//! [`reset`] rebuilds a request from the configuration of an existing one:
//! method, URI, version, headers and extensions are copied and the body is
//! replayed. The original request is left as it was and can be used, or
//! dropped, independently of the fresh one.

use bytes::Bytes;
use http::Request;
use tracing::debug;

use crate::entity::Entity;
use crate::EntityError;

/// A body that can hand out an unconsumed copy of itself.
pub trait ReplayBody: Sized {
    /// Returns `None` when the body can not be produced a second time.
    fn replay(&self) -> Option<Self>;
}

impl ReplayBody for Entity {
    fn replay(&self) -> Option<Self> {
        self.try_clone()
    }
}

impl ReplayBody for () {
    fn replay(&self) -> Option<Self> {
        Some(())
    }
}

impl ReplayBody for Bytes {
    fn replay(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ReplayBody for String {
    fn replay(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ReplayBody for Vec<u8> {
    fn replay(&self) -> Option<Self> {
        Some(self.clone())
    }
}

/// Builds a fresh, independently mutable copy of `request`.
///
/// Fails with [`EntityError::ResetUnsupported`] when the body can not be
/// replayed, e.g. a stream entity or an entity that was already consumed.
pub fn reset<B: ReplayBody>(request: &Request<B>) -> Result<Request<B>, EntityError> {
    let Some(body) = request.body().replay() else {
        return Err(EntityError::reset_unsupported("request body can not be replayed"));
    };

    let mut fresh = Request::new(body);
    *fresh.method_mut() = request.method().clone();
    *fresh.uri_mut() = request.uri().clone();
    *fresh.version_mut() = request.version();
    *fresh.headers_mut() = request.headers().clone();
    *fresh.extensions_mut() = request.extensions().clone();

    debug!(method = %request.method(), uri = %request.uri(), "reset request");
    Ok(fresh)
}

//! Application route error action wrapper
//!
//! The host's `error` action can fire more than once for the same error
//! object while it bubbles. The wrapper reports each distinct error once,
//! runs the original action first, and preserves its bubbling decision.

use std::sync::Arc;

use erraroo_core::{
    domain::RouteError,
    ports::{ApplicationRoute, RouteErrorHandler},
};
use tracing::debug;

use crate::events::CaptureHandle;

/// Remembers the last route error seen, by identity.
#[derive(Debug, Default)]
pub struct RepeatGuard {
    last: Option<Arc<RouteError>>,
}

impl RepeatGuard {
    /// Returns `true` when `error` is the same object as the previous
    /// call's. Otherwise remembers it and returns `false`.
    pub fn is_repeat(&mut self, error: &Arc<RouteError>) -> bool {
        if let Some(last) = &self.last {
            if Arc::ptr_eq(last, error) {
                return true;
            }
        }
        self.last = Some(Arc::clone(error));
        false
    }
}

/// Wraps `existing` so every distinct route error is also captured.
///
/// A repeated error returns `false` without running `existing`. Without an
/// existing action the error keeps bubbling.
pub fn wrap_error_handler(
    mut existing: Option<RouteErrorHandler>,
    handle: CaptureHandle,
) -> RouteErrorHandler {
    let mut guard = RepeatGuard::default();

    Box::new(move |error: &Arc<RouteError>| {
        if guard.is_repeat(error) {
            debug!("Route error already reported");
            return false;
        }

        let bubble = match existing.as_mut() {
            Some(handler) => handler(error),
            None => true,
        };
        handle.route_error(Arc::clone(error));
        bubble
    })
}

/// Replaces the route's error action with the capturing wrapper.
pub fn install(route: &mut dyn ApplicationRoute, handle: CaptureHandle) {
    let existing = route.take_error_handler();
    route.set_error_handler(wrap_error_handler(existing, handle));
}

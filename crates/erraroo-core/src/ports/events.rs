//! Host event ports (driving/primary ports)
//!
//! The host exposes where errors and navigation events come from; the
//! capture controller registers listeners on them during `initialize`.
//!
//! ## Design Notes
//!
//! - Listeners are registered once and live for the process lifetime.
//! - The host's own error hook is an [`ErrorObserver`] like any other and
//!   is notified in registration order, never replaced.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{CapturedError, RouteError};

/// Failure raised by an [`ErrorObserver`].
#[derive(Debug, Clone, Error)]
pub enum ObserverError {
    /// The observer re-raised an error object
    #[error("Re-raised error: {}", .0.message.as_deref().unwrap_or("<no message>"))]
    Reraised(Arc<CapturedError>),

    /// The observer failed for another reason
    #[error("Observer failed: {0}")]
    Failed(String),
}

/// Listener for one of the host's error sources
pub type ErrorListener = Box<dyn Fn(Arc<CapturedError>) -> Result<(), ObserverError> + Send + Sync>;

/// Listener for navigation events
pub type NavigationListener = Box<dyn Fn(&NavigationEvent) + Send + Sync>;

/// Application route error action. Returns whether the error should keep
/// bubbling to the host's error state.
pub type RouteErrorHandler = Box<dyn FnMut(&Arc<RouteError>) -> bool + Send>;

/// A callback notified of every uncaught error.
pub trait ErrorObserver: Send + Sync {
    fn on_error(&self, error: &Arc<CapturedError>) -> Result<(), ObserverError>;
}

impl<F> ErrorObserver for F
where
    F: Fn(&Arc<CapturedError>) -> Result<(), ObserverError> + Send + Sync,
{
    fn on_error(&self, error: &Arc<CapturedError>) -> Result<(), ObserverError> {
        self(error)
    }
}

/// Host error sources
pub trait ErrorSources {
    /// Global uncaught-exception hook
    fn on_uncaught_error(&mut self, listener: ErrorListener);

    /// Global unhandled-promise-rejection hook
    fn on_unhandled_rejection(&mut self, listener: ErrorListener);

    /// Already-parsed errors from the stack-capture library
    fn on_stack_report(&mut self, listener: ErrorListener);
}

/// Navigation lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Fired before leaving the current route
    WillTransition { target_name: String },
    /// Fired after entering the new route
    DidTransition,
}

/// Host navigation event source
pub trait NavigationSource {
    fn subscribe(&mut self, listener: NavigationListener);
}

/// Read access to the host router
pub trait Router: Send + Sync {
    /// Name of the current route, `None` before the first transition
    fn current_route_name(&self) -> Option<String>;
}

/// The host's application route with its mutable `error` action slot
pub trait ApplicationRoute {
    /// Removes and returns the current error handler, if any
    fn take_error_handler(&mut self) -> Option<RouteErrorHandler>;

    /// Installs `handler` as the error action
    fn set_error_handler(&mut self, handler: RouteErrorHandler);
}

/// Everything `initialize` needs from the host application instance
pub trait HostApp {
    fn error_sources(&mut self) -> &mut dyn ErrorSources;

    fn navigation(&mut self) -> &mut dyn NavigationSource;

    fn router(&self) -> Arc<dyn Router>;

    /// The application route, when the host has one
    fn application_route(&mut self) -> Option<&mut dyn ApplicationRoute> {
        None
    }
}

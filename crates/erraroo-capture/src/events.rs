//! Capture events and the handle host hooks use to emit them
//!
//! Host hooks never touch controller state directly. They push events onto
//! an unbounded channel through a [`CaptureHandle`]; the controller drains
//! the channel, so diagnostic log order is the order events were observed.

use std::sync::Arc;

use erraroo_core::{
    domain::{CapturedError, RouteError},
    ports::{ErrorObserver, NavigationEvent, ObserverError},
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Where a captured error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    /// Global uncaught-exception hook
    Uncaught,
    /// Unhandled promise rejection
    Rejection,
    /// Parsed report from the stack-capture library
    StackReport,
}

impl std::fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorSource::Uncaught => "uncaught",
            ErrorSource::Rejection => "rejection",
            ErrorSource::StackReport => "stack_report",
        };
        write!(f, "{}", s)
    }
}

/// Something the controller must process
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    Error {
        source: ErrorSource,
        error: Arc<CapturedError>,
    },
    RouteError(Arc<RouteError>),
    Navigation(NavigationEvent),
}

/// Cloneable sender side handed to host hooks.
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    tx: mpsc::UnboundedSender<CaptureEvent>,
}

impl CaptureHandle {
    /// Creates a handle and the receiver the controller drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CaptureEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn capture(&self, source: ErrorSource, error: Arc<CapturedError>) {
        self.dispatch(CaptureEvent::Error { source, error });
    }

    pub fn route_error(&self, error: Arc<RouteError>) {
        self.dispatch(CaptureEvent::RouteError(error));
    }

    pub fn navigation(&self, event: NavigationEvent) {
        self.dispatch(CaptureEvent::Navigation(event));
    }

    fn dispatch(&self, event: CaptureEvent) {
        if self.tx.send(event).is_err() {
            debug!("Capture controller stopped, event dropped");
        }
    }
}

/// Host error observers, notified in registration order.
#[derive(Clone)]
pub struct ObserverChain {
    observers: Arc<[Arc<dyn ErrorObserver>]>,
}

impl ObserverChain {
    pub fn new(observers: Vec<Arc<dyn ErrorObserver>>) -> Self {
        Self {
            observers: observers.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notifies every observer of `error`.
    ///
    /// An observer re-raising `error` itself is swallowed. Any other
    /// failure does not stop the remaining observers; the first one is
    /// returned once all have run.
    pub fn notify(&self, error: &Arc<CapturedError>) -> Result<(), ObserverError> {
        let mut first_failure = None;

        for observer in self.observers.iter() {
            match observer.on_error(error) {
                Ok(()) => {}
                Err(ObserverError::Reraised(raised)) if Arc::ptr_eq(&raised, error) => {
                    debug!("Observer re-raised the captured error, ignoring");
                }
                Err(e) => {
                    warn!(error = %e, "Error observer failed");
                    first_failure.get_or_insert(e);
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ObserverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverChain")
            .field("observers", &self.observers.len())
            .finish()
    }
}

//! Erraroo Capture - Orchestration of the error reporting pipeline
//!
//! The [`CaptureController`] activates once against the host environment,
//! subscribes to the host's error and navigation sources, and turns every
//! captured error into a `js.error` report carrying the recent diagnostic
//! log.
//!
//! ## Flow
//!
//! ```text
//! host hooks ──→ CaptureHandle ──→ mpsc ──→ CaptureController ──→ ReportingClient
//!                                               │
//!                                           LogBuffer
//! ```

pub mod controller;
pub mod events;
pub mod route;
pub mod timing;

pub use controller::{CaptureController, ControllerState};
pub use events::{CaptureEvent, CaptureHandle, ErrorSource, ObserverChain};
pub use route::{wrap_error_handler, RepeatGuard};
pub use timing::{schedule_timing_report, TIMING_DELAY};

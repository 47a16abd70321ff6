//! Domain types for the error reporting pipeline
//!
//! - Stack frame normalization
//! - Captured errors and their normalized report form
//! - Route-transition failures
//! - The rolling diagnostic log
//! - Session identity
//! - Domain-specific error types

pub mod error_report;
pub mod errors;
pub mod frame;
pub mod log;
pub mod route_error;
pub mod session;

pub use error_report::{normalize_error, CapturedError, ErrorReport};
pub use errors::DomainError;
pub use frame::{normalize_frame, normalize_stack, RawFrame, StackFrame};
pub use log::{LogBuffer, LogEntry, LogLevel, MAX_LOG_SIZE};
pub use route_error::{AdapterError, RouteError, ADAPTER_FAILURE_MESSAGE};
pub use session::SessionId;

//! Erraroo Telemetry - Report assembly and delivery
//!
//! Provides:
//! - `ReportingClient`: Wraps payloads in the wire envelope and delivers them
//! - `HttpTransport`: reqwest-backed delivery to the collection endpoint
//! - `ErrorPayload`: The `js.error` request body
//! - `SystemContext`: Host metadata for native (non-browser) processes

pub mod client;
pub mod error;
pub mod payload;
pub mod system;
pub mod transport;

pub use client::ReportingClient;
pub use error::TelemetryError;
pub use payload::ErrorPayload;
pub use system::SystemContext;
pub use transport::HttpTransport;

//! Port definitions (hexagonal architecture interfaces)
//!
//! ## Ports Overview
//!
//! - [`ReportTransport`] - Delivery of report envelopes
//! - [`HostContext`] / [`TimingSource`] - Host metadata read for reports
//! - [`ErrorSources`], [`NavigationSource`], [`Router`], [`ApplicationRoute`] -
//!   Host event sources the capture controller subscribes to

pub mod events;
pub mod host;
pub mod transport;

pub use events::{
    ApplicationRoute, ErrorListener, ErrorObserver, ErrorSources, HostApp, NavigationEvent,
    NavigationListener, NavigationSource, ObserverError, RouteErrorHandler, Router,
};
pub use host::{
    normalized_plugins, HostContext, LibraryInfo, Plugin, PluginInfo, StaticHostContext,
    TimingSource,
};
pub use transport::{ClientInfo, ReportEnvelope, ReportKind, ReportTransport, CLIENT_NAME};

//! Capture controller
//!
//! Owns the diagnostic log and the reporting client. Activation runs once
//! against the host environment; installation subscribes to the host's
//! error and navigation sources. Everything the hooks observe arrives here
//! as [`CaptureEvent`]s and is processed by a single writer.
//!
//! ## States
//!
//! ```text
//! Uninitialized ──before_initialize──→ Armed ──initialize──→ Installed
//!       │
//!       └──→ Gated (no config, no token, invalid, or disabled)
//! ```

use std::{sync::Arc, time::Duration};

use erraroo_core::{
    config::{HostEnvironment, ReporterConfig},
    domain::{normalize_error, CapturedError, LogBuffer, LogEntry, LogLevel, RouteError, SessionId},
    gate::{self, CaptureSettings},
    ports::{
        ErrorObserver, HostApp, HostContext, NavigationEvent, ReportKind, ReportTransport, Router,
        TimingSource,
    },
};
use erraroo_telemetry::{ErrorPayload, HttpTransport, ReportingClient};
use serde_json::{json, Value};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    events::{CaptureEvent, CaptureHandle, ErrorSource, ObserverChain},
    route,
    timing::{schedule_timing_report, TIMING_DELAY},
};

/// Route name logged before the first transition
const ROOT_ROUTE: &str = "root";

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Activation has not run
    Uninitialized,
    /// Activation ran but capture is off
    Gated,
    /// Activation succeeded with capture enabled
    Armed,
    /// Listeners are subscribed
    Installed,
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ControllerState::Uninitialized => "uninitialized",
            ControllerState::Gated => "gated",
            ControllerState::Armed => "armed",
            ControllerState::Installed => "installed",
        };
        write!(f, "{}", s)
    }
}

/// Orchestrates capture, logging and delivery for one host application.
pub struct CaptureController {
    state: ControllerState,
    config: Option<ReporterConfig>,
    capture: Option<CaptureSettings>,
    logs: LogBuffer,
    host: Arc<dyn HostContext>,
    transport: Option<Arc<dyn ReportTransport>>,
    client: Option<ReportingClient>,
    router: Option<Arc<dyn Router>>,
    observers: Vec<Arc<dyn ErrorObserver>>,
    timing: Option<Arc<dyn TimingSource>>,
    timing_delay: Duration,
    timing_task: Option<JoinHandle<()>>,
    events: Option<mpsc::UnboundedReceiver<CaptureEvent>>,
}

impl CaptureController {
    /// Creates a controller around an injected log buffer and host context.
    pub fn new(logs: LogBuffer, host: Arc<dyn HostContext>) -> Self {
        Self {
            state: ControllerState::Uninitialized,
            config: None,
            capture: None,
            logs,
            host,
            transport: None,
            client: None,
            router: None,
            observers: Vec::new(),
            timing: None,
            timing_delay: TIMING_DELAY,
            timing_task: None,
            events: None,
        }
    }

    /// Delivers reports through `transport` instead of HTTP.
    pub fn with_transport(mut self, transport: Arc<dyn ReportTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Source of page timing data for the delayed `js.timing` report.
    pub fn with_timing_source(mut self, source: Arc<dyn TimingSource>) -> Self {
        self.timing = Some(source);
        self
    }

    pub fn with_timing_delay(mut self, delay: Duration) -> Self {
        self.timing_delay = delay;
        self
    }

    /// Registers a host error observer.
    ///
    /// Observers are notified after the error is captured, in registration
    /// order. Only observers registered before [`initialize`] take part.
    ///
    /// [`initialize`]: CaptureController::initialize
    pub fn register_observer(&mut self, observer: Arc<dyn ErrorObserver>) {
        if self.state == ControllerState::Installed {
            warn!("Error observer registered after installation, ignored");
            return;
        }
        self.observers.push(observer);
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Configuration resolved at activation
    pub fn config(&self) -> Option<&ReporterConfig> {
        self.config.as_ref()
    }

    pub fn capture_settings(&self) -> Option<CaptureSettings> {
        self.capture
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.client.as_ref().map(ReportingClient::session)
    }

    /// Current diagnostic log, oldest first
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.snapshot()
    }

    /// Takes the pending timing report task, if one was scheduled.
    pub fn take_timing_task(&mut self) -> Option<JoinHandle<()>> {
        self.timing_task.take()
    }

    /// Activation hook. Runs once, before the application boots.
    pub fn before_initialize(&mut self, env: &HostEnvironment) -> ControllerState {
        if self.state != ControllerState::Uninitialized {
            warn!(state = %self.state, "Erraroo already activated");
            return self.state;
        }

        let Some(activation) = gate::activate_or_warn(env) else {
            self.state = ControllerState::Gated;
            return self.state;
        };

        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(HttpTransport::from_config(&activation.config)),
        };
        self.client = Some(ReportingClient::new(&activation.config, activation.session_id(), transport));

        self.state = if activation.is_enabled() {
            ControllerState::Armed
        } else {
            info!(environment = %env.environment, "Erraroo disabled outside production");
            ControllerState::Gated
        };
        self.capture = Some(activation.capture);
        self.config = Some(activation.config);
        self.state
    }

    /// Instance hook. Subscribes to the host's sources when armed.
    ///
    /// Returns the handle the hooks emit through, or `None` when capture
    /// is not armed.
    pub fn initialize(&mut self, app: &mut dyn HostApp) -> Option<CaptureHandle> {
        if self.state != ControllerState::Armed {
            debug!(state = %self.state, "Capture not armed, skipping installation");
            return None;
        }
        let config = self.config.clone()?;

        debug!("Installing erraroo");

        let (handle, rx) = CaptureHandle::channel();
        self.events = Some(rx);
        self.router = Some(app.router());

        let chain = ObserverChain::new(self.observers.clone());
        let sources = app.error_sources();

        let uncaught = handle.clone();
        sources.on_uncaught_error(Box::new(move |err: Arc<CapturedError>| {
            uncaught.capture(ErrorSource::Uncaught, Arc::clone(&err));
            error!(message = err.message.as_deref().unwrap_or_default(), "Uncaught error");
            chain.notify(&err)
        }));

        let rejection = handle.clone();
        sources.on_unhandled_rejection(Box::new(move |err: Arc<CapturedError>| {
            rejection.capture(ErrorSource::Rejection, Arc::clone(&err));
            error!(message = err.message.as_deref().unwrap_or_default(), "Unhandled rejection");
            Ok(())
        }));

        let stack_report = handle.clone();
        sources.on_stack_report(Box::new(move |err: Arc<CapturedError>| {
            stack_report.capture(ErrorSource::StackReport, err);
            Ok(())
        }));

        let navigation = handle.clone();
        app.navigation()
            .subscribe(Box::new(move |event: &NavigationEvent| {
                navigation.navigation(event.clone())
            }));

        if config.install_route_handler {
            match app.application_route() {
                Some(application_route) => route::install(application_route, handle.clone()),
                None => debug!("Host has no application route, error action not wrapped"),
            }
        }

        if config.collect_timing_data {
            match (&self.client, &self.timing) {
                (Some(client), Some(source)) => {
                    self.timing_task = schedule_timing_report(
                        client.clone(),
                        Arc::clone(source),
                        self.timing_delay,
                    );
                }
                _ => debug!("No timing source, timing report skipped"),
            }
        }

        self.state = ControllerState::Installed;
        info!(observers = self.observers.len(), "Erraroo installed");
        Some(handle)
    }

    /// Appends `payload` to the diagnostic log.
    pub fn log(&mut self, payload: Value, level: Option<LogLevel>) -> &LogEntry {
        let debug_enabled = self.config.as_ref().is_some_and(|c| c.debug);
        let entry = self.logs.append(payload, level);
        if debug_enabled {
            debug!(level = %entry.level, payload = %entry.payload, "Erraroo log");
        }
        entry
    }

    /// Reporting client, present once activation completed
    pub fn client(&self) -> Option<&ReportingClient> {
        self.client.as_ref()
    }

    /// Logs a captured error and assembles its `js.error` payload.
    ///
    /// Errors without a message are dropped without logging.
    pub fn error_payload(&mut self, error: CapturedError) -> Option<ErrorPayload> {
        let Some(message) = error.message.clone() else {
            debug!("Captured error without message, dropped");
            return None;
        };

        self.log(
            json!({ "message": message, "event": "error" }),
            Some(LogLevel::Error),
        );

        let trace = match normalize_error(error) {
            Ok(trace) => trace,
            Err(e) => {
                debug!(error = %e, "Captured error could not be normalized");
                return None;
            }
        };

        let userdata = self.config.as_ref().and_then(|c| c.userdata.clone());
        Some(ErrorPayload::collect(
            self.host.as_ref(),
            userdata,
            trace,
            self.logs.snapshot(),
        ))
    }

    /// Reports a captured error.
    ///
    /// The error is logged, normalized, and sent as `js.error` with the
    /// current log. Returns the delivery task when a request was
    /// dispatched.
    pub fn report_error(&mut self, error: CapturedError) -> Option<JoinHandle<()>> {
        let payload = self.error_payload(error)?;

        let Some(client) = &self.client else {
            debug!("Erraroo not activated, error not sent");
            return None;
        };

        match serde_json::to_value(&payload) {
            Ok(data) => client.send(ReportKind::Error, data),
            Err(e) => {
                warn!(error = %e, "Failed to encode error report");
                None
            }
        }
    }

    /// Handles an error reaching the application route.
    ///
    /// HTTP failures are reported with their status. Adapter failures log
    /// every nested error, then report the first entry's title and detail.
    pub fn application_route_error(&mut self, error: &RouteError) -> Vec<JoinHandle<()>> {
        let mut deliveries = Vec::new();

        if let Some(report) = error.http_report() {
            deliveries.extend(self.report_error(report));
        }

        if error.is_adapter_failure() {
            for nested in &error.errors {
                match serde_json::to_value(nested) {
                    Ok(payload) => {
                        self.log(payload, Some(LogLevel::ErrorObject));
                    }
                    Err(e) => warn!(error = %e, "Failed to encode adapter error"),
                }
            }
            if let Some(report) = error.adapter_report() {
                deliveries.extend(self.report_error(report));
            }
        }

        deliveries
    }

    /// Logs the route being left and the transition target.
    pub fn will_transition(&mut self, target_name: &str) {
        let current = self.current_route_name();
        self.log(
            json!({
                "currentRouteName": current,
                "targetName": target_name,
                "event": "willTransition",
            }),
            None,
        );
    }

    /// Logs the route just entered.
    pub fn did_transition(&mut self) {
        let current = self.current_route_name();
        self.log(
            json!({ "currentRouteName": current, "event": "didTransition" }),
            None,
        );
    }

    fn current_route_name(&self) -> String {
        self.router
            .as_ref()
            .and_then(|r| r.current_route_name())
            .unwrap_or_else(|| ROOT_ROUTE.to_string())
    }

    fn handle_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Error { source, error } => {
                debug!(%source, "Processing captured error");
                self.report_error(error.as_ref().clone());
            }
            CaptureEvent::RouteError(error) => {
                self.application_route_error(&error);
            }
            CaptureEvent::Navigation(NavigationEvent::WillTransition { target_name }) => {
                self.will_transition(&target_name);
            }
            CaptureEvent::Navigation(NavigationEvent::DidTransition) => {
                self.did_transition();
            }
        }
    }

    /// Processes every event already queued. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let Some(mut rx) = self.events.take() else {
            return 0;
        };

        let mut handled = 0;
        while let Ok(event) = rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }

        self.events = Some(rx);
        handled
    }

    /// Processes events until every [`CaptureHandle`] is dropped.
    pub async fn run(&mut self) {
        let Some(mut rx) = self.events.take() else {
            warn!("Capture controller not installed, nothing to run");
            return;
        };

        while let Some(event) = rx.recv().await {
            self.handle_event(event);
        }

        debug!("All capture handles dropped, controller stopped");
    }
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("logs", &self.logs.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

//! End-to-end capture flows through the fake host

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use erraroo_capture::{CaptureController, ControllerState};
use erraroo_core::{
    config::{HostEnvironment, ReporterOptions},
    domain::{AdapterError, CapturedError, LogBuffer, LogLevel, RawFrame, RouteError},
    ports::{ErrorObserver, NavigationEvent, ObserverError, ReportKind},
};
use serde_json::json;

use crate::common::{
    activated, host_context, next_report, options, production, FakeHost, FakeRoute,
    RecordingTransport,
};

fn is_session_shaped(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    groups.iter().map(|g| g.len()).collect::<Vec<_>>() == [8, 4, 4, 4, 12]
        && groups
            .iter()
            .all(|g| g.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)))
}

#[tokio::test]
async fn test_no_configuration_sends_nothing() {
    let (mut controller, transport, _rx) = activated(&HostEnvironment::new("production"));
    let mut host = FakeHost::default();

    assert_eq!(controller.state(), ControllerState::Gated);
    assert!(controller.initialize(&mut host).is_none());
    assert_eq!(host.sources.listener_count(), 0);
    assert!(host.navigation.listeners.is_empty());

    assert!(controller.report_error(CapturedError::new("boom")).is_none());
    tokio::task::yield_now().await;
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let env = production(ReporterOptions {
        endpoint: Some("http://localhost:3000/api/v1/events".into()),
        ..ReporterOptions::default()
    });
    let (mut controller, transport, _rx) = activated(&env);

    assert_eq!(controller.state(), ControllerState::Gated);
    assert!(controller.initialize(&mut FakeHost::default()).is_none());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_development_requires_opt_in() {
    let env = HostEnvironment::new("development").with_options(options());
    let (mut controller, _transport, _rx) = activated(&env);
    let mut host = FakeHost::default();

    assert_eq!(controller.state(), ControllerState::Gated);
    assert!(controller.initialize(&mut host).is_none());
    assert_eq!(host.sources.listener_count(), 0);

    let env = HostEnvironment::new("development").with_options(ReporterOptions {
        enabled: Some(true),
        ..options()
    });
    let (controller, _transport, _rx) = activated(&env);
    assert_eq!(controller.state(), ControllerState::Armed);
}

#[tokio::test]
async fn test_production_activation_mints_session() {
    let (controller, _transport, _rx) = activated(&production(options()));

    assert_eq!(controller.state(), ControllerState::Armed);
    let config = controller.config().unwrap();
    assert!(config.enabled);

    let session = controller.session_id().unwrap().to_string();
    assert!(is_session_shaped(&session), "bad session id: {session}");

    let settings = controller.capture_settings().unwrap();
    assert!(!settings.remote_fetching);
    assert!(settings.collect_window_errors);
}

#[tokio::test]
async fn test_uncaught_error_is_reported() {
    let env = production(ReporterOptions {
        userdata: Some(json!({"user": "u-1"})),
        ..options()
    });
    let (mut controller, _transport, mut rx) = activated(&env);
    let mut host = FakeHost::default();
    let handle = controller.initialize(&mut host);

    assert!(handle.is_some());
    assert_eq!(controller.state(), ControllerState::Installed);
    assert_eq!(host.sources.listener_count(), 3);

    let error = CapturedError::new("boom")
        .with_name("TypeError")
        .with_stack(vec![
            RawFrame::new("https://app.example.com/assets/app.js", 10, 5).with_func("render"),
            RawFrame::new("https://app.example.com/assets/vendor.js", 0, 12),
            RawFrame::default(),
        ]);
    host.sources.raise_uncaught(Arc::new(error)).unwrap();
    assert_eq!(controller.process_pending(), 1);

    let envelope = next_report(&mut rx).await;
    assert_eq!(envelope.kind, ReportKind::Error);
    assert_eq!(Some(envelope.session), controller.session_id());

    let data = &envelope.data;
    assert_eq!(data["trace"]["message"], "boom");
    assert_eq!(data["trace"]["name"], "TypeError");
    assert_eq!(
        data["trace"]["stack"],
        json!([{
            "column": 5,
            "func": "render",
            "line": 10,
            "url": "https://app.example.com/assets/app.js"
        }])
    );
    assert_eq!(data["libaries"][0]["name"], "Ember");
    assert_eq!(data["useragent"], "Mozilla/5.0 (X11; Linux x86_64)");
    assert_eq!(data["url"], "https://app.example.com/posts");
    assert_eq!(data["userdata"], json!({"user": "u-1"}));

    let logs = data["logs"].as_array().unwrap();
    let last = logs.last().unwrap();
    assert_eq!(last["level"], "error");
    assert_eq!(last["payload"], json!({"message": "boom", "event": "error"}));
}

#[tokio::test]
async fn test_rejection_and_stack_reports_are_captured() {
    let (mut controller, transport, mut rx) = activated(&production(options()));
    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    host.sources.reject(Arc::new(CapturedError::new("rejected"))).unwrap();
    host.sources
        .stack_report(Arc::new(CapturedError::new("parsed")))
        .unwrap();
    assert_eq!(controller.process_pending(), 2);

    next_report(&mut rx).await;
    next_report(&mut rx).await;

    let mut messages: Vec<String> = transport
        .sent()
        .iter()
        .map(|e| e.data["trace"]["message"].as_str().unwrap().to_string())
        .collect();
    messages.sort();
    assert_eq!(messages, vec!["parsed", "rejected"]);
}

#[tokio::test]
async fn test_message_less_error_is_dropped() {
    let (mut controller, transport, _rx) = activated(&production(options()));
    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    host.sources
        .raise_uncaught(Arc::new(CapturedError::default()))
        .unwrap();
    assert_eq!(controller.process_pending(), 1);
    tokio::task::yield_now().await;

    assert!(controller.logs().is_empty());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_observers_run_in_registration_order() {
    let (mut controller, _transport, _rx) = activated(&production(options()));
    let calls = Arc::new(Mutex::new(Vec::new()));

    let first_calls = calls.clone();
    let host_hook: Arc<dyn ErrorObserver> =
        Arc::new(move |e: &Arc<CapturedError>| -> Result<(), ObserverError> {
            first_calls.lock().unwrap().push("host");
            Err(ObserverError::Reraised(Arc::clone(e)))
        });
    let second_calls = calls.clone();
    let second: Arc<dyn ErrorObserver> =
        Arc::new(move |_: &Arc<CapturedError>| -> Result<(), ObserverError> {
            second_calls.lock().unwrap().push("second");
            Ok(())
        });
    controller.register_observer(host_hook);
    controller.register_observer(second);

    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    // The host hook re-raising the same error does not escape.
    assert!(host
        .sources
        .raise_uncaught(Arc::new(CapturedError::new("boom")))
        .is_ok());
    assert_eq!(*calls.lock().unwrap(), vec!["host", "second"]);
    assert_eq!(controller.process_pending(), 1);
}

#[tokio::test]
async fn test_observer_failure_propagates_after_capture() {
    let (mut controller, _transport, mut rx) = activated(&production(options()));
    let failing: Arc<dyn ErrorObserver> =
        Arc::new(|_: &Arc<CapturedError>| -> Result<(), ObserverError> {
            Err(ObserverError::Failed("handler crashed".into()))
        });
    controller.register_observer(failing);

    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    let result = host
        .sources
        .raise_uncaught(Arc::new(CapturedError::new("boom")));
    assert!(matches!(result, Err(ObserverError::Failed(_))));

    assert_eq!(controller.process_pending(), 1);
    assert_eq!(next_report(&mut rx).await.data["trace"]["message"], "boom");
}

#[tokio::test]
async fn test_route_error_reported_once() {
    let (mut controller, transport, mut rx) = activated(&production(options()));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut host = FakeHost::with_route(FakeRoute::with_counting_handler(calls.clone(), true));
    controller.initialize(&mut host);

    let error = Arc::new(RouteError::http(500, "Internal Server Error"));
    let route = host.route.as_mut().unwrap();
    assert!(route.fire(&error));
    assert!(!route.fire(&error));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(controller.process_pending(), 1);
    let envelope = next_report(&mut rx).await;
    assert_eq!(envelope.data["trace"]["name"], "Error 500");
    assert_eq!(envelope.data["trace"]["message"], "Internal Server Error");

    tokio::task::yield_now().await;
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_route_error_below_400_not_reported() {
    let (mut controller, transport, _rx) = activated(&production(options()));
    let mut host = FakeHost::with_route(FakeRoute::default());
    controller.initialize(&mut host);

    let route = host.route.as_mut().unwrap();
    assert!(route.fire(&Arc::new(RouteError::http(302, "Found"))));
    assert_eq!(controller.process_pending(), 1);
    tokio::task::yield_now().await;

    assert!(controller.logs().is_empty());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_adapter_failure_logs_nested_errors() {
    let (mut controller, _transport, mut rx) = activated(&production(options()));
    let mut host = FakeHost::with_route(FakeRoute::default());
    controller.initialize(&mut host);

    let error = Arc::new(RouteError::adapter(vec![
        AdapterError::new("Unprocessable", "title can't be blank"),
        AdapterError::new("Unprocessable", "body is too short"),
    ]));
    host.route.as_mut().unwrap().fire(&error);
    assert_eq!(controller.process_pending(), 1);

    let envelope = next_report(&mut rx).await;
    assert_eq!(envelope.data["trace"]["name"], "Unprocessable");
    assert_eq!(envelope.data["trace"]["message"], "title can't be blank");

    let levels: Vec<LogLevel> = controller.logs().iter().map(|e| e.level).collect();
    assert_eq!(
        levels,
        vec![LogLevel::ErrorObject, LogLevel::ErrorObject, LogLevel::Error]
    );
    assert_eq!(controller.logs()[1].payload["detail"], "body is too short");
}

#[tokio::test]
async fn test_route_handler_not_installed_when_disabled() {
    let env = production(ReporterOptions {
        install_route_handler: Some(false),
        ..options()
    });
    let (mut controller, _transport, _rx) = activated(&env);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut host = FakeHost::with_route(FakeRoute::with_counting_handler(calls.clone(), false));
    controller.initialize(&mut host);

    let route = host.route.as_mut().unwrap();
    assert!(!route.fire(&Arc::new(RouteError::http(500, "oops"))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.process_pending(), 0);
}

#[tokio::test]
async fn test_navigation_is_logged() {
    let (mut controller, _transport, _rx) = activated(&production(options()));
    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    host.navigation.emit(NavigationEvent::WillTransition {
        target_name: "posts.index".into(),
    });
    host.router.enter("posts.index");
    host.navigation.emit(NavigationEvent::DidTransition);
    host.navigation.emit(NavigationEvent::WillTransition {
        target_name: "about".into(),
    });

    // Route names are read when the event is processed.
    assert_eq!(controller.process_pending(), 3);

    let payloads: Vec<_> = controller.logs().into_iter().map(|e| e.payload).collect();
    assert_eq!(
        payloads,
        vec![
            json!({"currentRouteName": "posts.index", "targetName": "posts.index", "event": "willTransition"}),
            json!({"currentRouteName": "posts.index", "event": "didTransition"}),
            json!({"currentRouteName": "posts.index", "targetName": "about", "event": "willTransition"}),
        ]
    );
}

#[tokio::test]
async fn test_log_keeps_observation_order() {
    let (mut controller, _transport, mut rx) = activated(&production(options()));
    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    host.navigation.emit(NavigationEvent::WillTransition {
        target_name: "posts".into(),
    });
    host.sources
        .raise_uncaught(Arc::new(CapturedError::new("boom")))
        .unwrap();
    host.navigation.emit(NavigationEvent::DidTransition);
    assert_eq!(controller.process_pending(), 3);

    let events: Vec<_> = controller
        .logs()
        .iter()
        .map(|e| e.payload["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(events, vec!["willTransition", "error", "didTransition"]);

    // The report carries the log as of capture time.
    let envelope = next_report(&mut rx).await;
    assert_eq!(envelope.data["logs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_log_bound_under_navigation_storm() {
    let (mut controller, _transport, _rx) = activated(&production(options()));
    let mut host = FakeHost::default();
    controller.initialize(&mut host);

    for i in 0..150 {
        host.navigation.emit(NavigationEvent::WillTransition {
            target_name: format!("route-{i}"),
        });
    }
    assert_eq!(controller.process_pending(), 150);

    let logs = controller.logs();
    assert_eq!(logs.len(), 101);
    assert_eq!(logs[0].payload["targetName"], "route-49");
    assert_eq!(logs[100].payload["targetName"], "route-149");
}

#[tokio::test]
async fn test_run_stops_when_handles_dropped() {
    let (mut controller, transport, mut rx) = activated(&production(options()));
    let mut host = FakeHost::default();
    let handle = controller.initialize(&mut host).unwrap();

    host.sources
        .raise_uncaught(Arc::new(CapturedError::new("boom")))
        .unwrap();
    drop(handle);
    drop(host);

    controller.run().await;
    next_report(&mut rx).await;

    assert_eq!(controller.logs().len(), 1);
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_injected_log_buffer_is_used() {
    let (transport, _rx) = RecordingTransport::new();
    let mut controller =
        CaptureController::new(LogBuffer::with_max_size(2), Arc::new(host_context()))
            .with_transport(transport);

    for i in 0..5 {
        controller.log(json!({ "i": i }), None);
    }
    let logs = controller.logs();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].payload["i"], 2);
}

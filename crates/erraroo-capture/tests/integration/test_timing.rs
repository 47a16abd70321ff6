//! Delayed timing report

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

use erraroo_capture::{CaptureController, TIMING_DELAY};
use erraroo_core::{
    config::ReporterOptions,
    domain::LogBuffer,
    ports::{ReportKind, TimingSource},
};
use serde_json::json;
use tokio::time::Instant;

use crate::common::{
    activated, host_context, options, production, FakeHost, FakeTiming, RecordingTransport,
};

#[tokio::test(start_paused = true)]
async fn test_timing_report_sent_after_delay() {
    let timing = Arc::new(FakeTiming::default());
    let (transport, _rx) = RecordingTransport::new();
    let mut controller = CaptureController::new(LogBuffer::new(), Arc::new(host_context()))
        .with_transport(transport.clone())
        .with_timing_source(timing.clone());
    controller.before_initialize(&production(options()));

    let start = Instant::now();
    controller.initialize(&mut FakeHost::default());
    let task = controller.take_timing_task().expect("timing task scheduled");

    tokio::time::sleep(TIMING_DELAY - Duration::from_millis(1)).await;
    assert!(transport.sent().is_empty());
    assert_eq!(timing.reads.load(Ordering::SeqCst), 0);

    task.await.unwrap();
    assert!(start.elapsed() >= TIMING_DELAY);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, ReportKind::Timing);
    assert_eq!(sent[0].data, json!({"navigationStart": 1000, "loadEventEnd": 1420}));
    assert_eq!(Some(sent[0].session), controller.session_id());
    assert_eq!(timing.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timing_delay_is_configurable() {
    let (transport, _rx) = RecordingTransport::new();
    let mut controller = CaptureController::new(LogBuffer::new(), Arc::new(host_context()))
        .with_transport(transport.clone())
        .with_timing_source(Arc::new(FakeTiming::default()))
        .with_timing_delay(Duration::from_millis(250));
    controller.before_initialize(&production(options()));

    let start = Instant::now();
    controller.initialize(&mut FakeHost::default());
    controller.take_timing_task().unwrap().await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(250));
    assert!(start.elapsed() < TIMING_DELAY);
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_timing_disabled_by_option() {
    let (transport, _rx) = RecordingTransport::new();
    let timing: Arc<dyn TimingSource> = Arc::new(FakeTiming::default());
    let mut controller = CaptureController::new(LogBuffer::new(), Arc::new(host_context()))
        .with_transport(transport)
        .with_timing_source(timing);
    controller.before_initialize(&production(ReporterOptions {
        collect_timing_data: Some(false),
        ..options()
    }));

    controller.initialize(&mut FakeHost::default());
    assert!(controller.take_timing_task().is_none());
}

#[tokio::test]
async fn test_timing_skipped_without_source() {
    let (mut controller, _transport, _rx) = activated(&production(options()));
    controller.initialize(&mut FakeHost::default());
    assert!(controller.take_timing_task().is_none());
}

//! Integration tests for watch sessions driven by the tokio timer.
//!
//! All async tests run with a paused clock so tick timing is exact.


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use obj_watch::{
    wait_for, watch, Detected, InvalidArgument, WatchConfig, WatchError, WatchOutcome,
};
use rstest::rstest;
use serde_json::json;
use tokio::time::{sleep, Instant};
use tokio_test::{assert_err, assert_ok};
use watch_target::{Document, Element, ObjectTarget};

use test_helpers::{recording_config, CountingTarget, Resolution};

#[tokio::test(start_paused = true)]
async fn test_property_set_before_second_tick_succeeds_on_second_tick() {
    let target = ObjectTarget::new();
    let (config, mut rx) = recording_config(3, 10);

    assert_ok!(watch(target.clone(), "ready", config));

    sleep(Duration::from_millis(15)).await;
    target.set("ready", true);

    let resolution = rx.recv().await.unwrap();
    assert_eq!(
        resolution,
        Resolution::Success {
            detected: Detected::Value(json!(true)),
            attempts: 2
        }
    );

    // No failure follows, and nothing else ever arrives
    sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_property_never_set_fails_after_budget() {
    let target = ObjectTarget::new();
    let (config, mut rx) = recording_config(3, 10);
    let start = Instant::now();

    assert_ok!(watch(target, "ready", config));

    let resolution = rx.recv().await.unwrap();
    assert_eq!(resolution, Resolution::Failure { attempts: 3 });

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(30), "resolved early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(40), "resolved late: {:?}", elapsed);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[tokio::test(start_paused = true)]
async fn test_failure_after_exactly_n_ticks(#[case] attempts: u32) {
    let target = CountingTarget::never();
    let (config, mut rx) = recording_config(attempts, 10);

    assert_ok!(watch(target.clone(), "missing", config));

    assert_eq!(rx.recv().await.unwrap(), Resolution::Failure { attempts });
    assert_eq!(target.lookups(), attempts);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(target.lookups(), attempts);
}

#[tokio::test(start_paused = true)]
async fn test_unlimited_attempts_keep_polling() {
    let target = CountingTarget::never();
    let (config, mut rx) = recording_config(0, 10);

    assert_ok!(watch(target.clone(), "missing", config));

    sleep(Duration::from_millis(35)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(target.lookups(), 3);

    // Timer is still active
    sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(target.lookups(), 13);
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_after_success() {
    let target = CountingTarget::present_from(4);
    let (config, mut rx) = recording_config(0, 10);

    assert_ok!(watch(target.clone(), "anything", config));

    let resolution = rx.recv().await.unwrap();
    assert_eq!(
        resolution,
        Resolution::Success {
            detected: Detected::Value(json!(4)),
            attempts: 4
        }
    );

    sleep(Duration::from_millis(200)).await;
    assert_eq!(target.lookups(), 4);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_first_tick_waits_one_delay() {
    let target = ObjectTarget::new();
    target.set("ready", 1);
    let (config, mut rx) = recording_config(0, 50);
    let start = Instant::now();

    assert_ok!(watch(target, "ready", config));
    rx.recv().await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_sub_millisecond_delay_polls() {
    let start = Instant::now();
    let outcome = wait_for(
        ObjectTarget::new(),
        "ready",
        WatchConfig::new()
            .with_attempts(3)
            .with_delay(Duration::from_micros(500)),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, WatchOutcome::Exhausted { .. }));
    assert_eq!(outcome.attempts(), 3);
    assert!(start.elapsed() >= Duration::from_micros(1500));
}

#[tokio::test(start_paused = true)]
async fn test_fractional_delay_is_not_rounded_down() {
    let target = CountingTarget::never();
    let start = Instant::now();

    let outcome = wait_for(
        target.clone(),
        "missing",
        WatchConfig::new()
            .with_attempts(3)
            .with_delay(Duration::from_micros(1900)),
    )
    .await
    .unwrap();

    let elapsed = start.elapsed();
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(target.lookups(), 3);
    assert!(elapsed >= Duration::from_micros(5700), "resolved early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(8), "resolved late: {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_unschedulable_delay_fails_synchronously() {
    let (config, mut rx) = recording_config(1, 10);

    let err = assert_err!(watch(
        ObjectTarget::new(),
        "ready",
        config.with_delay(Duration::MAX)
    ));
    assert!(matches!(err, WatchError::Configuration(_)));

    sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_target_fails_synchronously() {
    let (config, mut rx) = recording_config(1, 10);

    let err = assert_err!(watch(json!(42), "ready", config));
    assert_eq!(err.invalid_reason(), Some(InvalidArgument::TargetNotObject));

    sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_empty_selector_fails_synchronously() {
    let (config, mut rx) = recording_config(1, 10);

    let err = assert_err!(watch(ObjectTarget::new(), "", config));
    assert!(matches!(
        err,
        WatchError::InvalidArgument {
            reason: InvalidArgument::EmptySelector,
            ..
        }
    ));

    sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_watch_outside_runtime() {
    let err = assert_err!(watch(ObjectTarget::new(), "ready", WatchConfig::new()));
    assert!(matches!(err, WatchError::NoRuntime));
}

#[tokio::test(start_paused = true)]
async fn test_document_single_match_is_a_collection() {
    let doc = Document::new();
    let writer = doc.clone();
    let (config, mut rx) = recording_config(10, 10);

    assert_ok!(watch(doc, "#app", config));

    sleep(Duration::from_millis(25)).await;
    writer.append_child(Element::new("div").with_id("app"));

    match rx.recv().await.unwrap() {
        Resolution::Success {
            detected: Detected::Elements(elements),
            attempts,
        } => {
            assert_eq!(elements.len(), 1);
            assert_eq!(elements.first().and_then(|e| e.id()), Some("app"));
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected resolution: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_document_returns_every_match() {
    let doc = Document::from_elements(vec![Element::new("ul").with_id("list")]);
    doc.append_to("list", Element::new("li").with_text("a"));
    doc.append_to("list", Element::new("li").with_text("b"));

    let outcome = wait_for(doc, "#list > li", WatchConfig::new().with_delay_millis(10))
        .await
        .unwrap();

    let elements = outcome.into_detected().and_then(Detected::into_elements).unwrap();
    let texts: Vec<_> = elements.iter().filter_map(|e| e.text()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_document_never_matching_exhausts() {
    let doc = Document::from_elements(vec![Element::new("div")]);
    let (config, mut rx) = recording_config(2, 10);

    assert_ok!(watch(doc, "span", config));
    assert_eq!(rx.recv().await.unwrap(), Resolution::Failure { attempts: 2 });
}

#[tokio::test(start_paused = true)]
async fn test_debug_logging_does_not_change_outcome() {
    for debug in [false, true] {
        let target = ObjectTarget::new();
        let (config, mut rx) = recording_config(3, 10);
        let start = Instant::now();

        assert_ok!(watch(target.clone(), "ready", config.with_debug(debug)));
        sleep(Duration::from_millis(15)).await;
        target.set("ready", "on");

        let resolution = rx.recv().await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Success {
                detected: Detected::Value(json!("on")),
                attempts: 2
            }
        );
        assert_eq!(start.elapsed(), Duration::from_millis(20));
    }
}

#[tokio::test(start_paused = true)]
async fn test_sessions_on_same_target_are_independent() {
    let target = ObjectTarget::new();
    let (short, mut short_rx) = recording_config(2, 10);
    let (long, mut long_rx) = recording_config(0, 10);

    assert_ok!(watch(target.clone(), "ready", short));
    assert_ok!(watch(target.clone(), "ready", long));

    assert_eq!(short_rx.recv().await.unwrap(), Resolution::Failure { attempts: 2 });

    sleep(Duration::from_millis(15)).await;
    target.set("ready", false);

    assert_eq!(
        long_rx.recv().await.unwrap(),
        Resolution::Success {
            detected: Detected::Value(json!(false)),
            attempts: 4
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_runs_user_callbacks() {
    let target = ObjectTarget::new();
    target.set("ready", json!({ "version": 2 }));

    let called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&called);

    let outcome = wait_for(
        target,
        "ready",
        WatchConfig::new()
            .with_delay_millis(10)
            .on_found(move |_| flag.store(true, Ordering::SeqCst)),
    )
    .await
    .unwrap();

    assert!(called.load(Ordering::SeqCst));
    assert!(outcome.is_found());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(outcome.context().selector(), "ready");
    assert_eq!(
        outcome.detected().and_then(Detected::as_value),
        Some(&json!({ "version": 2 }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_exhausted() {
    let outcome = wait_for(
        ObjectTarget::new(),
        "ready",
        WatchConfig::new().with_attempts(4).with_delay_millis(10),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, WatchOutcome::Exhausted { .. }));
    assert_eq!(outcome.attempts(), 4);
    assert!(outcome.detected().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_unlimited_can_be_bounded() {
    let result = tokio::time::timeout(
        Duration::from_millis(500),
        wait_for(ObjectTarget::new(), "ready", WatchConfig::new().with_delay_millis(10)),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_rejects_invalid_arguments() {
    let err = wait_for(json!("scalar"), "ready", WatchConfig::new())
        .await
        .unwrap_err();
    assert_eq!(err.invalid_reason(), Some(InvalidArgument::TargetNotObject));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_callback_is_not_caught() {
    let target = ObjectTarget::new();
    target.set("ready", true);

    let result = wait_for(
        target,
        "ready",
        WatchConfig::new()
            .with_delay_millis(10)
            .on_success(|_, _| panic!("callback failed")),
    )
    .await;

    assert!(matches!(result, Err(WatchError::WorkerStopped)));
}

//! Dispatcher fan-out and route channel lifecycle.
//!
//! # Test Coverage
//!
//! - Non-string values never reach a route pipeline
//! - `close` is idempotent, also from inside the channel's own subscriber
//! - Closing one channel leaves siblings untouched
//! - Delivery order follows registration order

use parking_lot::Mutex;
use pathstream::Router;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn count_values(channel: &pathstream::RouteChannel) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    channel.on_value(move |_| {
        handle.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    count
}

#[test]
fn test_non_string_pushes_are_ignored() {
    let router = Router::new();
    let channel = router.route("(.*)").unwrap();
    let count = count_values(&channel);

    for value in [json!(42), json!(true), json!(null), json!({"a": 1}), json!([1])] {
        router.push(value).unwrap();
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);

    router.push(json!("/anything")).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_twice_is_harmless() {
    let router = Router::new();
    let channel = router.route("/a").unwrap();
    let sibling = router.route("/a").unwrap();
    let sibling_count = count_values(&sibling);
    let ends = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&ends);
    channel.on_end(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    });

    channel.close();
    channel.close();
    assert_eq!(router.dispatcher().forwarding_count(), 1);
    router.push("/a").unwrap();

    assert!(channel.is_closed());
    assert!(!sibling.is_closed());
    assert_eq!(ends.load(Ordering::SeqCst), 1);
    assert_eq!(sibling_count.load(Ordering::SeqCst), 1);
    assert_eq!(router.dispatcher().forwarding_count(), 1);
}

#[test]
fn test_close_from_inside_own_subscriber() {
    let router = Router::new();
    let channel = router.route("/a/:n").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let handle = channel.clone();
    let sink = Arc::clone(&seen);
    channel.on_value(move |route| {
        sink.lock().push(route.param("n").map(str::to_string));
        handle.close();
        Ok(())
    });
    let after_close = count_values(&channel);

    router.push("/a/1").unwrap();
    router.push("/a/2").unwrap();

    assert_eq!(*seen.lock(), vec![Some("1".to_string())]);
    // closed before the second subscriber's turn
    assert_eq!(after_close.load(Ordering::SeqCst), 0);
    assert!(channel.is_closed());
}

#[test]
fn test_closing_one_channel_keeps_siblings() {
    let router = Router::new();
    let first = router.route("/a").unwrap();
    let second = router.route("/a").unwrap();
    let first_count = count_values(&first);
    let second_count = count_values(&second);

    first.close();
    router.push("/a").unwrap();

    assert_eq!(first_count.load(Ordering::SeqCst), 0);
    assert_eq!(second_count.load(Ordering::SeqCst), 1);
    assert!(!second.is_closed());
}

#[test]
fn test_closing_sibling_from_callback_mid_dispatch() {
    let router = Router::new();
    let first = router.route("/a").unwrap();
    let second = router.route("/a").unwrap();
    let second_count = count_values(&second);

    let victim = second.clone();
    first.on_value(move |_| {
        victim.close();
        Ok(())
    });

    router.push("/a").unwrap();
    router.push("/a").unwrap();
    assert_eq!(second_count.load(Ordering::SeqCst), 0);
    assert_eq!(router.dispatcher().forwarding_count(), 1);
}

#[test]
fn test_registration_order() {
    let router = Router::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut channels = Vec::new();
    for name in ["one", "two", "three"] {
        let channel = router.route("/x").unwrap();
        let sink = Arc::clone(&log);
        channel.on_value(move |_| {
            sink.lock().push(name);
            Ok(())
        });
        channels.push(channel);
    }

    router.push("/x").unwrap();
    assert_eq!(*log.lock(), vec!["one", "two", "three"]);
}

#[test]
fn test_off_value_stops_delivery() {
    let router = Router::new();
    let channel = router.route("/x").unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    let id = channel.on_value(move |_| {
        handle.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    router.push("/x").unwrap();
    assert!(channel.off_value(id));
    router.push("/x").unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(channel.subscriber_count(), 0);
}

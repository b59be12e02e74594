use super::*;
use crate::config::{ConfigStore, Overrides};
use crate::error::RouteError;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(ConfigStore::default()))
}

#[test]
fn test_event_conversions() {
    assert_eq!(DispatchEvent::from("/a"), DispatchEvent::Path("/a".into()));
    assert_eq!(
        DispatchEvent::from(json!("/b")),
        DispatchEvent::Path("/b".into())
    );
    assert_eq!(DispatchEvent::from(json!(42)), DispatchEvent::Signal(json!(42)));
    assert_eq!(DispatchEvent::from(json!(null)), DispatchEvent::Signal(json!(null)));
}

#[test]
fn test_push_forwards_paths_in_order() {
    let dispatcher = dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second"] {
        let log = Arc::clone(&log);
        dispatcher.subscribe(move |path| {
            log.lock().push(format!("{tag}:{path}"));
            Ok(())
        });
    }
    dispatcher.push("/users").unwrap();
    assert_eq!(*log.lock(), vec!["first:/users", "second:/users"]);
    assert_eq!(dispatcher.forwarding_count(), 2);
}

#[test]
fn test_non_string_values_are_dropped() {
    let dispatcher = dispatcher();
    let seen = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&seen);
    dispatcher.subscribe(move |_| {
        handle.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    for value in [json!(1), json!({"path": "/x"}), json!(null), json!(["/x"])] {
        dispatcher.push(value).unwrap();
    }
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    dispatcher.push(json!("/x")).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe() {
    let dispatcher = dispatcher();
    let id = dispatcher.subscribe(|_| Ok(()));
    assert!(dispatcher.unsubscribe(id));
    assert_eq!(dispatcher.forwarding_count(), 0);
}

#[test]
fn test_error_propagates_by_default() {
    let dispatcher = dispatcher();
    let observed = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&observed);
    dispatcher.on_error(move |_| {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    dispatcher.subscribe(|_| Err(RouteError::subscriber("boom")));

    assert!(dispatcher.push("/x").is_err());
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_silent_policy_is_read_live() {
    let store = Arc::new(ConfigStore::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store));
    dispatcher.subscribe(|_| Err(RouteError::subscriber("boom")));

    assert!(dispatcher.push("/x").is_err());
    store
        .configure(&Overrides::new().silent_errors(true))
        .unwrap();
    assert!(dispatcher.push("/x").is_ok());
}

#[test]
fn test_dispatcher_policy_tracks_store() {
    let store = Arc::new(ConfigStore::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store));
    assert!(!dispatcher.policy().is_silent());

    store
        .configure(&Overrides::new().silent_errors(true))
        .unwrap();
    assert!(dispatcher.policy().is_silent());
}

#[test]
fn test_policy_override_wins() {
    let store = Arc::new(ConfigStore::default());
    let silent = ErrorPolicy::with_override(Arc::clone(&store), Some(true));
    assert!(silent.is_silent());
    assert!(silent
        .apply(Err(RouteError::subscriber("x")), "/route")
        .is_ok());

    let live = ErrorPolicy::live(store);
    assert!(!live.is_silent());
    assert!(live.apply(Err(RouteError::subscriber("x")), "/route").is_err());
}

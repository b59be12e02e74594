use super::Router;
use crate::config::Overrides;
use crate::error::RouteError;
use crate::location::ParsedRoute;
use crate::pattern::PathParams;
use parking_lot::Mutex;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn collect(channel: &super::RouteChannel) -> Arc<Mutex<Vec<ParsedRoute>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    channel.on_value(move |route| {
        sink.lock().push(route.clone());
        Ok(())
    });
    seen
}

#[test]
fn test_malformed_pattern_registers_nothing() {
    let router = Router::new();
    let err = router.route("/users/:id(").unwrap_err();
    assert!(matches!(err, RouteError::Pattern { .. }));
    assert_eq!(router.dispatcher().forwarding_count(), 0);
}

#[test]
fn test_live_base_follows_configure() {
    let router = Router::new();
    let channel = router.route("/users/:id").unwrap();
    let seen = collect(&channel);

    router.push("/app/users/1").unwrap();
    assert!(seen.lock().is_empty());

    router.configure(&Overrides::new().base("/app")).unwrap();
    router.push("/app/users/1").unwrap();
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(seen.lock()[0].param("id"), Some("1"));
}

#[test]
fn test_base_override_is_fixed() {
    let router = Router::new();
    let channel = router
        .route_with("/users/:id", &Overrides::new().base("/v2"))
        .unwrap();
    let seen = collect(&channel);

    router.configure(&Overrides::new().base("/app")).unwrap();
    router.push("/app/users/1").unwrap();
    router.push("/v2/users/2").unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].param("id"), Some("2"));
}

#[test]
fn test_hash_stage_is_opt_in() {
    let router = Router::new();
    let plain = router.route(":foo/:bar").unwrap();
    let hashed = router
        .route_with(":foo/:bar", &Overrides::new().hash(true))
        .unwrap();
    let plain_seen = collect(&plain);
    let hashed_seen = collect(&hashed);

    router.push("#foo/bar").unwrap();
    assert!(plain_seen.lock().is_empty());
    assert_eq!(hashed_seen.lock().len(), 1);
    assert_eq!(hashed_seen.lock()[0].param("bar"), Some("bar"));
}

#[test]
fn test_decode_uri_stage() {
    let router = Router::new();
    let channel = router
        .route_with("/caf\u{e9}/:item", &Overrides::new().decode_uri(true))
        .unwrap();
    let seen = collect(&channel);

    router.push("/caf%C3%A9/a%2Fb").unwrap();
    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].param("item"), Some("a/b"));
}

#[test]
fn test_decode_uri_error_goes_to_error_stream() {
    let router = Router::new();
    let channel = router
        .route_with("/:item", &Overrides::new().decode_uri(true))
        .unwrap();
    let errors = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&errors);
    channel.on_error(move |err| {
        assert!(matches!(err, RouteError::Decode { .. }));
        handle.fetch_add(1, Ordering::SeqCst);
    });

    assert!(router.push("/%zz").is_err());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[test]
fn test_silent_override_per_route() {
    let router = Router::new();
    let quiet = router
        .route_with("/a", &Overrides::new().silent_errors(true))
        .unwrap();
    quiet.on_value(|_| Err(RouteError::subscriber("quiet failure")));

    assert!(router.push("/a").is_ok());

    let loud = router.route("/b").unwrap();
    loud.on_value(|_| Err(RouteError::subscriber("loud failure")));
    assert!(router.push("/b").is_err());
}

#[test]
fn test_route_regex_positional() {
    let router = Router::new();
    let channel = router
        .route_regex(Regex::new(r"^/files/(\d+)/(.+)$").unwrap(), &Overrides::new())
        .unwrap();
    let seen = collect(&channel);

    router.push("/files/10/a%20b").unwrap();
    let seen = seen.lock();
    assert_eq!(seen[0].params.index(0), Some("10"));
    assert_eq!(seen[0].params.index(1), Some("a%20b"));
}

#[test]
fn test_to_path() {
    let router = Router::new();
    let path = router
        .to_path("/users/:id", &PathParams::new().with("id", "42"))
        .unwrap();
    assert_eq!(path, "/users/42");
    assert!(router.to_path("/users/:id", &PathParams::new()).is_err());
}

#[test]
fn test_close_unregisters() {
    let router = Router::new();
    let channel = router.route("/a").unwrap();
    let ended = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&ended);
    channel.on_end(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(router.dispatcher().forwarding_count(), 1);

    channel.close();
    channel.close();
    assert!(channel.is_closed());
    assert_eq!(router.dispatcher().forwarding_count(), 0);
    assert_eq!(ended.load(Ordering::SeqCst), 1);
}

use super::{ConfigStore, Overrides, RouteOptions};
use serde_json::json;
use std::collections::BTreeSet;

fn key_set(options: &RouteOptions) -> BTreeSet<String> {
    options.to_map().unwrap().keys().cloned().collect()
}

#[test]
fn test_merge_overlays_known_and_passes_unknown() {
    let store = ConfigStore::default();
    let overrides = Overrides::try_from(json!({ "foo": "foo", "base": "buz" })).unwrap();
    let merged = store.merge_options(&overrides).unwrap();

    assert_eq!(merged.base, "buz");
    assert_eq!(merged.extra.get("foo"), Some(&json!("foo")));
    // merge is pure
    assert_eq!(store.defaults().base, "");
}

#[test]
fn test_configure_ignores_unknown_keys() {
    let store = ConfigStore::default();
    let before = key_set(&store.defaults());

    let updated = store
        .configure(&Overrides::new().set("unknownKey", 1))
        .unwrap();

    assert_eq!(key_set(&updated), before);
    assert!(updated.extra.is_empty());
}

#[test]
fn test_configure_updates_known_keys() {
    let store = ConfigStore::default();
    store
        .configure(&Overrides::new().base("/app").silent_errors(true))
        .unwrap();

    assert_eq!(store.base(), "/app");
    assert!(store.silent_errors());
    assert!(store.defaults().end);
}

#[test]
fn test_configure_rejects_wrong_types() {
    let store = ConfigStore::default();
    let err = store
        .configure(&Overrides::new().set("strict", "yes"))
        .unwrap_err();
    assert!(err.is_construction());
    assert!(!store.defaults().strict);
}

#[test]
fn test_null_base_means_empty() {
    let store = ConfigStore::default();
    let merged = store
        .merge_options(&Overrides::try_from(json!({ "base": null })).unwrap())
        .unwrap();
    assert_eq!(merged.base, "");
}

#[test]
fn test_encoder_survives_merge() {
    let store = ConfigStore::default();
    let merged = store
        .merge_options(&Overrides::new().encode(|s| s.to_uppercase()))
        .unwrap();
    assert_eq!(merged.encode_str("abc"), "ABC");

    let plain = store.merge_options(&Overrides::new()).unwrap();
    assert_eq!(plain.encode_str("abc"), "abc");
}

#[test]
fn test_overrides_must_be_object() {
    assert!(Overrides::try_from(json!([1, 2])).is_err());
    assert!(Overrides::try_from(json!(null)).unwrap().is_empty());
}

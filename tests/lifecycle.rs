mod common;

use composable_registry::{Definition, Kind, Registry, Value};
use std::sync::Arc;

#[test]
fn test_delete_removes_entry_and_instance() {
    let counter = common::Counter::default();
    let mut registry = Registry::new();
    registry.set("service", common::counting_service(&counter));
    assert_eq!(common::get_usize(&mut registry, "service"), 1);

    registry.delete("service");
    assert!(!registry.has("service"));
    assert!(!registry.is_resolved("service"));
    assert_eq!(registry.kind("service"), None);
    assert!(registry.get("service").unwrap_err().is_not_found());

    let fresh = common::Counter::default();
    registry.set("service", common::counting_service(&fresh));
    assert_eq!(common::get_usize(&mut registry, "service"), 1);
    assert_eq!(fresh.count(), 1);
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_delete_does_not_resolve() {
    let counter = common::Counter::default();
    let mut registry = Registry::new();
    registry.set("factory", common::counting_factory(&counter));
    registry.set("service", common::counting_service(&counter));

    registry.delete("factory").delete("service");
    assert_eq!(counter.count(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_delete_missing_is_noop() {
    let mut registry = Registry::new();
    registry.set_value("kept", 1_i32);

    registry.delete("missing");
    assert_eq!(registry.len(), 1);
    assert!(registry.has("kept"));
}

#[test]
fn test_delete_instance_keeps_definition() {
    let counter = common::Counter::default();
    let mut registry = Registry::new();
    registry.set("service", common::counting_service(&counter));

    assert_eq!(common::get_usize(&mut registry, "service"), 1);
    registry.delete_instance("service");
    assert!(registry.has("service"));
    assert!(!registry.is_resolved("service"));

    assert_eq!(common::get_usize(&mut registry, "service"), 2);
    assert!(registry.is_resolved("service"));
    assert_eq!(common::get_usize(&mut registry, "service"), 2);
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_delete_all_instances() {
    let counter = common::Counter::default();
    let mut registry = Registry::new();
    registry.set("a", common::counting_service(&counter));
    registry.set("b", common::counting_service(&counter));
    registry.get("a").unwrap();
    registry.get("b").unwrap();
    assert_eq!(counter.count(), 2);

    registry.delete_all_instances();
    assert!(!registry.is_resolved("a"));
    assert!(!registry.is_resolved("b"));
    assert_eq!(registry.len(), 2);

    registry.get("a").unwrap();
    registry.get("b").unwrap();
    assert_eq!(counter.count(), 4);
}

#[test]
fn test_set_replaces_cached_instance() {
    let counter = common::Counter::default();
    let mut registry = Registry::new();
    registry.set("service", common::counting_service(&counter));
    assert_eq!(common::get_usize(&mut registry, "service"), 1);

    registry.set(
        "service",
        Definition::service(|_| Ok(Arc::new(100_usize) as Value)),
    );
    assert!(!registry.is_resolved("service"));
    assert_eq!(common::get_usize(&mut registry, "service"), 100);

    registry.set_value("service", 7_usize);
    assert_eq!(registry.kind("service"), None);
    assert_eq!(common::get_usize(&mut registry, "service"), 7);
}

#[test]
fn test_reset() {
    let counter = common::Counter::default();
    let mut registry = Registry::with_values([("seed", Arc::new(1_i32) as Value)]);
    registry.set("service", common::counting_service(&counter));
    registry.get("service").unwrap();

    registry.reset();
    assert!(registry.is_empty());
    assert!(!registry.has("seed"));
    assert!(!registry.is_resolved("service"));
    assert!(registry.keys().is_empty());
}

#[test]
fn test_seeded_values_are_plain() {
    let callable: Value = Arc::new(Definition::factory(|_| Ok(Arc::new(()) as Value)));
    let mut registry = Registry::with_values([("definition", callable.clone())]);

    assert_eq!(registry.kind("definition"), None);
    let resolved = registry.get("definition").unwrap();
    assert!(Arc::ptr_eq(&callable, &resolved));
}

#[test]
fn test_keys_and_count() {
    let mut registry = Registry::new();
    registry
        .set_value("c", 3_i32)
        .set_value("a", 1_i32)
        .set_value("b", 2_i32);
    assert_eq!(registry.keys(), ["c", "a", "b"]);
    assert_eq!(registry.len(), 3);

    // Overwriting keeps the original position.
    registry.set_value("c", 30_i32);
    assert_eq!(registry.keys(), ["c", "a", "b"]);
    assert_eq!(registry.len(), 3);

    registry.delete("a");
    assert_eq!(registry.keys(), ["c", "b"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_kind_tracks_current_definition() {
    let counter = common::Counter::default();
    let mut registry = Registry::new();
    registry.set("id", common::counting_factory(&counter));
    assert_eq!(registry.kind("id"), Some(Kind::Factory));

    registry.set("id", common::counting_service(&counter));
    assert_eq!(registry.kind("id"), Some(Kind::Service));
    assert!(registry.raw_get("id").unwrap().is_service());
    assert!(!registry.raw_get("id").unwrap().is_factory());

    registry.delete("id");
    assert_eq!(registry.kind("id"), None);
}

#[test]
fn test_service_deleting_itself_is_not_cached() {
    let mut registry = Registry::new();
    registry.set(
        "session",
        Definition::service(|registry| {
            registry.delete("session");
            Ok(Arc::new(1_usize) as Value)
        }),
    );

    assert_eq!(common::get_usize(&mut registry, "session"), 1);
    assert!(!registry.has("session"));
    assert!(!registry.is_resolved("session"));
    assert!(registry.get("session").unwrap_err().is_not_found());
}

#[test]
fn test_service_replacing_itself_is_not_cached() {
    let mut registry = Registry::new();
    registry.set(
        "session",
        Definition::service(|registry| {
            registry.set_value("session", 2_usize);
            Ok(Arc::new(1_usize) as Value)
        }),
    );

    assert_eq!(common::get_usize(&mut registry, "session"), 1);
    assert_eq!(registry.kind("session"), None);
    assert!(!registry.is_resolved("session"));
    assert_eq!(common::get_usize(&mut registry, "session"), 2);
}

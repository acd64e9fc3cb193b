#![allow(dead_code)]

use composable_registry::{Definition, Registry, Value};
use std::io::Write;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{Builder, NamedTempFile};

pub struct TestFile(NamedTempFile);

impl Deref for TestFile {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.0.path()
    }
}

pub fn create_test_file(suffix: &str, content: &str) -> TestFile {
    let mut temp_file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(temp_file, "{}", content).unwrap();
    TestFile(temp_file)
}

pub fn create_toml_test_file(content: &str) -> TestFile {
    create_test_file(".toml", content)
}

pub fn create_json_test_file(content: &str) -> TestFile {
    create_test_file(".json", content)
}

/// Shared invocation counter for resolvers.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Service that counts invocations and returns the invocation number.
pub fn counting_service(counter: &Counter) -> Definition {
    let counter = counter.clone();
    Definition::service(move |_| Ok(Arc::new(counter.bump()) as Value))
}

/// Factory that counts invocations and returns the invocation number.
pub fn counting_factory(counter: &Counter) -> Definition {
    let counter = counter.clone();
    Definition::factory(move |_| Ok(Arc::new(counter.bump()) as Value))
}

pub fn get_usize(registry: &mut Registry, id: &str) -> usize {
    *registry
        .get_as::<usize>(id)
        .unwrap_or_else(|e| panic!("get '{}' failed: {}", id, e))
}

pub fn get_json(registry: &mut Registry, id: &str) -> serde_json::Value {
    registry
        .get_as::<serde_json::Value>(id)
        .unwrap_or_else(|e| panic!("get '{}' failed: {}", id, e))
        .as_ref()
        .clone()
}

//! Shared fixtures for framebus-core integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use framebus_core::{
    ColumnData, Frame, SqliteStore, StoreBackend, StoreConfig, StoreConfigMap, StoreItem,
    StoreResult,
};
use tempfile::TempDir;

/// Store wrapper that records every label it is asked to read.
#[derive(Debug)]
pub struct CountingStore {
    inner: SqliteStore,
    reads: Mutex<Vec<String>>,
}

impl CountingStore {
    pub fn new(path: &Path) -> Self {
        Self {
            inner: SqliteStore::new(path),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }
}

impl StoreBackend for CountingStore {
    fn write(
        &self,
        items: &mut dyn Iterator<Item = StoreItem>,
        config: &StoreConfigMap,
    ) -> StoreResult<()> {
        self.inner.write(items, config)
    }

    fn read(&self, label: &str, config: &StoreConfig) -> StoreResult<Frame> {
        self.reads.lock().unwrap().push(label.to_string());
        self.inner.read(label, config)
    }

    fn labels(&self) -> StoreResult<Box<dyn Iterator<Item = String> + '_>> {
        self.inner.labels()
    }
}

/// Two-column frame named `label`, values offset by `seed`.
pub fn sample_frame(label: &str, seed: i64) -> Frame {
    Frame::from_columns([
        ("x", ColumnData::Int64(vec![seed, seed + 1, seed + 2])),
        (
            "y",
            ColumnData::Float64(vec![seed as f64 * 0.5, 1.5, 2.5]),
        ),
    ])
    .unwrap()
    .with_name(label)
}

/// SQLite file in a fresh temp dir holding one sample frame per label.
pub fn seeded_store(labels: &[&str]) -> (TempDir, Arc<CountingStore>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frames.sqlite");
    let store = CountingStore::new(&path);
    let items: Vec<(Option<String>, Frame)> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (Some(label.to_string()), sample_frame(label, i as i64 * 10)))
        .collect();
    store.write_frames(&items, &StoreConfigMap::default()).unwrap();
    (dir, Arc::new(store))
}

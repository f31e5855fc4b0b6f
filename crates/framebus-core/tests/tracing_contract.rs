//! Log capture contract: loads and evictions are reported as structured
//! `debug` events (fmt JSON), resident hits only at `trace`.

mod common;

use std::sync::{Arc, Mutex};

use common::seeded_store;
use framebus_core::{Bus, StoreBackend, StoreConfigMap};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct MockWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MockWriter {
    type Writer = MockWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn setup_capture(filter: &str) -> (MockWriter, tracing::subscriber::DefaultGuard) {
    let writer = MockWriter {
        buf: Arc::new(Mutex::new(Vec::new())),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_env_filter(EnvFilter::new(filter))
        .json()
        .finish();
    (writer, tracing::subscriber::set_default(subscriber))
}

/// `(message, label)` of every captured event.
fn events(writer: &MockWriter) -> Vec<(String, String)> {
    let output = String::from_utf8(writer.buf.lock().unwrap().clone()).unwrap();
    output
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|v| {
            let fields = v.get("fields")?;
            let message = fields.get("message")?.as_str()?.to_string();
            let label = fields
                .get("label")
                .and_then(|l| l.as_str())
                .unwrap_or_default()
                .to_string();
            Some((message, label))
        })
        .collect()
}

#[test]
fn test_load_and_evict_events() {
    let (_dir, store) = seeded_store(&["a", "b"]);
    let (writer, _guard) = setup_capture("framebus_core=debug");

    let mut bus = Bus::from_store(
        store as Arc<dyn StoreBackend>,
        StoreConfigMap::default(),
        Some(1),
    )
    .unwrap();
    bus.frame("a").unwrap();
    bus.frame("b").unwrap();
    bus.frame("b").unwrap();

    let events = events(&writer);
    let loads: Vec<&str> = events
        .iter()
        .filter(|(m, _)| m == "loaded frame from store")
        .map(|(_, l)| l.as_str())
        .collect();
    let evictions: Vec<&str> = events
        .iter()
        .filter(|(m, _)| m == "evicted frame")
        .map(|(_, l)| l.as_str())
        .collect();

    assert_eq!(loads, ["a", "b"]);
    assert_eq!(evictions, ["a"]);
    assert!(
        !events.iter().any(|(m, _)| m == "touched resident frame"),
        "resident hits must stay below debug"
    );
}

#[test]
fn test_trace_reports_resident_hits() {
    let (_dir, store) = seeded_store(&["a", "b"]);
    let (writer, _guard) = setup_capture("framebus_core=trace");

    let mut bus = Bus::from_store(
        store as Arc<dyn StoreBackend>,
        StoreConfigMap::default(),
        Some(2),
    )
    .unwrap();
    bus.frame("a").unwrap();
    bus.frame("a").unwrap();

    let touches: Vec<(String, String)> = events(&writer)
        .into_iter()
        .filter(|(m, _)| m == "touched resident frame")
        .collect();
    assert_eq!(touches, [("touched resident frame".to_string(), "a".to_string())]);
}

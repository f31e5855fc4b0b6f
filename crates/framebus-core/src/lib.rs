//! Lazy, bounded-memory container of labelled tabular frames.
//!
//! This crate provides:
//!
//! - [`Frame`]: a small columnar table with a (possibly multi-level) index
//! - [`Bus`]: an ordered label → frame mapping whose frames may live in a store
//! - LRU residency with an optional `max_resident` ceiling
//! - A SQLite [`StoreBackend`] (one table per label)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use framebus_core::{Bus, BusConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = BusConfig::load(Path::new("bus.yaml"))?;
//! let mut bus = Bus::open(Path::new("frames.sqlite"), &config)?;
//!
//! // Loads "prices" and, if a ceiling is set, evicts the least recently used frame.
//! let prices = bus.frame("prices")?;
//! println!("{:?}", prices.shape());
//!
//! for status in bus.status() {
//!     println!("{} loaded={}", status.label, status.loaded);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Residency
//!
//! | `max_resident` | Behavior |
//! |----------------|----------|
//! | absent | frames stay resident once loaded |
//! | `n` | at most `n` frames resident after every individual load |

pub mod bus;
pub mod config;
pub mod error;
pub mod frame;
pub mod labels;
pub mod lru;
pub mod slot;
pub mod store;

pub use bus::{Bus, BusItems, BusStatus, ILoc, Loc, Selected};
pub use config::{BusConfig, StoreConfig, StoreConfigMap};
pub use error::{BusError, BusResult, FrameError, FrameResult, StoreError, StoreResult};
pub use frame::{ColumnData, DType, Frame, Index, Value};
pub use labels::{LabelIndex, SlotMap};
pub use lru::RecencyTracker;
pub use slot::Slot;
pub use store::{
    open_store, SqliteStore, StoreBackend, StoreFormat, StoreItem, LABEL_PLACEHOLDER,
};

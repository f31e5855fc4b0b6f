//! Store and bus configuration.
//!
//! ```yaml
//! max_resident: 2
//! store:
//!   default:
//!     index_depth: 1
//!   labels:
//!     prices:
//!       index_depth: 2
//!       dtypes:
//!         volume: float64
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::frame::DType;

/// How one label is written to and read from a store.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Leading fields that form the index on read.
    pub index_depth: usize,

    /// Levels of column labels on read.
    pub columns_depth: usize,

    /// Write index levels as leading fields (and primary key).
    pub include_index: bool,

    /// Write column labels as field names.
    pub include_columns: bool,

    /// Per-field dtype overrides applied on read.
    pub dtypes: BTreeMap<String, DType>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_depth: 1,
            columns_depth: 1,
            include_index: true,
            include_columns: true,
            dtypes: BTreeMap::new(),
        }
    }
}

/// Per-label [`StoreConfig`] lookup with a default.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfigMap {
    pub default: StoreConfig,
    pub labels: BTreeMap<String, StoreConfig>,
}

impl StoreConfigMap {
    pub fn new(default: StoreConfig) -> Self {
        Self {
            default,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, config: StoreConfig) -> Self {
        self.labels.insert(label.into(), config);
        self
    }

    /// Config for `label`, falling back to the default.
    pub fn get(&self, label: &str) -> &StoreConfig {
        self.labels.get(label).unwrap_or(&self.default)
    }
}

impl From<StoreConfig> for StoreConfigMap {
    fn from(default: StoreConfig) -> Self {
        Self::new(default)
    }
}

/// Bus-level settings: residency ceiling plus store configs.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum number of frames resident at once; unbounded when absent.
    pub max_resident: Option<usize>,

    pub store: StoreConfigMap,
}

impl BusConfig {
    pub fn from_yaml_str(text: &str) -> StoreResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&text)
    }
}

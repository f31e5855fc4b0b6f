//! Persistence contract for frames keyed by label.
//!
//! A [`StoreBackend`] writes, reads and enumerates frames. Backends never keep
//! a connection open between calls: each call opens what it needs and
//! releases it before returning.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{StoreConfig, StoreConfigMap};
use crate::error::{StoreError, StoreResult};
use crate::frame::Frame;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Name used for frames written without a label.
pub const LABEL_PLACEHOLDER: &str = "None";

/// Item fed to [`StoreBackend::write`].
pub type StoreItem = StoreResult<(Option<String>, Frame)>;

/// Storage backend contract used by the bus.
pub trait StoreBackend: fmt::Debug + Send + Sync {
    /// Persist every frame under its label (`None` maps to
    /// [`LABEL_PLACEHOLDER`]), pulling items one at a time. An `Err` item or
    /// a failed table write aborts the call and nothing is persisted.
    fn write(&self, items: &mut dyn Iterator<Item = StoreItem>, config: &StoreConfigMap)
        -> StoreResult<()>;

    /// [`StoreBackend::write`] over frames already in memory.
    fn write_frames(
        &self,
        items: &[(Option<String>, Frame)],
        config: &StoreConfigMap,
    ) -> StoreResult<()> {
        self.write(&mut items.iter().cloned().map(Ok::<_, StoreError>), config)
    }

    /// Load the frame stored under `label`.
    ///
    /// Fails with [`StoreError::NotFound`] if the label is absent.
    fn read(&self, label: &str, config: &StoreConfig) -> StoreResult<Frame>;

    /// Labels present in the backing resource, in backend order.
    fn labels(&self) -> StoreResult<Box<dyn Iterator<Item = String> + '_>>;
}

/// Backend selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Sqlite,
}

impl StoreFormat {
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()));
        match ext {
            Some(ext) if SqliteStore::EXTENSIONS.contains(&ext.as_str()) => Ok(Self::Sqlite),
            _ => Err(StoreError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Open the backend matching `path`'s extension.
pub fn open_store(path: &Path) -> StoreResult<Arc<dyn StoreBackend>> {
    match StoreFormat::from_path(path)? {
        StoreFormat::Sqlite => Ok(Arc::new(SqliteStore::new(path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            StoreFormat::from_path(Path::new("/tmp/frames.db")).unwrap(),
            StoreFormat::Sqlite
        );
        assert_eq!(
            StoreFormat::from_path(Path::new("frames.SQLITE")).unwrap(),
            StoreFormat::Sqlite
        );
        for path in ["frames.xlsx", "frames.zip", "frames.csv", "frames"] {
            let err = StoreFormat::from_path(Path::new(path)).unwrap_err();
            assert!(
                matches!(err, StoreError::UnsupportedFormat { .. }),
                "{}: {:?}",
                path,
                err
            );
        }
    }
}

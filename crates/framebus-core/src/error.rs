//! Error types for frames, stores and the bus.

/// Errors raised while building or converting a [`Frame`](crate::frame::Frame).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// A column or index level does not match the frame's row count.
    #[error("length mismatch for {column}: expected {expected} rows, got {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Labels or levels do not agree with the declared shape.
    #[error("invalid shape: {message}")]
    InvalidShape { message: String },

    /// A value could not be converted to the requested dtype.
    #[error("cannot cast {value} to {dtype}")]
    Cast { value: String, dtype: String },
}

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Label is not present in the backing resource.
    #[error("label not found in store: {label}")]
    NotFound { label: String },

    /// SQLite driver error.
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    /// Stored table cannot be mapped onto a frame with the requested config.
    #[error("schema error for {label}: {message}")]
    Schema { label: String, message: String },

    /// No backend handles this path.
    #[error("unsupported store format: {path}")]
    UnsupportedFormat { path: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Filesystem error.
    #[error("io error: {message}")]
    Io { message: String },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl StoreError {
    /// Whether the error means the label does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Bus errors.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Construction-time validation failed; no bus was built.
    #[error("bus init error: {message}")]
    Init { message: String },

    /// Label is not in the bus.
    #[error("label not in bus: {label}")]
    KeyNotFound { label: String },

    /// Position outside `0..len`.
    #[error("position {position} out of bounds for bus of length {len}")]
    OutOfBounds { position: usize, len: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BusError {
    pub(crate) fn init(message: impl Into<String>) -> Self {
        Self::Init {
            message: message.into(),
        }
    }
}

pub type FrameResult<T> = Result<T, FrameError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

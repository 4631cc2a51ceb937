//! Crate-level error types.

use std::fmt;

/// Errors raised by a style adapter or by the rendering backend on its
/// behalf.
///
/// Adapter errors are recoverable: the representation stays usable for the
/// next `build()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Geometry creation failed.
    Create(String),
    /// In-place channel refresh failed.
    Update(String),
    /// Asynchronous precomputation failed.
    Prepare(String),
    /// The prepare completion handle was dropped without signalling.
    PrepareAbandoned,
    /// The rendering backend rejected a buffer.
    Backend(String),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(msg) => write!(f, "create failed: {msg}"),
            Self::Update(msg) => write!(f, "update failed: {msg}"),
            Self::Prepare(msg) => write!(f, "prepare failed: {msg}"),
            Self::PrepareAbandoned => {
                write!(f, "prepare dropped without completing")
            }
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Errors produced by the molrepr crate.
#[derive(Debug)]
pub enum ReprError {
    /// No adapter is registered for the requested style.
    UnknownKind {
        /// The style name that was looked up.
        kind: String,
    },
    /// A style adapter failed during prepare, create or update.
    Adapter(AdapterError),
    /// The representation has been disposed.
    Disposed,
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
}

impl fmt::Display for ReprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { kind } => {
                write!(f, "representation type '{kind}' unknown")
            }
            Self::Adapter(e) => write!(f, "adapter error: {e}"),
            Self::Disposed => write!(f, "representation disposed"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
        }
    }
}

impl std::error::Error for ReprError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Adapter(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AdapterError> for ReprError {
    fn from(e: AdapterError) -> Self {
        Self::Adapter(e)
    }
}

impl From<std::io::Error> for ReprError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

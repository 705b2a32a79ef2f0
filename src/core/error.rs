//! Defines the custom error type for the `core` module.

use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Tree payloads arrive as opaque JSON from the storage layer; anything that
/// prevents building a [`FileNode`](super::FileNode) out of one is reported
/// as `MalformedTree` and the caller falls back to "no tree" rendering.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The directory JSON could not be parsed into a file tree.
    #[error("malformed directory tree: {0}")]
    MalformedTree(#[from] serde_json::Error),
}

//! Error types for driver writes.

use thiserror::Error;
use treedex_types::{Path, Segment};

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised when a write cannot be applied at the requested path.
///
/// Reads never fail; a missing node is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// A write had to step through a scalar.
    #[error("cannot traverse through scalar at {path}")]
    NotAContainer { path: Path },

    /// A key segment was used on a list, or an index segment on a map.
    #[error("segment '{segment}' does not address a child of the container at {path}")]
    SegmentMismatch { path: Path, segment: Segment },

    /// A list write past the end of the list (writing at `len` appends).
    #[error("index {index} out of bounds for list of length {len} at {path}")]
    IndexOutOfBounds { path: Path, index: usize, len: usize },

    /// `add_in_path` pointed at something other than a list.
    #[error("cannot append to non-list node at {path}")]
    NotAList { path: Path },
}

/// The first `depth` segments of `path`, for error reporting.
pub(crate) fn prefix(path: &Path, depth: usize) -> Path {
    path.segments()[..depth.min(path.len())].iter().cloned().collect()
}

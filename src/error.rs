//! Error kinds surfaced to the shell.
//!
//! Every core operation reports failure as a [`LayoutError`].  The
//! [`Session`](crate::session::Session) converts these into
//! [`Reply::Error`](crate::command::Reply::Error) values so that no failure
//! ever escapes to the event loop.

use crate::command::WindowHandle;
use serde::{Deserialize, Serialize};

/// Coarse classification of a [`LayoutError`], sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NoDisplayInfo,
    NoMatchingWindow,
    InsufficientSpace,
    InvalidHandle,
    LaunchFailure,
    PersistenceFailure,
    InvalidArgument,
    Backend,
}

/// Possible errors from the layout engine, the launcher and the settings
/// store.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The display topology could not be determined.
    #[error("unable to read display information")]
    NoDisplayInfo,

    /// No visible window carries the requested title.
    #[error("no visible window titled {0:?}")]
    NoMatchingWindow(String),

    /// More new windows than free grid cells, and overflow is disabled.
    ///
    /// Stale entries have already been evicted when this is returned.
    #[error("not enough screen space: {needed} new window(s) but {available} free cell(s)")]
    InsufficientSpace { needed: usize, available: usize },

    /// The handle does not refer to a live window.
    #[error("invalid window handle {0}")]
    InvalidHandle(WindowHandle),

    /// The target program could not be started.
    #[error("launch failed: {0}")]
    LaunchFailure(String),

    /// Settings could not be read or written.
    #[error("settings error: {0}")]
    PersistenceFailure(String),

    /// A caller-supplied value is out of range (zero cell size, …).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A window primitive failed on an otherwise valid handle.
    #[error("window backend error: {0}")]
    Backend(String),
}

impl LayoutError {
    /// The wire-level kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LayoutError::NoDisplayInfo => ErrorKind::NoDisplayInfo,
            LayoutError::NoMatchingWindow(_) => ErrorKind::NoMatchingWindow,
            LayoutError::InsufficientSpace { .. } => ErrorKind::InsufficientSpace,
            LayoutError::InvalidHandle(_) => ErrorKind::InvalidHandle,
            LayoutError::LaunchFailure(_) => ErrorKind::LaunchFailure,
            LayoutError::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
            LayoutError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LayoutError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Wrap a backend error.
    pub(crate) fn backend(e: impl std::error::Error) -> Self {
        LayoutError::Backend(e.to_string())
    }
}

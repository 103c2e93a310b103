//! Error kinds for lldpmap operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Only boundary failures are represented here. Bad telemetry records are
/// handled where they are read and never surface as an `ErrorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration or parameters
    ConfigInvalid,

    // =========================================================================
    // Input errors
    // =========================================================================
    /// Device snapshot could not be read as a device list
    SnapshotInvalid,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    // =========================================================================
    // Decoding errors
    // =========================================================================
    /// A remote response could not be decoded
    DeserializationFailed,

    // =========================================================================
    // Layout and rendering errors
    // =========================================================================
    /// The external layout program failed or produced unusable output
    LayoutFailed,

    /// The external renderer failed to produce an image
    RenderFailed,

    // =========================================================================
    // Remote map errors
    // =========================================================================
    /// Looking up an existing map failed
    MapLookupFailed,

    /// Creating a new map failed
    MapCreateFailed,

    /// Clearing or rewriting an existing map failed
    MapUpdateFailed,

    /// The remote API could not be reached
    RemoteUnavailable,

    /// The remote API answered with an error object
    RemoteRejected,

    /// Timeout occurred
    Timeout,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::RemoteUnavailable | ErrorKind::IoFailed
        )
    }
}

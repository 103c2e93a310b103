//! Error status for retry decisions

use std::fmt;

use crate::ErrorKind;

/// Whether an error may go away if the same call is repeated.
///
/// The pipeline itself never retries a failed publish. The status is there
/// for callers that wrap a run in their own retry loop (a cron wrapper, a
/// systemd timer with `Restart=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorStatus {
    /// Repeating the call will fail the same way until something external changes.
    #[default]
    Permanent,

    /// Repeating the call may succeed (network hiccup, busy API frontend).
    Temporary,
}

impl ErrorStatus {
    /// Default status for a freshly created error of `kind`.
    pub fn for_kind(kind: ErrorKind) -> Self {
        if kind.is_retryable() {
            ErrorStatus::Temporary
        } else {
            ErrorStatus::Permanent
        }
    }

    /// Check if retry is recommended
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

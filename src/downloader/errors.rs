// Error types for download tasks
//
// Every variant is local to one task: the batch loop only ever sees a
// boolean plus the log/status lines emitted on the way out.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadError {
    /// The input string is not a well-formed http(s) URL
    InvalidInput(String),

    /// Known-unsupported host (Spotify)
    UnsupportedSource(String),

    /// The downloader executable could not be spawned
    SpawnFailure(String),

    /// The downloader ran but exited nonzero
    SubprocessFailure,

    /// Playlist metadata could not be obtained (task degrades, not fatal)
    MetadataProbeFailure(String),

    /// The user requested cancellation mid-task
    Cancelled,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(url) => write!(f, "Not a valid URL: {}", url),
            Self::UnsupportedSource(url) => write!(f, "Unsupported source, skipped: {}", url),
            Self::SpawnFailure(cmd) => write!(
                f,
                "Command not found: {}. Make sure it is installed and on PATH.",
                cmd
            ),
            Self::SubprocessFailure => write!(f, "Downloader exited with an error"),
            Self::MetadataProbeFailure(msg) => {
                write!(f, "Could not fetch playlist metadata: {}", msg)
            }
            Self::Cancelled => write!(f, "Cancelled by user"),
        }
    }
}

impl std::error::Error for DownloadError {}

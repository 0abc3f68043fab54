// URL classification - decides which download routine handles an input line

use serde::{Deserialize, Serialize};

/// Category of a submitted URL, derived purely from the string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlCategory {
    /// A single video (also the permissive fallback for unknown hosts)
    Video,
    /// A YouTube Music playlist, downloaded as audio
    MusicPlaylist,
    /// A YouTube playlist, downloaded as video
    VideoPlaylist,
    /// A host we knowingly do not support (Spotify)
    UnsupportedSource,
    /// Not a well-formed http(s) URL at all
    InvalidInput,
}

impl UrlCategory {
    pub fn is_playlist(&self) -> bool {
        matches!(self, Self::MusicPlaylist | Self::VideoPlaylist)
    }

    /// Whether this category ever reaches the external downloader.
    pub fn is_downloadable(&self) -> bool {
        !matches!(self, Self::UnsupportedSource | Self::InvalidInput)
    }
}

/// Classify a URL string. Pure, no network access.
///
/// Anything that looks like a well-formed URL on an unknown host falls
/// through to `Video`: the external downloader is the final authority on
/// whether a site is actually supported.
pub fn classify(url: &str) -> UrlCategory {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return UrlCategory::InvalidInput;
    }

    if url.contains("spotify.com") {
        return UrlCategory::UnsupportedSource;
    }

    let has_list_param = url.contains("list=");
    if url.contains("music.youtube.com") && has_list_param {
        return UrlCategory::MusicPlaylist;
    }

    if (url.contains("youtube.com") || url.contains("youtu.be")) && has_list_param {
        return UrlCategory::VideoPlaylist;
    }

    UrlCategory::Video
}

// Common data models for the download orchestrator

use std::path::Path;

use super::classifier::{classify, UrlCategory};
use super::settings::Settings;

/// One unit of batch work: a URL, its resolved category, and the
/// read-only context it runs with. Created per loop iteration and
/// discarded after completion; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct DownloadTask<'a> {
    pub url: &'a str,
    pub category: UrlCategory,
    pub settings: &'a Settings,
    pub base_dir: &'a Path,
}

impl<'a> DownloadTask<'a> {
    pub fn new(url: &'a str, settings: &'a Settings, base_dir: &'a Path) -> Self {
        Self {
            url,
            category: classify(url),
            settings,
            base_dir,
        }
    }
}

/// Playlist title and item count, probed once per playlist task.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMeta {
    pub title: String,
    pub item_count: u32,
}

impl PlaylistMeta {
    /// Fallback used when the probe fails or the fields are absent; the
    /// download then proceeds with an inaccurate progress denominator.
    pub fn unknown() -> Self {
        Self {
            title: "Untitled Playlist".to_string(),
            item_count: 0,
        }
    }
}

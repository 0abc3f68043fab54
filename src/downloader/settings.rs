// Settings persistence - one JSON blob, loaded once per batch run
//
// Missing keys are backfilled with the documented defaults; a corrupt
// or absent file is replaced with the defaults and written back so the
// blob always exists after first load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "universal-downloader";

fn default_browser() -> String {
    "chrome".to_string()
}
fn default_interval() -> u64 {
    600
}
fn default_max_resolution() -> String {
    "2160".to_string()
}
fn default_video_format() -> String {
    "mp4".to_string()
}
fn default_audio_format() -> String {
    "m4a".to_string()
}
fn default_playlist_as() -> String {
    "audio".to_string()
}

/// Recognized configuration options. Read-only during a batch run;
/// owned by the shell and passed by reference into the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Cookie source browser, or "none" to skip cookies entirely
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Pacing delay between batch items, in seconds
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Pixel-height cap fed into the format selector (kept as a string,
    /// it is spliced verbatim into the -f expression)
    #[serde(default = "default_max_resolution")]
    pub max_resolution: String,

    /// Container format videos are merged into
    #[serde(default = "default_video_format")]
    pub video_format: String,

    /// Audio codec/container for extracted playlist audio
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Default playlist treatment; persisted for the settings dialog,
    /// classification decides the actual routing
    #[serde(default = "default_playlist_as")]
    pub playlist_as: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            browser: default_browser(),
            interval_seconds: default_interval(),
            max_resolution: default_max_resolution(),
            video_format: default_video_format(),
            audio_format: default_audio_format(),
            playlist_as: default_playlist_as(),
        }
    }
}

impl Settings {
    /// Browser to borrow session cookies from, if any.
    pub fn cookie_browser(&self) -> Option<&str> {
        let browser = self.browser.trim();
        if browser.is_empty() || browser.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(browser)
        }
    }

    /// Load settings from `path`. Missing file or malformed JSON yields
    /// the defaults, which are persisted back immediately.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("[Settings] {} is malformed ({}), using defaults", path.display(), e);
                    let defaults = Settings::default();
                    if let Err(e) = defaults.save_to(path) {
                        eprintln!("[Settings] Failed to rewrite defaults: {}", e);
                    }
                    defaults
                }
            },
            Err(_) => {
                let defaults = Settings::default();
                if let Err(e) = defaults.save_to(path) {
                    eprintln!("[Settings] Failed to write defaults: {}", e);
                }
                defaults
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

/// Platform config location for the settings blob
/// (e.g. ~/.config/universal-downloader/settings.json on Linux).
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

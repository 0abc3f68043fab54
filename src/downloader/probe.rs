// Playlist metadata probing
//
// One metadata-only yt-dlp invocation per playlist task, run before the
// real download so the progress denominator and target directory are
// known up front. Any failure degrades to defaults instead of aborting
// the task.

use serde_json::Value;

use super::errors::DownloadError;
use super::models::PlaylistMeta;
use super::settings::Settings;
use super::tools::locate_ytdlp;
use super::traits::EventSink;
use super::utils::run_output_with_timeout;

/// Hard ceiling on the probe; large playlists can be slow, but an
/// unbounded hang would stall the whole batch.
const PROBE_TIMEOUT_SECS: u64 = 120;

/// Fetch playlist title and item count via a flat-listing JSON dump.
/// Never fails: on any error a warning is logged and the defaults
/// (untitled, count 0) come back.
pub async fn probe_playlist(url: &str, settings: &Settings, sink: &dyn EventSink) -> PlaylistMeta {
    let mut args = vec![
        "--dump-single-json".to_string(),
        "--flat-playlist".to_string(),
    ];
    if let Some(browser) = settings.cookie_browser() {
        args.push("--cookies-from-browser".to_string());
        args.push(browser.to_string());
    }
    args.push(url.to_string());

    let program = locate_ytdlp();
    match run_output_with_timeout(&program, &args, PROBE_TIMEOUT_SECS).await {
        Ok(output) if output.status.success() => {
            let raw = String::from_utf8_lossy(&output.stdout);
            match serde_json::from_str::<Value>(&raw) {
                Ok(json) => PlaylistMeta {
                    title: json["title"]
                        .as_str()
                        .unwrap_or("Untitled Playlist")
                        .to_string(),
                    item_count: json["playlist_count"].as_u64().unwrap_or(0) as u32,
                },
                Err(e) => degrade(sink, &format!("malformed JSON: {}", e)),
            }
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first = stderr.lines().next().unwrap_or("no error output");
            degrade(sink, first)
        }
        Err(e) => degrade(sink, &e),
    }
}

fn degrade(sink: &dyn EventSink, reason: &str) -> PlaylistMeta {
    let err = DownloadError::MetadataProbeFailure(reason.to_string());
    eprintln!("[Probe] {}", err);
    sink.log_line(&format!("Warning: {}; the progress bar may be inaccurate.", err));
    PlaylistMeta::unknown()
}

/// Replace characters that are illegal (or hostile) in directory names.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_illegal_characters() {
        assert_eq!(
            sanitize_title(r#"AC/DC: Best* "Hits" <2024>?"#),
            "AC_DC_ Best_ _Hits_ _2024__"
        );
        assert_eq!(sanitize_title(r"a\b|c%d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_leaves_ordinary_titles_alone() {
        assert_eq!(sanitize_title("Lo-fi beats (2024)"), "Lo-fi beats (2024)");
        assert_eq!(sanitize_title(""), "");
    }
}

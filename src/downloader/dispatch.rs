// Download dispatcher - routes a classified URL to its download routine
//
// Owns the yt-dlp argument construction for every category. All
// failures are reported through the sink and collapse into the boolean
// the batch loop consumes; nothing here aborts the batch.

use std::fs;
use std::path::Path;

use super::cancel::CancelFlag;
use super::classifier::UrlCategory;
use super::errors::DownloadError;
use super::models::DownloadTask;
use super::probe::{probe_playlist, sanitize_title};
use super::progress::ProgressState;
use super::runner::run_streaming;
use super::settings::Settings;
use super::tools::locate_ytdlp;
use super::traits::EventSink;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlaylistKind {
    Audio,
    Video,
}

/// Handle one URL to completion or failure. Returns `true` only when
/// the downloader finished successfully.
pub async fn dispatch(task: &DownloadTask<'_>, sink: &dyn EventSink, cancel: &CancelFlag) -> bool {
    match task.category {
        UrlCategory::Video => download_video(task, sink, cancel),
        UrlCategory::MusicPlaylist => {
            download_playlist(task, PlaylistKind::Audio, sink, cancel).await
        }
        UrlCategory::VideoPlaylist => {
            download_playlist(task, PlaylistKind::Video, sink, cancel).await
        }
        UrlCategory::UnsupportedSource => {
            sink.log_line(&DownloadError::UnsupportedSource(task.url.to_string()).to_string());
            sink.status("Unsupported source");
            false
        }
        UrlCategory::InvalidInput => {
            sink.log_line(&DownloadError::InvalidInput(task.url.to_string()).to_string());
            sink.status("Invalid input");
            false
        }
    }
}

fn download_video(task: &DownloadTask<'_>, sink: &dyn EventSink, cancel: &CancelFlag) -> bool {
    sink.log_line(&format!("Video link detected: {}", task.url));

    let folder = task.base_dir.join("videos");
    if !ensure_dir(&folder, sink) {
        return false;
    }

    sink.log_line(&format!(
        "Downloading at up to {}p into {} (format: {})...",
        task.settings.max_resolution,
        folder.display(),
        task.settings.video_format
    ));

    let args = video_args(task.url, task.settings, &folder);
    let success = run_streaming(
        &locate_ytdlp(),
        &args,
        sink,
        ProgressState::single(),
        cancel,
        None,
    );

    if success {
        sink.log_line(&format!("Video downloaded: {}", task.url));
    } else if !cancel.is_cancelled() {
        sink.log_line(&format!("Video download failed: {}", task.url));
    }
    success
}

async fn download_playlist(
    task: &DownloadTask<'_>,
    kind: PlaylistKind,
    sink: &dyn EventSink,
    cancel: &CancelFlag,
) -> bool {
    let label = match kind {
        PlaylistKind::Audio => "Audio playlist",
        PlaylistKind::Video => "Video playlist",
    };
    sink.log_line(&format!("{} link detected: {}", label, task.url));

    let meta = probe_playlist(task.url, task.settings, sink).await;
    if cancel.is_cancelled() {
        sink.log_line("Download cancelled.");
        sink.status("Cancelled by user");
        return false;
    }

    let folder = task
        .base_dir
        .join("playlists")
        .join(sanitize_title(&meta.title));
    if !ensure_dir(&folder, sink) {
        return false;
    }

    if meta.item_count == 0 {
        sink.log_line(
            "Playlist is empty or its item count is unknown; downloading anyway, the progress bar may be inaccurate.",
        );
    }
    let state = ProgressState::playlist(meta.item_count);

    let (args, format_desc) = match kind {
        PlaylistKind::Audio => (
            playlist_audio_args(task.url, task.settings, &folder),
            format!("audio format: {}", task.settings.audio_format),
        ),
        PlaylistKind::Video => (
            playlist_video_args(task.url, task.settings, &folder),
            format!("video format: {}", task.settings.video_format),
        ),
    };

    sink.log_line(&format!(
        "Downloading playlist into {} ({} items, {})",
        folder.display(),
        state.total_items(),
        format_desc
    ));

    let success = run_streaming(&locate_ytdlp(), &args, sink, state, cancel, None);

    if success {
        sink.log_line(&format!("{} downloaded: {}", label, task.url));
    } else if !cancel.is_cancelled() {
        sink.log_line(&format!("{} download failed: {}", label, task.url));
    }
    success
}

fn ensure_dir(folder: &Path, sink: &dyn EventSink) -> bool {
    match fs::create_dir_all(folder) {
        Ok(()) => true,
        Err(e) => {
            sink.log_line(&format!(
                "Could not create directory {}: {}",
                folder.display(),
                e
            ));
            sink.status("Error: could not create target directory");
            false
        }
    }
}

fn resolution_capped_format(max_resolution: &str) -> String {
    format!(
        "bestvideo[height<={r}]+bestaudio/best[height<={r}]",
        r = max_resolution
    )
}

fn output_template(folder: &Path) -> String {
    folder.join("%(title)s.%(ext)s").to_string_lossy().to_string()
}

fn cookie_args(settings: &Settings) -> Vec<String> {
    match settings.cookie_browser() {
        Some(browser) => vec!["--cookies-from-browser".to_string(), browser.to_string()],
        None => Vec::new(),
    }
}

fn video_args(url: &str, settings: &Settings, folder: &Path) -> Vec<String> {
    let mut args = vec!["--progress".to_string()];
    args.extend(cookie_args(settings));
    args.extend([
        "-f".to_string(),
        resolution_capped_format(&settings.max_resolution),
        "--merge-output-format".to_string(),
        settings.video_format.clone(),
        "-o".to_string(),
        output_template(folder),
        "--newline".to_string(),
        url.to_string(),
    ]);
    args
}

fn playlist_audio_args(url: &str, settings: &Settings, folder: &Path) -> Vec<String> {
    let mut args = vec!["--progress".to_string()];
    args.extend(cookie_args(settings));
    args.extend([
        "--extract-audio".to_string(),
        "--audio-format".to_string(),
        settings.audio_format.clone(),
        // 0 = best quality
        "--audio-quality".to_string(),
        "0".to_string(),
        "-o".to_string(),
        output_template(folder),
        "--newline".to_string(),
        url.to_string(),
    ]);
    args
}

fn playlist_video_args(url: &str, settings: &Settings, folder: &Path) -> Vec<String> {
    let mut args = vec!["--progress".to_string()];
    args.extend(cookie_args(settings));
    args.extend([
        "-f".to_string(),
        resolution_capped_format(&settings.max_resolution),
        "--merge-output-format".to_string(),
        settings.video_format.clone(),
        "-o".to_string(),
        output_template(folder),
        "--newline".to_string(),
        url.to_string(),
    ]);
    args
}

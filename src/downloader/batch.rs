// Batch runner - sequential processing of the submitted URL list
//
// One batch runs on one dedicated worker; downloads are strictly
// sequential. Cancellation is checked before every item and once per
// countdown tick, so a pending inter-item wait aborts within about a
// second of the request.

use std::path::Path;
use std::time::Duration;

use super::cancel::CancelFlag;
use super::dispatch::dispatch;
use super::models::DownloadTask;
use super::settings::Settings;
use super::traits::EventSink;

/// URLs longer than this are truncated in status lines.
const STATUS_URL_LEN: usize = 80;

/// Process `urls` in input order. Duplicates are processed
/// independently; a failing item never stops the batch, only
/// cancellation does.
pub async fn run_batch(
    urls: &[String],
    settings: &Settings,
    base_dir: &Path,
    sink: &dyn EventSink,
    cancel: &CancelFlag,
) {
    cancel.reset();
    sink.progress(0.0);

    let total = urls.len();
    for (i, url) in urls.iter().enumerate() {
        if cancel.is_cancelled() {
            sink.log_line("Batch cancelled by user.");
            sink.status("Cancelled");
            break;
        }

        let shown: String = url.chars().take(STATUS_URL_LEN).collect();
        sink.status(&format!("({}/{}) starting: {}", i + 1, total, shown));
        sink.log_line(&format!("--- ({}/{}) processing: {} ---", i + 1, total, url));
        eprintln!("[Batch] ({}/{}) {}", i + 1, total, url);

        let task = DownloadTask::new(url, settings, base_dir);
        let success = dispatch(&task, sink, cancel).await;

        if success {
            sink.status(&format!("({}/{}) done", i + 1, total));
        } else if cancel.is_cancelled() {
            sink.status(&format!("({}/{}) cancelled", i + 1, total));
        } else {
            sink.status(&format!("({}/{}) failed or skipped", i + 1, total));
        }

        // Pacing delay, skipped after the last item
        if i + 1 < total && !cancel.is_cancelled() && settings.interval_seconds > 0 {
            sink.log_line(&format!(
                "Waiting {} seconds before the next item...",
                settings.interval_seconds
            ));
            for remaining in (1..=settings.interval_seconds).rev() {
                if cancel.is_cancelled() {
                    break;
                }
                sink.status(&format!("Waiting {:02}:{:02}...", remaining / 60, remaining % 60));
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    if !cancel.is_cancelled() {
        sink.status("All tasks complete");
        sink.log_line("All tasks complete.");
    }
}

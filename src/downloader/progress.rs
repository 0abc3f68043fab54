// Progress interpretation for yt-dlp output lines
//
// Maps the downloader's heterogeneous progress output (per-item
// percentages, playlist item markers, "already downloaded" skips) onto
// one 0-100 scale. Pure state machine: feeding it lines never spawns
// anything, so it is testable without a subprocess.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ITEM_RE: Regex =
        Regex::new(r"\[download\] Downloading item (\d+) of (\d+)").unwrap();
    static ref PERCENT_RE: Regex = Regex::new(r"\[download\]\s+([0-9.]+)%").unwrap();
}

const ALREADY_DOWNLOADED: &str = "has already been downloaded";

/// Normalized event produced from one raw output line.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A new playlist item started; carries the 1-based index and the
    /// probed denominator (not the count yt-dlp printed on the line).
    ItemStarted { index: u32, total: u32 },
    /// Overall percentage on the unified 0-100 scale. `regressed` marks
    /// a value lower than the last one emitted (out-of-order item
    /// reporting); callers should surface it rather than hide it.
    Percent { value: f32, regressed: bool },
}

/// Per-invocation parser state. Lives for one subprocess run.
#[derive(Debug, Clone)]
pub struct ProgressState {
    is_playlist: bool,
    /// 1-based index of the item currently downloading; 0 = none seen yet.
    current_item: u32,
    /// Playlist denominator, always >= 1.
    total_items: u32,
    last_percent: f32,
}

impl ProgressState {
    pub fn single() -> Self {
        Self {
            is_playlist: false,
            current_item: 0,
            total_items: 1,
            last_percent: 0.0,
        }
    }

    /// Playlist mode. A zero denominator is substituted with 1 so the
    /// arithmetic never divides by zero (the bar is then inaccurate but
    /// harmless, matching the probe-failure degradation).
    pub fn playlist(total_items: u32) -> Self {
        Self {
            is_playlist: true,
            current_item: 0,
            total_items: total_items.max(1),
            last_percent: 0.0,
        }
    }

    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Feed one raw output line; returns the event it maps to, if any.
    /// Unrecognized lines are ignored here (the runner still forwards
    /// them as raw log output).
    pub fn observe(&mut self, line: &str) -> Option<ProgressEvent> {
        if !self.is_playlist {
            let percent: f32 = PERCENT_RE.captures(line)?.get(1)?.as_str().parse().ok()?;
            return Some(self.emit(percent));
        }

        if let Some(caps) = ITEM_RE.captures(line) {
            let index: u32 = caps.get(1)?.as_str().parse().ok()?;
            self.current_item = index;
            // Item-marker lines never carry a percentage of their own.
            return Some(ProgressEvent::ItemStarted {
                index,
                total: self.total_items,
            });
        }

        // Percentages before the first item marker belong to nothing we
        // can place on the overall scale; skip them.
        if self.current_item == 0 {
            return None;
        }

        let completed = (self.current_item - 1) as f32 / self.total_items as f32 * 100.0;

        if let Some(caps) = PERCENT_RE.captures(line) {
            let item_percent: f32 = caps.get(1)?.as_str().parse().ok()?;
            let overall = completed + item_percent / self.total_items as f32;
            return Some(self.emit(overall));
        }

        if line.contains(ALREADY_DOWNLOADED) {
            // A skipped item counts as fully done.
            let overall = self.current_item as f32 / self.total_items as f32 * 100.0;
            return Some(self.emit(overall));
        }

        None
    }

    fn emit(&mut self, value: f32) -> ProgressEvent {
        let regressed = value < self.last_percent;
        self.last_percent = value;
        ProgressEvent::Percent { value, regressed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(event: Option<ProgressEvent>) -> f32 {
        match event {
            Some(ProgressEvent::Percent { value, .. }) => value,
            other => panic!("expected percent event, got {:?}", other),
        }
    }

    #[test]
    fn test_single_video_percentage() {
        let mut state = ProgressState::single();
        let p = percent(state.observe("[download]  42.5% of 120.00MiB at 1.20MiB/s ETA 01:10"));
        assert_eq!(p, 42.5);
    }

    #[test]
    fn test_single_video_ignores_noise() {
        let mut state = ProgressState::single();
        assert_eq!(state.observe("[youtube] Extracting URL"), None);
        assert_eq!(state.observe("[Merger] Merging formats"), None);
    }

    #[test]
    fn test_playlist_item_marker_sets_index() {
        let mut state = ProgressState::playlist(5);
        let event = state.observe("[download] Downloading item 3 of 5");
        assert_eq!(event, Some(ProgressEvent::ItemStarted { index: 3, total: 5 }));
    }

    #[test]
    fn test_playlist_overall_percentage() {
        // N=5, K=3, P=40 -> (2/5)*100 + 40/5 = 48
        let mut state = ProgressState::playlist(5);
        state.observe("[download] Downloading item 3 of 5");
        let p = percent(state.observe("[download]  40.0% of 10.00MiB at 500KiB/s"));
        assert_eq!(p, 48.0);
    }

    #[test]
    fn test_playlist_percentage_before_item_marker_is_ignored() {
        let mut state = ProgressState::playlist(5);
        assert_eq!(state.observe("[download]  40.0% of 10.00MiB"), None);
    }

    #[test]
    fn test_already_downloaded_completes_item() {
        // K=2 of N=4 -> 50
        let mut state = ProgressState::playlist(4);
        state.observe("[download] Downloading item 2 of 4");
        let p = percent(state.observe(
            "[download] song.m4a has already been downloaded",
        ));
        assert_eq!(p, 50.0);
    }

    #[test]
    fn test_playlist_progress_is_monotonic_in_order() {
        let mut state = ProgressState::playlist(3);
        let mut last = 0.0_f32;
        for item in 1..=3u32 {
            state.observe(&format!("[download] Downloading item {} of 3", item));
            for p in [10.0, 55.0, 100.0] {
                let overall = percent(state.observe(&format!("[download]  {:.1}% of 5MiB", p)));
                assert!(overall >= last, "progress went backwards: {} < {}", overall, last);
                last = overall;
            }
        }
        // 66.67 + 33.33 in f32 lands within rounding of 100
        assert!((last - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_out_of_order_item_is_flagged() {
        let mut state = ProgressState::playlist(4);
        state.observe("[download] Downloading item 3 of 4");
        state.observe("[download]  80.0% of 5MiB");
        // Downloader jumps back to an earlier item (e.g. a retry)
        state.observe("[download] Downloading item 2 of 4");
        match state.observe("[download]  10.0% of 5MiB") {
            Some(ProgressEvent::Percent { value, regressed }) => {
                assert!(value < 70.0);
                assert!(regressed);
            }
            other => panic!("expected percent event, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_denominator_is_substituted() {
        let state = ProgressState::playlist(0);
        assert_eq!(state.total_items(), 1);
    }
}

// CLI shell around the download engine: owns the settings, the base
// directory, the cancellation flag (wired to Ctrl-C) and a console sink.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use universal_downloader::downloader::{
    run_batch, settings_path, tools, CancelFlag, EventSink, Settings,
};

#[derive(Parser)]
#[command(
    name = "universal-downloader",
    version,
    about = "Batch media downloads via yt-dlp, processed sequentially with pacing delays"
)]
struct Cli {
    /// URLs to download, processed in order
    urls: Vec<String>,

    /// Read additional URLs from a file, one per line
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Base directory downloads are placed under
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    dir: PathBuf,

    /// Override the configured pacing interval between items (seconds)
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,
}

struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn log_line(&self, text: &str) {
        println!("{}", text);
    }

    fn progress(&self, percent: f32) {
        eprintln!("[Progress] {:.1}%", percent);
    }

    fn status(&self, text: &str) {
        eprintln!("[Status] {}", text);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut urls = cli.urls.clone();
    if let Some(path) = &cli.file {
        match std::fs::read_to_string(path) {
            Ok(content) => urls.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from),
            ),
            Err(e) => {
                eprintln!("Failed to read {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        }
    }
    if urls.is_empty() {
        eprintln!("No URLs given. Pass them as arguments or via --file.");
        return ExitCode::from(2);
    }

    if let Err(e) = std::fs::create_dir_all(&cli.dir) {
        eprintln!("Cannot use {} as download directory: {}", cli.dir.display(), e);
        return ExitCode::from(2);
    }

    match tools::ytdlp_version() {
        Some(version) => eprintln!("yt-dlp: {}", version),
        None => eprintln!("yt-dlp not found; every download will fail until it is installed"),
    }

    let mut settings = match settings_path() {
        Some(path) => Settings::load_from(&path),
        None => Settings::default(),
    };
    if let Some(interval) = cli.interval {
        settings.interval_seconds = interval;
    }

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancellation requested, finishing up...");
                cancel.cancel();
            }
        });
    }

    run_batch(&urls, &settings, &cli.dir, &ConsoleSink, &cancel).await;

    if cancel.is_cancelled() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

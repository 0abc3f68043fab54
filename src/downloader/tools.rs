// Locating and probing the external downloader binary

use std::process::Command;

/// Find the yt-dlp executable in common install locations, falling back
/// to whatever PATH resolves.
pub fn locate_ytdlp() -> String {
    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac / manual install
        "/usr/bin/yt-dlp",          // Distro package
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = Command::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout);
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    "yt-dlp".to_string()
}

/// Installed yt-dlp version, or None when the binary is missing.
/// The shell shows this before a batch starts so a missing downloader
/// is visible up front rather than as N task failures.
pub fn ytdlp_version() -> Option<String> {
    let output = Command::new(locate_ytdlp()).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

// Subprocess lifecycle: spawn, stream merged output, cancel, reap
//
// The downloader's stdout and stderr both feed one channel so the
// consumer sees a single merged line stream, in the spirit of piping
// stderr into stdout. Lines are decoded lossily: a bad byte sequence
// becomes a substitution character, never an aborted download.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::cancel::CancelFlag;
use super::errors::DownloadError;
use super::progress::{ProgressEvent, ProgressState};
use super::traits::EventSink;

/// How long to wait for the next output line before re-checking the
/// cancellation flag. Keeps a silent child from parking the worker past
/// a cancellation checkpoint.
const LINE_POLL: Duration = Duration::from_millis(500);

/// Spawn `program` with `args` and stream its output until exit.
///
/// Returns `true` iff the process exited with code 0. Cancellation
/// kills and reaps the child, emits a cancellation log line, resets
/// progress to 0 and returns `false`. A spawn failure is reported as a
/// log line plus a status naming the missing command; the caller treats
/// it as a single-task failure.
pub fn run_streaming(
    program: &str,
    args: &[String],
    sink: &dyn EventSink,
    mut progress: ProgressState,
    cancel: &CancelFlag,
    work_dir: Option<&Path>,
) -> bool {
    sink.status("Downloading...");
    sink.progress(0.0);

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = work_dir {
        command.current_dir(dir);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            eprintln!("[Runner] Failed to spawn {}: {}", program, e);
            sink.log_line(&DownloadError::SpawnFailure(program.to_string()).to_string());
            sink.status(&format!("Error: {} not found", program));
            return false;
        }
    };

    let (tx, rx) = mpsc::channel::<String>();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader(stderr, tx.clone()));
    }
    // The loop below ends when the readers drop their senders.
    drop(tx);

    loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            // Readers are detached; they drain and exit once the pipes
            // close. No further lines are processed either way.
            drop(readers);
            sink.log_line("Download cancelled.");
            sink.status("Cancelled by user");
            sink.progress(0.0);
            return false;
        }

        match rx.recv_timeout(LINE_POLL) {
            Ok(line) => {
                if line.is_empty() {
                    continue;
                }
                sink.log_line(&line);
                match progress.observe(&line) {
                    Some(ProgressEvent::ItemStarted { index, total }) => {
                        sink.status(&format!("Downloading {}/{}", index, total));
                    }
                    Some(ProgressEvent::Percent { value, regressed }) => {
                        if regressed {
                            eprintln!(
                                "[Runner] Progress stepped backwards to {:.1}% (item reported out of order?)",
                                value
                            );
                        }
                        sink.progress(value);
                    }
                    None => {}
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    for handle in readers {
        let _ = handle.join();
    }

    match child.wait() {
        Ok(status) if status.success() => {
            sink.progress(100.0);
            true
        }
        Ok(status) => {
            eprintln!("[Runner] {} exited with {}", program, status);
            false
        }
        Err(e) => {
            eprintln!("[Runner] Failed to wait for {}: {}", program, e);
            false
        }
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(
    stream: R,
    tx: mpsc::Sender<String>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                // Pipe errors mean the child is gone; nothing to report.
                Err(_) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::traits::test_sink::RecordingSink;

    fn sh(script: &str) -> (String, Vec<String>) {
        (
            "sh".to_string(),
            vec!["-c".to_string(), script.to_string()],
        )
    }

    #[test]
    fn test_successful_run_reports_lines_and_final_progress() {
        let sink = RecordingSink::default();
        let cancel = CancelFlag::new();
        let (program, args) = sh(
            "echo '[download]  25.0% of 4MiB'; \
             echo '[download] 100.0% of 4MiB'; \
             exit 0",
        );

        let ok = run_streaming(
            &program,
            &args,
            &sink,
            ProgressState::single(),
            &cancel,
            None,
        );

        assert!(ok);
        let logs = sink.logs();
        assert!(logs.iter().any(|l| l.contains("25.0%")));
        let percents = sink.percents();
        assert_eq!(percents.first(), Some(&0.0));
        assert_eq!(percents.last(), Some(&100.0));
        assert!(percents.contains(&25.0));
    }

    #[test]
    fn test_stderr_is_merged_into_the_line_stream() {
        let sink = RecordingSink::default();
        let cancel = CancelFlag::new();
        let (program, args) = sh("echo out-line; echo err-line 1>&2; exit 0");

        assert!(run_streaming(
            &program,
            &args,
            &sink,
            ProgressState::single(),
            &cancel,
            None,
        ));
        let logs = sink.logs();
        assert!(logs.iter().any(|l| l == "out-line"));
        assert!(logs.iter().any(|l| l == "err-line"));
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let sink = RecordingSink::default();
        let cancel = CancelFlag::new();
        let (program, args) = sh("echo '[download] 50.0%'; exit 3");

        let ok = run_streaming(
            &program,
            &args,
            &sink,
            ProgressState::single(),
            &cancel,
            None,
        );

        assert!(!ok);
        // No final 100 on failure
        assert_eq!(sink.percents().last(), Some(&50.0));
    }

    #[test]
    fn test_missing_executable_reports_and_fails() {
        let sink = RecordingSink::default();
        let cancel = CancelFlag::new();

        let ok = run_streaming(
            "definitely-not-a-real-binary-xyz",
            &[],
            &sink,
            ProgressState::single(),
            &cancel,
            None,
        );

        assert!(!ok);
        assert!(sink
            .logs()
            .iter()
            .any(|l| l.contains("definitely-not-a-real-binary-xyz")));
        assert!(sink
            .statuses()
            .iter()
            .any(|s| s.contains("not found")));
    }

    #[test]
    fn test_cancellation_mid_stream() {
        let sink = RecordingSink::default();
        let cancel = CancelFlag::new();
        let (program, args) = sh("echo '[download] 10.0%'; sleep 10; echo '[download] 90.0%'");

        let canceller = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(300));
                cancel.cancel();
            })
        };

        let ok = run_streaming(
            &program,
            &args,
            &sink,
            ProgressState::single(),
            &cancel,
            None,
        );
        canceller.join().unwrap();

        assert!(!ok);
        assert!(sink.logs().iter().any(|l| l.contains("cancelled")));
        // Progress is reset, and the post-sleep line was never processed
        assert_eq!(sink.percents().last(), Some(&0.0));
        assert!(!sink.logs().iter().any(|l| l.contains("90.0%")));
    }
}

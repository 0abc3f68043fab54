// Helper for one-shot subprocess invocations

use std::process::Output;
use std::time::Duration;

use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Run a command to completion, capturing both streams, with a hard
/// timeout. The child is killed if the timeout fires or the future is
/// dropped.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, String> {
    let result = timeout(
        Duration::from_secs(timeout_secs),
        TokioCommand::new(program)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(output) => output.map_err(|e| format!("Failed to start {}: {}", program, e)),
        Err(_) => Err(format!("{} timed out after {}s", program, timeout_secs)),
    }
}

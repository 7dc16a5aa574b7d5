use std::process::{Command, Stdio};

use crate::foundation::error::{StoriesError, StoriesResult};

/// Run `cmd` through `sh -c` and fail unless it exits successfully.
///
/// The child's stdout is captured so it cannot leak into the JSON written on our stdout.
pub fn run_build_command(cmd: &str) -> StoriesResult<()> {
    tracing::info!(command = cmd, "building story binary");

    let output = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| StoriesError::build(format!("failed to spawn `sh -c {cmd}`: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StoriesError::build(format!(
            "`{cmd}` exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        tracing::debug!(output = %stdout.trim(), "build step output");
    }
    Ok(())
}

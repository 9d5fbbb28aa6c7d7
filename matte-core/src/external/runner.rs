//! Process runner for ffmpeg invocations.
//!
//! A thin synchronous wrapper: spawn, drain the event stream collecting
//! error-level stderr lines, then check the exit status. A non-zero exit
//! or spawn failure surfaces immediately with the exit code and captured
//! stderr; there are no retries.

use crate::error::{command_failed_error, command_start_error, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

/// Runs an ffmpeg command to completion.
///
/// `context` names the invocation (e.g. `ffmpeg (mask encode)`) so errors
/// identify which pass failed.
pub(crate) fn run_ffmpeg(mut cmd: FfmpegCommand, context: &str) -> CoreResult<()> {
    log::debug!("Running {context}: {cmd:?}");

    let mut child = cmd
        .spawn()
        .map_err(|e| command_start_error(context, format!("Failed to start: {e}")))?;

    let mut stderr_buffer = String::new();
    let events = child.iter().map_err(|e| {
        command_start_error(context, format!("Failed to read process output: {e}"))
    })?;
    for event in events {
        match event {
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line)
            | FfmpegEvent::Error(line) => {
                stderr_buffer.push_str(&line);
                stderr_buffer.push('\n');
            }
            _ => {}
        }
    }

    let status = child
        .wait()
        .map_err(|e| command_start_error(context, format!("Failed to wait for exit: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        log::error!(
            "{context} exited with {:?}: {}",
            status.code(),
            stderr_buffer.trim()
        );
        Err(command_failed_error(
            context,
            status,
            stderr_buffer.trim().to_string(),
        ))
    }
}

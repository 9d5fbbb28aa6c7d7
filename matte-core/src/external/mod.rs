//! Interactions with external CLI tools.
//!
//! Everything that touches ffmpeg or ffprobe lives here: the startup
//! dependency check, the duration probe, filter-graph construction, the
//! encode passes, and the process runner that all ffmpeg invocations go
//! through. The rest of the crate never spawns a process directly.

use crate::error::{command_start_error, CoreError, CoreResult};
use std::io;
use std::process::{Command, Stdio};

/// FFmpeg filter-graph construction and the two encode passes.
pub mod ffmpeg;

/// Duration probing via ffprobe, with a fixed fallback.
pub mod ffprobe;

/// The process runner wrapping ffmpeg invocations.
pub(crate) mod runner;

pub use ffmpeg::{chromakey_filter, encode_mask, encode_result, mask_filter_chain, result_filter_chain};
pub use ffprobe::{probe_duration_secs, FALLBACK_DURATION_SECS};

/// Checks that a required external command is available and executable.
///
/// Runs the command with `-version` and discards its output; only the fact
/// that it could be spawned matters. Used at startup for ffmpeg and
/// ffprobe, where a missing tool is fatal.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check for '{cmd_name}': {e}");
            Err(command_start_error(cmd_name, e))
        }
    }
}

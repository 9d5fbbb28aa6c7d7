//! Temporary file management utilities.
//!
//! Sampled frames and staged inputs are ephemeral per-request artifacts.
//! [`CleanupList`] gives them a single owner whose `Drop` implementation
//! removes every registered path on every exit path; a failed deletion is
//! logged and never escalated.

use std::path::{Path, PathBuf};

/// Returns a temporary file path with random suffix. Does not create the file.
pub fn create_temp_file_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    use rand::distributions::Alphanumeric;
    use rand::{thread_rng, Rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    let filename = format!("{prefix}_{random_suffix}.{extension}");
    dir.join(filename)
}

/// A list of paths deleted when the list is dropped.
///
/// Register every temp artifact a request creates; dropping the list at the
/// end of the request (success or failure) removes them all.
#[derive(Debug, Default)]
pub struct CleanupList {
    paths: Vec<PathBuf>,
}

impl CleanupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a path for deletion when this list is dropped.
    pub fn register(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Empties the list without deleting anything.
    ///
    /// For paths that should be removed only on failure: register them,
    /// run the fallible work, and disarm once it has succeeded.
    pub fn disarm(&mut self) {
        self.paths.clear();
    }
}

impl Drop for CleanupList {
    fn drop(&mut self) {
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            if let Err(e) = std::fs::remove_file(path) {
                log::warn!("Failed to remove temp file {}: {e}", path.display());
            } else {
                log::debug!("Removed temp file {}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn temp_file_paths_are_unique() {
        let dir = tempdir().unwrap();
        let a = create_temp_file_path(dir.path(), "frame", "rgb");
        let b = create_temp_file_path(dir.path(), "frame", "rgb");
        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "rgb");
    }

    #[test]
    fn cleanup_list_removes_registered_files() {
        let dir = tempdir().unwrap();
        let kept = dir.path().join("kept.webm");
        let staged = dir.path().join("staged.rgb");
        std::fs::write(&kept, b"output").unwrap();
        std::fs::write(&staged, b"frame").unwrap();

        {
            let mut cleanup = CleanupList::new();
            cleanup.register(staged.clone());
            // Registering a path that no longer exists must not panic.
            cleanup.register(dir.path().join("already_gone.rgb"));
        }

        assert!(!staged.exists());
        assert!(kept.exists());
    }

    #[test]
    fn disarmed_list_keeps_its_files() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("session_mask.webm");
        std::fs::write(&output, b"encoded").unwrap();

        {
            let mut cleanup = CleanupList::new();
            cleanup.register(output.clone());
            cleanup.disarm();
        }

        assert!(output.exists());
    }
}

//! Configuration structures and constants for the matte-core library.
//!
//! Instances of [`CoreConfig`] are created by consumers of the library
//! (like matte-server) and passed to [`crate::process_chroma_key`] to
//! control where artifacts land and how the result pass is rendered.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Constant Rate Factor used for both encode passes.
/// Range: 0-63 for libvpx, with lower values producing higher quality.
pub const DEFAULT_CRF: u32 = 30;

/// Video bitrate cap for the binary mask pass.
pub const MASK_VIDEO_BITRATE: &str = "1M";

/// Video bitrate cap for the transparent result pass.
pub const RESULT_VIDEO_BITRATE: &str = "2M";

/// Strategy for rendering the transparent result pass.
///
/// The two variants produce visually equivalent output for most players
/// but differ in how the keyed-out region is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultRenderStrategy {
    /// Composite the keyed frame onto an opaque black background with an
    /// overlay. More widely compatible; this is the default.
    #[default]
    OverlayBlack,

    /// Key directly to an alpha-bearing pixel format without compositing.
    AlphaDirect,
}

/// Main configuration structure for the matte-core library.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory where encoded output files will be saved.
    pub output_dir: PathBuf,

    /// Directory for staged inputs and sampled frames. Falls back to
    /// `output_dir` when unset.
    pub temp_dir: Option<PathBuf>,

    /// How the result pass renders the keyed-out region.
    pub result_render: ResultRenderStrategy,
}

impl CoreConfig {
    /// Creates a configuration with default rendering and no separate
    /// temp directory.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            temp_dir: None,
            result_render: ResultRenderStrategy::default(),
        }
    }

    /// The directory temp artifacts should be created in.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.as_deref().unwrap_or(&self.output_dir)
    }

    /// Ensures the configured directories exist and are usable.
    pub fn validate(&self) -> CoreResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(CoreError::Config("output_dir must not be empty".to_string()));
        }
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            CoreError::Config(format!(
                "output directory '{}' is not usable: {e}",
                self.output_dir.display()
            ))
        })?;
        if let Some(temp) = &self.temp_dir {
            std::fs::create_dir_all(temp).map_err(|e| {
                CoreError::Config(format!(
                    "temp directory '{}' is not usable: {e}",
                    temp.display()
                ))
            })?;
        }
        Ok(())
    }
}

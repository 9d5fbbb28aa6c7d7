//! Core library for chroma-key background removal driven by ffmpeg and ffprobe.
//!
//! This crate owns the decision logic of the matte service: resolving the
//! key color and tolerance parameters for the mask and result passes,
//! auto-detecting the key color from sampled frames, building ffmpeg
//! filter graphs, and running the external encodes. The pixel work itself
//! is done by ffmpeg; this crate only drives it.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use matte_core::{CoreConfig, ColorType, ProcessChromaKeyOptions, process_chroma_key};
//! use std::path::PathBuf;
//!
//! let config = CoreConfig::new(PathBuf::from("/srv/matte/outputs"));
//! config.validate().unwrap();
//!
//! let options = ProcessChromaKeyOptions {
//!     input_path: PathBuf::from("/tmp/clip.mp4"),
//!     output_dir: config.output_dir.clone(),
//!     color_type: ColorType::Green,
//!     result_overrides: None,
//!     mask_overrides: None,
//!     session_id: "demo".to_string(),
//!     auto_detect_color: true,
//!     progress: None,
//! };
//!
//! let outputs = process_chroma_key(&config, &options).unwrap();
//! println!("mask at {}", outputs.mask_path.display());
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod processing;
pub mod settings;
pub mod temp_files;

// Re-exports for public API
pub use config::{CoreConfig, ResultRenderStrategy};
pub use error::{CoreError, CoreResult};
pub use external::check_dependency;
pub use processing::detection::detect_chroma_color;
pub use processing::{
    process_chroma_key, ProcessChromaKeyOptions, ProcessedVideoResult, ProcessingPhase,
    ProgressCallback,
};
pub use settings::{
    resolve_settings, rgb_to_hex, ChromaKeySettings, ColorType, Rgb, SettingsOverrides,
};
pub use temp_files::CleanupList;

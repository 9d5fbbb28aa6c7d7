//! The per-request processing pipeline.
//!
//! Sequencing for one request: optional color detection, color precedence,
//! two independent settings resolutions, then the mask and result encode
//! passes. The two passes share no mutable state once settings are
//! resolved; a request runs to completion or fails on the first encode
//! error.

pub mod detection;

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::external::ffmpeg::{encode_mask, encode_result};
use crate::settings::{resolve_settings, ColorType, SettingsOverrides};
use crate::temp_files::CleanupList;
use log::{debug, info};
use std::fmt;
use std::path::PathBuf;

/// Phases reported through the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingPhase {
    DetectingColor,
    EncodingMask,
    EncodingResult,
}

impl fmt::Display for ProcessingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingPhase::DetectingColor => write!(f, "detecting key color"),
            ProcessingPhase::EncodingMask => write!(f, "encoding mask"),
            ProcessingPhase::EncodingResult => write!(f, "encoding result"),
        }
    }
}

/// Callback invoked at phase boundaries of the pipeline.
pub type ProgressCallback = Box<dyn Fn(ProcessingPhase) + Send + Sync>;

/// The resolved request bundle passed into the encoding stage.
///
/// Exists for the duration of one request; nothing here is persisted.
pub struct ProcessChromaKeyOptions {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub color_type: ColorType,
    /// Overrides applied to the result pass only.
    pub result_overrides: Option<SettingsOverrides>,
    /// Overrides applied to the mask pass only.
    pub mask_overrides: Option<SettingsOverrides>,
    pub session_id: String,
    pub auto_detect_color: bool,
    pub progress: Option<ProgressCallback>,
}

/// Paths to the two generated output files. Owned by the caller once
/// returned; the pipeline does not track them further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedVideoResult {
    pub mask_path: PathBuf,
    pub result_path: PathBuf,
}

fn report(options: &ProcessChromaKeyOptions, phase: ProcessingPhase) {
    info!("[{}] {phase}", options.session_id);
    if let Some(progress) = &options.progress {
        progress(phase);
    }
}

/// Removes the chroma-key background from a video, producing a binary
/// alpha mask and a transparency composite.
///
/// Color precedence, applied identically to both passes: a successful
/// auto-detection overrides a request-supplied color, which overrides the
/// preset default. Mask and result settings are resolved independently
/// from their own override sets.
pub fn process_chroma_key(
    config: &CoreConfig,
    options: &ProcessChromaKeyOptions,
) -> CoreResult<ProcessedVideoResult> {
    let mut result_overrides = options.result_overrides.clone().unwrap_or_default();
    let mut mask_overrides = options.mask_overrides.clone().unwrap_or_default();

    if options.auto_detect_color {
        report(options, ProcessingPhase::DetectingColor);
        if let Some(hex) = detection::detect_chroma_color(
            &options.input_path,
            options.color_type,
            config.temp_dir(),
        ) {
            info!("[{}] Using auto-detected color #{hex}", options.session_id);
            // A confirmed detection outranks a color carried in the request.
            result_overrides.color = Some(hex.clone());
            mask_overrides.color = Some(hex);
        }
    }

    let result_settings = resolve_settings(options.color_type, Some(&result_overrides));
    let mask_settings = resolve_settings(options.color_type, Some(&mask_overrides));
    debug!(
        "[{}] mask settings: {mask_settings:?}, result settings: {result_settings:?}",
        options.session_id
    );

    std::fs::create_dir_all(&options.output_dir)?;
    let mask_path = options
        .output_dir
        .join(format!("{}_mask.webm", options.session_id));
    let result_path = options
        .output_dir
        .join(format!("{}_result.webm", options.session_id));

    // ffmpeg opens the output before validating the filter graph, so a
    // failed encode can leave a zero-byte or partial file behind. Both
    // outputs ride a cleanup list disarmed only after both passes succeed.
    let mut failed_outputs = CleanupList::new();
    failed_outputs.register(mask_path.clone());
    failed_outputs.register(result_path.clone());

    report(options, ProcessingPhase::EncodingMask);
    encode_mask(&options.input_path, &mask_path, &mask_settings)?;

    report(options, ProcessingPhase::EncodingResult);
    encode_result(
        &options.input_path,
        &result_path,
        &result_settings,
        config.result_render,
    )?;
    failed_outputs.disarm();

    info!(
        "[{}] Processing complete. Mask: {}, Result: {}",
        options.session_id,
        mask_path.display(),
        result_path.display()
    );

    Ok(ProcessedVideoResult {
        mask_path,
        result_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn failed_encode_leaves_no_output_files() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("outputs");
        let config = CoreConfig::new(output_dir.clone());
        config.validate().unwrap();

        // A leftover from an earlier attempt must also be gone afterwards.
        let mask_path = output_dir.join("sess_mask.webm");
        std::fs::write(&mask_path, b"partial").unwrap();

        let options = ProcessChromaKeyOptions {
            input_path: dir.path().join("missing_input.mp4"),
            output_dir: output_dir.clone(),
            color_type: ColorType::Green,
            result_overrides: None,
            mask_overrides: None,
            session_id: "sess".to_string(),
            auto_detect_color: false,
            progress: None,
        };

        assert!(process_chroma_key(&config, &options).is_err());
        assert!(!mask_path.exists());
        assert!(!output_dir.join("sess_result.webm").exists());
    }
}

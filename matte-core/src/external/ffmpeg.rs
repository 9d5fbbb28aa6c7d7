//! FFmpeg filter-graph construction and the two encode passes.
//!
//! Each request produces two independent ffmpeg invocations from its two
//! resolved settings triples: a binary alpha mask and a transparency
//! composite. Both encode to VP8 in WebM; the mask pass drops audio, the
//! result pass re-encodes it to Vorbis and keeps alt-ref frames disabled
//! so the alpha channel survives.

use crate::config::{ResultRenderStrategy, DEFAULT_CRF, MASK_VIDEO_BITRATE, RESULT_VIDEO_BITRATE};
use crate::error::CoreResult;
use crate::external::runner::run_ffmpeg;
use crate::settings::ChromaKeySettings;
use ffmpeg_sidecar::command::FfmpegCommand;
use log::info;
use std::path::Path;

/// Renders the chromakey filter primitive for a resolved settings triple.
pub fn chromakey_filter(settings: &ChromaKeySettings) -> String {
    format!(
        "chromakey=0x{}:{}:{}",
        settings.color, settings.similarity, settings.blend
    )
}

/// Filter chain for the mask pass: key out the color, extract the alpha
/// channel, then hard-threshold luminance at the midpoint to force a
/// binary black/white mask.
pub fn mask_filter_chain(settings: &ChromaKeySettings) -> String {
    format!(
        "{},format=yuva420p,alphaextract,geq=lum='if(gt(lum(X,Y),128),255,0)',format=yuv420p",
        chromakey_filter(settings)
    )
}

/// Filter chain for the result pass, per the configured strategy.
pub fn result_filter_chain(
    settings: &ChromaKeySettings,
    strategy: ResultRenderStrategy,
) -> String {
    match strategy {
        ResultRenderStrategy::OverlayBlack => format!(
            "split[bg][fg];[bg]drawbox=c=black:t=fill[bg2];[fg]{}[fg2];[bg2][fg2]overlay=format=auto",
            chromakey_filter(settings)
        ),
        ResultRenderStrategy::AlphaDirect => {
            format!("{},format=yuva420p", chromakey_filter(settings))
        }
    }
}

/// Encodes the binary alpha mask video.
pub fn encode_mask(
    input_path: &Path,
    output_path: &Path,
    settings: &ChromaKeySettings,
) -> CoreResult<()> {
    info!(
        "Encoding mask pass: {} -> {}",
        input_path.display(),
        output_path.display()
    );

    let mut cmd = FfmpegCommand::new();
    cmd.input(input_path.to_string_lossy().as_ref())
        .args(["-vf", &mask_filter_chain(settings)])
        .args(["-c:v", "libvpx"])
        .args(["-crf", &DEFAULT_CRF.to_string()])
        .args(["-b:v", MASK_VIDEO_BITRATE])
        .arg("-an")
        .overwrite()
        .output(output_path.to_string_lossy().as_ref());

    run_ffmpeg(cmd, "ffmpeg (mask encode)")
}

/// Encodes the transparent composite video with audio passthrough.
pub fn encode_result(
    input_path: &Path,
    output_path: &Path,
    settings: &ChromaKeySettings,
    strategy: ResultRenderStrategy,
) -> CoreResult<()> {
    info!(
        "Encoding result pass: {} -> {}",
        input_path.display(),
        output_path.display()
    );

    let mut cmd = FfmpegCommand::new();
    cmd.input(input_path.to_string_lossy().as_ref())
        .args(["-vf", &result_filter_chain(settings, strategy)])
        .args(["-c:v", "libvpx"])
        .args(["-pix_fmt", "yuva420p"])
        // alt-ref frames corrupt the alpha channel in libvpx
        .args(["-auto-alt-ref", "0"])
        .args(["-crf", &DEFAULT_CRF.to_string()])
        .args(["-b:v", RESULT_VIDEO_BITRATE])
        .args(["-c:a", "libvorbis"])
        .overwrite()
        .output(output_path.to_string_lossy().as_ref());

    run_ffmpeg(cmd, "ffmpeg (result encode)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{resolve_settings, ColorType};

    #[test]
    fn chromakey_filter_renders_settings() {
        let settings = ChromaKeySettings {
            color: "1A2B3C".to_string(),
            similarity: 0.3,
            blend: 0.1,
        };
        assert_eq!(chromakey_filter(&settings), "chromakey=0x1A2B3C:0.3:0.1");
    }

    #[test]
    fn mask_chain_thresholds_luminance_at_midpoint() {
        let settings = resolve_settings(ColorType::Green, None);
        assert_eq!(
            mask_filter_chain(&settings),
            "chromakey=0x00FF00:0.01:0.08,format=yuva420p,alphaextract,\
             geq=lum='if(gt(lum(X,Y),128),255,0)',format=yuv420p"
        );
    }

    #[test]
    fn result_chain_overlay_composites_onto_black() {
        let settings = resolve_settings(ColorType::Blue, None);
        assert_eq!(
            result_filter_chain(&settings, ResultRenderStrategy::OverlayBlack),
            "split[bg][fg];[bg]drawbox=c=black:t=fill[bg2];\
             [fg]chromakey=0x0000FF:0.3:0.1[fg2];[bg2][fg2]overlay=format=auto"
        );
    }

    #[test]
    fn result_chain_alpha_direct_keeps_alpha_format() {
        let settings = resolve_settings(ColorType::Green, None);
        assert_eq!(
            result_filter_chain(&settings, ResultRenderStrategy::AlphaDirect),
            "chromakey=0x00FF00:0.01:0.08,format=yuva420p"
        );
    }
}

//! Automatic chroma-key color detection.
//!
//! Samples still frames at fixed points of the clip, finds each frame's
//! dominant non-extreme color through quantized histogram voting, then
//! tallies agreement across frames to pick one consistent key color.
//! Detection is best-effort: every failure here degrades to "no color
//! detected" and the pipeline falls back to the configured color.

use crate::error::CoreResult;
use crate::external::{ffprobe::probe_duration_secs, runner::run_ffmpeg};
use crate::settings::{ColorType, Rgb};
use crate::temp_files::{create_temp_file_path, CleanupList};
use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// Relative positions sampled for detection. Early and mid-clip points
/// avoid fade-in/fade-out artifacts at the very start and end.
const SAMPLE_PERCENTAGES: [f64; 3] = [5.0, 25.0, 50.0];

/// Frames are downscaled to this width before analysis.
const ANALYSIS_WIDTH: u32 = 320;

/// Channel bucket width; merges near-identical colors caused by
/// compression noise.
const QUANTIZE_STEP: u8 = 8;

/// Pixels with all channels below this are treated as shadow and skipped.
const DARK_CUTOFF: u8 = 30;

/// Pixels with all channels above this are treated as highlight and skipped.
const LIGHT_CUTOFF: u8 = 240;

/// Frequency tally that remembers insertion order, so ties resolve to the
/// first key seen. Used for both pixel buckets and per-frame hex votes to
/// keep tie-breaking deterministic.
struct OrderedTally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u32)>,
}

impl<K: Eq + Hash + Clone> OrderedTally<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// The key with the highest count, first-seen winning ties.
    fn winner(&self) -> Option<&K> {
        let mut best: Option<(&K, u32)> = None;
        for (key, count) in &self.entries {
            if best.map_or(true, |(_, best_count)| *count > best_count) {
                best = Some((key, *count));
            }
        }
        best.map(|(key, _)| key)
    }
}

/// Extracts one downscaled raw RGB24 frame at `percentage` of the clip's
/// duration into a uniquely named temp file, returning its path.
///
/// The caller owns the file and is responsible for deleting it.
pub fn extract_frame(
    input_path: &Path,
    percentage: f64,
    temp_dir: &Path,
) -> CoreResult<PathBuf> {
    let duration = probe_duration_secs(input_path);
    let timestamp = duration * percentage / 100.0;

    std::fs::create_dir_all(temp_dir)?;
    let frame_path = create_temp_file_path(temp_dir, "frame", "rgb");

    debug!(
        "Extracting frame at {percentage}% ({timestamp:.2}s) of {} to {}",
        input_path.display(),
        frame_path.display()
    );

    let mut cmd = FfmpegCommand::new();
    cmd.args(["-ss", &format!("{timestamp:.2}")])
        .input(input_path.to_string_lossy().as_ref())
        .args(["-frames:v", "1"])
        .args(["-vf", &format!("scale={ANALYSIS_WIDTH}:-1")])
        .args(["-f", "rawvideo"])
        .args(["-pix_fmt", "rgb24"])
        .overwrite()
        .output(frame_path.to_string_lossy().as_ref());

    run_ffmpeg(cmd, "ffmpeg (frame extraction)")?;
    Ok(frame_path)
}

/// Finds the dominant non-extreme color of a raw RGB24 frame file.
///
/// Returns `None` when no pixel qualifies (for instance a frame that is
/// entirely shadow or highlight).
pub fn dominant_color(frame_path: &Path) -> CoreResult<Option<Rgb>> {
    let data = std::fs::read(frame_path)?;
    Ok(dominant_color_in_frame(&data))
}

fn dominant_color_in_frame(data: &[u8]) -> Option<Rgb> {
    let mut buckets: OrderedTally<(u8, u8, u8)> = OrderedTally::new();

    for pixel in data.chunks_exact(3) {
        let (r, g, b) = (pixel[0], pixel[1], pixel[2]);

        // Near-black pixels are shadows, near-white ones are highlights;
        // neither is a plausible key screen sample.
        if r < DARK_CUTOFF && g < DARK_CUTOFF && b < DARK_CUTOFF {
            continue;
        }
        if r > LIGHT_CUTOFF && g > LIGHT_CUTOFF && b > LIGHT_CUTOFF {
            continue;
        }

        buckets.add((quantize(r), quantize(g), quantize(b)));
    }

    buckets.winner().map(|&(r, g, b)| Rgb { r, g, b })
}

fn quantize(value: u8) -> u8 {
    (value / QUANTIZE_STEP) * QUANTIZE_STEP
}

/// Detects the dominant key color of a video as a six-digit upper-case hex
/// string, or `None` when no sampled frame yields a qualifying color.
///
/// The color type is only used for logging; detection itself is
/// color-agnostic. Per-frame failures are logged and skipped, and every
/// temp frame created here is deleted before returning.
pub fn detect_chroma_color(
    input_path: &Path,
    color_type: ColorType,
    temp_dir: &Path,
) -> Option<String> {
    info!(
        "Auto-detecting {color_type} screen color from {}",
        input_path.display()
    );

    let mut cleanup = CleanupList::new();
    let mut votes: OrderedTally<String> = OrderedTally::new();

    for percentage in SAMPLE_PERCENTAGES {
        let frame_path = match extract_frame(input_path, percentage, temp_dir) {
            Ok(path) => path,
            Err(e) => {
                warn!("Frame extraction at {percentage}% failed: {e}");
                continue;
            }
        };
        cleanup.register(frame_path.clone());

        match dominant_color(&frame_path) {
            Ok(Some(rgb)) => {
                let hex = rgb.to_hex();
                debug!("Frame at {percentage}%: detected #{hex}");
                votes.add(hex);
            }
            Ok(None) => debug!("Frame at {percentage}%: no qualifying color"),
            Err(e) => warn!("Frame analysis at {percentage}% failed: {e}"),
        }
    }

    match votes.winner() {
        Some(hex) => {
            info!("Detected {color_type} screen color: #{hex}");
            Some(hex.clone())
        }
        None => {
            info!("Could not detect {color_type} screen color, keeping configured color");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(pixels: &[(u8, u8, u8)]) -> Vec<u8> {
        pixels.iter().flat_map(|&(r, g, b)| [r, g, b]).collect()
    }

    #[test]
    fn quantize_buckets_are_multiples_of_eight() {
        assert_eq!(quantize(103), 96);
        assert_eq!(quantize(250), 248);
        assert_eq!(quantize(12), 8);
        assert_eq!(quantize(0), 0);
        assert_eq!(quantize(255), 248);
    }

    #[test]
    fn extreme_pixels_are_excluded() {
        // All shadow and highlight: nothing qualifies.
        let frame = frame_of(&[(10, 10, 10), (29, 29, 29), (241, 241, 241), (255, 255, 255)]);
        assert_eq!(dominant_color_in_frame(&frame), None);
    }

    #[test]
    fn mixed_extreme_channels_still_qualify() {
        // Only one channel extreme: the pixel still votes.
        let frame = frame_of(&[(10, 250, 10)]);
        assert_eq!(
            dominant_color_in_frame(&frame),
            Some(Rgb { r: 8, g: 248, b: 8 })
        );
    }

    #[test]
    fn majority_bucket_wins() {
        let frame = frame_of(&[
            (103, 250, 12),
            (100, 248, 10), // same bucket as above
            (50, 60, 200),
        ]);
        assert_eq!(
            dominant_color_in_frame(&frame),
            Some(Rgb { r: 96, g: 248, b: 8 })
        );
    }

    #[test]
    fn empty_frame_yields_nothing() {
        assert_eq!(dominant_color_in_frame(&[]), None);
    }

    #[test]
    fn tally_majority_and_tie_break() {
        let mut votes: OrderedTally<String> = OrderedTally::new();
        votes.add("1A2B3C".to_string());
        votes.add("00FF00".to_string());
        votes.add("1A2B3C".to_string());
        assert_eq!(votes.winner().map(String::as_str), Some("1A2B3C"));

        // Tied counts resolve to the first key seen.
        let mut tied: OrderedTally<String> = OrderedTally::new();
        tied.add("0000FF".to_string());
        tied.add("00FF00".to_string());
        assert_eq!(tied.winner().map(String::as_str), Some("0000FF"));

        let empty: OrderedTally<String> = OrderedTally::new();
        assert_eq!(empty.winner(), None);
    }
}

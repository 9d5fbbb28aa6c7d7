//! Duration probing via ffprobe.
//!
//! Duration is only used to place sampling timestamps, so an approximate
//! answer is acceptable and a probe failure must never abort the pipeline.

use ffprobe::ffprobe;
use std::path::Path;

/// Duration assumed when ffprobe fails or returns something unparsable.
pub const FALLBACK_DURATION_SECS: f64 = 5.0;

/// Returns the container duration of `input_path` in seconds.
///
/// Any failure (probe exit, missing field, parse error, non-positive
/// value) yields [`FALLBACK_DURATION_SECS`] with a warning, never an error.
pub fn probe_duration_secs(input_path: &Path) -> f64 {
    log::debug!("Probing duration of {}", input_path.display());

    let duration = match ffprobe(input_path) {
        Ok(metadata) => metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok()),
        Err(err) => {
            log::warn!(
                "ffprobe failed for {}: {err:?}, assuming {FALLBACK_DURATION_SECS}s",
                input_path.display()
            );
            return FALLBACK_DURATION_SECS;
        }
    };

    match duration {
        Some(secs) if secs > 0.0 => secs,
        _ => {
            log::warn!(
                "Could not parse duration for {}, assuming {FALLBACK_DURATION_SECS}s",
                input_path.display()
            );
            FALLBACK_DURATION_SECS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_fallback() {
        let duration = probe_duration_secs(Path::new("definitely_not_here.mp4"));
        assert_eq!(duration, FALLBACK_DURATION_SECS);
    }
}

//! Request model and validation for the remove-background endpoints.
//!
//! Both the JSON and the multipart endpoint funnel into
//! [`RemoveBackgroundRequest`]; validation is shared so the two surfaces
//! cannot drift apart.

use matte_core::ColorType;
use serde::Deserialize;

/// Maximum accepted input video size.
pub const MAX_VIDEO_BYTES: usize = 500 * 1024 * 1024;

/// MIME types accepted for uploaded videos.
pub const ALLOWED_VIDEO_TYPES: [&str; 5] = [
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
];

pub const NO_VIDEO_PROVIDED: &str = "Either video file or video_url must be provided";
pub const BOTH_VIDEOS_PROVIDED: &str = "Provide either video file or video_url, not both";

/// Parameters common to both endpoints. Field names are snake_case with
/// camelCase aliases accepted for compatibility.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RemoveBackgroundRequest {
    #[serde(default, alias = "videoUrl")]
    pub video_url: Option<String>,

    /// Required; kept optional in the model so a missing value produces a
    /// clean 400 instead of a deserialization error.
    #[serde(default, alias = "colorType")]
    pub color_type: Option<ColorType>,

    /// Custom key color as six hex digits, with or without a leading '#'.
    #[serde(default)]
    pub color: Option<String>,

    /// Result pass similarity, 0.01 to 1.0.
    #[serde(default)]
    pub similarity: Option<f64>,

    /// Result pass blend, 0.0 to 1.0.
    #[serde(default)]
    pub blend: Option<f64>,

    /// Mask pass similarity, 0.01 to 1.0.
    #[serde(default, alias = "maskSimilarity")]
    pub mask_similarity: Option<f64>,

    /// Mask pass blend, 0.0 to 1.0.
    #[serde(default, alias = "maskBlend")]
    pub mask_blend: Option<f64>,

    #[serde(default, alias = "autoDetectColor")]
    pub auto_detect_color: bool,
}

/// Validates a request, returning the color type on success and the
/// client-facing error message on failure.
pub fn validate(req: &RemoveBackgroundRequest, has_upload: bool) -> Result<ColorType, String> {
    if !has_upload && req.video_url.is_none() {
        return Err(NO_VIDEO_PROVIDED.to_string());
    }
    if has_upload && req.video_url.is_some() {
        return Err(BOTH_VIDEOS_PROVIDED.to_string());
    }

    let Some(color_type) = req.color_type else {
        return Err("color_type must be 'green' or 'blue'".to_string());
    };

    if let Some(url) = &req.video_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("video_url must be an http(s) URL".to_string());
        }
    }

    if let Some(color) = &req.color {
        if !is_valid_hex_color(color) {
            return Err("color must be a valid 6-character hex color (e.g. 00FF00)".to_string());
        }
    }

    for (value, name) in [
        (req.similarity, "similarity"),
        (req.mask_similarity, "mask_similarity"),
    ] {
        if let Some(v) = value {
            if !(0.01..=1.0).contains(&v) {
                return Err(format!("{name} must be between 0.01 and 1.0"));
            }
        }
    }

    for (value, name) in [(req.blend, "blend"), (req.mask_blend, "mask_blend")] {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("{name} must be between 0.0 and 1.0"));
            }
        }
    }

    Ok(color_type)
}

/// Accepts six hex digits, optionally prefixed with '#'.
pub fn is_valid_hex_color(color: &str) -> bool {
    let digits = color.strip_prefix('#').unwrap_or(color);
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_allowed_video_type(content_type: &str) -> bool {
    ALLOWED_VIDEO_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green_url_request() -> RemoveBackgroundRequest {
        RemoveBackgroundRequest {
            video_url: Some("https://example.com/clip.mp4".to_string()),
            color_type: Some(ColorType::Green),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_minimal_url_request() {
        assert_eq!(validate(&green_url_request(), false), Ok(ColorType::Green));
    }

    #[test]
    fn rejects_missing_and_double_input() {
        let mut req = green_url_request();
        req.video_url = None;
        assert_eq!(validate(&req, false), Err(NO_VIDEO_PROVIDED.to_string()));

        let req = green_url_request();
        assert_eq!(validate(&req, true), Err(BOTH_VIDEOS_PROVIDED.to_string()));
    }

    #[test]
    fn rejects_missing_color_type() {
        let mut req = green_url_request();
        req.color_type = None;
        assert!(validate(&req, false).is_err());
    }

    #[test]
    fn rejects_non_http_urls() {
        let mut req = green_url_request();
        req.video_url = Some("ftp://example.com/clip.mp4".to_string());
        assert!(validate(&req, false).is_err());
    }

    #[test]
    fn validates_hex_colors() {
        assert!(is_valid_hex_color("00FF00"));
        assert!(is_valid_hex_color("#1a2b3c"));
        assert!(!is_valid_hex_color("00FF0"));
        assert!(!is_valid_hex_color("00FF0G"));
        assert!(!is_valid_hex_color(""));

        let mut req = green_url_request();
        req.color = Some("nothex".to_string());
        assert!(validate(&req, false).is_err());
    }

    #[test]
    fn validates_float_ranges() {
        let mut req = green_url_request();
        req.similarity = Some(0.005);
        assert!(validate(&req, false).is_err());

        let mut req = green_url_request();
        req.mask_blend = Some(1.5);
        assert!(validate(&req, false).is_err());

        let mut req = green_url_request();
        req.similarity = Some(0.01);
        req.blend = Some(0.0);
        req.mask_similarity = Some(1.0);
        req.mask_blend = Some(1.0);
        assert!(validate(&req, false).is_ok());
    }

    #[test]
    fn checks_upload_mime_types() {
        assert!(is_allowed_video_type("video/mp4"));
        assert!(is_allowed_video_type("video/x-matroska"));
        assert!(!is_allowed_video_type("image/png"));
    }

    #[test]
    fn deserializes_camel_case_aliases() {
        let req: RemoveBackgroundRequest = serde_json::from_str(
            r#"{"videoUrl": "https://example.com/a.mp4", "colorType": "blue",
                "maskSimilarity": 0.4, "autoDetectColor": true}"#,
        )
        .unwrap();
        assert_eq!(req.color_type, Some(ColorType::Blue));
        assert_eq!(req.mask_similarity, Some(0.4));
        assert!(req.auto_detect_color);
    }
}

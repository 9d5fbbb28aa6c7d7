//! Chroma-key parameter model and resolution.
//!
//! A request resolves into two fully independent [`ChromaKeySettings`]
//! instances, one per encode pass. Each resolution starts from the preset
//! for the requested [`ColorType`] and applies only the override fields
//! present for that pass; the mask and result settings are never derived
//! from one another.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two supported key screen colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    Green,
    Blue,
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorType::Green => write!(f, "green"),
            ColorType::Blue => write!(f, "blue"),
        }
    }
}

impl ColorType {
    /// The preset parameter triple for this screen color.
    pub fn preset(self) -> ChromaKeySettings {
        match self {
            // Low similarity keeps the key tight and avoids green spill
            // on the subject.
            ColorType::Green => ChromaKeySettings {
                color: "00FF00".to_string(),
                similarity: 0.01,
                blend: 0.08,
            },
            ColorType::Blue => ChromaKeySettings {
                color: "0000FF".to_string(),
                similarity: 0.3,
                blend: 0.1,
            },
        }
    }
}

/// Parameters for one ffmpeg chromakey pass.
///
/// Invariant: `color` is always exactly six upper-case hex digits with no
/// leading `#`. Instances are immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromaKeySettings {
    /// Hex color to remove, e.g. `00FF00`.
    pub color: String,
    /// Tolerance radius around the target color, 0.01 to 1.0.
    pub similarity: f64,
    /// Edge softness between keyed and non-keyed regions, 0.0 to 1.0.
    pub blend: f64,
}

/// Optional per-pass overrides applied on top of a preset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsOverrides {
    pub color: Option<String>,
    pub similarity: Option<f64>,
    pub blend: Option<f64>,
}

/// Resolves the settings for one pass: preset values for the color type,
/// replaced field-wise by whatever the overrides carry.
///
/// Call this once per pass with that pass's own override set. Supplying an
/// override for one pass has no effect on the other.
pub fn resolve_settings(
    color_type: ColorType,
    overrides: Option<&SettingsOverrides>,
) -> ChromaKeySettings {
    let base = color_type.preset();
    let Some(overrides) = overrides else {
        return base;
    };
    ChromaKeySettings {
        color: overrides
            .color
            .as_deref()
            .map(str::to_ascii_uppercase)
            .unwrap_or(base.color),
        similarity: overrides.similarity.unwrap_or(base.similarity),
        blend: overrides.blend.unwrap_or(base.blend),
    }
}

/// A sampled pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Renders this color as six upper-case hex digits.
    pub fn to_hex(self) -> String {
        rgb_to_hex(i32::from(self.r), i32::from(self.g), i32::from(self.b))
    }
}

/// Converts integer channels to a six-digit upper-case hex string,
/// clamping each channel to [0, 255]. Total over all inputs.
pub fn rgb_to_hex(r: i32, g: i32, b: i32) -> String {
    let clamp = |v: i32| v.clamp(0, 255) as u8;
    format!("{:02X}{:02X}{:02X}", clamp(r), clamp(g), clamp(b))
}

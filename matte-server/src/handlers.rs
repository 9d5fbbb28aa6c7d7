//! HTTP handlers for the remove-background API.
//!
//! Both endpoints stage an input file (upload or download), build the two
//! per-pass override sets, and hand off to `matte_core::process_chroma_key`
//! on the blocking pool. Staged inputs ride a `CleanupList` that is moved
//! into the blocking task, so they are deleted whether processing succeeds
//! or fails.

use crate::download;
use crate::error::ApiError;
use crate::request::{
    is_allowed_video_type, validate, RemoveBackgroundRequest, ALLOWED_VIDEO_TYPES,
    MAX_VIDEO_BYTES, NO_VIDEO_PROVIDED,
};
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use matte_core::{
    process_chroma_key, CleanupList, ColorType, CoreConfig, ProcessChromaKeyOptions,
    SettingsOverrides,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CoreConfig>,
    pub http: reqwest::Client,
}

#[derive(Debug, Serialize)]
pub struct ApiSuccess {
    pub success: bool,
    pub data: OutputLinks,
}

#[derive(Debug, Serialize)]
pub struct OutputLinks {
    pub mask: String,
    pub result: String,
    pub session_id: String,
}

struct Upload {
    data: Bytes,
    filename: Option<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "matte",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// `POST /api/v1/video/remove-background` (multipart/form-data).
///
/// Accepts a `video` file or a `video_url` field, plus the chroma-key
/// parameters as form fields.
pub async fn remove_background_multipart(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiSuccess>, ApiError> {
    let mut req = RemoveBackgroundRequest::default();
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "video" {
            if let Some(content_type) = field.content_type() {
                if !is_allowed_video_type(content_type) {
                    return Err(ApiError::BadRequest(format!(
                        "Invalid file type. Allowed: {}",
                        ALLOWED_VIDEO_TYPES.join(", ")
                    )));
                }
            }
            let filename = field.file_name().map(ToString::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
            if data.len() > MAX_VIDEO_BYTES {
                return Err(ApiError::BadRequest("File size exceeds 500MB limit".to_string()));
            }
            if !data.is_empty() {
                upload = Some(Upload { data, filename });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read field '{name}': {e}")))?;
        match name.as_str() {
            "color_type" | "colorType" => {
                req.color_type = match text.as_str() {
                    "green" => Some(ColorType::Green),
                    "blue" => Some(ColorType::Blue),
                    _ => None,
                };
            }
            "video_url" | "videoUrl" => req.video_url = non_empty(text),
            "color" => req.color = non_empty(text),
            "similarity" => req.similarity = Some(parse_float(&name, &text)?),
            "blend" => req.blend = Some(parse_float(&name, &text)?),
            "mask_similarity" | "maskSimilarity" => {
                req.mask_similarity = Some(parse_float(&name, &text)?);
            }
            "mask_blend" | "maskBlend" => req.mask_blend = Some(parse_float(&name, &text)?),
            "auto_detect_color" | "autoDetectColor" => {
                req.auto_detect_color = matches!(text.as_str(), "true" | "1" | "yes");
            }
            _ => {}
        }
    }

    let color_type = validate(&req, upload.is_some()).map_err(ApiError::BadRequest)?;
    run_pipeline(state, req, color_type, upload).await
}

/// `POST /api/v1/video/remove-background-json` (application/json).
///
/// Requires `video_url`; uploads go through the multipart endpoint.
pub async fn remove_background_json(
    State(state): State<AppState>,
    Json(req): Json<RemoveBackgroundRequest>,
) -> Result<Json<ApiSuccess>, ApiError> {
    let color_type = validate(&req, false).map_err(ApiError::BadRequest)?;
    run_pipeline(state, req, color_type, None).await
}

async fn run_pipeline(
    state: AppState,
    req: RemoveBackgroundRequest,
    color_type: ColorType,
    upload: Option<Upload>,
) -> Result<Json<ApiSuccess>, ApiError> {
    let session_id = Uuid::new_v4().to_string();
    let temp_dir = state.config.temp_dir().to_path_buf();
    tokio::fs::create_dir_all(&temp_dir)
        .await
        .map_err(|e| ApiError::Processing(format!("failed to prepare temp directory: {e}")))?;

    let mut cleanup = CleanupList::new();
    let input_path = match upload {
        Some(upload) => {
            let ext = upload
                .filename
                .as_deref()
                .and_then(extension_of)
                .unwrap_or("mp4");
            let path = temp_dir.join(format!("{session_id}_input.{ext}"));
            tracing::info!(session = %session_id, "staging uploaded file ({} bytes)", upload.data.len());
            tokio::fs::write(&path, &upload.data)
                .await
                .map_err(|e| ApiError::Processing(format!("failed to stage upload: {e}")))?;
            cleanup.register(path.clone());
            path
        }
        None => {
            let Some(url) = req.video_url.clone() else {
                return Err(ApiError::BadRequest(NO_VIDEO_PROVIDED.to_string()));
            };
            let ext = extension_of(&url).unwrap_or("mp4");
            let path = temp_dir.join(format!("{session_id}_input.{ext}"));
            cleanup.register(path.clone());
            download::download_video(&state.http, &url, &path, MAX_VIDEO_BYTES as u64)
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to download video: {e:#}")))?;
            path
        }
    };

    // The resolver normalizes case; the leading '#' is stripped here.
    let color = req
        .color
        .as_deref()
        .map(|c| c.trim_start_matches('#').to_string());
    let result_overrides = SettingsOverrides {
        color: color.clone(),
        similarity: req.similarity,
        blend: req.blend,
    };
    let mask_overrides = SettingsOverrides {
        color,
        similarity: req.mask_similarity,
        blend: req.mask_blend,
    };

    let progress_session = session_id.clone();
    let options = ProcessChromaKeyOptions {
        input_path,
        output_dir: state.config.output_dir.clone(),
        color_type,
        result_overrides: Some(result_overrides),
        mask_overrides: Some(mask_overrides),
        session_id: session_id.clone(),
        auto_detect_color: req.auto_detect_color,
        progress: Some(Box::new(move |phase| {
            tracing::info!(session = %progress_session, "{phase}");
        })),
    };

    let config = state.config.clone();
    let outputs = tokio::task::spawn_blocking(move || {
        // The staged input must outlive both encode passes; dropping the
        // list afterwards removes it on success and failure alike.
        let _cleanup = cleanup;
        process_chroma_key(&config, &options)
    })
    .await
    .map_err(|e| ApiError::Processing(format!("processing task failed: {e}")))??;

    Ok(Json(ApiSuccess {
        success: true,
        data: OutputLinks {
            mask: output_url(&outputs.mask_path),
            result: output_url(&outputs.result_path),
            session_id,
        },
    }))
}

fn output_url(path: &Path) -> String {
    match path.file_name() {
        Some(name) => format!("/outputs/{}", name.to_string_lossy()),
        None => String::new(),
    }
}

fn extension_of(name: &str) -> Option<&str> {
    // URLs carry query strings and fragments after the path.
    let name = name.split(['?', '#']).next().unwrap_or(name);
    Path::new(name).extension().and_then(|e| e.to_str())
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

fn parse_float(name: &str, text: &str) -> Result<f64, ApiError> {
    text.parse::<f64>()
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_urls_are_rooted_at_outputs() {
        let path = Path::new("/srv/matte/outputs/abc_mask.webm");
        assert_eq!(output_url(path), "/outputs/abc_mask.webm");
    }

    #[test]
    fn extension_extraction_handles_urls_and_filenames() {
        assert_eq!(extension_of("clip.mov"), Some("mov"));
        assert_eq!(extension_of("https://example.com/video.webm"), Some("webm"));
        assert_eq!(
            extension_of("https://example.com/clip.webm?sig=abc#t=5"),
            Some("webm")
        );
        assert_eq!(extension_of("no_extension"), None);
    }
}

use crate::config::Config;
use crate::error::WorkshopError;
use crate::types::{FileContents, FileUpload, ImageRef, StoredFile, UploadedFile};
use crate::validation::format_file_size;
use crate::AppState;
use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::collections::HashMap;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const SCREENSHOT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];
const MAX_PREVIEW_DIMENSION: u32 = 4000;

/// What an upload is for; each kind has its own acceptance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    PaymentScreenshot,
    ProfilePicture,
}

/// Decode the base64 payload of an HTTP upload. A `data:` URL prefix is accepted.
pub fn decode_upload(upload: &FileUpload) -> Result<UploadedFile, WorkshopError> {
    let data = match upload.file_data.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => upload.file_data.as_str(),
    };
    let bytes = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|_| WorkshopError::Validation("Invalid base64 file data".to_string()))?;

    Ok(UploadedFile {
        name: upload.file_name.clone(),
        content_type: upload.content_type.to_ascii_lowercase(),
        bytes,
    })
}

pub fn validate_upload(file: &UploadedFile, kind: UploadKind) -> Result<(), WorkshopError> {
    match kind {
        UploadKind::PaymentScreenshot => {
            if !SCREENSHOT_TYPES.contains(&file.content_type.as_str()) {
                return Err(WorkshopError::Validation(
                    "Please upload a valid image (JPEG, JPG, or PNG)".to_string(),
                ));
            }
        }
        UploadKind::ProfilePicture => {
            if !file.content_type.starts_with("image/") {
                return Err(WorkshopError::Validation("Please select an image file".to_string()));
            }
        }
    }

    if file.bytes.is_empty() {
        return Err(WorkshopError::Validation("File is empty".to_string()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(WorkshopError::Validation(format!(
            "File size must be less than {}",
            format_file_size(MAX_UPLOAD_BYTES)
        )));
    }

    // The declared type comes from the client; check the bytes too.
    let sniffed = image::guess_format(&file.bytes).ok();
    match (kind, sniffed) {
        (UploadKind::PaymentScreenshot, Some(ImageFormat::Jpeg | ImageFormat::Png)) => Ok(()),
        (UploadKind::PaymentScreenshot, _) => Err(WorkshopError::Validation(
            "File contents are not a JPEG or PNG image".to_string(),
        )),
        (UploadKind::ProfilePicture, Some(_)) => Ok(()),
        (UploadKind::ProfilePicture, None) => Err(WorkshopError::Validation(
            "File contents are not a recognised image".to_string(),
        )),
    }
}

/// Validate and store an upload.
pub async fn upload_file(
    state: &AppState,
    file: &UploadedFile,
    kind: UploadKind,
) -> Result<StoredFile, WorkshopError> {
    validate_upload(file, kind)?;
    let stored = state.blobs.put(file).await?;
    tracing::info!("Uploaded {:?} {} as {}", kind, stored.name, stored.id);
    Ok(stored)
}

/// Delete a blob; failure is logged and swallowed.
pub async fn delete_file_best_effort(state: &AppState, file_id: &str) {
    if let Err(e) = state.blobs.delete(file_id).await {
        tracing::warn!("Failed to delete file {}: {:?}", file_id, e);
    }
}

pub async fn view_file(state: &AppState, file_id: &str) -> Result<FileContents, WorkshopError> {
    state.blobs.get(file_id).await
}

/// Fetch a stored image and render its JPEG preview.
pub async fn preview_file(
    state: &AppState,
    file_id: &str,
    params: &PreviewParams,
) -> Result<Vec<u8>, WorkshopError> {
    let contents = state.blobs.get(file_id).await?;
    render_preview(&contents.bytes, params)
}

// ========== URLS ==========
pub fn view_url(config: &Config, file_id: &str) -> String {
    format!("{}/files/{}/view", config.api_base_url.trim_end_matches('/'), file_id)
}

pub fn preview_url(config: &Config, file_id: &str, params: &PreviewParams) -> String {
    let mut query = vec![];
    if let Some(width) = params.width {
        query.push(format!("width={}", width));
    }
    if let Some(height) = params.height {
        query.push(format!("height={}", height));
    }
    query.push(format!("gravity={}", params.gravity.as_str()));
    query.push(format!("quality={}", params.quality));

    format!(
        "{}/files/{}/preview?{}",
        config.api_base_url.trim_end_matches('/'),
        file_id,
        query.join("&")
    )
}

/// Displayable URL for an image reference. Stored images get the default preview.
pub fn image_url(config: &Config, image: &ImageRef) -> String {
    match image {
        ImageRef::External { url } => url.clone(),
        ImageRef::Stored { file_id } => preview_url(config, file_id, &PreviewParams::default()),
    }
}

// ========== PREVIEWS ==========
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Gravity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "center" => Some(Gravity::Center),
            "top-left" => Some(Gravity::TopLeft),
            "top" => Some(Gravity::Top),
            "top-right" => Some(Gravity::TopRight),
            "left" => Some(Gravity::Left),
            "right" => Some(Gravity::Right),
            "bottom-left" => Some(Gravity::BottomLeft),
            "bottom" => Some(Gravity::Bottom),
            "bottom-right" => Some(Gravity::BottomRight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::TopLeft => "top-left",
            Gravity::Top => "top",
            Gravity::TopRight => "top-right",
            Gravity::Left => "left",
            Gravity::Right => "right",
            Gravity::BottomLeft => "bottom-left",
            Gravity::Bottom => "bottom",
            Gravity::BottomRight => "bottom-right",
        }
    }

    /// Crop offset given the surplus width and height.
    fn offset(&self, extra_x: u32, extra_y: u32) -> (u32, u32) {
        let x = match self {
            Gravity::TopLeft | Gravity::Left | Gravity::BottomLeft => 0,
            Gravity::TopRight | Gravity::Right | Gravity::BottomRight => extra_x,
            _ => extra_x / 2,
        };
        let y = match self {
            Gravity::TopLeft | Gravity::Top | Gravity::TopRight => 0,
            Gravity::BottomLeft | Gravity::Bottom | Gravity::BottomRight => extra_y,
            _ => extra_y / 2,
        };
        (x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub gravity: Gravity,
    pub quality: u8,
}

impl Default for PreviewParams {
    fn default() -> Self {
        Self {
            width: Some(400),
            height: Some(400),
            gravity: Gravity::Center,
            quality: 100,
        }
    }
}

impl PreviewParams {
    /// Parse `width`, `height`, `gravity` and `quality` query parameters.
    /// Without either dimension the default 400x400 box is used.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, WorkshopError> {
        let defaults = Self::default();
        let width = parse_dimension(query, "width")?;
        let height = parse_dimension(query, "height")?;
        let (width, height) = if width.is_none() && height.is_none() {
            (defaults.width, defaults.height)
        } else {
            (width, height)
        };

        let gravity = match query.get("gravity") {
            Some(raw) => Gravity::parse(raw)
                .ok_or_else(|| WorkshopError::Validation(format!("Unknown gravity: {}", raw)))?,
            None => defaults.gravity,
        };

        let quality = match query.get("quality") {
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or_else(|| {
                    WorkshopError::Validation("quality must be between 1 and 100".to_string())
                })?,
            None => defaults.quality,
        };

        Ok(Self {
            width,
            height,
            gravity,
            quality,
        })
    }
}

fn parse_dimension(
    query: &HashMap<String, String>,
    name: &str,
) -> Result<Option<u32>, WorkshopError> {
    query
        .get(name)
        .map(|raw| {
            raw.parse::<u32>()
                .ok()
                .filter(|v| (1..=MAX_PREVIEW_DIMENSION).contains(v))
                .ok_or_else(|| {
                    WorkshopError::Validation(format!(
                        "{} must be between 1 and {}",
                        name, MAX_PREVIEW_DIMENSION
                    ))
                })
        })
        .transpose()
}

/// Resize and re-encode as JPEG. Both dimensions crop to fill the box,
/// one dimension keeps the aspect ratio.
pub fn render_preview(image_bytes: &[u8], params: &PreviewParams) -> Result<Vec<u8>, WorkshopError> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| WorkshopError::Validation(format!("Failed to load image: {}", e)))?;

    let resized = match (params.width, params.height) {
        (Some(width), Some(height)) => fill(&img, width, height, params.gravity),
        (Some(width), None) => img.resize(width, u32::MAX, FilterType::Lanczos3),
        (None, Some(height)) => img.resize(u32::MAX, height, FilterType::Lanczos3),
        (None, None) => img,
    };

    let rgb = resized.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, params.quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| WorkshopError::backend("Failed to encode JPEG", e))?;

    Ok(buf)
}

fn fill(img: &DynamicImage, width: u32, height: u32, gravity: Gravity) -> DynamicImage {
    let (orig_width, orig_height) = img.dimensions();
    let scale = f64::max(
        width as f64 / orig_width as f64,
        height as f64 / orig_height as f64,
    );
    let scaled_width = ((orig_width as f64 * scale).ceil() as u32).max(width);
    let scaled_height = ((orig_height as f64 * scale).ceil() as u32).max(height);

    let scaled = img.resize_exact(scaled_width, scaled_height, FilterType::Lanczos3);
    let (x, y) = gravity.offset(scaled_width - width, scaled_height - height);
    scaled.crop_imm(x, y, width, height)
}

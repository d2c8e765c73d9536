// ABOUTME: Error types for loading, decoding and rendering images
// ABOUTME: Every failure funnels into one of these variants before reaching the UI

use image::error::{ImageFormatHint, UnsupportedErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{reference}: {reason}")]
    SourceUnavailable { reference: String, reason: String },

    #[error("{reference}: image: {reason}")]
    DecodeFailed { reference: String, reason: String },

    #[error("{reference}: unsupported image: {reason}")]
    Unsupported { reference: String, reason: String },

    #[error("{reference}: image too large: {size} bytes (max: {limit} bytes)")]
    TooLarge {
        reference: String,
        size: u64,
        limit: u64,
    },
}

impl ImageError {
    pub fn source_unavailable(reference: &str, reason: impl ToString) -> Self {
        ImageError::SourceUnavailable {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn decode_failed(reference: &str, reason: impl ToString) -> Self {
        ImageError::DecodeFailed {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Classify an `image` crate failure for the given reference
    pub fn from_image(reference: &str, err: image::ImageError) -> Self {
        match err {
            // An unrecognized signature means the bytes are not an image at all
            image::ImageError::Unsupported(e)
                if matches!(
                    e.kind(),
                    UnsupportedErrorKind::Format(ImageFormatHint::Unknown)
                ) =>
            {
                ImageError::decode_failed(reference, e)
            }
            image::ImageError::Unsupported(e) => ImageError::Unsupported {
                reference: reference.to_string(),
                reason: e.to_string(),
            },
            image::ImageError::IoError(e) => ImageError::source_unavailable(reference, e),
            other => ImageError::decode_failed(reference, other),
        }
    }

    /// Classify a `reqwest` failure for the given URL
    pub fn from_http(reference: &str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if let Some(status) = err.status() {
            format!("HTTP status {}", status)
        } else {
            err.to_string()
        };
        ImageError::source_unavailable(reference, reason)
    }

    pub fn reference(&self) -> &str {
        match self {
            ImageError::SourceUnavailable { reference, .. }
            | ImageError::DecodeFailed { reference, .. }
            | ImageError::Unsupported { reference, .. }
            | ImageError::TooLarge { reference, .. } => reference,
        }
    }

    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            ImageError::SourceUnavailable { .. } => {
                Some("Check that the path exists or that the URL is reachable")
            }
            ImageError::DecodeFailed { .. } => {
                Some("The file does not look like a PNG, JPEG, GIF, WebP, BMP or TIFF image")
            }
            ImageError::TooLarge { .. } => {
                Some("Raise the limit with IMGCAT_MAX_IMAGE_SIZE (e.g. IMGCAT_MAX_IMAGE_SIZE=100MB)")
            }
            ImageError::Unsupported { .. } => None,
        }
    }
}

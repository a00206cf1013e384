use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Smallest selection edge (CSS pixels) a caller should forward to the crop step
pub const MIN_DIM: f64 = 10.0;

/// User-drawn rectangle in CSS pixels, relative to the viewport at gesture end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl SelectionRect {
    /// Selection at 1x scale with no scroll offset
    pub fn unscaled(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            device_pixel_ratio: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Both edges strictly larger than `min_dim`
    pub fn exceeds(&self, min_dim: f64) -> bool {
        self.width > min_dim && self.height > min_dim
    }
}

/// Full-viewport PNG at device-pixel resolution
#[derive(Debug, Clone)]
pub struct FrameCapture(pub Vec<u8>);

impl FrameCapture {
    pub fn new(png: Vec<u8>) -> Self {
        Self(png)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// PNG restricted to the selected region, sized in CSS pixels
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CroppedImage {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Timeout,
    Unauthorized,
    RateLimitedOrServerError,
    MalformedResponse,
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::RateLimitedOrServerError => "rate limited or server error",
            FailureKind::MalformedResponse => "malformed response",
            FailureKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Outcome of one extraction request, including every expected failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionResult {
    Success(String),
    Empty,
    Failure { kind: FailureKind, message: String },
}

impl ExtractionResult {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ExtractionResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractionResult::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Line shown in the result card
    pub fn display_text(&self) -> String {
        match self {
            ExtractionResult::Success(text) => text.clone(),
            ExtractionResult::Empty => {
                "Text extraction completed but no text found in image.".to_string()
            }
            ExtractionResult::Failure { kind, message } => {
                format!("Error extracting text: {kind}: {message}")
            }
        }
    }
}

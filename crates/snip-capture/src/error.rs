use thiserror::Error;

/// Selection math that cannot be mapped onto the frame
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Selection resolves to a non-positive source size ({width} x {height} device px)")]
    NonPositiveExtent { width: f64, height: f64 },

    #[error("Invalid device pixel ratio {0}")]
    InvalidScale(f64),

    #[error("Selection coordinates are not finite")]
    NonFinite,

    #[error("Selection of {width} x {height} css px exceeds the {max_width} x {max_height} viewport")]
    ExceedsFrame {
        width: f64,
        height: f64,
        max_width: u32,
        max_height: u32,
    },

    #[error(
        "Source rectangle at ({x}, {y}) size {width} x {height} lies outside the {frame_width} x {frame_height} frame"
    )]
    OutsideFrame {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        frame_width: u32,
        frame_height: u32,
    },
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Screenshot provider failure, passed through as reported
    #[error("Capture unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to decode frame: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Crop task failed: {0}")]
    Task(String),
}

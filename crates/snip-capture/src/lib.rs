mod crop;
mod error;
mod geometry;
mod provider;
mod session;

pub use crop::{crop, crop_async, encode_png};
pub use error::{CaptureError, GeometryError};
pub use geometry::{PixelRect, SourceRect};
pub use provider::{PngFileProvider, ScreenshotProvider, capture_selection};
pub use session::{SelectionSession, ViewportMetrics};

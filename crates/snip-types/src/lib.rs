pub mod types;

pub use types::{
    CroppedImage, ExtractionResult, FailureKind, FrameCapture, MIN_DIM, SelectionRect,
};

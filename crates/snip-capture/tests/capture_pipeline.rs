//! Selection-to-frame mapping through the public capture API

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use snip_capture::{
    CaptureError, PngFileProvider, ScreenshotProvider, SelectionSession, SourceRect,
    ViewportMetrics, capture_selection, crop, encode_png,
};
use snip_types::{FrameCapture, SelectionRect};

/// Device-pixel frame where every `scale x scale` block holds its CSS coordinates
fn hidpi_frame(css_width: u32, css_height: u32, scale: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(css_width * scale, css_height * scale, |x, y| {
        Rgba([(x / scale) as u8, (y / scale) as u8, 0, 255])
    });
    encode_png(&image).unwrap()
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(png, ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

fn selection(left: f64, top: f64, width: f64, height: f64, dpr: f64, scroll_y: f64) -> SelectionRect {
    SelectionRect {
        left,
        top,
        width,
        height,
        device_pixel_ratio: dpr,
        scroll_x: 0.0,
        scroll_y,
    }
}

#[test]
fn test_output_size_is_independent_of_ratio() {
    for scale in [1u32, 2, 3] {
        let rect = selection(5.0, 6.0, 20.0, 12.0, scale as f64, 0.0);

        let source = SourceRect::from_selection(&rect).unwrap();
        assert_eq!(source.width, 20.0 * scale as f64);
        assert_eq!(source.height, 12.0 * scale as f64);

        let cropped = crop(FrameCapture::new(hidpi_frame(64, 48, scale)), rect).unwrap();
        assert_eq!((cropped.width, cropped.height), (20, 12));

        let out = decode(&cropped.png);
        for y in 0..12 {
            for x in 0..20 {
                assert_eq!(
                    out.get_pixel(x, y),
                    &Rgba([5 + x as u8, 6 + y as u8, 0, 255]),
                    "scale {scale} at ({x}, {y})"
                );
            }
        }
    }
}

#[test]
fn test_scroll_shifts_source_rows() {
    let scale = 2u32;
    let frame = hidpi_frame(64, 64, scale);
    let delta = 4.0;

    let still = crop(
        FrameCapture::new(frame.clone()),
        selection(3.0, 6.0, 16.0, 16.0, scale as f64, 0.0),
    )
    .unwrap();
    let scrolled = crop(
        FrameCapture::new(frame),
        selection(3.0, 6.0, 16.0, 16.0, scale as f64, delta),
    )
    .unwrap();

    let still = decode(&still.png);
    let scrolled = decode(&scrolled.png);
    for y in 0..16 {
        let expected_row = still.get_pixel(0, y)[1] as f64 + delta;
        assert_eq!(scrolled.get_pixel(0, y)[1] as f64, expected_row);
        assert_eq!(scrolled.get_pixel(0, y)[0], still.get_pixel(0, y)[0]);
    }
}

#[test]
fn test_session_feeds_crop() {
    let mut session = SelectionSession::default();
    session.begin(40.0, 30.0);
    session.drag_to(10.0, 8.0);
    let rect = session
        .finish(ViewportMetrics {
            device_pixel_ratio: 2.0,
            scroll_x: 1.0,
            scroll_y: 0.0,
        })
        .unwrap();

    let cropped = crop(FrameCapture::new(hidpi_frame(64, 64, 2)), rect).unwrap();
    assert_eq!((cropped.width, cropped.height), (30, 22));
    assert_eq!(decode(&cropped.png).get_pixel(0, 0), &Rgba([11, 8, 0, 255]));
}

struct DeniedProvider;

#[async_trait]
impl ScreenshotProvider for DeniedProvider {
    async fn capture_visible(&self) -> Result<FrameCapture, CaptureError> {
        Err(CaptureError::Unavailable("permission denied".to_string()))
    }
}

#[tokio::test]
async fn test_provider_failure_passes_through() {
    let err = capture_selection(&DeniedProvider, selection(0.0, 0.0, 20.0, 20.0, 1.0, 0.0))
        .await
        .unwrap_err();
    match err {
        CaptureError::Unavailable(message) => assert_eq!(message, "permission denied"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_file_provider_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    std::fs::write(&path, hidpi_frame(32, 32, 1)).unwrap();

    let provider = PngFileProvider::new(&path);
    let cropped = capture_selection(&provider, selection(2.0, 3.0, 12.0, 14.0, 1.0, 0.0))
        .await
        .unwrap();
    assert_eq!((cropped.width, cropped.height), (12, 14));

    let missing = PngFileProvider::new(dir.path().join("missing.png"));
    assert!(matches!(
        missing.capture_visible().await,
        Err(CaptureError::Unavailable(_))
    ));
}

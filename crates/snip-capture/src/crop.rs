use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use snip_types::{CroppedImage, FrameCapture, SelectionRect};

use crate::error::{CaptureError, GeometryError};
use crate::geometry::SourceRect;

/// Crop `frame` to the selection and resample it back to CSS-pixel size.
///
/// Output is `ceil(width) x ceil(height)`. Each destination pixel takes the
/// frame pixel under its centre (nearest neighbour); centres that fall
/// outside the clamped source rectangle stay transparent.
pub fn crop(frame: FrameCapture, rect: SelectionRect) -> Result<CroppedImage, CaptureError> {
    let source = SourceRect::from_selection(&rect)?;
    let dest = blit(frame, &rect, &source)?;

    let png = encode_png(&dest)?;
    tracing::debug!(
        "Cropped {}x{} css px from device rect ({:.1}, {:.1}) {:.1}x{:.1}",
        dest.width(),
        dest.height(),
        source.x,
        source.y,
        source.width,
        source.height
    );

    Ok(CroppedImage {
        width: dest.width(),
        height: dest.height(),
        png,
    })
}

/// [`crop`] on the blocking pool so the caller's runtime keeps running
pub async fn crop_async(
    frame: FrameCapture,
    rect: SelectionRect,
) -> Result<CroppedImage, CaptureError> {
    tokio::task::spawn_blocking(move || crop(frame, rect))
        .await
        .map_err(|e| CaptureError::Task(e.to_string()))?
}

// The decoded frame lives only inside this call.
fn blit(
    frame: FrameCapture,
    rect: &SelectionRect,
    source: &SourceRect,
) -> Result<RgbaImage, CaptureError> {
    let bitmap = image::load_from_memory_with_format(frame.as_bytes(), ImageFormat::Png)
        .map_err(CaptureError::Decode)?
        .to_rgba8();
    drop(frame);

    let (frame_width, frame_height) = bitmap.dimensions();
    let bounds = source.clamp_to(frame_width, frame_height)?;

    // A selection never covers more than the viewport the frame was taken of
    let max_width = (frame_width as f64 / source.scale).ceil() as u32;
    let max_height = (frame_height as f64 / source.scale).ceil() as u32;
    let dest_width = (rect.width.ceil() as u32).max(1);
    let dest_height = (rect.height.ceil() as u32).max(1);
    if dest_width > max_width || dest_height > max_height {
        return Err(GeometryError::ExceedsFrame {
            width: rect.width,
            height: rect.height,
            max_width,
            max_height,
        }
        .into());
    }

    let x_range = bounds.x as f64..(bounds.x + bounds.width) as f64;
    let y_range = bounds.y as f64..(bounds.y + bounds.height) as f64;
    let mut dest = RgbaImage::new(dest_width, dest_height);

    for dy in 0..dest_height {
        let sy = (source.y + (dy as f64 + 0.5) * source.scale).floor();
        if !y_range.contains(&sy) {
            continue;
        }

        for dx in 0..dest_width {
            let sx = (source.x + (dx as f64 + 0.5) * source.scale).floor();
            if !x_range.contains(&sx) {
                continue;
            }

            dest.put_pixel(dx, dy, *bitmap.get_pixel(sx as u32, sy as u32));
        }
    }

    Ok(dest)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(CaptureError::Encode)?;
    Ok(buffer)
}

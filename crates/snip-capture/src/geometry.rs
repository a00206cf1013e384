use snip_types::SelectionRect;

use crate::error::GeometryError;

/// Selection mapped into device pixels of the full-viewport frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Integer frame region, `x..x + width` by `y..y + height`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn from_selection(rect: &SelectionRect) -> Result<Self, GeometryError> {
        let scale = rect.device_pixel_ratio;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::InvalidScale(scale));
        }

        let values = [
            rect.left,
            rect.top,
            rect.width,
            rect.height,
            rect.scroll_x,
            rect.scroll_y,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let source = Self {
            x: (rect.left + rect.scroll_x) * scale,
            y: (rect.top + rect.scroll_y) * scale,
            width: rect.width * scale,
            height: rect.height * scale,
            scale,
        };

        if source.width <= 0.0 || source.height <= 0.0 {
            return Err(GeometryError::NonPositiveExtent {
                width: source.width,
                height: source.height,
            });
        }

        Ok(source)
    }

    /// Floor the origin, ceil the far edge, then clip to the frame.
    ///
    /// Only a region with no area left after clipping is an error.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Result<PixelRect, GeometryError> {
        let x0 = self.x.floor().max(0.0);
        let y0 = self.y.floor().max(0.0);
        let x1 = (self.x + self.width).ceil().min(frame_width as f64);
        let y1 = (self.y + self.height).ceil().min(frame_height as f64);

        if x1 <= x0 || y1 <= y0 {
            return Err(GeometryError::OutsideFrame {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                frame_width,
                frame_height,
            });
        }

        Ok(PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

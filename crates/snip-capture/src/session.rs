use snip_types::{MIN_DIM, SelectionRect};

/// Viewport state sampled when the drag finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub device_pixel_ratio: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

/// One drag gesture, from mouse-down to mouse-up.
///
/// A fresh session is built per gesture and dropped once it yields a
/// [`SelectionRect`] or is cancelled.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    start: (f64, f64),
    end: (f64, f64),
    dragging: bool,
    min_dim: f64,
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new(MIN_DIM)
    }
}

impl SelectionSession {
    pub fn new(min_dim: f64) -> Self {
        Self {
            start: (0.0, 0.0),
            end: (0.0, 0.0),
            dragging: false,
            min_dim,
        }
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.start = (x, y);
        self.end = (x, y);
        self.dragging = true;
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        if self.dragging {
            self.end = (x, y);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Normalized `(left, top, width, height)` of the box drawn so far
    pub fn current_box(&self) -> (f64, f64, f64, f64) {
        let (sx, sy) = self.start;
        let (ex, ey) = self.end;
        (sx.min(ex), sy.min(ey), (ex - sx).abs(), (ey - sy).abs())
    }

    /// End the drag. Boxes with an edge at or below `min_dim` yield `None`;
    /// the caller then starts a new session for the next gesture.
    pub fn finish(&mut self, metrics: ViewportMetrics) -> Option<SelectionRect> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;

        let (left, top, width, height) = self.current_box();
        let rect = SelectionRect {
            left,
            top,
            width,
            height,
            device_pixel_ratio: metrics.device_pixel_ratio,
            scroll_x: metrics.scroll_x,
            scroll_y: metrics.scroll_y,
        };

        if !rect.exceeds(self.min_dim) {
            tracing::debug!("Discarding {width}x{height} selection below {}px", self.min_dim);
            return None;
        }

        Some(rect)
    }

    /// Escape pressed
    pub fn cancel(self) {
        tracing::debug!("Selection cancelled");
    }
}

/// Rendering viewport the projection is laid out for.
///
/// Only the pixel-per-day scale depends on it; day offsets never do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineViewport {
    /// Available chart width in pixels.
    pub width: f32,
    /// Multiplier applied on top of the fitted day width.
    pub zoom: f32,
}

const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 8.0;
const ZOOM_STEP: f32 = 1.2;

impl Default for TimelineViewport {
    fn default() -> Self {
        Self::new(1024.0)
    }
}

impl TimelineViewport {
    pub fn new(width: f32) -> Self {
        Self { width, zoom: 1.0 }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut vp = TimelineViewport::new(800.0);
        for _ in 0..50 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, MAX_ZOOM);
        for _ in 0..100 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom, MIN_ZOOM);
    }
}

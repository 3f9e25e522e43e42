//! Authoritative container geometry for an embedded view.
//!
//! The viewport is the single source of truth for both screen placement and
//! render-surface sizing. The rendering engine learns about it two ways: push
//! (the session notifies the active render host when the bounds change) and
//! pull (the engine queries current bounds through the view delegate). Both
//! paths read from here.

use crate::geometry::{Rect, Size};

/// Current container bounds for a window session.
///
/// Updates are change-detecting: applying the same rectangle twice reports
/// no change, so the session sends at most one resize notification per
/// logical change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportState {
    bounds: Rect,
}

impl ViewportState {
    /// Creates a viewport with the given initial bounds.
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    /// Replaces the container bounds.
    ///
    /// Returns true if the rectangle actually changed, false if the call was
    /// a no-op.
    pub fn set_bounds(&mut self, bounds: Rect) -> bool {
        if self.bounds == bounds {
            return false;
        }
        self.bounds = bounds;
        true
    }

    /// Resizes the container, preserving the existing origin.
    ///
    /// Returns true if the dimensions actually changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.set_bounds(self.bounds.with_size(width, height))
    }

    /// Returns the current container bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the current container dimensions.
    pub fn size(&self) -> Size {
        self.bounds.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_bounds_reports_change() {
        let mut viewport = ViewportState::default();
        let rect = Rect::new(0, 0, 800, 600);

        assert!(viewport.set_bounds(rect));
        assert_eq!(viewport.bounds(), rect);

        // Identical rectangle is a no-op.
        assert!(!viewport.set_bounds(rect));
    }

    #[test]
    fn test_resize_preserves_origin() {
        let mut viewport = ViewportState::new(Rect::new(100, 50, 640, 480));

        assert!(viewport.resize(800, 600));
        assert_eq!(viewport.bounds(), Rect::new(100, 50, 800, 600));
        assert_eq!(viewport.size(), Size::new(800, 600));

        assert!(!viewport.resize(800, 600));
    }
}

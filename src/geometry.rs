//! Geometry value types shared by the viewport, configuration, and
//! delegate payloads.
//!
//! `Rect` carries both screen placement and render-surface sizing; `Size` is
//! the derived form the render host asks for when it only needs dimensions.

use serde::{Deserialize, Serialize};

/// A rectangle in container coordinates: origin plus dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Horizontal position of the origin.
    pub x: i32,
    /// Vertical position of the origin.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from origin and dimensions.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin with the given dimensions.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the dimensions of this rectangle.
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Returns a copy of this rectangle with the origin preserved and the
    /// dimensions replaced.
    pub fn with_size(&self, width: u32, height: u32) -> Self {
        Self::new(self.x, self.y, width, height)
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@({},{})", self.width, self.height, self.x, self.y)
    }
}

/// Dimensions without placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Creates a size from dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_size_roundtrip() {
        let rect = Rect::new(10, -20, 800, 600);
        assert_eq!(rect.size(), Size::new(800, 600));
        assert_eq!(rect.with_size(1024, 768), Rect::new(10, -20, 1024, 768));
    }

    #[test]
    fn test_empty_detection() {
        assert!(Rect::default().is_empty());
        assert!(Rect::new(5, 5, 0, 100).is_empty());
        assert!(!Rect::from_size(1, 1).is_empty());
        assert!(Size::new(0, 10).is_empty());
        assert!(!Size::new(10, 10).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rect::new(1, 2, 3, 4).to_string(), "3x4@(1,2)");
        assert_eq!(Size::new(640, 480).to_string(), "640x480");
    }
}

//! Common geometry types shared by the pointer pipeline crates.
//!
//! - [`Point`] - 2D point with i32 coordinates (hot points, pointer positions)
//! - [`Size`] - pixel dimensions of a pointer image or surface
//! - [`Rect`] - rectangle with position and dimensions

/// A 2D point with integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset the point by another point.
    pub const fn offset(&self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A rectangle defined by top-left position and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` placed so that `hotspot` (relative to its
    /// top-left corner) lands on `anchor`.
    pub const fn around_hotspot(anchor: Point, hotspot: Point, size: Size) -> Self {
        Self::new(
            anchor.x - hotspot.x,
            anchor.y - hotspot.y,
            size.width,
            size.height,
        )
    }

    /// Get the right edge (x + width).
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Get the bottom edge (y + height).
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Check if a point is contained within this rectangle.
    pub const fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Dimensions of the rectangle.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

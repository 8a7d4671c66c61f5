//! The windowing services the cursor pipeline depends on.
//!
//! [`CursorPlatform`] is implemented by whatever owns the local windows and
//! the event loop. All methods are called on the UI thread only.

use crate::surface::Surface;
use rdp_common::{Point, Size};
use rdp_pixelbuffer::PixelFormat;
use rdp_pointer::PointerError;
use std::fmt;

/// Identifier of a local window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Scale-related properties of one window, read fresh on every build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMetrics {
    /// Which window these metrics describe.
    pub id: WindowId,
    /// Client area size in logical (unscaled) units.
    pub logical_size: Size,
    /// Configured session-to-window content scale, used when smart sizing
    /// is off.
    pub content_scale: f64,
    /// Monitor HiDPI factor (physical pixels per logical unit).
    pub display_scale: f64,
    /// Letterbox offset of the session image inside the window, in window
    /// pixels.
    pub offset: Point,
}

impl WindowMetrics {
    /// Metrics for a window showing the session unscaled on a 100% monitor.
    pub fn unscaled(id: WindowId, logical_size: Size) -> Self {
        Self {
            id,
            logical_size,
            content_scale: 1.0,
            display_scale: 1.0,
            offset: Point::default(),
        }
    }
}

/// Native cursor services provided by the windowing layer.
pub trait CursorPlatform {
    /// Native cursor handle. Dropping it destroys the native cursor.
    type Cursor;

    /// Window currently holding mouse focus.
    fn mouse_focus(&self) -> Option<WindowId>;

    /// Current metrics of `window`, or `None` if it no longer exists.
    fn window_metrics(&self, window: WindowId) -> Option<WindowMetrics>;

    /// The first open window, whose monitor decides the HiDPI factor.
    fn reference_window(&self) -> Option<WindowId>;

    /// Pixel format surfaces should be created in.
    fn native_format(&self) -> PixelFormat;

    /// Largest cursor edge, in pixels, the platform accepts.
    fn max_cursor_size(&self) -> Option<u32> {
        None
    }

    /// Create a colour cursor from `surface` (and its alternates).
    ///
    /// `hotspot` is in window pixels, the space of the highest resolution
    /// image.
    fn create_color_cursor(
        &mut self,
        surface: &Surface,
        hotspot: Point,
    ) -> Result<Self::Cursor, PointerError>;

    /// Make `cursor` the active cursor.
    fn set_cursor(&mut self, cursor: &Self::Cursor);

    /// Make the system default cursor active.
    fn set_default_cursor(&mut self);

    /// Show the active cursor.
    fn show_cursor(&mut self);

    /// Hide the cursor.
    fn hide_cursor(&mut self);

    /// Move the pointer to `position` (window pixels) inside `window`.
    fn warp_mouse(&mut self, window: WindowId, position: Point);
}

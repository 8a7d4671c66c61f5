//! A windowing platform that composites the cursor in software.
//!
//! [`SoftwarePlatform`] keeps its windows, focus and cursor state in memory
//! and draws the active cursor into an RGBA frame on request. It backs the
//! `rdpcursor` tool and headless use, where no native cursor API exists.

use crate::config::PointerConfig;
use crate::platform::{CursorPlatform, WindowId, WindowMetrics};
use crate::surface::Surface;
use rdp_common::{Point, Rect, Size};
use rdp_pixelbuffer::PixelFormat;
use rdp_pointer::PointerError;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Cursor image data
#[derive(Debug, Clone)]
pub struct CursorImage {
    /// Cursor dimensions
    pub width: u32,
    pub height: u32,
    /// Hotspot position (relative to cursor top-left)
    pub hotspot_x: u32,
    pub hotspot_y: u32,
    /// RGBA pixel data (4 bytes per pixel)
    pub pixels: Vec<u8>,
    /// Size the cursor was requested at on a 100% monitor
    pub nominal: Size,
}

impl CursorImage {
    /// Capture the best resolution image of `surface`.
    ///
    /// The hot point is clamped into the image.
    pub fn from_surface(surface: &Surface, hotspot: Point) -> Self {
        let image = surface.best_image();
        let hotspot_x = hotspot.x.clamp(0, image.width() as i32 - 1) as u32;
        let hotspot_y = hotspot.y.clamp(0, image.height() as i32 - 1) as u32;
        if hotspot_x as i32 != hotspot.x || hotspot_y as i32 != hotspot.y {
            warn!(
                "Cursor hotspot ({}, {}) outside {}x{} image, clamped",
                hotspot.x,
                hotspot.y,
                image.width(),
                image.height()
            );
        }

        Self {
            width: image.width(),
            height: image.height(),
            hotspot_x,
            hotspot_y,
            pixels: image.to_rgba_image().into_raw(),
            nominal: surface.size(),
        }
    }

    /// Check if the cursor image is valid
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width * self.height * 4) as usize
    }

    /// RGBA colour at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(rgba)
    }
}

/// Handle to a cursor created by [`SoftwarePlatform`].
pub type SoftwareCursor = Rc<CursorImage>;

#[derive(Debug, Clone)]
enum ActiveCursor {
    Default,
    Custom(Weak<CursorImage>),
}

/// In-memory windowing platform.
pub struct SoftwarePlatform {
    windows: Vec<WindowMetrics>,
    focus: Option<WindowId>,
    format: PixelFormat,
    max_cursor_size: u32,
    active: ActiveCursor,
    visible: bool,
    pointer: Option<(WindowId, Point)>,
    cursors_created: usize,
}

impl SoftwarePlatform {
    /// Create a platform with no windows.
    pub fn new(format: PixelFormat, max_cursor_size: u32) -> Self {
        Self {
            windows: Vec::new(),
            focus: None,
            format,
            max_cursor_size,
            active: ActiveCursor::Default,
            visible: true,
            pointer: None,
            cursors_created: 0,
        }
    }

    /// Create a BGRA platform with the limits from `config`.
    pub fn from_config(config: &PointerConfig) -> Self {
        Self::new(PixelFormat::bgra32(), config.max_cursor_size)
    }

    /// Open a window. The first window opened is the reference window.
    pub fn open_window(&mut self, metrics: WindowMetrics) {
        debug!(
            "Opening {} {}x{} (content {:.2}, display {:.2})",
            metrics.id,
            metrics.logical_size.width,
            metrics.logical_size.height,
            metrics.content_scale,
            metrics.display_scale
        );
        self.windows.retain(|w| w.id != metrics.id);
        self.windows.push(metrics);
    }

    /// Close a window, dropping focus if it had it.
    pub fn close_window(&mut self, id: WindowId) {
        self.windows.retain(|w| w.id != id);
        if self.focus == Some(id) {
            self.focus = None;
        }
    }

    /// Give mouse focus to `window`, or to nothing.
    pub fn set_focus(&mut self, window: Option<WindowId>) {
        self.focus = window.filter(|id| self.windows.iter().any(|w| w.id == *id));
    }

    /// Move a window to a monitor with a different HiDPI factor.
    pub fn set_display_scale(&mut self, id: WindowId, display_scale: f64) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.display_scale = display_scale;
        }
    }

    /// Currently installed custom cursor, if it is still alive.
    pub fn active_cursor(&self) -> Option<SoftwareCursor> {
        match &self.active {
            ActiveCursor::Default => None,
            ActiveCursor::Custom(cursor) => cursor.upgrade(),
        }
    }

    /// True when the system default cursor is in effect.
    pub fn is_default_cursor(&self) -> bool {
        self.active_cursor().is_none()
    }

    /// Whether the cursor is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Last warp target.
    pub fn pointer_position(&self) -> Option<(WindowId, Point)> {
        self.pointer
    }

    /// Number of native cursors created so far.
    pub fn cursors_created(&self) -> usize {
        self.cursors_created
    }

    /// Bounds of the active cursor in window pixels.
    pub fn cursor_bounds(&self) -> Option<Rect> {
        let cursor = self.active_cursor()?;
        let (_, position) = self.pointer?;
        Some(Rect::around_hotspot(
            position,
            Point::new(cursor.hotspot_x as i32, cursor.hotspot_y as i32),
            Size::new(cursor.width, cursor.height),
        ))
    }

    /// Composite the active cursor at the pointer position into an RGBA
    /// frame.
    pub fn render_to_frame(&self, frame: &mut [u8], frame_width: u32, frame_height: u32) {
        if !self.visible {
            return;
        }
        let (Some(cursor), Some(bounds)) = (self.active_cursor(), self.cursor_bounds()) else {
            return;
        };

        let start_x = bounds.x.max(0) as u32;
        let start_y = bounds.y.max(0) as u32;
        let end_x = bounds.right().min(frame_width as i32).max(0) as u32;
        let end_y = bounds.bottom().min(frame_height as i32).max(0) as u32;

        for y in start_y..end_y {
            for x in start_x..end_x {
                let src_x = (x as i32 - bounds.x) as u32;
                let src_y = (y as i32 - bounds.y) as u32;
                let Some([r, g, b, a]) = cursor.pixel(src_x, src_y) else {
                    continue;
                };
                let dst_idx = ((y * frame_width + x) * 4) as usize;
                if a == 0 || dst_idx + 3 >= frame.len() {
                    continue;
                }

                if a == 255 {
                    frame[dst_idx..dst_idx + 4].copy_from_slice(&[r, g, b, 255]);
                } else {
                    let src_a = a as u16;
                    let inv_alpha = 255 - src_a;
                    for (offset, src) in [r, g, b].into_iter().enumerate() {
                        let dst = frame[dst_idx + offset] as u16;
                        frame[dst_idx + offset] =
                            ((src as u16 * src_a + dst * inv_alpha) / 255) as u8;
                    }
                    frame[dst_idx + 3] = 255;
                }
            }
        }
    }
}

impl CursorPlatform for SoftwarePlatform {
    type Cursor = SoftwareCursor;

    fn mouse_focus(&self) -> Option<WindowId> {
        self.focus
    }

    fn window_metrics(&self, window: WindowId) -> Option<WindowMetrics> {
        self.windows.iter().find(|w| w.id == window).copied()
    }

    fn reference_window(&self) -> Option<WindowId> {
        self.windows.first().map(|w| w.id)
    }

    fn native_format(&self) -> PixelFormat {
        self.format
    }

    fn max_cursor_size(&self) -> Option<u32> {
        Some(self.max_cursor_size)
    }

    fn create_color_cursor(
        &mut self,
        surface: &Surface,
        hotspot: Point,
    ) -> Result<Self::Cursor, PointerError> {
        let image = surface.best_image();
        if image.width() > self.max_cursor_size || image.height() > self.max_cursor_size {
            return Err(PointerError::Build(format!(
                "cursor {}x{} exceeds platform limit {}",
                image.width(),
                image.height(),
                self.max_cursor_size
            )));
        }

        let cursor = CursorImage::from_surface(surface, hotspot);
        self.cursors_created += 1;
        trace!(
            "Created cursor {}x{} (nominal {}x{})",
            cursor.width,
            cursor.height,
            cursor.nominal.width,
            cursor.nominal.height
        );
        Ok(Rc::new(cursor))
    }

    fn set_cursor(&mut self, cursor: &Self::Cursor) {
        self.active = ActiveCursor::Custom(Rc::downgrade(cursor));
    }

    fn set_default_cursor(&mut self) {
        self.active = ActiveCursor::Default;
    }

    fn show_cursor(&mut self) {
        self.visible = true;
    }

    fn hide_cursor(&mut self) {
        self.visible = false;
    }

    fn warp_mouse(&mut self, window: WindowId, position: Point) {
        trace!("Warp to ({}, {}) in {}", position.x, position.y, window);
        self.pointer = Some((window, position));
    }
}

impl fmt::Debug for SoftwarePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwarePlatform")
            .field("windows", &self.windows.len())
            .field("focus", &self.focus)
            .field("active", &self.active)
            .field("visible", &self.visible)
            .finish()
    }
}

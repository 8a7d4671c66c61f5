//! Scale factors between session pixels and window pixels.
//!
//! Three independent factors are involved whenever something in session
//! space (a pointer image, a hot point, a pointer position) is shown in a
//! window:
//!
//! - the **content scale**: how large the session image is drawn inside the
//!   window, in logical units. With smart sizing it follows the window size,
//!   otherwise it is the window's configured scale;
//! - the **display scale**: the HiDPI factor of the monitor the window is on;
//! - the letterbox **offset** of the session image inside the window.
//!
//! [`ScaleResolver`] combines them into a [`ScaleContext`] snapshot. Nothing
//! is cached: each build asks the platform for fresh metrics.

use crate::platform::{CursorPlatform, WindowId, WindowMetrics};
use rdp_common::{Point, Size};
use rdp_pointer::PointerError;
use std::fmt;
use tracing::{debug, trace};

/// Which way a coordinate is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    /// Session pixels to window pixels.
    SessionToWindow,
    /// Window pixels to session pixels.
    WindowToSession,
}

impl fmt::Display for ScaleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionToWindow => write!(f, "session->window"),
            Self::WindowToSession => write!(f, "window->session"),
        }
    }
}

/// Scale factors of one window, captured at a single point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleContext {
    /// Content scale along X (session pixel to logical unit).
    pub content_x: f64,
    /// Content scale along Y.
    pub content_y: f64,
    /// Monitor HiDPI factor.
    pub display_scale: f64,
    /// Letterbox offset in window pixels.
    pub offset: Point,
}

impl ScaleContext {
    /// Session pixel to window pixel factor along X.
    pub fn factor_x(&self) -> f64 {
        self.content_x * self.display_scale
    }

    /// Session pixel to window pixel factor along Y.
    pub fn factor_y(&self) -> f64 {
        self.content_y * self.display_scale
    }
}

/// Size of an image of `size` window pixels on a monitor with
/// `display_scale`, when drawn at 100%. Never smaller than 1x1.
pub fn nominal_size(size: Size, display_scale: f64) -> Result<Size, PointerError> {
    let scale = check_factor("display", display_scale)?;
    Ok(Size::new(
        round_len(size.width as f64 / scale),
        round_len(size.height as f64 / scale),
    ))
}

fn round_len(value: f64) -> u32 {
    value.round().clamp(1.0, u32::MAX as f64) as u32
}

fn check_factor(name: &str, value: f64) -> Result<f64, PointerError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PointerError::Scale(format!("{} scale {} is not usable", name, value)))
    }
}

/// Computes session/window scale factors for the focused window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResolver {
    session_size: Size,
    smart_sizing: bool,
}

impl ScaleResolver {
    /// Create a resolver for a session desktop of `session_size`.
    pub fn new(session_size: Size, smart_sizing: bool) -> Self {
        Self {
            session_size,
            smart_sizing,
        }
    }

    /// Session desktop size.
    pub fn session_size(&self) -> Size {
        self.session_size
    }

    /// Update the session desktop size after a resize.
    pub fn set_session_size(&mut self, size: Size) {
        if self.session_size != size {
            debug!("Session size changed to {}x{}", size.width, size.height);
            self.session_size = size;
        }
    }

    /// Whether the session image follows the window size.
    pub fn smart_sizing(&self) -> bool {
        self.smart_sizing
    }

    /// The window a cursor should be built for: the one with mouse focus.
    pub fn target_window<P: CursorPlatform + ?Sized>(&self, platform: &P) -> Option<WindowId> {
        platform.mouse_focus()
    }

    /// Snapshot the factors of `metrics`.
    pub fn scale_context(&self, metrics: &WindowMetrics) -> Result<ScaleContext, PointerError> {
        let (content_x, content_y) = if self.smart_sizing {
            if self.session_size.is_empty() {
                return Err(PointerError::Scale(format!(
                    "session size {}x{} is empty",
                    self.session_size.width, self.session_size.height
                )));
            }
            (
                metrics.logical_size.width as f64 / self.session_size.width as f64,
                metrics.logical_size.height as f64 / self.session_size.height as f64,
            )
        } else {
            (metrics.content_scale, metrics.content_scale)
        };

        let context = ScaleContext {
            content_x: check_factor("content", content_x)?,
            content_y: check_factor("content", content_y)?,
            display_scale: check_factor("display", metrics.display_scale)?,
            offset: metrics.offset,
        };
        trace!(
            "{}: factors {:.3}x{:.3} (display {:.2})",
            metrics.id,
            context.factor_x(),
            context.factor_y(),
            context.display_scale
        );
        Ok(context)
    }

    /// Convert a point between session and window pixels.
    ///
    /// `apply_offset` accounts for the letterbox offset, which only exists
    /// when smart sizing is off.
    pub fn scale_coordinates(
        &self,
        metrics: &WindowMetrics,
        point: Point,
        direction: ScaleDirection,
        apply_offset: bool,
    ) -> Result<Point, PointerError> {
        let context = self.scale_context(metrics)?;
        let use_offset = apply_offset && !self.smart_sizing;

        let scaled = match direction {
            ScaleDirection::SessionToWindow => {
                let p = Point::new(
                    (point.x as f64 * context.factor_x()).round() as i32,
                    (point.y as f64 * context.factor_y()).round() as i32,
                );
                if use_offset {
                    p.offset(context.offset)
                } else {
                    p
                }
            }
            ScaleDirection::WindowToSession => {
                let p = if use_offset {
                    Point::new(point.x - context.offset.x, point.y - context.offset.y)
                } else {
                    point
                };
                Point::new(
                    (p.x as f64 / context.factor_x()).round() as i32,
                    (p.y as f64 / context.factor_y()).round() as i32,
                )
            }
        };
        Ok(scaled)
    }

    /// Convert a session-pixel size to window pixels, at least 1x1.
    pub fn scale_size(&self, metrics: &WindowMetrics, size: Size) -> Result<Size, PointerError> {
        let context = self.scale_context(metrics)?;
        Ok(Size::new(
            round_len(size.width as f64 * context.factor_x()),
            round_len(size.height as f64 * context.factor_y()),
        ))
    }
}

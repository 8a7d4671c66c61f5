//! # rdp-display: remote pointers as local cursors
//!
//! This crate is the UI-thread half of the pointer pipeline. It takes the
//! pointer shapes decoded by `rdp-pointer` and turns them into native
//! cursors sized for the window under the mouse.
//!
//! ## Features
//!
//! - **Scale resolution**: session size, window content scale and monitor
//!   HiDPI factor combined per window, see [`ScaleResolver`]
//! - **Cursor construction**: resampling plus a 100% image with a full
//!   resolution alternate, see [`CursorBuilder`]
//! - **State machine**: default, custom and hidden cursors driven by
//!   [`rdp_pointer::PointerEvent`]s, see [`CursorManager`]
//! - **Software platform**: an in-memory [`CursorPlatform`] that composites
//!   the cursor itself
//! - **Monitor scales**: the HiDPI factor of the monitor holding a window,
//!   see [`MonitorScales`]
//!
//! ## Example
//!
//! ```rust
//! use rdp_common::{Point, Size};
//! use rdp_display::{CursorManager, PointerConfig, SoftwarePlatform, WindowId, WindowMetrics};
//! use rdp_pixelbuffer::PixelFormat;
//! use rdp_pointer::{pointer_channel, PointerShape};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), rdp_pointer::PointerError> {
//! let config = PointerConfig::default();
//! let mut platform = SoftwarePlatform::from_config(&config);
//! platform.open_window(WindowMetrics::unscaled(WindowId(1), Size::new(800, 600)));
//! platform.set_focus(Some(WindowId(1)));
//!
//! let mut manager = CursorManager::from_config(platform, Size::new(800, 600), &config);
//! let (tx, rx) = pointer_channel();
//!
//! let pixels = vec![0xFF; 16 * 16 * 4];
//! let format = PixelFormat::bgra32();
//! let shape = PointerShape::from_pixels(Size::new(16, 16), Point::new(0, 0), format, &pixels)?;
//! tx.set(Arc::new(shape))?;
//!
//! manager.process_pending(&rx)?;
//! assert!(manager.platform().active_cursor().is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cursor;
pub mod monitor;
pub mod platform;
pub mod scaling;
pub mod software;
pub mod surface;

pub use config::{ConfigError, PointerConfig, PointerConfigBuilder};
pub use cursor::{CursorBuilder, CursorManager, CursorState, NativePointer};
pub use monitor::MonitorScales;
pub use platform::{CursorPlatform, WindowId, WindowMetrics};
pub use scaling::{nominal_size, ScaleContext, ScaleDirection, ScaleResolver};
pub use software::{CursorImage, SoftwareCursor, SoftwarePlatform};
pub use surface::Surface;

//! Native cursor construction and the UI-side cursor state machine.
//!
//! [`CursorBuilder`] turns a decoded pointer shape into a native cursor for
//! one window: it scales the shape into window pixels, wraps the result in a
//! 100% display scale surface carrying the full resolution image as an
//! alternate, and installs the cursor.
//!
//! [`CursorManager`] applies [`PointerEvent`]s posted by the protocol thread
//! and tracks which cursor is active. Everything here lives on the UI thread.

use crate::config::PointerConfig;
use crate::platform::{CursorPlatform, WindowId};
use crate::scaling::{nominal_size, ScaleDirection, ScaleResolver};
use crate::surface::Surface;
use rdp_common::{Point, Size};
use rdp_pixelbuffer::{image_scale, ScaleFilter};
use rdp_pointer::{PointerError, PointerEvent, PointerId, PointerReceiver, PointerRef};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// UI-side half of a pointer resource: the shared shape plus the native
/// handles derived from it.
///
/// Holding the shape keeps its pixel buffer alive for as long as any
/// handle built from it exists.
pub struct NativePointer<C> {
    shape: PointerRef,
    cursor: Option<C>,
    surface: Option<Rc<Surface>>,
}

impl<C> NativePointer<C> {
    /// Wrap a shape with no native handles yet.
    pub fn new(shape: PointerRef) -> Self {
        Self {
            shape,
            cursor: None,
            surface: None,
        }
    }

    /// Identity of the wrapped shape.
    pub fn id(&self) -> PointerId {
        self.shape.id()
    }

    /// The wrapped shape.
    pub fn shape(&self) -> &PointerRef {
        &self.shape
    }

    /// Native cursor, once built.
    pub fn cursor(&self) -> Option<&C> {
        self.cursor.as_ref()
    }

    /// Full resolution surface the cursor was built from, once built.
    pub fn surface(&self) -> Option<&Rc<Surface>> {
        self.surface.as_ref()
    }

    /// True if native handles are present.
    pub fn is_built(&self) -> bool {
        self.cursor.is_some()
    }

    /// Destroy the native cursor and surface. Safe to call repeatedly.
    pub fn clear(&mut self) {
        let had_cursor = self.cursor.take().is_some();
        let had_surface = self.surface.take().is_some();
        if had_cursor || had_surface {
            trace!("Cleared native handles of {}", self.shape.id());
        }
    }

    /// Destroy the native handles and drop this reference to the shape.
    pub fn release(mut self) {
        self.clear();
    }
}

impl<C> fmt::Debug for NativePointer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativePointer")
            .field("shape", &self.shape)
            .field("built", &self.cursor.is_some())
            .field(
                "surface",
                &self.surface.as_ref().map(|s| format!("{}x{}", s.width(), s.height())),
            )
            .finish()
    }
}

/// Builds and installs native cursors from pointer shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorBuilder {
    hidpi_alternate: bool,
}

impl Default for CursorBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CursorBuilder {
    /// Create a builder.
    ///
    /// Shapes are always resampled with [`ScaleFilter::Linear`].
    pub fn new(hidpi_alternate: bool) -> Self {
        Self { hidpi_alternate }
    }

    /// Create a builder from configuration.
    pub fn from_config(config: &PointerConfig) -> Self {
        Self::new(config.hidpi_alternate)
    }

    /// Whether the 100% surface with a HiDPI alternate is built.
    pub fn hidpi_alternate(&self) -> bool {
        self.hidpi_alternate
    }

    /// Build a cursor for `pointer` sized for `window` and make it active.
    ///
    /// Any previous handles of `pointer` are destroyed first. On error no
    /// new handles are kept and the active cursor is left untouched. A
    /// scaled size over the platform's cursor limit is rejected before any
    /// surface is allocated.
    pub fn build<P: CursorPlatform>(
        &self,
        platform: &mut P,
        resolver: &ScaleResolver,
        pointer: &mut NativePointer<P::Cursor>,
        window: WindowId,
    ) -> Result<(), PointerError> {
        pointer.clear();

        let shape = Arc::clone(&pointer.shape);
        let metrics = platform
            .window_metrics(window)
            .ok_or_else(|| PointerError::Scale(format!("{} is not open", window)))?;
        let hotspot = resolver.scale_coordinates(
            &metrics,
            shape.hotspot(),
            ScaleDirection::SessionToWindow,
            false,
        )?;
        let scaled_size = resolver.scale_size(&metrics, shape.size())?;
        if let Some(limit) = platform.max_cursor_size() {
            if scaled_size.width > limit || scaled_size.height > limit {
                return Err(PointerError::Build(format!(
                    "scaled cursor {}x{} exceeds platform limit {}",
                    scaled_size.width, scaled_size.height, limit
                )));
            }
        }

        let mut image = Surface::new(scaled_size, platform.native_format())?;
        image_scale(&mut image.lock(), &shape.image(), ScaleFilter::Linear)?;
        let image = Rc::new(image);

        let cursor = if self.hidpi_alternate {
            let normal = self.nominal_surface(platform, &image)?;
            platform.create_color_cursor(&normal, hotspot)?
        } else {
            platform.create_color_cursor(&image, hotspot)?
        };

        platform.set_cursor(&cursor);
        platform.show_cursor();
        debug!(
            "Installed {} for {}: {}x{} -> {}x{}, hotspot ({}, {})",
            shape.id(),
            window,
            shape.width(),
            shape.height(),
            scaled_size.width,
            scaled_size.height,
            hotspot.x,
            hotspot.y
        );

        pointer.cursor = Some(cursor);
        pointer.surface = Some(image);
        Ok(())
    }

    /// The image at 100% display scale of the reference window, with
    /// `image` attached as its high resolution alternate.
    fn nominal_surface<P: CursorPlatform>(
        &self,
        platform: &P,
        image: &Rc<Surface>,
    ) -> Result<Surface, PointerError> {
        let reference = platform
            .reference_window()
            .and_then(|id| platform.window_metrics(id))
            .ok_or_else(|| PointerError::Build("no open window".to_string()))?;

        let size: Size = nominal_size(image.size(), reference.display_scale)?;
        let mut normal = Surface::new(size, image.format())?;
        normal.blit_scaled(image, ScaleFilter::Linear)?;
        normal.add_alternate_image(Rc::clone(image));
        Ok(normal)
    }
}

/// Which cursor is currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// The platform default cursor.
    #[default]
    Default,
    /// A remote pointer shape.
    Custom(PointerId),
    /// No cursor shown.
    Hidden,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Custom(id) => write!(f, "Custom({})", id),
            Self::Hidden => write!(f, "Hidden"),
        }
    }
}

/// Applies pointer events on the UI thread.
pub struct CursorManager<P: CursorPlatform> {
    platform: P,
    resolver: ScaleResolver,
    builder: CursorBuilder,
    state: CursorState,
    current: Option<NativePointer<P::Cursor>>,
    has_cursor: bool,
    position: Option<Point>,
}

impl<P: CursorPlatform> CursorManager<P> {
    /// Create a manager driving `platform`.
    pub fn new(platform: P, resolver: ScaleResolver, builder: CursorBuilder) -> Self {
        Self {
            platform,
            resolver,
            builder,
            state: CursorState::Default,
            current: None,
            has_cursor: false,
            position: None,
        }
    }

    /// Create a manager for a session of `session_size` from configuration.
    pub fn from_config(platform: P, session_size: Size, config: &PointerConfig) -> Self {
        Self::new(
            platform,
            ScaleResolver::new(session_size, config.smart_sizing),
            CursorBuilder::from_config(config),
        )
    }

    /// Current state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// True while a cursor (default or custom) is shown.
    pub fn has_cursor(&self) -> bool {
        self.has_cursor
    }

    /// Last requested pointer position, in session pixels.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// The installed custom pointer, if any.
    pub fn current(&self) -> Option<&NativePointer<P::Cursor>> {
        self.current.as_ref()
    }

    /// The windowing platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the windowing platform.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Mutable access to the scale resolver, e.g. after a session resize.
    pub fn resolver_mut(&mut self) -> &mut ScaleResolver {
        &mut self.resolver
    }

    /// Apply every event queued on `receiver`, in order.
    ///
    /// Returns the number of events applied. Stops at the first fatal error.
    pub fn process_pending(&mut self, receiver: &PointerReceiver) -> Result<usize, PointerError> {
        let mut count = 0;
        while let Some(event) = receiver.try_recv() {
            self.handle_event(event)?;
            count += 1;
        }
        Ok(count)
    }

    /// Apply one event.
    ///
    /// Only fatal errors are returned; anything else falls back to the
    /// default cursor.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<(), PointerError> {
        trace!("Handling pointer event {} in state {}", event, self.state);
        match event {
            PointerEvent::Default => {
                self.install_default();
                Ok(())
            }
            PointerEvent::Null => {
                self.hide();
                Ok(())
            }
            PointerEvent::Set(shape) => self.install(shape),
            PointerEvent::Position { x, y } => {
                self.move_to(x, y);
                Ok(())
            }
            PointerEvent::Release(id) => {
                self.release(id);
                Ok(())
            }
        }
    }

    /// Rebuild the active custom cursor, e.g. after the focused window
    /// moved to a monitor with a different scale.
    pub fn refresh(&mut self) -> Result<(), PointerError> {
        match self.current.as_ref() {
            Some(current) if self.state == CursorState::Custom(current.id()) => {
                let shape = Arc::clone(current.shape());
                self.install(shape)
            }
            _ => Ok(()),
        }
    }

    fn install(&mut self, shape: PointerRef) -> Result<(), PointerError> {
        let Some(window) = self.resolver.target_window(&self.platform) else {
            debug!("No window has mouse focus, using default cursor for {}", shape.id());
            self.install_default();
            return Ok(());
        };

        let id = shape.id();
        let (mut pointer, previous) = match self.current.take() {
            Some(current) if current.id() == id => (current, None),
            other => (NativePointer::new(shape), other),
        };

        match self
            .builder
            .build(&mut self.platform, &self.resolver, &mut pointer, window)
        {
            Ok(()) => {
                if let Some(previous) = previous {
                    previous.release();
                }
                self.current = Some(pointer);
                self.state = CursorState::Custom(id);
                self.has_cursor = true;
                Ok(())
            }
            Err(err) => {
                pointer.release();
                self.current = previous;
                self.install_default();
                if err.is_fatal() {
                    return Err(err);
                }
                warn!("Failed to build cursor for {}: {}", id, err);
                Ok(())
            }
        }
    }

    fn install_default(&mut self) {
        self.platform.set_default_cursor();
        self.platform.show_cursor();
        if let Some(current) = self.current.take() {
            current.release();
        }
        self.state = CursorState::Default;
        self.has_cursor = true;
    }

    fn hide(&mut self) {
        self.platform.hide_cursor();
        if let Some(current) = self.current.take() {
            current.release();
        }
        self.state = CursorState::Hidden;
        self.has_cursor = false;
    }

    fn move_to(&mut self, x: u32, y: u32) {
        let session = Point::new(x as i32, y as i32);
        self.position = Some(session);

        let Some(window) = self.resolver.target_window(&self.platform) else {
            trace!("No window has mouse focus, ignoring pointer position");
            return;
        };
        let Some(metrics) = self.platform.window_metrics(window) else {
            return;
        };

        match self.resolver.scale_coordinates(
            &metrics,
            session,
            ScaleDirection::SessionToWindow,
            true,
        ) {
            Ok(target) => self.platform.warp_mouse(window, target),
            Err(err) => warn!("Cannot place pointer at ({}, {}): {}", x, y, err),
        }
    }

    fn release(&mut self, id: PointerId) {
        if self.current.as_ref().map(NativePointer::id) != Some(id) {
            trace!("Release of inactive {}", id);
            return;
        }
        debug!("Active {} released, using default cursor", id);
        if self.state == CursorState::Hidden {
            if let Some(current) = self.current.take() {
                current.release();
            }
        } else {
            self.install_default();
        }
    }
}

impl<P: CursorPlatform + fmt::Debug> fmt::Debug for CursorManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorManager")
            .field("platform", &self.platform)
            .field("state", &self.state)
            .field("has_cursor", &self.has_cursor)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::WindowMetrics;
    use crate::software::SoftwarePlatform;
    use rdp_pixelbuffer::PixelFormat;
    use rdp_pointer::{pointer_channel, PointerShape};

    fn shape(size: Size, rgba: [u8; 4]) -> PointerRef {
        let format = PixelFormat::bgra32();
        let mut pixels = vec![0u8; size.area() as usize * 4];
        for pixel in pixels.chunks_exact_mut(4) {
            format.write_rgba(rgba, pixel);
        }
        Arc::new(PointerShape::from_pixels(size, Point::new(1, 1), format, &pixels).unwrap())
    }

    fn window(id: u64, content_scale: f64, display_scale: f64) -> WindowMetrics {
        WindowMetrics {
            id: WindowId(id),
            logical_size: Size::new(800, 600),
            content_scale,
            display_scale,
            offset: Point::default(),
        }
    }

    fn manager(content_scale: f64, display_scale: f64) -> CursorManager<SoftwarePlatform> {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), 256);
        platform.open_window(window(1, content_scale, display_scale));
        platform.set_focus(Some(WindowId(1)));
        CursorManager::new(
            platform,
            ScaleResolver::new(Size::new(800, 600), false),
            CursorBuilder::default(),
        )
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), 256);
        platform.open_window(window(1, 1.0, 1.0));
        let resolver = ScaleResolver::new(Size::new(800, 600), false);

        let mut native = NativePointer::new(shape(Size::new(4, 4), [0, 0, 0, 255]));
        native.clear();
        CursorBuilder::default()
            .build(&mut platform, &resolver, &mut native, WindowId(1))
            .unwrap();
        assert!(native.is_built());

        native.clear();
        native.clear();
        assert!(!native.is_built());
        assert!(native.surface().is_none());
        assert!(platform.is_default_cursor());
    }

    #[test]
    fn test_shape_resampling_is_linear_regardless_of_config() {
        let config = PointerConfig::builder()
            .scale_filter(ScaleFilter::Nearest)
            .hidpi_alternate(false)
            .build()
            .unwrap();
        let mut platform = SoftwarePlatform::from_config(&config);
        platform.open_window(window(1, 2.0, 1.0));
        let resolver = ScaleResolver::new(Size::new(800, 600), false);

        let format = PixelFormat::bgra32();
        let mut pixels = vec![0u8; 8];
        format.write_rgba([0, 0, 0, 255], &mut pixels[..4]);
        format.write_rgba([255, 255, 255, 255], &mut pixels[4..]);
        let two_tone =
            PointerShape::from_pixels(Size::new(2, 1), Point::new(0, 0), format, &pixels).unwrap();

        let mut native = NativePointer::new(Arc::new(two_tone));
        CursorBuilder::from_config(&config)
            .build(&mut platform, &resolver, &mut native, WindowId(1))
            .unwrap();

        let [r, ..] = native.surface().unwrap().pixel_rgba(1, 0).unwrap();
        assert!(r > 0 && r < 255, "edge pixel {} was not blended", r);
    }

    #[test]
    fn test_build_without_alternate() {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), 256);
        platform.open_window(window(1, 1.0, 2.0));
        let resolver = ScaleResolver::new(Size::new(800, 600), false);
        let builder = CursorBuilder::new(false);

        let mut native = NativePointer::new(shape(Size::new(8, 8), [1, 2, 3, 255]));
        builder
            .build(&mut platform, &resolver, &mut native, WindowId(1))
            .unwrap();

        let cursor = native.cursor().unwrap();
        assert_eq!(cursor.nominal, Size::new(16, 16));
        assert_eq!((cursor.width, cursor.height), (16, 16));
        assert!(native.surface().unwrap().alternates().is_empty());
    }

    #[test]
    fn test_rebuild_replaces_handles() {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), 256);
        platform.open_window(window(1, 1.0, 1.0));
        let resolver = ScaleResolver::new(Size::new(800, 600), false);
        let builder = CursorBuilder::default();

        let mut native = NativePointer::new(shape(Size::new(8, 8), [1, 2, 3, 255]));
        builder.build(&mut platform, &resolver, &mut native, WindowId(1)).unwrap();
        assert_eq!(native.surface().unwrap().size(), Size::new(8, 8));

        platform.set_display_scale(WindowId(1), 2.0);
        builder.build(&mut platform, &resolver, &mut native, WindowId(1)).unwrap();
        assert_eq!(native.surface().unwrap().size(), Size::new(16, 16));
        assert_eq!(platform.cursors_created(), 2);
    }

    #[test]
    fn test_build_for_closed_window_fails_cleanly() {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), 256);
        let resolver = ScaleResolver::new(Size::new(800, 600), false);
        let mut native = NativePointer::new(shape(Size::new(8, 8), [0, 0, 0, 255]));

        let err = CursorBuilder::default()
            .build(&mut platform, &resolver, &mut native, WindowId(7))
            .unwrap_err();
        assert!(matches!(err, PointerError::Scale(_)));
        assert!(!native.is_built());
    }

    #[test]
    fn test_no_focus_installs_default() {
        let mut mgr = manager(1.0, 1.0);
        mgr.platform_mut().set_focus(None);

        mgr.handle_event(PointerEvent::Set(shape(Size::new(4, 4), [0, 0, 0, 255])))
            .unwrap();
        assert_eq!(mgr.state(), CursorState::Default);
        assert!(mgr.platform().is_default_cursor());
        assert_eq!(mgr.platform().cursors_created(), 0);
    }

    #[test]
    fn test_last_set_wins() {
        let mut mgr = manager(1.0, 1.0);
        let a = shape(Size::new(4, 4), [255, 0, 0, 255]);
        let b = shape(Size::new(6, 6), [0, 255, 0, 255]);

        mgr.handle_event(PointerEvent::Set(a.clone())).unwrap();
        mgr.handle_event(PointerEvent::Set(b.clone())).unwrap();

        assert_eq!(mgr.state(), CursorState::Custom(b.id()));
        let active = mgr.platform().active_cursor().unwrap();
        assert_eq!(active.width, 6);
        // a's native handles are gone, only the caller's reference is left
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn test_build_failure_installs_default() {
        let mut mgr = manager(1.0, 1.0);
        let small = shape(Size::new(4, 4), [0, 0, 0, 255]);
        mgr.handle_event(PointerEvent::Set(small)).unwrap();

        // 300x300 exceeds the 256 limit
        let huge = shape(Size::new(300, 300), [0, 0, 0, 255]);
        mgr.handle_event(PointerEvent::Set(huge.clone())).unwrap();

        assert_eq!(mgr.state(), CursorState::Default);
        assert!(mgr.platform().is_default_cursor());
        assert!(mgr.current().is_none());
        assert_eq!(Arc::strong_count(&huge), 1);
    }

    #[test]
    fn test_allocation_failure_is_fatal() {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), u32::MAX);
        platform.open_window(window(1, 1e9, 1.0));
        platform.set_focus(Some(WindowId(1)));
        let mut mgr = CursorManager::new(
            platform,
            ScaleResolver::new(Size::new(800, 600), false),
            CursorBuilder::default(),
        );

        let err = mgr
            .handle_event(PointerEvent::Set(shape(Size::new(32, 32), [0, 0, 0, 255])))
            .unwrap_err();
        assert!(matches!(err, PointerError::Allocation(_)), "{}", err);
        assert!(err.is_fatal());
        assert_eq!(mgr.state(), CursorState::Default);
        assert!(mgr.platform().is_default_cursor());
        assert!(mgr.current().is_none());
    }

    #[test]
    fn test_oversize_cursor_rejected_before_allocation() {
        let mut platform = SoftwarePlatform::new(PixelFormat::bgra32(), 256);
        platform.open_window(window(1, 1e6, 1.0));
        let resolver = ScaleResolver::new(Size::new(800, 600), false);

        let mut native = NativePointer::new(shape(Size::new(32, 32), [0, 0, 0, 255]));
        let err = CursorBuilder::default()
            .build(&mut platform, &resolver, &mut native, WindowId(1))
            .unwrap_err();
        // an allocation attempt at this size would fail as Allocation
        assert!(matches!(err, PointerError::Build(_)), "{}", err);
        assert!(err.to_string().contains("exceeds platform limit"));
        assert!(!native.is_built());
        assert_eq!(platform.cursors_created(), 0);
    }

    #[test]
    fn test_hidpi_alternate_sizes() {
        let mut mgr = manager(1.5, 2.0);
        let ptr = shape(Size::new(32, 32), [10, 20, 30, 255]);
        mgr.handle_event(PointerEvent::Set(ptr)).unwrap();

        let native = mgr.current().unwrap();
        assert_eq!(native.surface().unwrap().size(), Size::new(96, 96));

        let cursor = mgr.platform().active_cursor().unwrap();
        assert_eq!(cursor.nominal, Size::new(48, 48));
        assert_eq!((cursor.width, cursor.height), (96, 96));
        assert_eq!((cursor.hotspot_x, cursor.hotspot_y), (3, 3));
    }

    #[test]
    fn test_null_hides_and_default_shows() {
        let mut mgr = manager(1.0, 1.0);
        mgr.handle_event(PointerEvent::Set(shape(Size::new(4, 4), [0, 0, 0, 255])))
            .unwrap();

        mgr.handle_event(PointerEvent::Null).unwrap();
        assert_eq!(mgr.state(), CursorState::Hidden);
        assert!(!mgr.platform().is_visible());
        assert!(!mgr.has_cursor());
        assert!(mgr.current().is_none());

        mgr.handle_event(PointerEvent::Default).unwrap();
        assert_eq!(mgr.state(), CursorState::Default);
        assert!(mgr.platform().is_visible());
        assert!(mgr.has_cursor());
    }

    #[test]
    fn test_position_warps_in_focused_window() {
        let mut mgr = manager(2.0, 1.0);
        let ptr = shape(Size::new(4, 4), [0, 0, 0, 255]);
        mgr.handle_event(PointerEvent::Set(ptr.clone())).unwrap();

        mgr.handle_event(PointerEvent::Position { x: 10, y: 20 }).unwrap();
        assert_eq!(mgr.state(), CursorState::Custom(ptr.id()));
        assert_eq!(mgr.position(), Some(Point::new(10, 20)));
        assert_eq!(
            mgr.platform().pointer_position(),
            Some((WindowId(1), Point::new(20, 40)))
        );
    }

    #[test]
    fn test_position_without_focus_is_ignored() {
        let mut mgr = manager(1.0, 1.0);
        mgr.platform_mut().set_focus(None);
        mgr.handle_event(PointerEvent::Position { x: 5, y: 5 }).unwrap();
        assert_eq!(mgr.position(), Some(Point::new(5, 5)));
        assert_eq!(mgr.platform().pointer_position(), None);
    }

    #[test]
    fn test_release_of_active_pointer() {
        let mut mgr = manager(1.0, 1.0);
        let a = shape(Size::new(4, 4), [0, 0, 0, 255]);
        let b = shape(Size::new(4, 4), [0, 0, 0, 255]);
        mgr.handle_event(PointerEvent::Set(a.clone())).unwrap();

        mgr.handle_event(PointerEvent::Release(b.id())).unwrap();
        assert_eq!(mgr.state(), CursorState::Custom(a.id()));

        mgr.handle_event(PointerEvent::Release(a.id())).unwrap();
        assert_eq!(mgr.state(), CursorState::Default);
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn test_refresh_rebuilds_for_new_scale() {
        let mut mgr = manager(1.0, 1.0);
        mgr.handle_event(PointerEvent::Set(shape(Size::new(8, 8), [0, 0, 0, 255])))
            .unwrap();
        mgr.platform_mut().set_display_scale(WindowId(1), 2.0);

        mgr.refresh().unwrap();
        let cursor = mgr.platform().active_cursor().unwrap();
        assert_eq!((cursor.width, cursor.height), (16, 16));
        assert_eq!(mgr.platform().cursors_created(), 2);
    }

    #[test]
    fn test_process_pending_applies_in_order() {
        let (tx, rx) = pointer_channel();
        let mut mgr = manager(1.0, 1.0);
        let a = shape(Size::new(4, 4), [0, 0, 0, 255]);
        let b = shape(Size::new(4, 4), [0, 0, 0, 255]);

        tx.set(a).unwrap();
        tx.set_null().unwrap();
        tx.set(b.clone()).unwrap();

        assert_eq!(mgr.process_pending(&rx).unwrap(), 3);
        assert_eq!(mgr.state(), CursorState::Custom(b.id()));
        assert!(mgr.platform().is_visible());
    }
}

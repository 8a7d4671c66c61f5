//! Pointer backend interface consumed by the protocol layer.
//!
//! The protocol stack never touches native cursor objects. It talks to a
//! [`PointerBackend`] that it was handed once at start-up through
//! [`Graphics::register_pointer`]. The stock implementation,
//! [`ChannelPointerBackend`], decodes shapes on the calling thread and
//! forwards every state change to the UI thread as a [`PointerEvent`].
//!
//! [`PointerEvent`]: crate::dispatch::PointerEvent

use crate::dispatch::PointerSender;
use crate::errors::PointerError;
use crate::shape::{PointerAttributes, PointerRef, PointerShape};
use parking_lot::RwLock;
use rdp_pixelbuffer::{Palette, PixelFormat};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Operations the protocol layer performs on remote pointers.
///
/// `set*` requests are fire-and-forget: they return as soon as the request
/// is queued and fail only if the UI side has shut down.
pub trait PointerBackend: Send + Sync {
    /// Decode a new pointer shape.
    fn new_pointer(&self, attributes: &PointerAttributes<'_>) -> Result<PointerRef, PointerError>;

    /// Give up the protocol layer's reference to `pointer`.
    fn free(&self, pointer: PointerRef) -> Result<(), PointerError>;

    /// Make `pointer` the active cursor.
    fn set(&self, pointer: &PointerRef) -> Result<(), PointerError>;

    /// Hide the cursor.
    fn set_null(&self) -> Result<(), PointerError>;

    /// Show the platform default cursor.
    fn set_default(&self) -> Result<(), PointerError>;

    /// Move the pointer to session coordinates `(x, y)`.
    fn set_position(&self, x: u32, y: u32) -> Result<(), PointerError>;
}

/// Backend that decodes in place and forwards changes over a channel.
pub struct ChannelPointerBackend {
    sender: PointerSender,
    format: PixelFormat,
    palette: RwLock<Option<Palette>>,
}

impl ChannelPointerBackend {
    /// Decode into `format` and forward changes through `sender`.
    pub fn new(sender: PointerSender, format: PixelFormat) -> Self {
        Self {
            sender,
            format,
            palette: RwLock::new(None),
        }
    }

    /// Replace the palette used for 8bpp pointers.
    pub fn set_palette(&self, palette: Option<Palette>) {
        debug!(
            "Pointer palette updated ({} entries)",
            palette.as_ref().map_or(0, Palette::len)
        );
        *self.palette.write() = palette;
    }

    /// Pixel format shapes are decoded into.
    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

impl PointerBackend for ChannelPointerBackend {
    fn new_pointer(&self, attributes: &PointerAttributes<'_>) -> Result<PointerRef, PointerError> {
        let palette = self.palette.read();
        let shape = PointerShape::new(attributes, self.format, palette.as_ref())?;
        Ok(Arc::new(shape))
    }

    fn free(&self, pointer: PointerRef) -> Result<(), PointerError> {
        let id = pointer.id();
        drop(pointer);
        self.sender.release(id)
    }

    fn set(&self, pointer: &PointerRef) -> Result<(), PointerError> {
        self.sender.set(Arc::clone(pointer))
    }

    fn set_null(&self) -> Result<(), PointerError> {
        self.sender.set_null()
    }

    fn set_default(&self) -> Result<(), PointerError> {
        self.sender.set_default()
    }

    fn set_position(&self, x: u32, y: u32) -> Result<(), PointerError> {
        self.sender.set_position(x, y)
    }
}

impl fmt::Debug for ChannelPointerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelPointerBackend")
            .field("sender", &self.sender)
            .field("format", &self.format)
            .finish()
    }
}

/// Per-session rendering context the protocol layer draws through.
#[derive(Default)]
pub struct Graphics {
    pointer: Option<Arc<dyn PointerBackend>>,
}

impl Graphics {
    /// Create a context with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the pointer implementation. A later call replaces the earlier one.
    pub fn register_pointer(&mut self, backend: Arc<dyn PointerBackend>) {
        if self.pointer.is_some() {
            debug!("Replacing registered pointer backend");
        }
        self.pointer = Some(backend);
    }

    /// The registered pointer implementation, if any.
    pub fn pointer(&self) -> Option<&Arc<dyn PointerBackend>> {
        self.pointer.as_ref()
    }
}

impl fmt::Debug for Graphics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graphics")
            .field("pointer", &self.pointer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{pointer_channel, PointerEvent};
    use pretty_assertions::assert_eq;
    use rdp_common::Point;
    use rdp_pixelbuffer::pointer_data::scanline_step;
    use rdp_pixelbuffer::PointerMasks;

    fn mono_attributes<'a>(xor: &'a [u8], and: &'a [u8]) -> PointerAttributes<'a> {
        PointerAttributes {
            width: 16,
            height: 16,
            hotspot: Point::new(0, 0),
            masks: PointerMasks {
                xor_mask: xor,
                and_mask: and,
                xor_bpp: 1,
            },
        }
    }

    #[test]
    fn test_backend_forwards_events() {
        let (tx, rx) = pointer_channel();
        let backend = ChannelPointerBackend::new(tx, PixelFormat::bgra32());

        let xor = vec![0u8; scanline_step(16, 1) * 16];
        let and = vec![0u8; scanline_step(16, 1) * 16];
        let pointer = backend.new_pointer(&mono_attributes(&xor, &and)).unwrap();
        let id = pointer.id();

        backend.set(&pointer).unwrap();
        backend.set_position(3, 4).unwrap();
        backend.free(pointer).unwrap();

        let events: Vec<PointerEvent> = rx.drain().collect();
        assert_eq!(events.len(), 3);
        match &events[0] {
            PointerEvent::Set(p) => assert_eq!(p.id(), id),
            other => panic!("unexpected {}", other),
        }
        assert!(matches!(events[1], PointerEvent::Position { x: 3, y: 4 }));
        assert!(matches!(events[2], PointerEvent::Release(r) if r == id));
    }

    #[test]
    fn test_free_drops_protocol_reference() {
        let (tx, rx) = pointer_channel();
        let backend = ChannelPointerBackend::new(tx, PixelFormat::bgra32());

        let xor = vec![0u8; scanline_step(16, 1) * 16];
        let and = vec![0u8; scanline_step(16, 1) * 16];
        let pointer = backend.new_pointer(&mono_attributes(&xor, &and)).unwrap();
        backend.set(&pointer).unwrap();

        let weak = Arc::downgrade(&pointer);
        backend.free(pointer).unwrap();
        // the queued Set still holds the shape
        assert!(weak.upgrade().is_some());

        drop(rx.drain().collect::<Vec<_>>());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_palette_required_for_8bpp() {
        let (tx, _rx) = pointer_channel();
        let backend = ChannelPointerBackend::new(tx, PixelFormat::bgra32());

        let xor = vec![1u8; scanline_step(4, 8) * 4];
        let attributes = PointerAttributes {
            width: 4,
            height: 4,
            hotspot: Point::default(),
            masks: PointerMasks {
                xor_mask: &xor,
                and_mask: &[],
                xor_bpp: 8,
            },
        };
        assert!(matches!(
            backend.new_pointer(&attributes),
            Err(PointerError::Conversion(_))
        ));

        backend.set_palette(Some(Palette::new(vec![[0, 0, 0], [255, 0, 0]])));
        let pointer = backend.new_pointer(&attributes).unwrap();
        assert_eq!(pointer.format().to_rgba(&pointer.data()[0..4]), [255, 0, 0, 255]);
    }

    #[test]
    fn test_requests_fail_once_ui_is_gone() {
        let (tx, rx) = pointer_channel();
        let backend = ChannelPointerBackend::new(tx, PixelFormat::bgra32());
        drop(rx);
        assert_eq!(backend.set_default(), Err(PointerError::Disconnected));
        assert_eq!(backend.set_null(), Err(PointerError::Disconnected));
    }

    #[test]
    fn test_graphics_registration() {
        let (tx, _rx) = pointer_channel();
        let mut graphics = Graphics::new();
        assert!(graphics.pointer().is_none());

        graphics.register_pointer(Arc::new(ChannelPointerBackend::new(tx, PixelFormat::bgra32())));
        let backend = graphics.pointer().unwrap();
        backend.set_default().unwrap();
    }
}

//! Remote pointer resources and their hand-off to the UI thread.
//!
//! The protocol thread owns decoding: a pointer update arrives as an XOR/AND
//! mask pair, is converted into a [`PointerShape`] and shared as a
//! [`PointerRef`]. Requests to show, hide, move or release pointers are then
//! posted through the [`dispatch`] channel and applied by the UI thread,
//! which is the only thread allowed to create native cursors.
//!
//! # Example
//!
//! ```
//! use rdp_common::Point;
//! use rdp_pixelbuffer::{PixelFormat, PointerMasks};
//! use rdp_pointer::{
//!     pointer_channel, ChannelPointerBackend, PointerAttributes, PointerBackend, PointerEvent,
//! };
//!
//! let (tx, rx) = pointer_channel();
//! let backend = ChannelPointerBackend::new(tx, PixelFormat::bgra32());
//!
//! let xor = [0u8; 2 * 2];
//! let and = [0u8; 2 * 2];
//! let pointer = backend.new_pointer(&PointerAttributes {
//!     width: 2,
//!     height: 2,
//!     hotspot: Point::new(0, 0),
//!     masks: PointerMasks { xor_mask: &xor, and_mask: &and, xor_bpp: 1 },
//! })?;
//! backend.set(&pointer)?;
//!
//! assert!(matches!(rx.try_recv(), Some(PointerEvent::Set(_))));
//! # Ok::<(), rdp_pointer::PointerError>(())
//! ```

pub mod backend;
pub mod dispatch;
pub mod errors;
pub mod shape;

pub use backend::{ChannelPointerBackend, Graphics, PointerBackend};
pub use dispatch::{pointer_channel, PointerEvent, PointerReceiver, PointerSender};
pub use errors::PointerError;
pub use shape::{PointerAttributes, PointerId, PointerRef, PointerShape};

/// Result type for pointer operations.
pub type Result<T> = std::result::Result<T, PointerError>;

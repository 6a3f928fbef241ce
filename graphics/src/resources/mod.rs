//! Native-backed resources.
//!
//! This module contains the resource types created by [`GraphicsDevice`]:
//! - [`Texture`] - 2D or cube texture, optionally bindable as a render target
//! - [`VertexBuffer`] / [`IndexBuffer`] - geometry storage handles
//!
//! Resources are reference-counted with [`Rc`] and hold only their native
//! handle. The device keeps a weak registry of everything it created and
//! disposes whatever is still alive when the device itself is disposed.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Rc`]: std::rc::Rc

mod buffer;
mod texture;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use texture::Texture;

use crate::backend::NativeContext;

/// Lifecycle hooks shared by every resource the device tracks.
pub trait GraphicsResource {
    /// Release the native object. Calling this twice is a no-op.
    fn dispose(&self, context: &mut dyn NativeContext);

    /// Whether [`dispose`](Self::dispose) has run.
    fn is_disposed(&self) -> bool;

    /// Called after the device has been reset.
    fn device_reset(&self) {}
}

//! Framebuffer and drawing
//!
//! [`Framebuffer`] holds panel-ready packed pixels. [`primitives`] draws into
//! it with integer-only algorithms; anything from `embedded_graphics` works as
//! well through the `DrawTarget` impl.

pub mod font;
pub mod framebuffer;
pub mod primitives;

pub use font::{Font, FONT_8X8};
pub use framebuffer::Framebuffer;

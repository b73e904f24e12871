//! Packed pixel buffer sized for a panel
//!
//! Layout matches what the panel RAM expects, so [`Framebuffer::as_bytes`] can
//! be handed straight to [`crate::epd::driver::Controller::display`]:
//!
//! - rows are `ceil(width * bpp / 8)` bytes, padded at the end
//! - [`ColorDepth::Mono`]: 8 pixels per byte, leftmost pixel in bit 7
//! - [`ColorDepth::Nibble`]: 2 pixels per byte, even x in the high nibble

use core::convert::Infallible;

use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

use crate::epd::color::PaletteIndex;
use crate::epd::error::Error;
use crate::epd::profile::{ColorDepth, PanelProfile};

/// Packed framebuffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    depth: ColorDepth,
    buffer: Vec<u8>,
}

impl Framebuffer {
    /// Zeroed framebuffer (palette index 0 everywhere)
    pub fn new(width: u16, height: u16, depth: ColorDepth) -> Self {
        let size = Self::size_for(width, height, depth);
        Framebuffer {
            width,
            height,
            depth,
            buffer: vec![0; size],
        }
    }

    /// Framebuffer matching a panel profile
    pub fn for_profile(profile: &PanelProfile) -> Self {
        Self::new(profile.width, profile.height, profile.depth)
    }

    fn size_for(width: u16, height: u16, depth: ColorDepth) -> usize {
        Self::stride_for(width, depth) * usize::from(height)
    }

    fn stride_for(width: u16, depth: ColorDepth) -> usize {
        (usize::from(width) * usize::from(depth.bits())).div_ceil(8)
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Bit depth
    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Bytes per row
    pub fn row_stride(&self) -> usize {
        Self::stride_for(self.width, self.depth)
    }

    /// Buffer length this framebuffer always has
    pub fn expected_size(&self) -> usize {
        Self::size_for(self.width, self.height, self.depth)
    }

    /// Packed bytes, ready for the panel
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Set every pixel to `color` (masked to the bit depth)
    pub fn fill(&mut self, color: u8) {
        let byte = self.depth.fill_byte(color);
        self.buffer.fill(byte);
    }

    /// Replace the contents with an externally prepared frame.
    ///
    /// The buffer must be exactly [`Framebuffer::expected_size`] bytes; on
    /// mismatch the framebuffer is left untouched.
    pub fn load_external(&mut self, data: &[u8]) -> Result<(), Error> {
        let expected = self.expected_size();
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        self.buffer.copy_from_slice(data);
        Ok(())
    }

    /// Byte index and bit shift of an in-bounds pixel
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let bits = usize::from(self.depth.bits());
        let index = y * self.row_stride() + (x * bits) / 8;
        let shift = match self.depth {
            ColorDepth::Mono => 7 - (x % 8) as u8,
            ColorDepth::Nibble => {
                if x % 2 == 0 {
                    4
                } else {
                    0
                }
            }
        };
        Some((index, shift))
    }

    /// Set one pixel. Out of range coordinates are ignored; `color` wraps
    /// modulo the palette size.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u8) {
        let Some((index, shift)) = self.locate(x, y) else {
            return;
        };
        let mask = self.depth.mask();
        let byte = &mut self.buffer[index];
        *byte = (*byte & !(mask << shift)) | ((color & mask) << shift);
    }

    /// Read one pixel. Out of range coordinates read as 0.
    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        match self.locate(x, y) {
            Some((index, shift)) => (self.buffer[index] >> shift) & self.depth.mask(),
            None => 0,
        }
    }
}

impl AsRef<[u8]> for Framebuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// For use with embedded_graphics
impl DrawTarget for Framebuffer {
    type Color = PaletteIndex;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.0);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.0);
        Ok(())
    }
}

/// For use with embedded_graphics
impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

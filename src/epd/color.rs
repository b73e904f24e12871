//! Colours as palette indices
//!
//! Framebuffers store palette indices, not RGB. These types give the indices
//! names for the built-in panels and plug them into embedded-graphics.

use embedded_graphics::pixelcolor::raw::RawU8;
use embedded_graphics::pixelcolor::{BinaryColor, PixelColor, Rgb888};
use embedded_graphics::prelude::{RgbColor, WebColors};

/// A palette index as stored in a framebuffer.
///
/// Values are masked to the framebuffer's bit depth when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PaletteIndex(pub u8);

impl PixelColor for PaletteIndex {
    type Raw = RawU8;
}

impl From<u8> for PaletteIndex {
    fn from(index: u8) -> Self {
        PaletteIndex(index)
    }
}

impl From<PaletteIndex> for u8 {
    fn from(color: PaletteIndex) -> Self {
        color.0
    }
}

/// `On` draws black, `Off` draws white, as on paper.
impl From<BinaryColor> for PaletteIndex {
    fn from(color: BinaryColor) -> Self {
        match color {
            BinaryColor::On => Mono::Black.into(),
            BinaryColor::Off => Mono::White.into(),
        }
    }
}

/// Black/white panel palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mono {
    /// Black pixel (RAM bit 0)
    Black = 0,
    /// White pixel (RAM bit 1)
    White = 1,
}

impl From<Mono> for PaletteIndex {
    fn from(color: Mono) -> Self {
        PaletteIndex(color as u8)
    }
}

/// Seven-colour ACeP palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Acep7 {
    #[allow(missing_docs)]
    Black = 0b000,
    #[allow(missing_docs)]
    White = 0b001,
    #[allow(missing_docs)]
    Green = 0b010,
    #[allow(missing_docs)]
    Blue = 0b011,
    #[allow(missing_docs)]
    Red = 0b100,
    #[allow(missing_docs)]
    Yellow = 0b101,
    #[allow(missing_docs)]
    Orange = 0b110,
    /// Not a real colour: drives the pixel without dithering, used to clear
    Clean = 0b111,
}

impl Acep7 {
    /// Closest palette entry for an exact primary colour; anything else maps
    /// to white. No dithering is attempted.
    pub fn from_rgb888(rgb: Rgb888) -> Self {
        match rgb {
            Rgb888::BLACK => Self::Black,
            Rgb888::WHITE => Self::White,
            Rgb888::GREEN => Self::Green,
            Rgb888::BLUE => Self::Blue,
            Rgb888::RED => Self::Red,
            Rgb888::YELLOW => Self::Yellow,
            Rgb888::CSS_ORANGE => Self::Orange,
            _ => Self::White,
        }
    }
}

impl From<Acep7> for PaletteIndex {
    fn from(color: Acep7) -> Self {
        PaletteIndex(color as u8)
    }
}

//! Pin definitions for the Waveshare ESP32-S3 PhotoPainter board
//!
//! This module contains all GPIO pin assignments used by the firmware binary.

/// Pin configuration constants for the e-paper panel and the power-management IC
pub struct Pins;

impl Pins {
    // SPI Display pins
    /// SPI Clock pin
    pub const SCK: u8 = 12;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 11;
    /// SPI Master In Slave Out (unused by the panel, reserved for the bus)
    pub const MISO: u8 = 13;
    /// Chip Select pin for SPI display
    pub const CS: u8 = 10;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 9;
    /// Reset pin for display
    pub const RST: u8 = 8;
    /// Busy status pin
    pub const BSY: u8 = 7;

    // PMIC pins
    /// AXP2101 I2C data
    pub const PMIC_SDA: u8 = 17;
    /// AXP2101 I2C clock
    pub const PMIC_SCL: u8 = 18;
}

/// SPI bus settings used with the panel
pub struct SpiSettings;

impl SpiSettings {
    /// Bus clock in Hz
    pub const BAUDRATE_HZ: u32 = 4_000_000;
    /// Clock idles low, data sampled on the rising edge
    pub const MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_0;
}

/// I2C bus clock for the PMIC in Hz
pub const PMIC_I2C_BAUDRATE_HZ: u32 = 400_000;

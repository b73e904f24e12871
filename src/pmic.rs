//! AXP2101 power management IC driver
//!
//! The PhotoPainter powers the e-paper panel from the PMIC's ALDO1 rail, so the
//! rail has to be up before [`crate::epd::driver::Controller::init`] is called.
//!
//! Reference: X-Powers AXP2101 datasheet

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// 7-bit I2C address on the PhotoPainter
pub const AXP2101_I2C_ADDR: u8 = 0x34;

/// Power status (bit 3: battery present)
pub const REG_STATUS: u8 = 0x00;
/// Charger mode and status, low nibble is the charge state
pub const REG_MODE_CHGSTATUS: u8 = 0x01;
/// Power off control (bit 0: power off)
pub const REG_POWER_OFF_EN: u8 = 0x12;
/// ADC channel enable
pub const REG_ADC_CHANNEL_CONTROL: u8 = 0x30;
/// First of the IRQ status registers
pub const REG_IRQ_STATUS1: u8 = 0x48;
/// Second IRQ status register
pub const REG_IRQ_STATUS2: u8 = 0x49;
/// DCDC on/off (bits 0..=2: DCDC1..DCDC3)
pub const REG_DC_ONOFF_DVM: u8 = 0x80;
/// LDO on/off (bits 0..=1: ALDO1..ALDO2)
pub const REG_LDO_ONOFF_SET: u8 = 0x90;

/// Battery present bit in [`REG_STATUS`]
pub const STATUS_BATTERY_PRESENT: u8 = 0x08;

const POWER_STABLE_MS: u32 = 10;
const DISPLAY_POWER_STABLE_MS: u32 = 5;

/// Switchable supply rails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rail {
    /// 3.3 V system
    Dcdc1,
    /// ESP32-S3 core
    Dcdc2,
    /// Peripherals
    Dcdc3,
    /// E-paper panel
    Aldo1,
    /// Additional peripherals
    Aldo2,
}

impl Rail {
    /// Enable register and bit
    const fn location(self) -> (u8, u8) {
        match self {
            Rail::Dcdc1 => (REG_DC_ONOFF_DVM, 0),
            Rail::Dcdc2 => (REG_DC_ONOFF_DVM, 1),
            Rail::Dcdc3 => (REG_DC_ONOFF_DVM, 2),
            Rail::Aldo1 => (REG_LDO_ONOFF_SET, 0),
            Rail::Aldo2 => (REG_LDO_ONOFF_SET, 1),
        }
    }
}

/// PMIC errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PmicError {
    /// Nothing answered at the address during probing
    #[error("AXP2101 not found at address 0x{addr:02X}")]
    NotFound {
        /// Probed address
        addr: u8,
    },
    /// An I2C transfer failed
    #[error("I2C error: {0:?}")]
    Bus(ErrorKind),
}

/// AXP2101 over embedded-hal I2C
pub struct Axp2101<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C> Axp2101<I2C>
where
    I2C: I2c,
{
    /// Probe the status register at `addr`.
    pub fn new(mut i2c: I2C, addr: u8) -> Result<Self, PmicError> {
        let mut buf = [0u8; 1];
        if let Err(e) = i2c.write_read(addr, &[REG_STATUS], &mut buf) {
            log::error!("AXP2101 probe at 0x{:02X} failed: {:?}", addr, e.kind());
            return Err(PmicError::NotFound { addr });
        }
        log::info!("AXP2101 found at 0x{:02X}", addr);
        Ok(Axp2101 { i2c, addr })
    }

    /// Give back the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, PmicError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(|e| PmicError::Bus(e.kind()))?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), PmicError> {
        self.i2c
            .write(self.addr, &[reg, value])
            .map_err(|e| PmicError::Bus(e.kind()))
    }

    fn update_bit(&mut self, reg: u8, bit: u8, set: bool) -> Result<(), PmicError> {
        let value = self.read_reg(reg)?;
        let value = if set {
            value | (1 << bit)
        } else {
            value & !(1 << bit)
        };
        self.write_reg(reg, value)
    }

    /// Bring up DCDC1..3 and ALDO1..2, then wait for the rails to settle.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PmicError> {
        for rail in [
            Rail::Dcdc1,
            Rail::Dcdc2,
            Rail::Dcdc3,
            Rail::Aldo1,
            Rail::Aldo2,
        ] {
            self.set_rail(rail, true)?;
        }
        delay.delay_ms(POWER_STABLE_MS);
        log::info!("AXP2101 rails enabled");
        Ok(())
    }

    /// Switch one rail on or off, leaving the others alone
    pub fn set_rail(&mut self, rail: Rail, on: bool) -> Result<(), PmicError> {
        let (reg, bit) = rail.location();
        log::debug!("{:?} {}", rail, if on { "on" } else { "off" });
        self.update_bit(reg, bit, on)
    }

    /// Power the panel (ALDO1) and wait for it to settle
    pub fn enable_display_power<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PmicError> {
        self.set_rail(Rail::Aldo1, true)?;
        delay.delay_ms(DISPLAY_POWER_STABLE_MS);
        Ok(())
    }

    /// Cut panel power
    pub fn disable_display_power(&mut self) -> Result<(), PmicError> {
        self.set_rail(Rail::Aldo1, false)
    }

    /// Raw power status register
    pub fn status(&mut self) -> Result<u8, PmicError> {
        self.read_reg(REG_STATUS)
    }

    /// Raw charger status register
    pub fn charging_status(&mut self) -> Result<u8, PmicError> {
        self.read_reg(REG_MODE_CHGSTATUS)
    }

    /// Pre-charge or constant-current charge in progress
    pub fn is_charging(&mut self) -> Result<bool, PmicError> {
        let state = self.charging_status()? & 0x0F;
        Ok(matches!(state, 0x01 | 0x02))
    }

    /// Battery connected
    pub fn is_battery_present(&mut self) -> Result<bool, PmicError> {
        Ok(self.status()? & STATUS_BATTERY_PRESENT != 0)
    }

    /// Shut the whole board down. Does not return on real hardware.
    pub fn power_off(&mut self) -> Result<(), PmicError> {
        log::warn!("AXP2101 power off requested");
        self.update_bit(REG_POWER_OFF_EN, 0, true)
    }

    /// Acknowledge all pending interrupts
    pub fn clear_irq(&mut self) -> Result<(), PmicError> {
        self.write_reg(REG_IRQ_STATUS1, 0xFF)?;
        self.write_reg(REG_IRQ_STATUS2, 0xFF)
    }

    /// Enable every ADC channel
    pub fn enable_adc(&mut self) -> Result<(), PmicError> {
        self.write_reg(REG_ADC_CHANNEL_CONTROL, 0xFF)
    }

    /// Disable every ADC channel
    pub fn disable_adc(&mut self) -> Result<(), PmicError> {
        self.write_reg(REG_ADC_CHANNEL_CONTROL, 0x00)
    }
}

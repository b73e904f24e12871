//! Panel transport: the byte-level capability the controller drives
//!
//! The controller never touches a bus directly. It only needs the primitives of
//! [`Transport`], which keeps the protocol state machine testable against
//! [`crate::epd::sim::SimTransport`] and portable across HALs.
use display_interface::DisplayError;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

/// Discrete control lines between host and panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLine {
    /// Chip select (active low)
    ChipSelect,
    /// Data/command select (low = command, high = data)
    DataCommand,
    /// Hardware reset (active low)
    Reset,
}

/// Logic level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic low
    Low,
    /// Logic high
    High,
}

impl Level {
    /// The other level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Byte-level access to a panel controller.
///
/// Implementations own the bus and the control/status lines. The controller
/// assumes exclusive access; wrap it in a mutex if a host shares it.
pub trait Transport {
    /// Send a single command byte (DC low).
    fn write_command(&mut self, command: u8) -> Result<(), DisplayError>;

    /// Send a burst of data bytes (DC high).
    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError>;

    /// Drive a control line to the given level.
    fn set_control_line(&mut self, line: ControlLine, level: Level) -> Result<(), DisplayError>;

    /// Sample the busy status line.
    fn read_busy_line(&mut self) -> Result<Level, DisplayError>;

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_command(&mut self, command: u8) -> Result<(), DisplayError> {
        (**self).write_command(command)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        (**self).write_data(data)
    }

    fn set_control_line(&mut self, line: ControlLine, level: Level) -> Result<(), DisplayError> {
        (**self).set_control_line(line, level)
    }

    fn read_busy_line(&mut self) -> Result<Level, DisplayError> {
        (**self).read_busy_line()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// [`Transport`] over embedded-hal 1.0 SPI and GPIO
///
/// Chip select is owned by the [`SpiDevice`], which asserts it around every
/// transfer, so [`ControlLine::ChipSelect`] requests are accepted and ignored.
pub struct SpiTransport<SPI, BSY, DC, RST, DELAY> {
    /// SPI device (manages CS)
    spi: SPI,
    /// Busy status input
    busy: BSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Reseting
    rst: RST,
    /// Delay provider for reset pulses and busy polling
    delay: DELAY,
}

impl<SPI, BSY, DC, RST, DELAY> SpiTransport<SPI, BSY, DC, RST, DELAY> {
    /// Wrap the bus and pins. Performs no I/O.
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, delay: DELAY) -> Self {
        SpiTransport {
            spi,
            busy,
            dc,
            rst,
            delay,
        }
    }

    /// Give back the bus and pins
    pub fn release(self) -> (SPI, BSY, DC, RST, DELAY) {
        (self.spi, self.busy, self.dc, self.rst, self.delay)
    }
}

impl<SPI, BSY, DC, RST, DELAY> Transport for SpiTransport<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn write_command(&mut self, command: u8) -> Result<(), DisplayError> {
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;

        match self.spi.write(&[command]) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {:?}", command, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(data)
            .map_err(|_| DisplayError::BusWriteError)
    }

    fn set_control_line(&mut self, line: ControlLine, level: Level) -> Result<(), DisplayError> {
        match (line, level) {
            (ControlLine::ChipSelect, _) => Ok(()),
            (ControlLine::DataCommand, Level::High) => {
                self.dc.set_high().map_err(|_| DisplayError::DCError)
            }
            (ControlLine::DataCommand, Level::Low) => {
                self.dc.set_low().map_err(|_| DisplayError::DCError)
            }
            (ControlLine::Reset, Level::High) => {
                self.rst.set_high().map_err(|_| DisplayError::RSError)
            }
            (ControlLine::Reset, Level::Low) => {
                self.rst.set_low().map_err(|_| DisplayError::RSError)
            }
        }
    }

    fn read_busy_line(&mut self) -> Result<Level, DisplayError> {
        // DisplayError has no busy variant; a failed read is reported like a DC fault
        self.busy
            .is_high()
            .map(Level::from)
            .map_err(|_| DisplayError::DCError)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

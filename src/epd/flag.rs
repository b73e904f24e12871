/// Register payload values used by the built-in panel profiles.
///
/// Grouped by the command they belong to. Values for the ED2208-GCA come from the
/// vendor init sequence; the ACeP values come from the 7.3" reference firmware.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Driver Output Control (0x01): MUX = gate lines - 1, then GD/SM/TB
    pub const DRIVER_OUTPUT_GATE_SCAN_FROM_G0: u8 = 0x00;

    // Booster Soft Start Control (0x0C)
    pub const BOOSTER_SOFT_START_PHASE1: u8 = 0xD7;
    pub const BOOSTER_SOFT_START_PHASE2: u8 = 0xD6;
    pub const BOOSTER_SOFT_START_PHASE3: u8 = 0x9D;

    // Write VCOM register (0x2C)
    pub const VCOM_ED2208: u8 = 0xA8;

    // Dummy line period (0x3A) / gate line width (0x3B)
    pub const DUMMY_LINE_PERIOD: u8 = 0x1A;
    pub const GATE_LINE_WIDTH: u8 = 0x08;

    // Data Entry Mode (0x11)
    pub const DATA_ENTRY_INCRY_INCRX: u8 = 0x03; // Y increment, X increment

    // Display Update Control 2 (0x22)
    pub const DISPLAY_UPDATE_FULL: u8 = 0xC7; // clock, analog, OTP LUT, display
    pub const DISPLAY_UPDATE_REGISTER_LUT: u8 = 0xC4; // clock, analog, display (LUT already loaded)

    // Deep Sleep Mode (0x10) / ACeP deep sleep (0x07) check code
    pub const DEEP_SLEEP_MODE_1: u8 = 0x01;
    pub const ACEP_DEEP_SLEEP_CHECK: u8 = 0xA5;

    // ACeP refresh / power-off payload
    pub const ACEP_REFRESH_NORMAL: u8 = 0x00;
    pub const ACEP_POWER_OFF_NORMAL: u8 = 0x00;
}

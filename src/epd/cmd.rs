//! Command opcodes for the panel controllers used by the built-in profiles.

/// SSD16xx-family opcodes (ED2208-GCA, 2.13" black/white).
pub struct Cmd;
#[allow(missing_docs)]
impl Cmd {
    // Init
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const BOOSTER_SOFT_START_CONTROL: u8 = 0x0C;
    pub const DEEP_SLEEP_MODE: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const WRITE_VCOM_REGISTER: u8 = 0x2C;
    pub const WRITE_LUT_REGISTER: u8 = 0x32;
    pub const SET_DUMMY_LINE_PERIOD: u8 = 0x3A;
    pub const SET_GATE_TIME: u8 = 0x3B;

    // RAM window
    pub const SET_RAMX_START_END: u8 = 0x44;
    pub const SET_RAMY_START_END: u8 = 0x45;
    pub const SET_RAMX_COUNTER: u8 = 0x4E;
    pub const SET_RAMY_COUNTER: u8 = 0x4F;

    // Update
    pub const WRITE_RAM: u8 = 0x24;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;
    pub const TERMINATE_FRAME_READ_WRITE: u8 = 0xFF;
}

/// UC81xx-family opcodes (7.3" seven-colour ACeP panel).
pub struct AcepCmd;
#[allow(missing_docs)]
impl AcepCmd {
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_SETTING: u8 = 0x01;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_OFF_SEQUENCE: u8 = 0x03;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START_1: u8 = 0x05;
    pub const BOOSTER_SOFT_START_2: u8 = 0x06;
    pub const DEEP_SLEEP: u8 = 0x07;
    pub const BOOSTER_SOFT_START_3: u8 = 0x08;
    pub const DATA_START_TRANSMISSION: u8 = 0x10;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const IPC: u8 = 0x13;
    pub const PLL_CONTROL: u8 = 0x30;
    pub const TEMPERATURE_SENSOR_ENABLE: u8 = 0x41;
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const TCON_SETTING: u8 = 0x60;
    pub const RESOLUTION_SETTING: u8 = 0x61;
    pub const VCOM_DC_SETTING: u8 = 0x82;
    pub const T_VDCS: u8 = 0x84;
    pub const AGID: u8 = 0x86;
    pub const CMDH: u8 = 0xAA;
    pub const CCSET: u8 = 0xE0;
    pub const POWER_SAVING: u8 = 0xE3;
    pub const TSSET: u8 = 0xE6;
}

//! Panel profiles: per-model constant data
//!
//! A [`PanelProfile`] carries everything that differs between panel models:
//! resolution, colour depth, opcodes, the ordered init sequence, the refresh
//! sequence and optional waveform LUT. The controller and framebuffer are the
//! same code for every model; only the profile value changes.
//!
//! Built-in profiles:
//! - [`ED2208_GCA`]: 2.13" 250x122 black/white (SSD16xx family), OTP waveform.
//! - [`ED2208_GCA_PARTIAL`]: same panel, fast refresh from a register LUT.
//! - [`EPD_7IN3F`]: 7.3" 800x480 seven-colour ACeP (UC81xx family), 4 bits per pixel.

use crate::epd::cmd::{AcepCmd, Cmd};
use crate::epd::flag::Flag;
use crate::epd::interface::Level;

/// Bits used to store one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 1 bit per pixel, MSB is the leftmost pixel
    Mono,
    /// 4 bits per pixel, high nibble is the leftmost pixel
    Nibble,
}

impl ColorDepth {
    /// Bits per pixel
    pub const fn bits(self) -> u8 {
        match self {
            ColorDepth::Mono => 1,
            ColorDepth::Nibble => 4,
        }
    }

    /// Mask selecting a palette index of this depth
    pub const fn mask(self) -> u8 {
        match self {
            ColorDepth::Mono => 0x01,
            ColorDepth::Nibble => 0x0F,
        }
    }

    /// Number of distinct palette indices
    pub const fn levels(self) -> u16 {
        1 << self.bits()
    }

    /// A byte with every pixel slot set to `color`, masked to this depth
    pub const fn fill_byte(self, color: u8) -> u8 {
        let c = color & self.mask();
        match self {
            ColorDepth::Mono => 0u8.wrapping_sub(c),
            ColorDepth::Nibble => (c << 4) | c,
        }
    }
}

/// One entry of a command table: opcode, payload, and whether the panel goes
/// busy afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Command byte
    pub opcode: u8,
    /// Data bytes sent right after the command (may be empty)
    pub data: &'static [u8],
    /// Wait for the busy line to clear after sending
    pub blocking: bool,
    /// Extra settle time after the step (and after the busy wait, if any)
    pub delay_ms: u32,
}

impl Step {
    /// A bare command without payload
    pub const fn cmd(opcode: u8) -> Self {
        Step {
            opcode,
            data: &[],
            blocking: false,
            delay_ms: 0,
        }
    }

    /// A command followed by `data`
    pub const fn with_data(opcode: u8, data: &'static [u8]) -> Self {
        Step {
            opcode,
            data,
            blocking: false,
            delay_ms: 0,
        }
    }

    /// Mark the step as one after which the busy line must be waited out
    pub const fn blocking(self) -> Self {
        Step {
            blocking: true,
            ..self
        }
    }

    /// Add a settle delay after the step
    pub const fn then_delay(self, delay_ms: u32) -> Self {
        Step { delay_ms, ..self }
    }
}

/// Opcodes for the RAM address window (SSD16xx style controllers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamWindow {
    /// Set RAM X start/end (in bytes)
    pub x_range: u8,
    /// Set RAM Y start/end (in lines, little endian u16)
    pub y_range: u8,
    /// Set RAM X address counter
    pub x_counter: u8,
    /// Set RAM Y address counter
    pub y_counter: u8,
}

/// Semantic operation -> opcode mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTable {
    /// Start streaming pixel data into panel RAM
    pub write_ram: u8,
    /// Start the physical refresh, followed by `refresh_data`
    pub refresh: u8,
    /// Payload of the refresh command (may be empty)
    pub refresh_data: &'static [u8],
    /// Enter deep sleep, followed by `deep_sleep_data`
    pub deep_sleep: u8,
    /// Payload of the deep sleep command
    pub deep_sleep_data: &'static [u8],
    /// Upload a waveform LUT (only used when the profile carries one)
    pub write_lut: Option<u8>,
    /// RAM window opcodes; `None` for controllers that take the resolution in
    /// the init sequence instead
    pub ram_window: Option<RamWindow>,
}

/// Reset pulse and busy-wait bounds.
///
/// Busy waits are bounded by a poll count times a fixed interval, not wall clock
/// time, so they behave the same against a simulated transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Reset held high before the pulse
    pub reset_high_ms: u32,
    /// Reset pulse width (line low)
    pub reset_low_ms: u32,
    /// Settle time after releasing reset
    pub reset_settle_ms: u32,
    /// Delay between two busy samples
    pub busy_poll_interval_ms: u32,
    /// Busy polls allowed per wait during `init()`
    pub init_max_polls: u32,
    /// Busy polls allowed per wait during a refresh
    pub refresh_max_polls: u32,
}

impl Timing {
    /// Worst case duration of one init busy wait
    pub const fn init_timeout_ms(&self) -> u32 {
        self.init_max_polls * self.busy_poll_interval_ms
    }

    /// Worst case duration of one refresh busy wait
    pub const fn refresh_timeout_ms(&self) -> u32 {
        self.refresh_max_polls * self.busy_poll_interval_ms
    }
}

/// Immutable description of one panel model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelProfile {
    /// Human readable model name, used in logs
    pub name: &'static str,
    /// Pixels per row
    pub width: u16,
    /// Rows
    pub height: u16,
    /// Pixel packing
    pub depth: ColorDepth,
    /// Level of the busy line while the controller is busy
    pub busy_level: Level,
    /// Opcodes for the semantic operations
    pub commands: CommandTable,
    /// Register configuration, sent in order by `init()`
    pub init_sequence: &'static [Step],
    /// Sent after the pixel data, before the refresh command
    pub refresh_prelude: &'static [Step],
    /// Sent once the refresh has completed
    pub refresh_epilogue: &'static [Step],
    /// Optional waveform lookup table uploaded at the end of `init()`
    pub lut: Option<&'static [u8]>,
    /// Reset and busy-wait timing
    pub timing: Timing,
}

impl PanelProfile {
    /// Bytes per row: `ceil(width * bits / 8)`
    pub const fn row_stride(&self) -> usize {
        (self.width as usize * self.depth.bits() as usize).div_ceil(8)
    }

    /// Exact size in bytes of a frame for this panel
    pub const fn frame_size(&self) -> usize {
        self.row_stride() * self.height as usize
    }

    /// Payload of the RAM X range command: first and last byte column
    pub fn ram_x_range(&self) -> [u8; 2] {
        let last = self.row_stride().saturating_sub(1);
        [0x00, last as u8]
    }

    /// Payload of the RAM Y range command: first and last line, little endian
    pub fn ram_y_range(&self) -> [u8; 4] {
        let last = self.height.saturating_sub(1);
        [0x00, 0x00, (last & 0xFF) as u8, (last >> 8) as u8]
    }
}

/// Shared SSD16xx timing: 200 ms reset phases, 10 ms polls, 5 s per wait
const SSD16XX_TIMING: Timing = Timing {
    reset_high_ms: 200,
    reset_low_ms: 2,
    reset_settle_ms: 200,
    busy_poll_interval_ms: 10,
    init_max_polls: 500,
    refresh_max_polls: 500,
};

const ED2208_RAM_WINDOW: RamWindow = RamWindow {
    x_range: Cmd::SET_RAMX_START_END,
    y_range: Cmd::SET_RAMY_START_END,
    x_counter: Cmd::SET_RAMX_COUNTER,
    y_counter: Cmd::SET_RAMY_COUNTER,
};

const ED2208_INIT: &[Step] = &[
    Step::cmd(Cmd::SW_RESET).blocking(),
    // MUX = 122 gate lines - 1
    Step::with_data(
        Cmd::DRIVER_OUTPUT_CONTROL,
        &[0x79, 0x00, Flag::DRIVER_OUTPUT_GATE_SCAN_FROM_G0],
    ),
    Step::with_data(
        Cmd::BOOSTER_SOFT_START_CONTROL,
        &[
            Flag::BOOSTER_SOFT_START_PHASE1,
            Flag::BOOSTER_SOFT_START_PHASE2,
            Flag::BOOSTER_SOFT_START_PHASE3,
        ],
    ),
    Step::with_data(Cmd::WRITE_VCOM_REGISTER, &[Flag::VCOM_ED2208]),
    Step::with_data(Cmd::SET_DUMMY_LINE_PERIOD, &[Flag::DUMMY_LINE_PERIOD]),
    Step::with_data(Cmd::SET_GATE_TIME, &[Flag::GATE_LINE_WIDTH]),
    Step::with_data(Cmd::DATA_ENTRY_MODE, &[Flag::DATA_ENTRY_INCRY_INCRX]),
];

const ED2208_EPILOGUE: &[Step] = &[Step::cmd(Cmd::TERMINATE_FRAME_READ_WRITE)];

/// Waveform for fast (partial) refresh on the ED2208-GCA: 20 bytes of phase
/// selection followed by 10 bytes of phase timing.
pub const ED2208_LUT_PARTIAL: [u8; 30] = [
    0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x0F, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
];

/// Waveshare ED2208-GCA, 2.13" 250x122 black and white.
///
/// Palette: 0 = black, 1 = white. Uses the waveform stored in OTP.
pub const ED2208_GCA: PanelProfile = PanelProfile {
    name: "ED2208-GCA",
    width: 250,
    height: 122,
    depth: ColorDepth::Mono,
    busy_level: Level::High,
    commands: CommandTable {
        write_ram: Cmd::WRITE_RAM,
        refresh: Cmd::MASTER_ACTIVATION,
        refresh_data: &[],
        deep_sleep: Cmd::DEEP_SLEEP_MODE,
        deep_sleep_data: &[Flag::DEEP_SLEEP_MODE_1],
        write_lut: Some(Cmd::WRITE_LUT_REGISTER),
        ram_window: Some(ED2208_RAM_WINDOW),
    },
    init_sequence: ED2208_INIT,
    refresh_prelude: &[Step::with_data(
        Cmd::DISPLAY_UPDATE_CTRL2,
        &[Flag::DISPLAY_UPDATE_FULL],
    )],
    refresh_epilogue: ED2208_EPILOGUE,
    lut: None,
    timing: SSD16XX_TIMING,
};

/// ED2208-GCA with the fast-refresh register LUT.
///
/// Refreshes in well under a second at the cost of ghosting; do a full
/// [`ED2208_GCA`] refresh every few updates.
pub const ED2208_GCA_PARTIAL: PanelProfile = PanelProfile {
    name: "ED2208-GCA (partial LUT)",
    refresh_prelude: &[Step::with_data(
        Cmd::DISPLAY_UPDATE_CTRL2,
        &[Flag::DISPLAY_UPDATE_REGISTER_LUT],
    )],
    lut: Some(&ED2208_LUT_PARTIAL),
    ..ED2208_GCA
};

const EPD_7IN3F_INIT: &[Step] = &[
    Step::with_data(AcepCmd::CMDH, &[0x49, 0x55, 0x20, 0x08, 0x09, 0x18]),
    Step::with_data(
        AcepCmd::POWER_SETTING,
        &[0x3F, 0x00, 0x32, 0x2A, 0x0E, 0x2A],
    ),
    Step::with_data(AcepCmd::PANEL_SETTING, &[0x5F, 0x69]),
    Step::with_data(AcepCmd::POWER_OFF_SEQUENCE, &[0x00, 0x54, 0x00, 0x44]),
    Step::with_data(AcepCmd::BOOSTER_SOFT_START_1, &[0x40, 0x1F, 0x1F, 0x2C]),
    Step::with_data(AcepCmd::BOOSTER_SOFT_START_2, &[0x6F, 0x1F, 0x1F, 0x22]),
    Step::with_data(AcepCmd::BOOSTER_SOFT_START_3, &[0x6F, 0x1F, 0x1F, 0x22]),
    Step::with_data(AcepCmd::IPC, &[0x00, 0x04]),
    Step::with_data(AcepCmd::PLL_CONTROL, &[0x3C]),
    Step::with_data(AcepCmd::TEMPERATURE_SENSOR_ENABLE, &[0x00]),
    Step::with_data(AcepCmd::VCOM_DATA_INTERVAL, &[0x3F]),
    Step::with_data(AcepCmd::TCON_SETTING, &[0x02, 0x00]),
    // 800 x 480
    Step::with_data(AcepCmd::RESOLUTION_SETTING, &[0x03, 0x20, 0x01, 0xE0]),
    Step::with_data(AcepCmd::VCOM_DC_SETTING, &[0x1E]),
    Step::with_data(AcepCmd::T_VDCS, &[0x00]),
    Step::with_data(AcepCmd::AGID, &[0x00]),
    Step::with_data(AcepCmd::POWER_SAVING, &[0x2F]),
    Step::with_data(AcepCmd::CCSET, &[0x00]),
    Step::with_data(AcepCmd::TSSET, &[0x00]),
    Step::cmd(AcepCmd::POWER_ON).blocking(),
];

/// Waveshare 7.3" ACeP (E), 800x480, seven colours at 4 bits per pixel.
///
/// Palette: see [`crate::epd::color::Acep7`]. Index 7 is "clean", which
/// drives the pixel without dithering. Busy is active low and a full refresh
/// takes 20-30 s, hence the long refresh bound.
pub const EPD_7IN3F: PanelProfile = PanelProfile {
    name: "EPD 7in3F",
    width: 800,
    height: 480,
    depth: ColorDepth::Nibble,
    busy_level: Level::Low,
    commands: CommandTable {
        write_ram: AcepCmd::DATA_START_TRANSMISSION,
        refresh: AcepCmd::DISPLAY_REFRESH,
        refresh_data: &[Flag::ACEP_REFRESH_NORMAL],
        deep_sleep: AcepCmd::DEEP_SLEEP,
        deep_sleep_data: &[Flag::ACEP_DEEP_SLEEP_CHECK],
        write_lut: None,
        ram_window: None,
    },
    init_sequence: EPD_7IN3F_INIT,
    refresh_prelude: &[Step::cmd(AcepCmd::POWER_ON).blocking()],
    refresh_epilogue: &[
        Step::with_data(AcepCmd::POWER_OFF, &[Flag::ACEP_POWER_OFF_NORMAL]).blocking(),
    ],
    lut: None,
    timing: Timing {
        reset_high_ms: 20,
        reset_low_ms: 2,
        reset_settle_ms: 20,
        busy_poll_interval_ms: 10,
        init_max_polls: 500,
        refresh_max_polls: 4_500,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_byte_replicates_index() {
        assert_eq!(ColorDepth::Mono.fill_byte(1), 0xFF);
        assert_eq!(ColorDepth::Mono.fill_byte(0), 0x00);
        assert_eq!(ColorDepth::Mono.fill_byte(3), 0xFF);
        assert_eq!(ColorDepth::Mono.fill_byte(2), 0x00);
        assert_eq!(ColorDepth::Nibble.fill_byte(0x7), 0x77);
        assert_eq!(ColorDepth::Nibble.fill_byte(0x1A), 0xAA);
    }

    #[test]
    fn frame_sizes_follow_row_stride() {
        // ceil(250 / 8) = 32 bytes per row
        assert_eq!(ED2208_GCA.row_stride(), 32);
        assert_eq!(ED2208_GCA.frame_size(), 32 * 122);
        assert_eq!(EPD_7IN3F.row_stride(), 400);
        assert_eq!(EPD_7IN3F.frame_size(), 192_000);
    }

    #[test]
    fn ram_window_payloads_cover_whole_panel() {
        assert_eq!(ED2208_GCA.ram_x_range(), [0x00, 31]);
        assert_eq!(ED2208_GCA.ram_y_range(), [0x00, 0x00, 121, 0x00]);
    }

    #[test]
    fn partial_variant_only_changes_waveform() {
        assert_eq!(ED2208_GCA_PARTIAL.width, ED2208_GCA.width);
        assert_eq!(ED2208_GCA_PARTIAL.init_sequence, ED2208_GCA.init_sequence);
        assert_eq!(ED2208_GCA_PARTIAL.lut.map(<[u8]>::len), Some(30));
        assert_ne!(ED2208_GCA_PARTIAL.refresh_prelude, ED2208_GCA.refresh_prelude);
    }

    #[test]
    fn init_sequences_start_and_end_with_blocking_steps() {
        assert_eq!(ED2208_GCA.init_sequence[0].opcode, Cmd::SW_RESET);
        assert!(ED2208_GCA.init_sequence[0].blocking);
        let last = EPD_7IN3F.init_sequence[EPD_7IN3F.init_sequence.len() - 1];
        assert_eq!(last.opcode, AcepCmd::POWER_ON);
        assert!(last.blocking);
    }

    #[test]
    fn depth_helpers() {
        assert_eq!(ColorDepth::Mono.levels(), 2);
        assert_eq!(ColorDepth::Nibble.levels(), 16);
        assert_eq!(ColorDepth::Nibble.mask(), 0x0F);
    }

    #[test]
    fn timeouts_are_poll_count_times_interval() {
        assert_eq!(ED2208_GCA.timing.init_timeout_ms(), 5_000);
        assert_eq!(EPD_7IN3F.timing.refresh_timeout_ms(), 45_000);
    }
}

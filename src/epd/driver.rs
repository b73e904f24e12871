//! Panel controller: the command protocol state machine
//!
//! [`Controller`] owns a [`Transport`] and a [`PanelProfile`] and walks the panel
//! through its states:
//!
//! ```text
//!  Uninitialized --init()--> Ready --display()/clear()--> Busy --> Ready
//!        ^                   |  ^                                   |
//!        |                   |  +------------- init() --------------+
//!        +-- fault/timeout --+--sleep()--> Sleeping --init()--> Ready
//! ```
//!
//! ## Critical Implementation Details
//!
//! ### Construction does no I/O
//!
//! `Controller::new` only stores its arguments. The hardware is touched by
//! [`Controller::init`], so a controller can be built and inspected in tests
//! without a panel attached.
//!
//! ### Validate before the first byte
//!
//! `display()` checks the frame size and the state before any transport call.
//! A short frame would otherwise leave the panel's RAM write half framed.
//!
//! ### Bounded busy waits
//!
//! Every busy wait is a fixed number of polls with a fixed delay in between
//! (see [`crate::epd::profile::Timing`]). There is no abort command on these
//! controllers, so a wait is never cut short; it either observes idle or runs
//! out of polls.
//!
//! ### Faults reset the state
//!
//! Any transport error or busy timeout in `init()`, `display()` or `clear()`
//! leaves the controller `Uninitialized`: the panel's registers are in an
//! unknown state and only a fresh `init()` (with hardware reset) recovers.

use crate::epd::error::Error;
use crate::epd::interface::{ControlLine, Level, Transport};
use crate::epd::profile::{PanelProfile, Step};

/// Chunk size when streaming a repeated byte
const FILL_CHUNK_SIZE: usize = 256;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Constructed, or a previous operation failed; needs `init()`
    Uninitialized,
    /// Registers configured, ready for `display()`
    Ready,
    /// A refresh is in progress
    Busy,
    /// In deep sleep; needs `init()`
    Sleeping,
}

/// Which busy wait timed out; decides the error reported.
#[derive(Debug, Clone, Copy)]
enum WaitPhase {
    Init,
    Refresh,
}

/// E-paper panel controller
///
/// Generic over the [`Transport`] so the same code drives real SPI hardware
/// ([`crate::epd::interface::SpiTransport`]) and the simulator
/// ([`crate::epd::sim::SimTransport`]). The controller assumes it is the only
/// user of the transport and does no locking of its own.
pub struct Controller<T> {
    transport: T,
    profile: PanelProfile,
    state: PanelState,
}

impl<T> Controller<T> {
    /// Create a controller. No hardware I/O happens until [`Controller::init`].
    pub fn new(transport: T, profile: PanelProfile) -> Self {
        Controller {
            transport,
            profile,
            state: PanelState::Uninitialized,
        }
    }

    /// Current state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Profile the controller was built with
    pub fn profile(&self) -> &PanelProfile {
        &self.profile
    }

    /// Exact frame size `display()` accepts
    pub fn expected_size(&self) -> usize {
        self.profile.frame_size()
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T> Controller<T>
where
    T: Transport,
{
    /// Reset the panel and run the profile's init sequence.
    ///
    /// Valid from every state; this is also the only way out of `Sleeping` and
    /// out of a failed operation. Fails with [`Error::HardwareInitFailed`] if
    /// the busy line does not clear after reset or after a blocking step.
    pub fn init(&mut self) -> Result<(), Error> {
        log::info!("Initializing {} panel", self.profile.name);
        self.state = PanelState::Uninitialized;

        self.reset()?;
        self.wait_until_idle(WaitPhase::Init)?;

        for step in self.profile.init_sequence {
            self.run_step(step, WaitPhase::Init)?;
        }

        if let (Some(lut), Some(opcode)) = (self.profile.lut, self.profile.commands.write_lut) {
            log::debug!("Uploading {} byte LUT", lut.len());
            self.transport.write_command(opcode)?;
            self.transport.write_data(lut)?;
        }

        self.state = PanelState::Ready;
        log::info!("{} panel ready", self.profile.name);
        Ok(())
    }

    /// Stream `frame` into panel RAM and refresh.
    ///
    /// `frame` must be exactly [`Controller::expected_size`] bytes, otherwise
    /// [`Error::SizeMismatch`] is returned before any transport call. Blocks
    /// until the refresh completes or the profile's refresh bound is exhausted
    /// ([`Error::RefreshTimeout`]).
    pub fn display(&mut self, frame: &[u8]) -> Result<(), Error> {
        let expected = self.expected_size();
        if frame.len() != expected {
            log::warn!(
                "Rejecting frame of {} bytes, {} expects {}",
                frame.len(),
                self.profile.name,
                expected
            );
            return Err(Error::SizeMismatch {
                expected,
                actual: frame.len(),
            });
        }
        self.ensure_ready("display")?;

        log::info!("Writing {} byte frame to {}", frame.len(), self.profile.name);
        self.guarded(|ctl| {
            ctl.set_full_window()?;
            ctl.transport.write_command(ctl.profile.commands.write_ram)?;
            ctl.transport.write_data(frame)?;
            ctl.refresh()
        })
    }

    /// Fill the whole panel with one palette index and refresh.
    ///
    /// Streams a repeated byte, so no framebuffer is needed. The index is
    /// masked to the profile's bit depth.
    pub fn clear(&mut self, color: u8) -> Result<(), Error> {
        self.ensure_ready("clear")?;

        let byte = self.profile.depth.fill_byte(color);
        let total = self.expected_size();
        log::info!(
            "Clearing {} with palette index {}",
            self.profile.name,
            color & self.profile.depth.mask()
        );

        self.guarded(|ctl| {
            ctl.set_full_window()?;
            ctl.transport.write_command(ctl.profile.commands.write_ram)?;
            ctl.write_repeated_byte(byte, total)?;
            ctl.refresh()
        })
    }

    /// Put the panel into deep sleep.
    ///
    /// Only `init()` brings it back. Calling `sleep()` again while sleeping
    /// does nothing.
    pub fn sleep(&mut self) -> Result<(), Error> {
        match self.state {
            PanelState::Sleeping => return Ok(()),
            PanelState::Ready => {}
            state => {
                return Err(Error::InvalidState {
                    operation: "sleep",
                    state,
                })
            }
        }

        log::info!("Putting {} into deep sleep", self.profile.name);
        let commands = self.profile.commands;
        self.guarded(|ctl| {
            ctl.transport.write_command(commands.deep_sleep)?;
            if !commands.deep_sleep_data.is_empty() {
                ctl.transport.write_data(commands.deep_sleep_data)?;
            }
            Ok(())
        })?;
        self.state = PanelState::Sleeping;
        Ok(())
    }

    /// Run `op`; on failure leave the controller `Uninitialized`, on success
    /// `Ready`.
    fn guarded<F>(&mut self, op: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        match op(self) {
            Ok(()) => {
                self.state = PanelState::Ready;
                Ok(())
            }
            Err(err) => {
                log::error!("{} operation failed: {}", self.profile.name, err);
                self.state = PanelState::Uninitialized;
                Err(err)
            }
        }
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<(), Error> {
        if self.state == PanelState::Ready {
            Ok(())
        } else {
            log::warn!("{} rejected while {:?}", operation, self.state);
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Hardware reset pulse: high, low, high with the profile's timing
    fn reset(&mut self) -> Result<(), Error> {
        let timing = self.profile.timing;
        self.transport
            .set_control_line(ControlLine::Reset, Level::High)?;
        self.transport.delay_ms(timing.reset_high_ms);
        self.transport
            .set_control_line(ControlLine::Reset, Level::Low)?;
        self.transport.delay_ms(timing.reset_low_ms);
        self.transport
            .set_control_line(ControlLine::Reset, Level::High)?;
        self.transport.delay_ms(timing.reset_settle_ms);
        Ok(())
    }

    fn run_step(&mut self, step: &Step, phase: WaitPhase) -> Result<(), Error> {
        log::debug!(
            "cmd 0x{:02X} with {} data bytes{}",
            step.opcode,
            step.data.len(),
            if step.blocking { " (blocking)" } else { "" }
        );
        self.transport.write_command(step.opcode)?;
        if !step.data.is_empty() {
            self.transport.write_data(step.data)?;
        }
        if step.blocking {
            self.wait_until_idle(phase)?;
        }
        if step.delay_ms > 0 {
            self.transport.delay_ms(step.delay_ms);
        }
        Ok(())
    }

    /// Point the RAM window and counters at the whole panel, if the controller
    /// has one
    fn set_full_window(&mut self) -> Result<(), Error> {
        let Some(window) = self.profile.commands.ram_window else {
            return Ok(());
        };

        self.transport.write_command(window.x_range)?;
        self.transport.write_data(&self.profile.ram_x_range())?;
        self.transport.write_command(window.y_range)?;
        self.transport.write_data(&self.profile.ram_y_range())?;

        // start from the beginning
        self.transport.write_command(window.x_counter)?;
        self.transport.write_data(&[0x00])?;
        self.transport.write_command(window.y_counter)?;
        self.transport.write_data(&[0x00, 0x00])?;
        Ok(())
    }

    /// Prelude, refresh command, busy wait, epilogue
    fn refresh(&mut self) -> Result<(), Error> {
        for step in self.profile.refresh_prelude {
            self.run_step(step, WaitPhase::Refresh)?;
        }

        let commands = self.profile.commands;
        self.transport.write_command(commands.refresh)?;
        if !commands.refresh_data.is_empty() {
            self.transport.write_data(commands.refresh_data)?;
        }
        self.state = PanelState::Busy;
        log::info!("Refresh started, waiting for {} to finish", self.profile.name);
        self.wait_until_idle(WaitPhase::Refresh)?;

        for step in self.profile.refresh_epilogue {
            self.run_step(step, WaitPhase::Refresh)?;
        }
        log::info!("Refresh complete");
        Ok(())
    }

    /// Send `total` copies of `byte` in fixed-size chunks
    fn write_repeated_byte(&mut self, byte: u8, total: usize) -> Result<(), Error> {
        let chunk = [byte; FILL_CHUNK_SIZE];
        let mut remaining = total;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK_SIZE);
            self.transport.write_data(&chunk[..n])?;
            remaining -= n;
        }
        log::debug!("Completed sending {} bytes of fill data", total);
        Ok(())
    }

    /// Poll the busy line until it reports idle, at most the phase's poll count
    fn wait_until_idle(&mut self, phase: WaitPhase) -> Result<(), Error> {
        let timing = self.profile.timing;
        let max_polls = match phase {
            WaitPhase::Init => timing.init_max_polls,
            WaitPhase::Refresh => timing.refresh_max_polls,
        };

        for poll in 0..max_polls {
            if self.transport.read_busy_line()? != self.profile.busy_level {
                log::debug!("Busy cleared after {} polls", poll);
                return Ok(());
            }
            self.transport.delay_ms(timing.busy_poll_interval_ms);
        }

        log::error!(
            "TIMEOUT waiting for busy line to clear after {} polls ({} ms)",
            max_polls,
            max_polls.saturating_mul(timing.busy_poll_interval_ms)
        );
        Err(match phase {
            WaitPhase::Init => Error::HardwareInitFailed { polls: max_polls },
            WaitPhase::Refresh => Error::RefreshTimeout { polls: max_polls },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epd::cmd::{AcepCmd, Cmd};
    use crate::epd::profile::{ED2208_GCA, ED2208_GCA_PARTIAL, EPD_7IN3F};
    use crate::epd::sim::{BusyScript, Event, SimTransport};

    fn ready(profile: PanelProfile) -> Controller<SimTransport> {
        let sim = SimTransport::new(profile.busy_level, BusyScript::BusyAfterCommand(1));
        let mut ctl = Controller::new(sim, profile);
        ctl.init().unwrap();
        ctl.transport_mut().clear_events();
        ctl
    }

    #[test]
    fn new_performs_no_io() {
        let ctl = Controller::new(SimTransport::idle(Level::High), ED2208_GCA);
        assert_eq!(ctl.state(), PanelState::Uninitialized);
        assert!(ctl.transport().events().is_empty());
        assert_eq!(ctl.expected_size(), 3904);
    }

    #[test]
    fn init_pulses_reset_then_sends_sequence_in_order() {
        let mut ctl = Controller::new(SimTransport::idle(Level::High), ED2208_GCA);
        ctl.init().unwrap();
        assert_eq!(ctl.state(), PanelState::Ready);

        let events = ctl.transport().events();
        assert_eq!(events[0], Event::Line(ControlLine::Reset, Level::High));
        assert_eq!(events[1], Event::Delay(200));
        assert_eq!(events[2], Event::Line(ControlLine::Reset, Level::Low));
        assert_eq!(events[3], Event::Delay(2));
        assert_eq!(events[4], Event::Line(ControlLine::Reset, Level::High));

        let expected: Vec<u8> = ED2208_GCA.init_sequence.iter().map(|s| s.opcode).collect();
        assert_eq!(ctl.transport().commands(), expected);
        assert_eq!(
            ctl.transport().data_after(Cmd::BOOSTER_SOFT_START_CONTROL),
            Some(vec![0xD7, 0xD6, 0x9D])
        );
    }

    #[test]
    fn init_uploads_lut_when_profile_has_one() {
        let mut ctl = Controller::new(SimTransport::idle(Level::High), ED2208_GCA_PARTIAL);
        ctl.init().unwrap();
        let commands = ctl.transport().commands();
        assert_eq!(commands.last(), Some(&Cmd::WRITE_LUT_REGISTER));
        assert_eq!(
            ctl.transport().data_after(Cmd::WRITE_LUT_REGISTER).map(|d| d.len()),
            Some(30)
        );
    }

    #[test]
    fn step_delays_and_poll_intervals_add_up() {
        const STEPS: &[Step] = &[Step::cmd(Cmd::SW_RESET).blocking().then_delay(7)];
        let profile = PanelProfile {
            init_sequence: STEPS,
            ..ED2208_GCA
        };
        let sim = SimTransport::new(Level::High, BusyScript::BusyAfterCommand(2));
        let mut ctl = Controller::new(sim, profile);
        ctl.init().unwrap();
        // reset pulse, two 10 ms polls after reset and after SW_RESET, settle
        assert_eq!(ctl.transport().total_delay_ms(), 402 + 20 + 20 + 7);
        assert_eq!(ctl.transport().busy_reads(), 6);
    }

    #[test]
    fn init_times_out_after_configured_polls() {
        let sim = SimTransport::new(Level::High, BusyScript::Stuck);
        let mut ctl = Controller::new(sim, ED2208_GCA);
        let err = ctl.init().unwrap_err();
        assert!(matches!(err, Error::HardwareInitFailed { polls: 500 }));
        assert_eq!(ctl.state(), PanelState::Uninitialized);
        // gave up on the wait right after reset, before any command
        assert_eq!(ctl.transport().busy_reads(), 500);
        assert!(ctl.transport().commands().is_empty());
    }

    #[test]
    fn init_fails_when_a_blocking_step_stays_busy() {
        // SW_RESET is the first command and never finishes
        let sim = SimTransport::new(Level::High, BusyScript::StuckFromCommand(1));
        let mut ctl = Controller::new(sim, ED2208_GCA);
        let err = ctl.init().unwrap_err();
        assert!(matches!(err, Error::HardwareInitFailed { polls: 500 }));
        assert_eq!(ctl.state(), PanelState::Uninitialized);
        assert_eq!(ctl.transport().commands(), vec![Cmd::SW_RESET]);
        // one idle read after reset, then the whole budget on SW_RESET
        assert_eq!(ctl.transport().busy_reads(), 1 + 500);
    }

    #[test]
    fn init_fails_when_the_last_step_stays_busy() {
        let steps = EPD_7IN3F.init_sequence.len() as u32;
        let sim = SimTransport::new(Level::Low, BusyScript::StuckFromCommand(steps));
        let mut ctl = Controller::new(sim, EPD_7IN3F);
        let err = ctl.init().unwrap_err();
        assert!(matches!(err, Error::HardwareInitFailed { polls: 500 }));
        assert_eq!(ctl.state(), PanelState::Uninitialized);

        let commands = ctl.transport().commands();
        assert_eq!(commands.len(), EPD_7IN3F.init_sequence.len());
        assert_eq!(commands.last(), Some(&AcepCmd::POWER_ON));

        ctl.transport_mut().set_script(BusyScript::Idle);
        ctl.init().unwrap();
        assert_eq!(ctl.state(), PanelState::Ready);
    }

    #[test]
    fn refresh_prelude_timeout_is_a_refresh_timeout() {
        let mut ctl = ready(EPD_7IN3F);
        // data start is command 1, the POWER_ON prelude command 2
        ctl.transport_mut().set_script(BusyScript::StuckFromCommand(2));
        let err = ctl.clear(1).unwrap_err();
        assert!(matches!(err, Error::RefreshTimeout { polls: 4_500 }));
        assert_eq!(ctl.state(), PanelState::Uninitialized);
        assert_eq!(
            ctl.transport().commands(),
            vec![AcepCmd::DATA_START_TRANSMISSION, AcepCmd::POWER_ON]
        );
        assert_eq!(ctl.transport().busy_reads(), 4_500);
    }

    #[test]
    fn refresh_epilogue_timeout_is_a_refresh_timeout() {
        let mut ctl = ready(EPD_7IN3F);
        // refresh itself completes, POWER_OFF never does
        ctl.transport_mut().set_script(BusyScript::StuckFromCommand(4));
        let frame = vec![0x11; ctl.expected_size()];
        let err = ctl.display(&frame).unwrap_err();
        assert!(matches!(err, Error::RefreshTimeout { polls: 4_500 }));
        assert_eq!(ctl.state(), PanelState::Uninitialized);
        assert_eq!(ctl.transport().commands().last(), Some(&AcepCmd::POWER_OFF));

        // rejected until re-initialized
        assert!(matches!(
            ctl.display(&frame),
            Err(Error::InvalidState {
                state: PanelState::Uninitialized,
                ..
            })
        ));
    }

    #[test]
    fn display_streams_window_ram_and_refresh() {
        let mut ctl = ready(ED2208_GCA);
        let frame = vec![0xAA; ctl.expected_size()];
        ctl.display(&frame).unwrap();
        assert_eq!(ctl.state(), PanelState::Ready);

        assert_eq!(
            ctl.transport().commands(),
            vec![
                Cmd::SET_RAMX_START_END,
                Cmd::SET_RAMY_START_END,
                Cmd::SET_RAMX_COUNTER,
                Cmd::SET_RAMY_COUNTER,
                Cmd::WRITE_RAM,
                Cmd::DISPLAY_UPDATE_CTRL2,
                Cmd::MASTER_ACTIVATION,
                Cmd::TERMINATE_FRAME_READ_WRITE,
            ]
        );
        assert_eq!(ctl.transport().data_after(Cmd::WRITE_RAM), Some(frame));
    }

    #[test]
    fn display_rejects_wrong_size_without_io() {
        let mut ctl = ready(EPD_7IN3F);
        let short = vec![0u8; 191_999];
        let err = ctl.display(&short).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                expected: 192_000,
                actual: 191_999
            }
        ));
        let long = vec![0u8; 192_001];
        assert!(ctl.display(&long).is_err());
        assert!(ctl.transport().events().is_empty());
        assert_eq!(ctl.state(), PanelState::Ready);
    }

    #[test]
    fn display_requires_init() {
        let mut ctl = Controller::new(SimTransport::idle(Level::High), ED2208_GCA);
        let frame = vec![0u8; ctl.expected_size()];
        let err = ctl.display(&frame).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                operation: "display",
                state: PanelState::Uninitialized
            }
        ));
        assert!(ctl.transport().events().is_empty());
    }

    #[test]
    fn refresh_timeout_drops_back_to_uninitialized() {
        let mut ctl = ready(ED2208_GCA);
        ctl.transport_mut().set_script(BusyScript::Stuck);
        let frame = vec![0u8; ctl.expected_size()];
        let err = ctl.display(&frame).unwrap_err();
        assert!(matches!(err, Error::RefreshTimeout { polls: 500 }));
        assert_eq!(ctl.state(), PanelState::Uninitialized);
        assert_eq!(ctl.transport().busy_reads(), 500);
    }

    #[test]
    fn transport_fault_is_returned_and_resets_state() {
        let mut ctl = ready(ED2208_GCA);
        ctl.transport_mut().fail_writes(true);
        let frame = vec![0u8; ctl.expected_size()];
        assert!(matches!(ctl.display(&frame), Err(Error::Transport(_))));
        assert_eq!(ctl.state(), PanelState::Uninitialized);
    }

    #[test]
    fn sleep_then_display_is_invalid_until_init() {
        let mut ctl = ready(ED2208_GCA);
        ctl.sleep().unwrap();
        assert_eq!(ctl.state(), PanelState::Sleeping);
        assert_eq!(ctl.transport().commands(), vec![Cmd::DEEP_SLEEP_MODE]);
        assert_eq!(ctl.transport().data_after(Cmd::DEEP_SLEEP_MODE), Some(vec![0x01]));

        // idempotent
        ctl.sleep().unwrap();
        assert_eq!(ctl.transport().commands().len(), 1);

        let frame = vec![0u8; ctl.expected_size()];
        assert!(matches!(
            ctl.display(&frame),
            Err(Error::InvalidState {
                state: PanelState::Sleeping,
                ..
            })
        ));

        ctl.init().unwrap();
        ctl.display(&frame).unwrap();
    }

    #[test]
    fn sleep_before_init_is_invalid() {
        let mut ctl = Controller::new(SimTransport::idle(Level::High), ED2208_GCA);
        assert!(matches!(ctl.sleep(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn acep_refresh_powers_on_refreshes_and_powers_off() {
        let mut ctl = ready(EPD_7IN3F);
        ctl.clear(7).unwrap();

        let commands = ctl.transport().commands();
        assert_eq!(
            commands,
            vec![
                AcepCmd::DATA_START_TRANSMISSION,
                AcepCmd::POWER_ON,
                AcepCmd::DISPLAY_REFRESH,
                AcepCmd::POWER_OFF,
            ]
        );
        let fill = ctl
            .transport()
            .data_after(AcepCmd::DATA_START_TRANSMISSION)
            .unwrap();
        assert_eq!(fill.len(), 192_000);
        assert!(fill.iter().all(|&b| b == 0x77));
        assert_eq!(
            ctl.transport().data_after(AcepCmd::DISPLAY_REFRESH),
            Some(vec![0x00])
        );
    }
}

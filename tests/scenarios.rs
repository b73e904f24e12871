//! End-to-end scenarios against the simulated transport.
//!
//! Run with: cargo test --test scenarios

use photopainter::epd::sim::{BusyScript, Event, SimTransport};
use photopainter::epd::{Cmd, Controller, Error, Level, PanelState, ED2208_GCA, EPD_7IN3F};
use photopainter::graphics::{primitives, Framebuffer, FONT_8X8};

// ---------------------------------------------------------------------------
// Test: draw text on the 250x122 mono panel and display it
// ---------------------------------------------------------------------------

/// One write-RAM burst of the whole frame, one refresh, then busy polls.
///
/// 250 px at 1 bpp is 32 bytes per row (31.25 rounded up), 122 rows.
#[test]
fn mono_text_frame_is_streamed_in_one_burst() {
    let sim = SimTransport::new(Level::High, BusyScript::BusyAfterCommand(3));
    let mut epd = Controller::new(sim, ED2208_GCA);
    epd.init().unwrap();
    epd.transport_mut().clear_events();

    let mut fb = Framebuffer::for_profile(&ED2208_GCA);
    fb.fill(0);
    primitives::text(&mut fb, "Hi", 10, 10, 1, &FONT_8X8);
    epd.display(fb.as_bytes()).unwrap();
    assert_eq!(epd.state(), PanelState::Ready);

    let events = epd.transport().events();
    let write_ram: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| **e == Event::Command(Cmd::WRITE_RAM))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(write_ram.len(), 1, "exactly one write RAM command");

    let burst = match &events[write_ram[0] + 1] {
        Event::Data(d) => d,
        other => panic!("expected data after write RAM, got {other:?}"),
    };
    assert_eq!(burst.len(), 32 * 122);
    assert_eq!(burst.as_slice(), fb.as_bytes());

    let refresh: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| **e == Event::Command(Cmd::MASTER_ACTIVATION))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(refresh.len(), 1, "exactly one refresh command");
    assert!(refresh[0] > write_ram[0]);

    let polls_after_refresh = events[refresh[0]..]
        .iter()
        .filter(|e| matches!(e, Event::BusyRead(_)))
        .count();
    assert!(polls_after_refresh >= 1);
}

// ---------------------------------------------------------------------------
// Test: 4-bit panel rejects a buffer one byte short
// ---------------------------------------------------------------------------

#[test]
fn short_acep_frame_is_rejected_before_any_io() {
    // never initialized: the size check still comes first
    let mut epd = Controller::new(SimTransport::idle(Level::Low), EPD_7IN3F);
    let frame = vec![0x11u8; 191_999];

    let err = epd.display(&frame).unwrap_err();
    assert!(matches!(
        err,
        Error::SizeMismatch {
            expected: 192_000,
            actual: 191_999
        }
    ));
    assert!(epd.transport().events().is_empty());
}

// ---------------------------------------------------------------------------
// Test: init against a panel that never leaves busy
// ---------------------------------------------------------------------------

#[test]
fn stuck_busy_fails_init_after_exactly_the_poll_bound() {
    let sim = SimTransport::new(Level::Low, BusyScript::Stuck);
    let mut epd = Controller::new(sim, EPD_7IN3F);

    let err = epd.init().unwrap_err();
    let bound = EPD_7IN3F.timing.init_max_polls;
    assert!(matches!(err, Error::HardwareInitFailed { polls } if polls == bound));
    assert_eq!(epd.transport().busy_reads(), bound as usize);
    assert_eq!(epd.state(), PanelState::Uninitialized);
}

// ---------------------------------------------------------------------------
// Test: sleeping panel must be re-initialized
// ---------------------------------------------------------------------------

#[test]
fn display_while_sleeping_is_invalid_state() {
    let mut epd = Controller::new(SimTransport::idle(Level::High), ED2208_GCA);
    epd.init().unwrap();
    epd.sleep().unwrap();
    epd.transport_mut().clear_events();

    let fb = Framebuffer::for_profile(&ED2208_GCA);
    let err = epd.display(fb.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            state: PanelState::Sleeping,
            ..
        }
    ));
    assert_eq!(epd.transport().write_count(), 0);

    epd.init().unwrap();
    epd.display(fb.as_bytes()).unwrap();
}

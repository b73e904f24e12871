//! E-paper panel driver
//!
//! Drives the ED2208-GCA mono panel on the Waveshare PhotoPainter and the
//! 7.3" seven-colour ACeP panel. Everything panel specific lives in a
//! [`profile::PanelProfile`]; the [`driver::Controller`] only knows the
//! generic protocol (reset, init sequence, RAM window, write RAM, refresh,
//! deep sleep).
//!
//! This driver is loosely modeled after the
//! [epd-waveshare](https://github.com/caemor/epd-waveshare) drivers, with the
//! command tables turned into data.
//!
//! ### Usage
//! The controller takes a whole frame at a time. To display something you:
//!
//! 1. create a [`crate::graphics::Framebuffer`] for the profile and draw on it,
//!    with [`crate::graphics::primitives`] or with
//!    [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. call [`driver::Controller::init`] once after power up or wake
//! 1. hand the framebuffer bytes to [`driver::Controller::display`]
//! 1. put the panel to rest with [`driver::Controller::sleep`]
//!
//! [`sim::SimTransport`] stands in for the hardware on the host.

pub mod cmd;
pub mod color;
pub mod driver;
pub mod error;
pub mod flag;
pub mod interface;
pub mod pins;
pub mod profile;
pub mod sim;

pub use cmd::{AcepCmd, Cmd};
pub use color::{Acep7, Mono, PaletteIndex};
pub use driver::{Controller, PanelState};
pub use error::Error;
pub use flag::Flag;
pub use interface::{ControlLine, Level, SpiTransport, Transport};
pub use pins::Pins;
pub use profile::{ColorDepth, PanelProfile, ED2208_GCA, ED2208_GCA_PARTIAL, EPD_7IN3F};

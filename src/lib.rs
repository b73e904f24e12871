//! Driver for the e-paper panels of the Waveshare ESP32-S3 PhotoPainter
//!
//! - [`epd`]: panel profiles, transport and the controller state machine
//! - [`graphics`]: packed framebuffer and drawing primitives
//! - [`pmic`]: AXP2101 power management, which feeds the panel
//!
//! The library only depends on embedded-hal traits and builds on the host;
//! the firmware in `main.rs` wires it to ESP-IDF.
#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod epd;
pub mod graphics;
pub mod pmic;

pub use epd::{Controller, Error, PanelProfile, PanelState};
pub use graphics::Framebuffer;

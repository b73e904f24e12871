//! Errors reported by the panel controller and the framebuffer.

pub use display_interface::DisplayError;

use crate::epd::driver::PanelState;

/// Everything that can go wrong while driving a panel.
///
/// None of these are retried internally. A `HardwareInitFailed` or
/// `RefreshTimeout` almost always means a wiring or power fault, and every extra
/// refresh attempt spends part of the panel's rated refresh-cycle budget.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The busy line never cleared while running the init sequence.
    #[error("panel busy line never cleared during init after {polls} polls (panel absent or miswired?)")]
    HardwareInitFailed {
        /// Busy polls spent before giving up
        polls: u32,
    },

    /// A supplied buffer does not have the size the profile requires.
    #[error("buffer is {actual} bytes but the panel expects exactly {expected}")]
    SizeMismatch {
        /// Size required by the profile
        expected: usize,
        /// Size that was supplied
        actual: usize,
    },

    /// The busy line did not clear within the maximum refresh wait.
    #[error("refresh did not complete after {polls} busy polls")]
    RefreshTimeout {
        /// Busy polls spent before giving up
        polls: u32,
    },

    /// The operation is not allowed in the controller's current state.
    #[error("{operation} is not allowed while the panel is {state:?}")]
    InvalidState {
        /// Name of the rejected operation
        operation: &'static str,
        /// State the controller was in
        state: PanelState,
    },

    /// The transport reported a bus or pin fault.
    #[error("transport fault: {0:?}")]
    Transport(DisplayError),
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_message_names_both_sizes() {
        let err = Error::SizeMismatch {
            expected: 192_000,
            actual: 191_999,
        };
        let text = err.to_string();
        assert!(text.contains("192000"));
        assert!(text.contains("191999"));
    }

    #[test]
    fn display_error_converts_into_transport_variant() {
        let err: Error = DisplayError::BusWriteError.into();
        assert!(matches!(err, Error::Transport(DisplayError::BusWriteError)));
    }
}

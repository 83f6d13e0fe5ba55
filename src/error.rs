//! Error types for Galaxy keypad operations.

use thiserror::Error;

/// Result type alias for keypad operations.
pub type Result<T> = std::result::Result<T, GalaxyError>;

/// Error types for keypad communication and setup.
///
/// Protocol anomalies on the wire (bad checksums, unexpected replies, silence)
/// are not errors; they are reported through [`crate::SessionObserver`].
#[derive(Error, Debug)]
pub enum GalaxyError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport reached end of stream
    #[error("Transport disconnected")]
    Disconnected,

    /// Screen slot outside 1-4
    #[error("Invalid screen number: {number} (expected 1-4)")]
    InvalidScreenNumber {
        /// Configured slot
        number: u8,
    },

    /// Beep mode byte not understood by the keypad
    #[error("Invalid beep mode: {0:#04x}")]
    InvalidBeepMode(u8),

    /// Malformed configuration or control input
    #[error("Configuration error: {0}")]
    Config(String),
}

//! # Galaxy Keypad Library
//!
//! A Rust library for driving Honeywell Galaxy alarm-panel keypads over an
//! RS-485 serial link. The library acts as the panel: it polls the keypad,
//! relays key presses and tamper state, pushes two-line display text and
//! configures the keypad sounder.
//!
//! ## Features
//!
//! - Frame construction and checksum validation for the keypad's bus protocol
//! - A priority scheduler that keeps exactly one command in flight
//! - Context-dependent reply decoding with key de-duplication and acknowledgement
//! - Pluggable transport and observer so sessions can run against test doubles
//!
//! ## Example
//!
//! ```no_run
//! use galaxy_keypad::{GalaxyKeypad, KeypadConfig, NoControl};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = KeypadConfig {
//!         display_text: "Hello|World".to_string(),
//!         ..KeypadConfig::default()
//!     };
//!     let mut keypad = GalaxyKeypad::open("/dev/ttyUSB0", &config)?;
//!     keypad.run(&mut NoControl)?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod constants;
pub mod control;
pub mod entry;
pub mod error;
pub mod interpreter;
pub mod observer;
pub mod protocol;
pub mod scheduler;
pub mod state;
pub mod transport;
pub mod types;

pub use codec::{build_frame, checksum, validate, Frame};
pub use command::{BeepMode, BeepSettings, Command, CommandKind};
pub use config::{KeypadConfig, SerialSettings, Timings};
pub use control::{ControlCommand, ControlSource, NoControl};
pub use entry::{CodeEntry, EntryAction};
pub use error::{GalaxyError, Result};
pub use interpreter::{ReplyInterpreter, ReplyShape};
pub use observer::{LogObserver, RecordingObserver, SessionEvent, SessionObserver};
pub use protocol::{GalaxyKeypad, SessionPhase};
pub use state::SessionState;
pub use transport::{SerialTransport, Transport};
pub use types::*;

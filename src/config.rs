//! Session configuration.
//!
//! All fields have defaults matching the keypad's stock behavior, so an empty
//! JSON object (or `KeypadConfig::default()`) yields a working setup for
//! screen slot 2.

use crate::constants::*;
use crate::error::Result;
use crate::types::{DisplayText, KeypadAddress, PanelAddress};
use serde::Deserialize;
use std::time::Duration;

/// Protocol timing, all values in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub reply_window_ms: u64,
    pub activity_poll_interval_ms: u64,
    /// Delay before the second init poll; independent of the status interval
    pub second_init_delay_ms: u64,
    pub status_poll_interval_ms: u64,
    pub key_dedup_window_ms: u64,
}

impl Timings {
    pub fn reply_window(&self) -> Duration {
        Duration::from_millis(self.reply_window_ms)
    }

    pub fn activity_poll_interval(&self) -> Duration {
        Duration::from_millis(self.activity_poll_interval_ms)
    }

    pub fn second_init_delay(&self) -> Duration {
        Duration::from_millis(self.second_init_delay_ms)
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    pub fn key_dedup_window(&self) -> Duration {
        Duration::from_millis(self.key_dedup_window_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            reply_window_ms: REPLY_WINDOW_MS,
            activity_poll_interval_ms: ACTIVITY_POLL_INTERVAL_MS,
            second_init_delay_ms: SECOND_INIT_DELAY_MS,
            status_poll_interval_ms: STATUS_POLL_INTERVAL_MS,
            key_dedup_window_ms: KEY_DEDUP_WINDOW_MS,
        }
    }
}

/// Serial line settings (8 data bits, no parity, 1 stop bit)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
}

impl SerialSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        SerialSettings {
            baud_rate: BAUD_RATE,
            read_timeout_ms: READ_TIMEOUT_MS,
        }
    }
}

/// Keypad session configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeypadConfig {
    /// Screen slot 1-4, selects the panel address
    pub screen_number: u8,
    pub keypad_address: u8,
    pub display_text: String,
    /// Send a silent beep configuration once the keypad is initialized
    pub disable_beep_at_startup: bool,
    pub timings: Timings,
    pub serial: SerialSettings,
}

impl KeypadConfig {
    pub fn panel_address(&self) -> Result<PanelAddress> {
        PanelAddress::from_screen_number(self.screen_number)
    }

    pub fn keypad_address(&self) -> KeypadAddress {
        KeypadAddress::new(self.keypad_address)
    }

    pub fn display_text(&self) -> DisplayText {
        DisplayText::new(&self.display_text)
    }
}

impl Default for KeypadConfig {
    fn default() -> Self {
        KeypadConfig {
            screen_number: 2,
            keypad_address: KEYPAD_ADDRESS,
            display_text: DEFAULT_DISPLAY_TEXT.to_string(),
            disable_beep_at_startup: true,
            timings: Timings::default(),
            serial: SerialSettings::default(),
        }
    }
}

//! Outbound commands and their wire payloads.

use crate::constants::*;
use crate::entry::CodeEntry;
use crate::error::GalaxyError;
use crate::types::{DisplayText, PanelAddress};

/// Keypad sounder behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BeepMode {
    Off = 0x00,
    On = 0x01,
    /// Beep and quiet periods are in tenths of a second
    Intermittent = 0x03,
}

impl BeepMode {
    /// Mode from its wire value
    pub fn from_u8(value: u8) -> Result<Self, GalaxyError> {
        match value {
            0x00 => Ok(BeepMode::Off),
            0x01 => Ok(BeepMode::On),
            0x03 => Ok(BeepMode::Intermittent),
            _ => Err(GalaxyError::InvalidBeepMode(value)),
        }
    }
}

/// Beep configuration pushed to the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepSettings {
    pub mode: BeepMode,
    pub beep_period: u8,
    pub quiet_period: u8,
}

impl BeepSettings {
    pub const SILENT: BeepSettings = BeepSettings {
        mode: BeepMode::Off,
        beep_period: 0,
        quiet_period: 0,
    };
}

impl Default for BeepSettings {
    fn default() -> Self {
        Self::SILENT
    }
}

/// Frames the controller sends to the keypad
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `00 0E`, sent once when the session starts
    InitPoll,
    /// `00 0F`, periodic and before each screen write
    StatusPoll,
    /// `19 01`, asks for pending key events
    ActivityPoll,
    /// `0C mode beep quiet`
    BeepConfig {
        mode: BeepMode,
        beep_period: u8,
        quiet_period: u8,
    },
    ScreenWrite {
        line1: String,
        line2: String,
    },
    /// Only sent in response to a key event, never outstanding
    Acknowledge {
        toggle: u8,
    },
}

/// Discriminant of [`Command`], used to attribute replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    InitPoll,
    StatusPoll,
    ActivityPoll,
    BeepConfig,
    ScreenWrite,
    Acknowledge,
}

impl Command {
    /// Beep configuration frame for `settings`
    pub fn beep(settings: BeepSettings) -> Self {
        Command::BeepConfig {
            mode: settings.mode,
            beep_period: settings.beep_period,
            quiet_period: settings.quiet_period,
        }
    }

    /// Screen write showing both lines of `text`
    pub fn screen(text: &DisplayText) -> Self {
        let (line1, line2) = text.lines();
        Command::ScreenWrite {
            line1: line1.to_string(),
            line2: line2.to_string(),
        }
    }

    /// Like [`Command::screen`], but while a code is being typed line 2
    /// shows one star per buffered key instead
    pub fn entry_screen(text: &DisplayText, entry: &CodeEntry) -> Self {
        if entry.is_empty() {
            return Self::screen(text);
        }
        Command::ScreenWrite {
            line1: text.lines().0.to_string(),
            line2: entry.masked(SCREEN_LINE_WIDTH),
        }
    }

    /// Discriminant used to attribute the reply
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::InitPoll => CommandKind::InitPoll,
            Command::StatusPoll => CommandKind::StatusPoll,
            Command::ActivityPoll => CommandKind::ActivityPoll,
            Command::BeepConfig { .. } => CommandKind::BeepConfig,
            Command::ScreenWrite { .. } => CommandKind::ScreenWrite,
            Command::Acknowledge { .. } => CommandKind::Acknowledge,
        }
    }

    /// Frame body without checksum: `[address, command, ...payload]`
    pub fn payload(&self, panel: PanelAddress) -> Vec<u8> {
        let mut payload = vec![panel.as_u8()];
        match self {
            Command::InitPoll => payload.extend_from_slice(&[POLL_CMD, INIT_POLL_ARG]),
            Command::StatusPoll => payload.extend_from_slice(&[POLL_CMD, STATUS_POLL_ARG]),
            Command::ActivityPoll => payload.extend_from_slice(&[ACTIVITY_CMD, ACTIVITY_ARG]),
            Command::BeepConfig {
                mode,
                beep_period,
                quiet_period,
            } => payload.extend_from_slice(&[BEEP_CMD, *mode as u8, *beep_period, *quiet_period]),
            Command::ScreenWrite { line1, line2 } => {
                payload.extend_from_slice(&[SCREEN_CMD, SCREEN_MODIFIER, SCREEN_RESET]);
                payload.extend(ascii_bytes(line1));
                payload.push(SCREEN_LINE2);
                payload.extend(ascii_bytes(line2));
                payload.push(SCREEN_HIDE_CURSOR);
            }
            Command::Acknowledge { toggle } => payload.extend_from_slice(&[ACK_CMD, *toggle]),
        }
        payload
    }
}

/// The keypad only renders ASCII; anything else is shown as '?'
fn ascii_bytes(text: &str) -> impl Iterator<Item = u8> + '_ {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
}

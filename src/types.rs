use crate::constants::*;
use crate::error::GalaxyError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Bus address of this controller, selected by screen slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelAddress(u8);

impl PanelAddress {
    /// Map a screen slot (1-4) to its address (0x10, 0x20, 0x30, 0x40)
    pub fn from_screen_number(number: u8) -> Result<Self, GalaxyError> {
        if !(1..=MAX_SCREEN_NUMBER).contains(&number) {
            return Err(GalaxyError::InvalidScreenNumber { number });
        }
        Ok(PanelAddress(PANEL_ADDRESS_BASE + (number - 1) * PANEL_ADDRESS_STEP))
    }

    /// Raw address byte, first byte of every outbound frame
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PanelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Bus address of the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeypadAddress(u8);

impl KeypadAddress {
    /// Keypad at `address`; the default is 0x11
    pub const fn new(address: u8) -> Self {
        KeypadAddress(address)
    }

    /// Raw address byte, first byte of every reply
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl Default for KeypadAddress {
    fn default() -> Self {
        KeypadAddress(KEYPAD_ADDRESS)
    }
}

impl fmt::Display for KeypadAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Keys reported in key event frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    Digit(u8),
    A,
    B,
    Enter,
    Escape,
    Star,
    Hash,
}

impl Key {
    /// Decode the low nibble of a key event code
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0x00..=0x09 => Some(Key::Digit(index)),
            0x0A => Some(Key::B),
            0x0B => Some(Key::A),
            0x0C => Some(Key::Enter),
            0x0D => Some(Key::Escape),
            0x0E => Some(Key::Star),
            0x0F => Some(Key::Hash),
            _ => None,
        }
    }

    /// Label printed on the key
    pub fn label(&self) -> &'static str {
        const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        match self {
            Key::Digit(d) => DIGITS.get(*d as usize).copied().unwrap_or("?"),
            Key::A => "A",
            Key::B => "B",
            Key::Enter => "ENT",
            Key::Escape => "ESC",
            Key::Star => "*",
            Key::Hash => "#",
        }
    }

    /// Character buffered for code entry, if the key contributes one
    pub fn code_char(&self) -> Option<char> {
        match self {
            Key::Digit(d) => char::from_digit(*d as u32, 10),
            Key::A => Some('A'),
            Key::B => Some('B'),
            Key::Star => Some('*'),
            Key::Hash => Some('#'),
            Key::Enter | Key::Escape => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A key press reported by the keypad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEvent {
    pub key: Key,
    /// Tamper bit carried in the same code
    pub tamper: bool,
    /// Raw code byte from the `F4` frame
    pub code: u8,
    /// When the reply was decoded
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key={}", self.key)?;
        if self.tamper {
            f.write_str(" [TAMPER]")?;
        }
        Ok(())
    }
}

/// Two-line text shown on the keypad, written as `line1|line2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText(String);

impl DisplayText {
    /// Empty text falls back to the default banner
    pub fn new(text: &str) -> Self {
        if text.is_empty() {
            DisplayText(DEFAULT_DISPLAY_TEXT.to_string())
        } else {
            DisplayText(text.to_string())
        }
    }

    /// Text as configured, separator included
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split on the first separator; without one the second line is empty
    pub fn lines(&self) -> (&str, &str) {
        self.0.split_once(LINE_SEPARATOR).unwrap_or((self.0.as_str(), ""))
    }
}

impl Default for DisplayText {
    fn default() -> Self {
        DisplayText(DEFAULT_DISPLAY_TEXT.to_string())
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_slots_map_to_panel_addresses() {
        let addresses: Vec<u8> = (1..=4)
            .map(|n| PanelAddress::from_screen_number(n).map(PanelAddress::as_u8))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(addresses, [0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn out_of_range_screen_slot_is_rejected() {
        for n in [0, 5, 0xFF] {
            assert!(matches!(
                PanelAddress::from_screen_number(n),
                Err(GalaxyError::InvalidScreenNumber { number }) if number == n
            ));
        }
    }

    #[test]
    fn key_table_matches_keypad_layout() {
        let labels: Vec<&str> = (0x00..=0x0F)
            .map(|i| Key::from_index(i).map(|k| k.label()).unwrap_or(""))
            .collect();
        assert_eq!(
            labels,
            ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "B", "A", "ENT", "ESC", "*", "#"]
        );
        assert_eq!(Key::from_index(0x10), None);
    }

    #[test]
    fn key_event_serializes_for_consumers() {
        use chrono::TimeZone;

        let event = KeyEvent {
            key: Key::Digit(3),
            tamper: true,
            code: 0x43,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({
                "key": { "Digit": 3 },
                "tamper": true,
                "code": 0x43,
                "timestamp": "2024-01-01T12:00:00Z",
            })
        );
        assert_eq!(serde_json::to_value(Key::Enter).unwrap(), serde_json::json!("Enter"));
    }

    #[test]
    fn display_text_splits_on_first_separator() {
        assert_eq!(DisplayText::new("LINE-A|LINE-B").lines(), ("LINE-A", "LINE-B"));
        assert_eq!(DisplayText::new("A|B|C").lines(), ("A", "B|C"));
        assert_eq!(DisplayText::new("ONLY").lines(), ("ONLY", ""));
        assert_eq!(DisplayText::new("").lines(), ("ESP-HOME", "Initializing"));
    }
}

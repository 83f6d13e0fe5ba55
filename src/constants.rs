//! Protocol constants for Galaxy keypad communication.
//!
//! This module defines the bus addresses, command bytes, reply types and
//! timing parameters of the keypad's RS-485 protocol.

/// Bus address of the keypad being polled
pub const KEYPAD_ADDRESS: u8 = 0x11;

/// Panel address used for screen slot 1; each further slot adds `PANEL_ADDRESS_STEP`
pub const PANEL_ADDRESS_BASE: u8 = 0x10;

/// Address distance between consecutive screen slots
pub const PANEL_ADDRESS_STEP: u8 = 0x10;

/// Highest configurable screen slot
pub const MAX_SCREEN_NUMBER: u8 = 4;

/// Seed of the checksum accumulator
pub const CHECKSUM_SEED: u32 = 0xAA;

/// Poll command (followed by `INIT_POLL_ARG` or `STATUS_POLL_ARG`)
pub const POLL_CMD: u8 = 0x00;

/// Argument of the first initialization poll
pub const INIT_POLL_ARG: u8 = 0x0E;

/// Argument of the second initialization and periodic status polls
pub const STATUS_POLL_ARG: u8 = 0x0F;

/// Screen write command
pub const SCREEN_CMD: u8 = 0x07;

/// Screen modifier flags sent with every screen write
pub const SCREEN_MODIFIER: u8 = 0xA1;

/// Clear screen and home cursor
pub const SCREEN_RESET: u8 = 0x17;

/// Move cursor to the start of the second line
pub const SCREEN_LINE2: u8 = 0x02;

/// Hide cursor, terminates the screen payload
pub const SCREEN_HIDE_CURSOR: u8 = 0x07;

/// Characters per display line
pub const SCREEN_LINE_WIDTH: usize = 16;

/// Acknowledge command for key events
pub const ACK_CMD: u8 = 0x0B;

/// Beep configuration command
pub const BEEP_CMD: u8 = 0x0C;

/// Activity poll command
pub const ACTIVITY_CMD: u8 = 0x19;

/// Argument of the activity poll
pub const ACTIVITY_ARG: u8 = 0x01;

/// Reply type: keypad busy or generic acknowledgement
pub const REPLY_BUSY: u8 = 0xFE;

/// Third reply byte confirming a busy/ack reply
pub const REPLY_BUSY_OK: u8 = 0xBA;

/// Reply type: keypad rejected the previous frame
pub const REPLY_REJECTED: u8 = 0xF2;

/// Reply type: key and tamper event
pub const REPLY_KEY_EVENT: u8 = 0xF4;

/// Total length of a key event reply, address and checksum included
pub const KEY_EVENT_LEN: usize = 4;

/// Key event code reporting tamper without a key
pub const TAMPER_ONLY_CODE: u8 = 0x7F;

/// Tamper bit inside a key event code
pub const TAMPER_BIT: u8 = 0x40;

/// Mask selecting the key index inside a key event code
pub const KEY_INDEX_MASK: u8 = 0x0F;

/// The two values the acknowledge toggle alternates between
pub const ACK_TOGGLE_VALUES: [u8; 2] = [0x00, 0x02];

/// Acknowledge toggle used for the first key event of a session
pub const INITIAL_ACK_TOGGLE: u8 = 0x00;

/// Text shown when no display text is configured
pub const DEFAULT_DISPLAY_TEXT: &str = "ESP-HOME|Initializing";

/// Separator between the two display lines
pub const LINE_SEPARATOR: char = '|';

/// Baud rate (9600 bps, 8N1)
pub const BAUD_RATE: u32 = 9600;

/// Per-read timeout in milliseconds
pub const READ_TIMEOUT_MS: u64 = 10;

/// Window after a send during which inbound bytes belong to that command
pub const REPLY_WINDOW_MS: u64 = 100;

/// Interval between activity polls
pub const ACTIVITY_POLL_INTERVAL_MS: u64 = 150;

/// Delay between the first init poll and the second one
pub const SECOND_INIT_DELAY_MS: u64 = 5000;

/// Interval between periodic status polls
pub const STATUS_POLL_INTERVAL_MS: u64 = 5000;

/// Repeats of the same key within this window are reported once
pub const KEY_DEDUP_WINDOW_MS: u64 = 200;

/// Pause between session loop iterations
pub const LOOP_YIELD_MS: u64 = 2;

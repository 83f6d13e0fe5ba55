//! Session events and the observer interface that receives them.
//!
//! The session never logs directly: it reports what happened on the bus to a
//! [`SessionObserver`]. [`LogObserver`] forwards events to the `log` facade,
//! [`RecordingObserver`] keeps them for inspection.

use crate::codec::to_hex;
use crate::command::CommandKind;
use crate::entry::EntryAction;
use crate::types::KeyEvent;
use log::{debug, info, trace, warn};

/// Something that happened on the bus or in the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A complete frame, checksum included, was written
    FrameSent {
        kind: CommandKind,
        bytes: Vec<u8>,
    },
    /// Bytes collected during the reply window of `kind`
    ReplyReceived {
        kind: CommandKind,
        bytes: Vec<u8>,
    },
    /// Reply window closed without any inbound bytes
    NoReply {
        kind: CommandKind,
    },
    /// Too short or not from the keypad
    ReplyRejected {
        bytes: Vec<u8>,
    },
    /// From the keypad, but not meaningful for `kind`
    ReplyIgnored {
        kind: CommandKind,
        bytes: Vec<u8>,
    },
    /// `F2` in answer to a screen write; the write is not retried
    ScreenRejected {
        bytes: Vec<u8>,
    },
    /// Tamper-only `F4` in answer to a screen write
    ScreenAcknowledged {
        tamper: bool,
    },
    /// `F4` frame whose checksum does not match; discarded
    ChecksumMismatch {
        bytes: Vec<u8>,
    },
    /// `F4` code that is neither a key nor a tamper report
    UnknownKeyCode {
        code: u8,
    },
    /// Tamper flag changed; `context` says what changed it
    TamperChanged {
        active: bool,
        context: &'static str,
    },
    /// New key press, acknowledged and passed on
    KeyPressed(KeyEvent),
    /// Same key reported again within the dedup window
    DuplicateKey(KeyEvent),
    /// Key event seen outside an activity poll; not acknowledged
    KeypadInfo {
        kind: CommandKind,
        key: Option<KeyEvent>,
        tamper: bool,
    },
    /// A reported key changed the code being entered; `masked` is what
    /// line 2 shows now (empty once the code is submitted or cleared)
    Entry {
        action: EntryAction,
        masked: String,
    },
    /// Display text replaced; pushed at the next free slot
    DisplayChanged {
        text: String,
    },
    /// Session stopped and transport closed
    Stopped,
}

/// Receives every [`SessionEvent`] in order
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::FrameSent { kind, bytes } => {
                trace!("TX {:?} ({} bytes): {}", kind, bytes.len(), to_hex(bytes))
            }
            SessionEvent::ReplyReceived { kind, bytes } => {
                trace!("RX for {:?}: {}", kind, to_hex(bytes))
            }
            SessionEvent::NoReply { kind } => debug!("No reply for {:?}", kind),
            SessionEvent::ReplyRejected { bytes } => {
                debug!("Reply not from keypad: {}", to_hex(bytes))
            }
            SessionEvent::ReplyIgnored { kind, bytes } => {
                debug!("Unexpected reply for {:?}: {}", kind, to_hex(bytes))
            }
            SessionEvent::ScreenRejected { bytes } => {
                warn!("Keypad rejected screen frame (F2): {}", to_hex(bytes))
            }
            SessionEvent::ScreenAcknowledged { tamper } => {
                info!("Screen ACK (tamper={})", tamper)
            }
            SessionEvent::ChecksumMismatch { bytes } => {
                warn!("Bad checksum for F4: {}", to_hex(bytes))
            }
            SessionEvent::UnknownKeyCode { code } => warn!("F4 unknown code=0x{:02X}", code),
            SessionEvent::TamperChanged { active, context } => {
                info!("[TAMPER] {}: {}", context, if *active { "ON" } else { "OFF" })
            }
            SessionEvent::KeyPressed(key) => info!("[KEY] {}", key),
            SessionEvent::DuplicateKey(key) => debug!("Duplicate {} ignored", key),
            SessionEvent::KeypadInfo { kind, key, tamper } => match key {
                Some(key) => debug!("F4 after {:?}: {}", kind, key),
                None => debug!("F4 after {:?}: tamper-only (tamper={})", kind, tamper),
            },
            SessionEvent::Entry { action, masked } => match action {
                EntryAction::Buffered => debug!("Input: {}", masked),
                EntryAction::Cleared => info!("Keypad input cleared (ESC)"),
                EntryAction::Submitted(code) => info!("Code entered: {}", code),
                EntryAction::EmptySubmit => info!("ENT pressed with no buffered digits"),
            },
            SessionEvent::DisplayChanged { text } => info!("Display text set to: {}", text),
            SessionEvent::Stopped => info!("Session stopped"),
        }
    }
}

/// Keeps every event in order of arrival
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<SessionEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes submitted with `ENT`, oldest first
    pub fn entered_codes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Entry {
                    action: EntryAction::Submitted(code),
                    ..
                } => Some(code.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Reported (non-duplicate) key presses, oldest first
    pub fn key_presses(&self) -> Vec<&KeyEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::KeyPressed(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    /// New tamper state at each change
    pub fn tamper_changes(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TamperChanged { active, .. } => Some(*active),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SessionObserver for RecordingObserver {
    fn on_event(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}

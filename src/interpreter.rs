//! Interpretation of keypad replies.
//!
//! The same bytes mean different things depending on which command they
//! answer, so replies are dispatched on the pair (outstanding command, reply
//! shape). Key event frames (`F4`) are decoded the same way for every command;
//! only a key seen in answer to an activity poll is acknowledged.

use crate::codec::checksum;
use crate::command::{Command, CommandKind};
use crate::constants::*;
use crate::observer::{SessionEvent, SessionObserver};
use crate::state::{ReportedKey, SessionState};
use crate::types::{Key, KeyEvent, KeypadAddress};
use chrono::Utc;
use std::time::{Duration, Instant};

/// Shape of a reply, from its second byte onwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// `FE`, with `ok` set when followed by `BA`
    Busy { ok: bool },
    /// `F2`
    Rejected,
    /// `F4 code checksum`, exactly four bytes with the address
    KeyCode { code: u8, checksum: u8 },
    Other(u8),
}

impl ReplyShape {
    /// Classify a reply of at least two bytes
    pub fn classify(bytes: &[u8]) -> Self {
        match bytes {
            [_, REPLY_BUSY, rest @ ..] => ReplyShape::Busy {
                ok: rest.first() == Some(&REPLY_BUSY_OK),
            },
            [_, REPLY_REJECTED, ..] => ReplyShape::Rejected,
            [_, REPLY_KEY_EVENT, code, cs] => ReplyShape::KeyCode {
                code: *code,
                checksum: *cs,
            },
            [_, kind, ..] => ReplyShape::Other(*kind),
            _ => ReplyShape::Other(0x00),
        }
    }
}

/// Contents of a key event code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode {
    /// `None` for tamper-only reports
    pub key: Option<Key>,
    pub tamper: bool,
}

/// Decode the code byte of an `F4` reply; `None` for codes with no meaning
pub fn decode_key_code(code: u8) -> Option<KeyCode> {
    if code == TAMPER_ONLY_CODE {
        return Some(KeyCode {
            key: None,
            tamper: true,
        });
    }
    let tamper = code & TAMPER_BIT != 0;
    match Key::from_index(code & KEY_INDEX_MASK) {
        Some(key) => Some(KeyCode {
            key: Some(key),
            tamper,
        }),
        None if tamper => Some(KeyCode { key: None, tamper }),
        None => None,
    }
}

/// Applies replies to the session state
#[derive(Debug, Clone, Copy)]
pub struct ReplyInterpreter {
    keypad: KeypadAddress,
    dedup_window: Duration,
}

impl ReplyInterpreter {
    pub fn new(keypad: KeypadAddress, dedup_window: Duration) -> Self {
        ReplyInterpreter {
            keypad,
            dedup_window,
        }
    }

    /// Handle everything received while `kind` was outstanding.
    ///
    /// Returns the acknowledgement to send back, if any.
    pub fn interpret(
        &self,
        state: &mut SessionState,
        kind: CommandKind,
        bytes: &[u8],
        now: Instant,
        observer: &mut dyn SessionObserver,
    ) -> Option<Command> {
        if bytes.len() < 2 || bytes[0] != self.keypad.as_u8() {
            observer.on_event(&SessionEvent::ReplyRejected {
                bytes: bytes.to_vec(),
            });
            return None;
        }

        match (kind, ReplyShape::classify(bytes)) {
            (CommandKind::InitPoll | CommandKind::StatusPoll, shape) => {
                // status content is not interpreted
                state.needs_status_before_screen = false;
                match shape {
                    ReplyShape::KeyCode { .. } => self.key_event(state, kind, bytes, now, observer),
                    _ => None,
                }
            }
            (CommandKind::ActivityPoll, ReplyShape::Busy { .. }) => None,
            (CommandKind::ScreenWrite, ReplyShape::Rejected) => {
                observer.on_event(&SessionEvent::ScreenRejected {
                    bytes: bytes.to_vec(),
                });
                None
            }
            (CommandKind::ScreenWrite, ReplyShape::Busy { ok: true }) => {
                update_tamper(state, false, "Cleared after screen FE BA", observer);
                None
            }
            (CommandKind::BeepConfig, ReplyShape::Busy { ok: true }) => None,
            (_, ReplyShape::KeyCode { .. }) => self.key_event(state, kind, bytes, now, observer),
            _ => {
                observer.on_event(&SessionEvent::ReplyIgnored {
                    kind,
                    bytes: bytes.to_vec(),
                });
                None
            }
        }
    }

    /// Handle a `F4 code checksum` reply
    fn key_event(
        &self,
        state: &mut SessionState,
        kind: CommandKind,
        bytes: &[u8],
        now: Instant,
        observer: &mut dyn SessionObserver,
    ) -> Option<Command> {
        let &[_, _, code, received_checksum] = bytes else {
            return None;
        };
        if checksum(&[self.keypad.as_u8(), REPLY_KEY_EVENT, code]) != received_checksum {
            observer.on_event(&SessionEvent::ChecksumMismatch {
                bytes: bytes.to_vec(),
            });
            return None;
        }

        let Some(decoded) = decode_key_code(code) else {
            observer.on_event(&SessionEvent::UnknownKeyCode { code });
            return None;
        };
        update_tamper(state, decoded.tamper, "From F4", observer);

        let event = decoded.key.map(|key| KeyEvent {
            key,
            tamper: decoded.tamper,
            code,
            timestamp: Utc::now(),
        });

        match (kind, event) {
            (CommandKind::ScreenWrite, _) if code == TAMPER_ONLY_CODE => {
                observer.on_event(&SessionEvent::ScreenAcknowledged {
                    tamper: decoded.tamper,
                });
                None
            }
            (CommandKind::ActivityPoll, Some(event)) => {
                self.report_key(state, event, now, observer);
                let toggle = state.next_ack_toggle();
                Some(Command::Acknowledge { toggle })
            }
            // tamper-only after an activity poll: the change was already reported
            (CommandKind::ActivityPoll, None) => None,
            (_, key) => {
                observer.on_event(&SessionEvent::KeypadInfo {
                    kind,
                    key,
                    tamper: decoded.tamper,
                });
                None
            }
        }
    }

    /// Report a key unless it repeats the last reported one within the window
    fn report_key(
        &self,
        state: &mut SessionState,
        event: KeyEvent,
        now: Instant,
        observer: &mut dyn SessionObserver,
    ) {
        let duplicate = state.last_key.is_some_and(|last| {
            last.key == event.key
                && last.tamper == event.tamper
                && now.saturating_duration_since(last.at) <= self.dedup_window
        });

        if duplicate {
            observer.on_event(&SessionEvent::DuplicateKey(event));
            return;
        }

        state.last_key = Some(ReportedKey {
            key: event.key,
            tamper: event.tamper,
            at: now,
        });
        let key = event.key;
        observer.on_event(&SessionEvent::KeyPressed(event));

        // every entry change redraws line 2
        let action = state.entry.push(key);
        state.screen_dirty = true;
        observer.on_event(&SessionEvent::Entry {
            action,
            masked: state.entry.masked(SCREEN_LINE_WIDTH),
        });
    }
}

fn update_tamper(
    state: &mut SessionState,
    active: bool,
    context: &'static str,
    observer: &mut dyn SessionObserver,
) {
    if state.set_tamper(active) {
        observer.on_event(&SessionEvent::TamperChanged { active, context });
    }
}

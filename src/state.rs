//! Mutable per-session protocol state.

use crate::command::{BeepSettings, CommandKind};
use crate::constants::{ACK_TOGGLE_VALUES, INITIAL_ACK_TOGGLE};
use crate::entry::CodeEntry;
use crate::types::{DisplayText, Key};
use std::time::{Duration, Instant};

/// The command whose reply window is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outstanding {
    pub kind: CommandKind,
    pub sent_at: Instant,
}

/// Last key event that was reported to the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportedKey {
    pub key: Key,
    pub tamper: bool,
    pub at: Instant,
}

/// Session state shared by the scheduler and the reply interpreter.
///
/// At most one command is outstanding; [`SessionState::begin_command`] is the
/// only way to open a reply window and it refuses while one is open.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) outstanding: Option<Outstanding>,
    pub(crate) last_init_poll: Instant,
    pub(crate) last_activity_poll: Option<Instant>,
    pub(crate) sent_second_init: bool,
    pub(crate) beep_configured: bool,
    pub(crate) beep: BeepSettings,
    pub(crate) needs_status_before_screen: bool,
    pub(crate) screen_dirty: bool,
    pub(crate) display_text: DisplayText,
    pub(crate) rx_buf: Vec<u8>,
    pub(crate) tamper_active: bool,
    pub(crate) ack_toggle: u8,
    pub(crate) last_key: Option<ReportedKey>,
    pub(crate) entry: CodeEntry,
}

impl SessionState {
    /// State right before the initial init poll goes out at `now`.
    ///
    /// With `configure_beep` false the startup beep configuration is skipped.
    pub fn new(now: Instant, display_text: DisplayText, configure_beep: bool) -> Self {
        SessionState {
            outstanding: None,
            last_init_poll: now,
            last_activity_poll: None,
            sent_second_init: false,
            beep_configured: !configure_beep,
            beep: BeepSettings::SILENT,
            needs_status_before_screen: false,
            screen_dirty: true,
            display_text,
            rx_buf: Vec::new(),
            tamper_active: false,
            ack_toggle: INITIAL_ACK_TOGGLE,
            last_key: None,
            entry: CodeEntry::new(),
        }
    }

    /// Open a reply window for `kind`. Returns false if one is already open.
    pub(crate) fn begin_command(&mut self, kind: CommandKind, now: Instant) -> bool {
        if self.outstanding.is_some() {
            return false;
        }
        self.outstanding = Some(Outstanding { kind, sent_at: now });
        self.rx_buf.clear();
        true
    }

    /// Append bytes read during the open window
    pub(crate) fn push_inbound(&mut self, bytes: &[u8]) {
        self.rx_buf.extend_from_slice(bytes);
    }

    /// True once the outstanding command has waited at least `window`
    pub fn reply_window_elapsed(&self, now: Instant, window: Duration) -> bool {
        self.outstanding
            .is_some_and(|o| now.saturating_duration_since(o.sent_at) >= window)
    }

    /// Close the reply window, handing back the command and its bytes
    pub(crate) fn take_reply(&mut self) -> Option<(CommandKind, Vec<u8>)> {
        let outstanding = self.outstanding.take()?;
        Some((outstanding.kind, std::mem::take(&mut self.rx_buf)))
    }

    pub(crate) fn set_display_text(&mut self, text: DisplayText) {
        self.display_text = text;
        self.screen_dirty = true;
    }

    /// Store new beep settings and re-arm the beep rule
    pub(crate) fn set_beep(&mut self, settings: BeepSettings) {
        self.beep = settings;
        self.beep_configured = false;
    }

    /// Returns true if the tamper flag changed
    pub(crate) fn set_tamper(&mut self, active: bool) -> bool {
        if self.tamper_active == active {
            return false;
        }
        self.tamper_active = active;
        true
    }

    /// Current toggle value; the stored value flips for the next call
    pub(crate) fn next_ack_toggle(&mut self) -> u8 {
        let current = self.ack_toggle;
        self.ack_toggle = if current == ACK_TOGGLE_VALUES[0] {
            ACK_TOGGLE_VALUES[1]
        } else {
            ACK_TOGGLE_VALUES[0]
        };
        current
    }

    /// Command whose reply window is open
    pub fn outstanding(&self) -> Option<Outstanding> {
        self.outstanding
    }

    /// Whether the first status poll after start has gone out
    pub fn sent_second_init(&self) -> bool {
        self.sent_second_init
    }

    /// False while a beep configuration is pending
    pub fn beep_configured(&self) -> bool {
        self.beep_configured
    }

    /// Settings used by the next beep configuration
    pub fn beep_settings(&self) -> BeepSettings {
        self.beep
    }

    /// Set by a screen write, cleared by the next status reply
    pub fn needs_status_before_screen(&self) -> bool {
        self.needs_status_before_screen
    }

    /// Display needs pushing
    pub fn screen_dirty(&self) -> bool {
        self.screen_dirty
    }

    pub fn display_text(&self) -> &DisplayText {
        &self.display_text
    }

    /// Bytes received in the current window
    pub fn inbound(&self) -> &[u8] {
        &self.rx_buf
    }

    /// Last tamper state seen from the keypad
    pub fn tamper_active(&self) -> bool {
        self.tamper_active
    }

    /// Toggle value the next acknowledgement will carry
    pub fn ack_toggle(&self) -> u8 {
        self.ack_toggle
    }

    pub fn last_key(&self) -> Option<ReportedKey> {
        self.last_key
    }

    /// Code being typed on the keypad
    pub fn entry(&self) -> &CodeEntry {
        &self.entry
    }
}

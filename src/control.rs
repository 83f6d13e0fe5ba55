//! Session control input.
//!
//! Control lines are plain text: `/quit` ends the session, `/beep ...` changes
//! the keypad sounder, and anything else becomes the display text.

use crate::command::{BeepMode, BeepSettings};
use crate::error::{GalaxyError, Result};
use std::sync::mpsc::{Receiver, TryRecvError};

/// A request from outside the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Stop the session and close the transport
    Quit,
    /// New display text, `line1|line2`
    SetDisplayText(String),
    /// Reconfigure the sounder
    SetBeep(BeepSettings),
}

impl ControlCommand {
    /// Parse one control line; blank lines yield `Ok(None)`.
    ///
    /// `/beep off`, `/beep on` and `/beep intermittent <beep> <quiet>` (tenths
    /// of a second) configure the sounder. `/beep <mode> [<beep> <quiet>]`
    /// takes the raw mode byte instead.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if !line.starts_with('/') {
            return Ok(Some(ControlCommand::SetDisplayText(line.to_string())));
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("/quit") => Ok(Some(ControlCommand::Quit)),
            Some("/beep") => parse_beep(words.collect()).map(|s| Some(ControlCommand::SetBeep(s))),
            Some(other) => Err(GalaxyError::Config(format!("unknown control command {}", other))),
            None => Ok(None),
        }
    }
}

fn parse_beep(args: Vec<&str>) -> Result<BeepSettings> {
    let period = |s: &str| {
        s.parse::<u8>()
            .map_err(|_| GalaxyError::Config(format!("invalid beep period {:?}", s)))
    };
    match args.as_slice() {
        ["off"] => Ok(BeepSettings::SILENT),
        ["on"] => Ok(BeepSettings {
            mode: BeepMode::On,
            beep_period: 0,
            quiet_period: 0,
        }),
        ["intermittent", beep, quiet] => Ok(BeepSettings {
            mode: BeepMode::Intermittent,
            beep_period: period(*beep)?,
            quiet_period: period(*quiet)?,
        }),
        [mode, periods @ ..] if mode.parse::<u8>().is_ok() => {
            let mode = BeepMode::from_u8(period(*mode)?)?;
            let (beep_period, quiet_period) = match periods {
                [] => (0, 0),
                [beep, quiet] => (period(*beep)?, period(*quiet)?),
                _ => return Err(beep_usage()),
            };
            Ok(BeepSettings {
                mode,
                beep_period,
                quiet_period,
            })
        }
        _ => Err(beep_usage()),
    }
}

fn beep_usage() -> GalaxyError {
    GalaxyError::Config(
        "usage: /beep off | on | intermittent <beep> <quiet> | <mode> [<beep> <quiet>]".to_string(),
    )
}

/// Non-blocking source of control commands
pub trait ControlSource {
    /// Next pending command, if any. Must not block.
    fn poll(&mut self) -> Option<ControlCommand>;
}

/// Lines from another thread (typically stdin). A closed channel ends the
/// session, like end of input on a console.
impl ControlSource for Receiver<String> {
    fn poll(&mut self) -> Option<ControlCommand> {
        loop {
            match self.try_recv() {
                Ok(line) => match ControlCommand::parse(&line) {
                    Ok(Some(command)) => return Some(command),
                    Ok(None) => continue,
                    Err(e) => {
                        log::warn!("{}", e);
                        continue;
                    }
                },
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(ControlCommand::Quit),
            }
        }
    }
}

/// Control source that never issues commands
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControl;

impl ControlSource for NoControl {
    fn poll(&mut self) -> Option<ControlCommand> {
        None
    }
}

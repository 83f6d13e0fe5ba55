use crate::codec::encode;
use crate::command::{BeepSettings, Command, CommandKind};
use crate::config::{KeypadConfig, Timings};
use crate::constants::LOOP_YIELD_MS;
use crate::control::{ControlCommand, ControlSource};
use crate::error::Result;
use crate::interpreter::ReplyInterpreter;
use crate::observer::{LogObserver, SessionEvent, SessionObserver};
use crate::scheduler;
use crate::state::SessionState;
use crate::transport::{SerialTransport, Transport};
use crate::types::{DisplayText, PanelAddress};
use log::{error, info};
use std::thread;
use std::time::{Duration, Instant};

/// Where the session loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing outstanding; the next tick may send
    Idle,
    /// A reply window is open for this command
    AwaitingReply(CommandKind),
    Stopped,
}

/// Main keypad session
pub struct GalaxyKeypad<T: Transport, O: SessionObserver = LogObserver> {
    transport: T,
    observer: O,
    state: SessionState,
    panel: PanelAddress,
    timings: Timings,
    interpreter: ReplyInterpreter,
    started: bool,
    stopped: bool,
}

impl GalaxyKeypad<SerialTransport, LogObserver> {
    /// Open the serial port and create a session that logs through `log`
    pub fn open(port_name: &str, config: &KeypadConfig) -> Result<Self> {
        let transport = SerialTransport::open(port_name, &config.serial)?;
        GalaxyKeypad::new(transport, config, LogObserver)
    }
}

impl<T: Transport, O: SessionObserver> GalaxyKeypad<T, O> {
    /// Create a session over any transport. Nothing is sent until the first tick.
    pub fn new(transport: T, config: &KeypadConfig, observer: O) -> Result<Self> {
        let panel = config.panel_address()?;
        let state = SessionState::new(
            Instant::now(),
            config.display_text(),
            config.disable_beep_at_startup,
        );
        Ok(GalaxyKeypad {
            transport,
            observer,
            state,
            panel,
            timings: config.timings.clone(),
            interpreter: ReplyInterpreter::new(
                config.keypad_address(),
                config.timings.key_dedup_window(),
            ),
            started: false,
            stopped: false,
        })
    }

    /// Send the initial init poll. Called by the first tick if not done before.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.started || self.stopped {
            return Ok(());
        }
        self.started = true;
        info!("Galaxy keypad session starting, panel {}", self.panel);
        let command = scheduler::start(&mut self.state, now);
        self.guard(|s| s.send(&command))
    }

    /// One loop iteration: maybe send, drain inbound bytes, close an
    /// elapsed reply window.
    ///
    /// A transport error stops the session and is returned.
    pub fn tick(&mut self, now: Instant) -> Result<SessionPhase> {
        if self.stopped {
            return Ok(SessionPhase::Stopped);
        }
        if !self.started {
            self.start(now)?;
        } else if let Some(command) = scheduler::next_command(&mut self.state, &self.timings, now) {
            self.guard(|s| s.send(&command))?;
        }
        self.guard(|s| s.drain())?;
        if self.state.reply_window_elapsed(now, self.timings.reply_window()) {
            self.guard(|s| s.finish_reply(now))?;
        }
        Ok(self.phase())
    }

    /// Tick until stopped, polling `control` every iteration
    pub fn run<C: ControlSource + ?Sized>(&mut self, control: &mut C) -> Result<()> {
        while !self.stopped {
            self.tick(Instant::now())?;
            if let Some(command) = control.poll() {
                self.handle_control(command)?;
            }
            thread::sleep(Duration::from_millis(LOOP_YIELD_MS));
        }
        Ok(())
    }

    /// Apply one control command
    pub fn handle_control(&mut self, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::Quit => {
                info!("Quit requested");
                self.stop()
            }
            ControlCommand::SetDisplayText(text) => {
                self.set_display_text(&text);
                Ok(())
            }
            ControlCommand::SetBeep(settings) => {
                self.set_beep(settings);
                Ok(())
            }
        }
    }

    /// Replace the display text; it is pushed at the next free slot
    pub fn set_display_text(&mut self, text: &str) {
        let text = DisplayText::new(text);
        self.observer.on_event(&SessionEvent::DisplayChanged {
            text: text.as_str().to_string(),
        });
        self.state.set_display_text(text);
    }

    /// Re-run beep configuration with new settings at the next free slot
    pub fn set_beep(&mut self, settings: BeepSettings) {
        self.state.set_beep(settings);
    }

    /// Close the transport and stop the loop
    pub fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.observer.on_event(&SessionEvent::Stopped);
        self.transport.close()
    }

    /// Current loop phase
    pub fn phase(&self) -> SessionPhase {
        if self.stopped {
            return SessionPhase::Stopped;
        }
        match self.state.outstanding() {
            Some(o) => SessionPhase::AwaitingReply(o.kind),
            None => SessionPhase::Idle,
        }
    }

    /// Protocol state, for inspection
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Address this session answers as
    pub fn panel_address(&self) -> PanelAddress {
        self.panel
    }

    /// Event observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Run a transport step; on failure close the transport and stop
    fn guard<R>(&mut self, step: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        step(self).map_err(|e| {
            error!("Transport failure, stopping session: {}", e);
            if let Err(close_err) = self.stop() {
                error!("Failed to close transport: {}", close_err);
            }
            e
        })
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        let frame = encode(command, self.panel);
        self.transport.write_all(frame.as_bytes())?;
        self.observer.on_event(&SessionEvent::FrameSent {
            kind: command.kind(),
            bytes: frame.into_bytes(),
        });
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        let mut buf = [0u8; 64];
        loop {
            let n = self.transport.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            self.state.push_inbound(&buf[..n]);
        }
    }

    fn finish_reply(&mut self, now: Instant) -> Result<()> {
        let Some((kind, bytes)) = self.state.take_reply() else {
            return Ok(());
        };
        if bytes.is_empty() {
            self.observer.on_event(&SessionEvent::NoReply { kind });
            return Ok(());
        }
        self.observer.on_event(&SessionEvent::ReplyReceived {
            kind,
            bytes: bytes.clone(),
        });
        match self
            .interpreter
            .interpret(&mut self.state, kind, &bytes, now, &mut self.observer)
        {
            Some(ack) => self.send(&ack),
            None => Ok(()),
        }
    }
}

//! Decides which single command to send on an idle tick.
//!
//! The rules below are evaluated top to bottom and the first one that applies
//! wins. Nothing is evaluated while a reply window is open.

use crate::command::Command;
use crate::config::Timings;
use crate::state::SessionState;
use log::trace;
use std::time::{Duration, Instant};

struct Rule {
    name: &'static str,
    applies: fn(&SessionState, &Timings, Instant) -> bool,
    fire: fn(&mut SessionState, Instant) -> Command,
}

const RULES: [Rule; 5] = [
    Rule {
        name: "second init poll",
        applies: second_init_due,
        fire: status_poll,
    },
    Rule {
        name: "status poll",
        applies: status_due,
        fire: status_poll,
    },
    Rule {
        name: "beep config",
        applies: beep_due,
        fire: beep_config,
    },
    Rule {
        name: "screen write",
        applies: screen_due,
        fire: screen_write,
    },
    Rule {
        name: "activity poll",
        applies: activity_due,
        fire: activity_poll,
    },
];

fn second_init_due(s: &SessionState, t: &Timings, now: Instant) -> bool {
    !s.sent_second_init && since(now, s.last_init_poll) >= t.second_init_delay()
}

fn status_due(s: &SessionState, t: &Timings, now: Instant) -> bool {
    since(now, s.last_init_poll) >= t.status_poll_interval() || s.needs_status_before_screen
}

fn beep_due(s: &SessionState, _: &Timings, _: Instant) -> bool {
    s.sent_second_init && !s.beep_configured
}

fn screen_due(s: &SessionState, _: &Timings, _: Instant) -> bool {
    s.sent_second_init && s.screen_dirty && !s.needs_status_before_screen
}

fn activity_due(s: &SessionState, t: &Timings, now: Instant) -> bool {
    s.last_activity_poll
        .map_or(true, |last| since(now, last) >= t.activity_poll_interval())
}

/// Whichever status poll goes out first after start counts as the second init
fn status_poll(s: &mut SessionState, now: Instant) -> Command {
    s.sent_second_init = true;
    s.last_init_poll = now;
    Command::StatusPoll
}

fn beep_config(s: &mut SessionState, _: Instant) -> Command {
    s.beep_configured = true;
    Command::beep(s.beep)
}

fn screen_write(s: &mut SessionState, _: Instant) -> Command {
    s.screen_dirty = false;
    s.needs_status_before_screen = true;
    Command::entry_screen(&s.display_text, &s.entry)
}

fn activity_poll(s: &mut SessionState, now: Instant) -> Command {
    s.last_activity_poll = Some(now);
    Command::ActivityPoll
}

fn since(now: Instant, then: Instant) -> Duration {
    now.saturating_duration_since(then)
}

/// Pick the next command and open its reply window.
///
/// Returns `None` while a command is outstanding or when nothing is due.
pub fn next_command(state: &mut SessionState, timings: &Timings, now: Instant) -> Option<Command> {
    if state.outstanding.is_some() {
        return None;
    }
    let rule = RULES.iter().find(|r| (r.applies)(state, timings, now))?;
    let command = (rule.fire)(state, now);
    trace!("Scheduler rule '{}' selected {:?}", rule.name, command.kind());
    state.begin_command(command.kind(), now);
    Some(command)
}

/// Record the unconditional init poll sent at session start
pub fn start(state: &mut SessionState, now: Instant) -> Command {
    state.last_init_poll = now;
    state.begin_command(Command::InitPoll.kind(), now);
    Command::InitPoll
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BeepMode, BeepSettings, CommandKind};
    use crate::types::{DisplayText, Key};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn fresh(t0: Instant) -> SessionState {
        SessionState::new(t0, DisplayText::new("LINE-A|LINE-B"), true)
    }

    /// Close the open window as if the reply arrived
    fn finish(state: &mut SessionState) {
        state.take_reply();
    }

    #[test]
    fn nothing_is_chosen_while_a_reply_is_pending() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        let timings = Timings::default();
        assert_eq!(start(&mut s, t0), Command::InitPoll);
        assert_eq!(next_command(&mut s, &timings, t0 + ms(10_000)), None);
        finish(&mut s);
        assert!(next_command(&mut s, &timings, t0 + ms(10_000)).is_some());
    }

    #[test]
    fn activity_polls_before_second_init() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        let timings = Timings::default();
        start(&mut s, t0);
        finish(&mut s);

        assert_eq!(next_command(&mut s, &timings, t0 + ms(100)), Some(Command::ActivityPoll));
        finish(&mut s);
        assert_eq!(next_command(&mut s, &timings, t0 + ms(200)), None, "interval not yet elapsed");
        assert_eq!(next_command(&mut s, &timings, t0 + ms(250)), Some(Command::ActivityPoll));
    }

    #[test]
    fn startup_sequence_follows_priority_order() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        let timings = Timings::default();
        start(&mut s, t0);
        finish(&mut s);

        let t = t0 + ms(5_000);
        assert_eq!(next_command(&mut s, &timings, t), Some(Command::StatusPoll));
        assert!(s.sent_second_init());
        finish(&mut s);

        assert_eq!(
            next_command(&mut s, &timings, t + ms(100)),
            Some(Command::beep(BeepSettings::SILENT))
        );
        finish(&mut s);

        assert_eq!(
            next_command(&mut s, &timings, t + ms(200)),
            Some(Command::ScreenWrite {
                line1: "LINE-A".into(),
                line2: "LINE-B".into()
            })
        );
        assert!(!s.screen_dirty());
        assert!(s.needs_status_before_screen());
        finish(&mut s);

        // status poll repeats until a reply clears the flag
        assert_eq!(next_command(&mut s, &timings, t + ms(300)), Some(Command::StatusPoll));
        finish(&mut s);
        assert_eq!(next_command(&mut s, &timings, t + ms(400)), Some(Command::StatusPoll));
        finish(&mut s);
        s.needs_status_before_screen = false;
        assert_eq!(next_command(&mut s, &timings, t + ms(500)), Some(Command::ActivityPoll));
    }

    #[test]
    fn periodic_status_poll_beats_activity_poll() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        s.sent_second_init = true;
        s.beep_configured = true;
        s.screen_dirty = false;
        let timings = Timings::default();

        assert_eq!(next_command(&mut s, &timings, t0 + ms(4_999)), Some(Command::ActivityPoll));
        finish(&mut s);
        assert_eq!(next_command(&mut s, &timings, t0 + ms(5_000)), Some(Command::StatusPoll));
        finish(&mut s);
        // timestamp moved, so the next status poll is 5 s away again
        assert_eq!(next_command(&mut s, &timings, t0 + ms(5_150)), Some(Command::ActivityPoll));
    }

    #[test]
    fn dirty_screen_waits_for_status_reply() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        s.sent_second_init = true;
        s.beep_configured = true;
        s.needs_status_before_screen = true;
        let timings = Timings::default();

        assert_eq!(next_command(&mut s, &timings, t0 + ms(10)), Some(Command::StatusPoll));
        assert!(s.screen_dirty(), "screen stays dirty until the status reply lands");
    }

    #[test]
    fn second_init_delay_and_status_interval_are_separate() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        s.screen_dirty = false;
        let timings = Timings {
            second_init_delay_ms: 200,
            status_poll_interval_ms: 1_000,
            ..Timings::default()
        };
        start(&mut s, t0);
        finish(&mut s);

        assert_eq!(next_command(&mut s, &timings, t0 + ms(200)), Some(Command::StatusPoll));
        finish(&mut s);
        assert_eq!(
            next_command(&mut s, &timings, t0 + ms(300)).map(|c| c.kind()),
            Some(CommandKind::BeepConfig)
        );
        finish(&mut s);
        assert_eq!(next_command(&mut s, &timings, t0 + ms(400)), Some(Command::ActivityPoll));
        finish(&mut s);
        assert_eq!(next_command(&mut s, &timings, t0 + ms(1_200)), Some(Command::StatusPoll));
    }

    #[test]
    fn short_status_interval_still_completes_startup() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        let timings = Timings {
            second_init_delay_ms: 5_000,
            status_poll_interval_ms: 1_000,
            ..Timings::default()
        };
        start(&mut s, t0);
        finish(&mut s);

        let mut sent = Vec::new();
        for step in 1..=300u64 {
            if let Some(command) = next_command(&mut s, &timings, t0 + ms(step * 10)) {
                sent.push(command.kind());
            }
            finish(&mut s);
        }

        assert!(s.sent_second_init());
        assert!(sent.contains(&CommandKind::BeepConfig));
        assert!(sent.contains(&CommandKind::ScreenWrite));
        let first_status = sent.iter().position(|k| *k == CommandKind::StatusPoll);
        let beep = sent.iter().position(|k| *k == CommandKind::BeepConfig);
        assert!(first_status < beep, "beep config follows the first status poll");
    }

    #[test]
    fn masked_code_replaces_second_line() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        s.sent_second_init = true;
        s.beep_configured = true;
        s.entry.push(Key::Digit(4));
        s.entry.push(Key::Digit(2));
        assert_eq!(
            next_command(&mut s, &Timings::default(), t0 + ms(1)),
            Some(Command::ScreenWrite {
                line1: "LINE-A".into(),
                line2: "**".into()
            })
        );
    }

    #[test]
    fn re_armed_beep_uses_new_settings() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        s.sent_second_init = true;
        s.beep_configured = true;
        s.screen_dirty = false;
        let settings = BeepSettings {
            mode: BeepMode::Intermittent,
            beep_period: 3,
            quiet_period: 7,
        };
        s.set_beep(settings);
        assert_eq!(
            next_command(&mut s, &Timings::default(), t0 + ms(1)),
            Some(Command::beep(settings))
        );
        assert!(s.beep_configured());
    }

    #[test]
    fn at_most_one_outstanding_across_many_ticks() {
        let t0 = Instant::now();
        let mut s = fresh(t0);
        let timings = Timings::default();
        start(&mut s, t0);
        let mut window_opened_at = t0;
        for step in 1..2_000u64 {
            let now = t0 + ms(step * 7);
            let had_outstanding = s.outstanding().is_some();
            let chosen = next_command(&mut s, &timings, now);
            if had_outstanding {
                assert!(chosen.is_none(), "new command while one was outstanding at step {}", step);
            }
            if chosen.is_some() {
                window_opened_at = now;
            }
            if s.reply_window_elapsed(now, timings.reply_window()) {
                assert!(now - window_opened_at >= timings.reply_window());
                finish(&mut s);
            }
        }
    }
}

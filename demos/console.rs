//! Console Example
//!
//! Drives a Galaxy keypad from a terminal:
//! - Selecting the serial port (argument or interactive list)
//! - Polling the keypad and logging key presses and tamper changes
//! - Logging entered codes (digits, then ENT) while the keypad shows stars
//! - Reading control lines from stdin
//!
//! Every stdin line becomes the display text (`line1|line2`), except:
//!   /quit                               end the session
//!   /beep off | on                      sounder off or on
//!   /beep intermittent <beep> <quiet>   periods in tenths of a second
//!   /beep <mode> [<beep> <quiet>]       raw mode byte (0, 1 or 3)
//!
//! Usage:
//!   cargo run --example console                      # Interactive port selection
//!   cargo run --example console -- /dev/ttyUSB0      # Specify port
//!   cargo run --example console -- /dev/ttyUSB0 3    # Specify port and screen slot
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=trace cargo run --example console

use galaxy_keypad::{GalaxyError, GalaxyKeypad, KeypadConfig, Result, SerialTransport};
use inquire::Select;
use log::info;
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = SerialTransport::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

    Select::new("Select a serial port:", port_names)
        .prompt()
        .map_err(|e| GalaxyError::Config(format!("Selection cancelled: {}", e)))
}

fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let port_name = match args.next() {
        Some(port) => port,
        None => select_port()?,
    };
    let screen_number = match args.next() {
        Some(n) => n
            .parse()
            .map_err(|_| GalaxyError::Config(format!("invalid screen number {:?}", n)))?,
        None => KeypadConfig::default().screen_number,
    };

    let config = KeypadConfig {
        screen_number,
        ..KeypadConfig::default()
    };

    info!("Connecting to Galaxy keypad on {}...", port_name);
    let mut keypad = GalaxyKeypad::open(&port_name, &config)?;
    info!(
        "Opened {}, panel ID {}, keypad {}",
        port_name,
        keypad.panel_address(),
        config.keypad_address()
    );

    // stdin is read on its own thread; closing stdin ends the session
    let (tx, mut rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if tx.send(line.clone()).is_ok() => {}
                _ => break,
            }
        }
    });

    keypad.run(&mut rx)?;
    info!("Exiting...");
    Ok(())
}

//! Byte channel to the keypad bus.

use crate::config::SerialSettings;
use crate::error::{GalaxyError, Result};
use log::{debug, trace};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};

/// Half-duplex byte channel used by the session loop
pub trait Transport {
    /// Read whatever is available; `Ok(0)` means nothing arrived before the
    /// read timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Serial port transport (8N1, short read timeout)
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Open a serial port
    pub fn open(port_name: &str, settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(port_name, settings.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(settings.read_timeout())
            .open()?;
        debug!("Opened {} at {} baud", port_name, settings.baud_rate);
        Ok(SerialTransport { port: Some(port) })
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(GalaxyError::Disconnected)
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match Read::read(self.port()?, buf) {
            Ok(0) => Ok(0),
            Ok(n) => {
                trace!("Read from port: {:02X?}", &buf[..n]);
                Ok(n)
            }
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        trace!("Write to port: {:02X?}", bytes);
        let port = self.port()?;
        Write::write_all(port, bytes)?;
        Write::flush(port)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            Write::flush(&mut port)?;
            debug!("Closed {}", port.name().unwrap_or_default());
        }
        Ok(())
    }
}

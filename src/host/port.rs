use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read as _};
use std::time::Duration;

use anyhow::{Context, Result};
use embedded_hal_nb::serial::{ErrorKind, ErrorType, Read};
use serialport::SerialPort;

const READ_CHUNK: usize = 4096;

#[derive(Debug)]
pub enum TransportError {
    Port(serialport::Error),
    Io(io::Error),
}

impl From<serialport::Error> for TransportError {
    fn from(value: serialport::Error) -> Self {
        TransportError::Port(value)
    }
}

impl From<io::Error> for TransportError {
    fn from(value: io::Error) -> Self {
        TransportError::Io(value)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Port(e) => write!(f, "serial port: {e}"),
            TransportError::Io(e) => write!(f, "serial read: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl embedded_hal_nb::serial::Error for TransportError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Non-blocking byte reader over a serial port. WouldBlock whenever the
/// OS has nothing queued. The port closes when this is dropped.
pub struct SerialRx {
    name: String,
    port: Box<dyn SerialPort>,
    pending: VecDeque<u8>,
}

impl SerialRx {
    pub fn open(name: &str, baud: u32) -> Result<SerialRx> {
        let port = serialport::new(name, baud)
            .timeout(Duration::from_millis(10))
            .open()
            .with_context(|| format!("failed to open serial port {name} @ {baud}"))?;
        log::info!("opened {name} @ {baud} baud");
        Ok(SerialRx {
            name: name.to_string(),
            port,
            pending: VecDeque::new(),
        })
    }

    fn refill(&mut self) -> Result<(), TransportError> {
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(());
        }
        let mut chunk = vec![0u8; available.min(READ_CHUNK)];
        match self.port.read(&mut chunk) {
            Ok(n) => self.pending.extend(&chunk[..n]),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

impl ErrorType for SerialRx {
    type Error = TransportError;
}

impl Read for SerialRx {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.pending.is_empty() {
            self.refill()?;
        }
        self.pending.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl Drop for SerialRx {
    fn drop(&mut self) {
        log::info!("closed {}", self.name);
    }
}

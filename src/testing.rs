//! In-memory transports for the unit tests.

use alloc::collections::VecDeque;

use embedded_hal_nb::serial::{ErrorKind, ErrorType, Read};

#[derive(Debug, Clone, Copy)]
enum Event {
    Byte(u8),
    /// Read boundary: the next `read` reports WouldBlock once
    Pause,
    Fault,
}

/// Replays a script of reads. Each pushed chunk is followed by a pause so
/// chunks arrive on separate ticks, the way a UART splits a message.
#[derive(Debug, Default)]
pub struct ScriptedRx {
    events: VecDeque<Event>,
}

impl ScriptedRx {
    pub fn new() -> ScriptedRx {
        ScriptedRx {
            events: VecDeque::new(),
        }
    }

    pub fn chunk(mut self, data: &[u8]) -> ScriptedRx {
        self.push_chunk(data);
        self
    }

    /// Bytes with no read boundary after them.
    pub fn bytes(mut self, data: &[u8]) -> ScriptedRx {
        self.events.extend(data.iter().map(|b| Event::Byte(*b)));
        self
    }

    pub fn fault(mut self) -> ScriptedRx {
        self.events.push_back(Event::Fault);
        self
    }

    pub fn push_chunk(&mut self, data: &[u8]) {
        self.events.extend(data.iter().map(|b| Event::Byte(*b)));
        self.events.push_back(Event::Pause);
    }
}

impl ErrorType for ScriptedRx {
    type Error = ErrorKind;
}

impl Read for ScriptedRx {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        match self.events.pop_front() {
            Some(Event::Byte(b)) => Ok(b),
            Some(Event::Pause) | None => Err(nb::Error::WouldBlock),
            Some(Event::Fault) => Err(nb::Error::Other(ErrorKind::Overrun)),
        }
    }
}

use alloc::vec::Vec;
use embedded_hal_nb::serial::Read;

/// Longest dataset line we accept: 784 three-digit pixels plus commas and
/// the label prefix fit with room to spare.
pub const LINE_CAPACITY: usize = 4096;

/// Append-only store of everything received since the last reset.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    buf: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> ByteBuffer {
        ByteBuffer { buf: Vec::new() }
    }

    pub fn ingest(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Load as much as we can from rx into the buffer, stopping at the first
    /// WouldBlock. Returns how many bytes came in; zero is fine. On a read
    /// error the bytes already taken stay in the buffer.
    pub fn fill_from<Rx: Read>(&mut self, rx: &mut Rx) -> Result<usize, Rx::Error> {
        let mut count = 0;
        loop {
            match rx.read() {
                Ok(c) => {
                    self.buf.push(c);
                    count += 1;
                }
                Err(nb::Error::WouldBlock) => return Ok(count),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }

    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        find(&self.buf, needle)
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        self.find(needle).is_some()
    }

    pub fn slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[derive(Debug)]
pub enum LineError<ReadError> {
    Read(ReadError),
    /// A line ran past `capacity` bytes; it was dropped up to its delimiter.
    Overflow { capacity: usize },
}

impl<Er: core::fmt::Display> core::fmt::Display for LineError<Er> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::Read(e) => write!(f, "read error: {e}"),
            LineError::Overflow { capacity } => {
                write!(f, "line longer than {capacity} bytes dropped")
            }
        }
    }
}

/// Assembles `\n` or `\r` terminated lines from a non-blocking reader.
pub struct LineReceiver<Rx: Read> {
    pub rx: Rx,
    line: heapless::Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
}

impl<Rx: Read> LineReceiver<Rx> {
    pub fn new(rx: Rx) -> LineReceiver<Rx> {
        LineReceiver {
            rx,
            line: heapless::Vec::new(),
            overflowed: false,
        }
    }

    /// Returns the next non-empty line with surrounding whitespace trimmed,
    /// or WouldBlock if no full line has arrived yet. Partial lines are kept
    /// across calls.
    pub fn recv_line(&mut self) -> nb::Result<Vec<u8>, LineError<Rx::Error>> {
        loop {
            let c = match self.rx.read() {
                Ok(c) => c,
                Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
                Err(nb::Error::Other(e)) => return Err(nb::Error::Other(LineError::Read(e))),
            };

            if c == b'\n' || c == b'\r' {
                if self.overflowed {
                    self.overflowed = false;
                    self.line.clear();
                    return Err(nb::Error::Other(LineError::Overflow {
                        capacity: LINE_CAPACITY,
                    }));
                }
                let line = self.line.trim_ascii().to_vec();
                self.line.clear();
                if line.is_empty() {
                    continue;
                }
                return Ok(line);
            }

            if self.overflowed {
                continue;
            }
            if self.line.push(c).is_err() {
                log::warn!("line exceeded {LINE_CAPACITY} bytes, dropping it");
                self.overflowed = true;
                self.line.clear();
            }
        }
    }

    pub fn release(self) -> Rx {
        self.rx
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::testing::ScriptedRx;

    #[test]
    fn fill_from_stops_at_read_boundary() {
        let mut rx = ScriptedRx::new().chunk(b"(1,2)").chunk(b"(3,4)");
        let mut buf = ByteBuffer::new();
        assert_eq!(buf.fill_from(&mut rx).unwrap(), 5);
        assert_eq!(buf.slice(), b"(1,2)");
        assert_eq!(buf.fill_from(&mut rx).unwrap(), 5);
        assert_eq!(buf.slice(), b"(1,2)(3,4)");
        // Nothing left is not an error
        assert_eq!(buf.fill_from(&mut rx).unwrap(), 0);
    }

    #[test]
    fn fill_from_keeps_bytes_read_before_fault() {
        let mut rx = ScriptedRx::new().bytes(b"ab").fault();
        let mut buf = ByteBuffer::new();
        buf.ingest(b"xy");
        assert!(buf.fill_from(&mut rx).is_err());
        assert_eq!(buf.slice(), b"xyab");
    }

    #[test]
    fn find_and_clear() {
        let mut buf = ByteBuffer::new();
        buf.ingest(b"(1,2)***1*2*3comp");
        assert_eq!(buf.find(b"***"), Some(5));
        assert!(!buf.contains(b"completed"));
        buf.ingest(b"leted");
        assert!(buf.contains(b"completed"));
        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn lines_split_across_reads() {
        let mut rx = LineReceiver::new(ScriptedRx::new().chunk(b"a*1*2,").chunk(b"3\r\n###\n"));
        assert!(matches!(rx.recv_line(), Err(nb::Error::WouldBlock)));
        assert_eq!(rx.recv_line().unwrap(), b"a*1*2,3".to_vec());
        assert_eq!(rx.recv_line().unwrap(), b"###".to_vec());
        assert!(matches!(rx.recv_line(), Err(nb::Error::WouldBlock)));
    }

    #[test]
    fn overlong_line_is_dropped_and_reported() {
        let long = vec![b'7'; LINE_CAPACITY + 10];
        let mut rx = ScriptedRx::new();
        rx.push_chunk(&long);
        rx.push_chunk(b"\nok\n");
        let mut lines = LineReceiver::new(rx);
        assert!(matches!(lines.recv_line(), Err(nb::Error::WouldBlock)));
        assert!(matches!(
            lines.recv_line(),
            Err(nb::Error::Other(LineError::Overflow { capacity: LINE_CAPACITY }))
        ));
        assert_eq!(lines.recv_line().unwrap(), b"ok".to_vec());
    }

    #[test]
    fn read_errors_pass_through() {
        let mut lines = LineReceiver::new(ScriptedRx::new().fault());
        assert!(matches!(
            lines.recv_line(),
            Err(nb::Error::Other(LineError::Read(_)))
        ));
    }
}

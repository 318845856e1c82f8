use embedded_hal_nb::serial::Read;

use crate::coordinates::{extract_mirrored, CoordinateStream};
use crate::error::{DecodeError, SessionError};
use crate::protocol::{TERMINAL_SENTINEL, X_MIRROR};
use crate::result::{preview, ResultRecord};
use crate::serial::ByteBuffer;
use crate::Decode;

/// What one tick produced.
#[derive(Debug)]
pub enum Tick<'a> {
    /// Still drawing: every unique pair seen so far this session
    Streaming(&'a CoordinateStream),
    /// Device finished; the buffer has been reset
    Result(ResultRecord),
}

/// Live recognition session over a non-blocking transport. Owns the raw
/// buffer and the last coordinate snapshot.
pub struct SessionController<Rx: Read> {
    rx: Rx,
    buffer: ByteBuffer,
    coordinates: CoordinateStream,
    mirror: i64,
}

impl<Rx: Read> SessionController<Rx> {
    pub fn new(rx: Rx) -> SessionController<Rx> {
        SessionController {
            rx,
            buffer: ByteBuffer::new(),
            coordinates: CoordinateStream::new(),
            mirror: X_MIRROR,
        }
    }

    pub fn with_mirror(mut self, mirror: i64) -> SessionController<Rx> {
        self.mirror = mirror;
        self
    }

    pub fn ingest(&mut self, bytes: &[u8]) {
        self.buffer.ingest(bytes);
    }

    pub fn is_terminal(&self) -> bool {
        self.buffer.contains(TERMINAL_SENTINEL)
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.coordinates.clear();
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn coordinates(&self) -> &CoordinateStream {
        &self.coordinates
    }

    /// Pull whatever the transport has, then decode. No new bytes is a
    /// normal tick. Transport errors leave the buffer as it was.
    pub fn tick(&mut self) -> Result<Tick<'_>, SessionError<Rx::Error>> {
        let read = self
            .buffer
            .fill_from(&mut self.rx)
            .map_err(SessionError::Transport)?;
        if read > 0 {
            log::trace!("read {read} bytes, buffer holds {}", self.buffer.len());
        }
        Ok(self.step()?)
    }

    /// The decode half of a tick, over what is buffered right now.
    ///
    /// Once the terminal sentinel is in, the buffer is reset whether or not
    /// the frame decodes, so a frame is never decoded twice and a bad one
    /// can't poison the next drawing.
    pub fn step(&mut self) -> Result<Tick<'_>, DecodeError> {
        if self.is_terminal() {
            let decoded = ResultRecord::decode(self.buffer.slice());
            if let Err(e) = &decoded {
                log::warn!(
                    "dropping result frame ({e}): {:?}",
                    preview(self.buffer.slice(), 64)
                );
            }
            self.reset();
            let record = decoded?;
            log::info!("result frame decoded, prediction {}", record.label);
            return Ok(Tick::Result(record));
        }

        self.coordinates = extract_mirrored(self.buffer.slice(), self.mirror);
        Ok(Tick::Streaming(&self.coordinates))
    }
}

use core::fmt;

use embedded_hal_nb::serial::Read;

use crate::error::DecodeError;
use crate::sample::{sample_columns, Collected, LabeledSampleDecoder};
use crate::serial::{LineError, LineReceiver};
use crate::sink::SampleSink;

#[derive(Debug)]
pub enum CollectError<ReadError, StorageError> {
    Line(LineError<ReadError>),
    Decode(DecodeError),
    Storage(StorageError),
}

impl<Er, Es> CollectError<Er, Es> {
    /// Transport and storage failures end the run. A bad line is skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CollectError::Line(LineError::Read(_)) | CollectError::Storage(_)
        )
    }
}

impl<Er: fmt::Display, Es: fmt::Display> fmt::Display for CollectError<Er, Es> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Line(e) => write!(f, "{e}"),
            CollectError::Decode(e) => write!(f, "{e}"),
            CollectError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

/// Dataset collection over a line transport: every decoded sample is
/// appended to the sink before `poll` returns it.
pub struct CollectionSession<Rx: Read, S: SampleSink> {
    lines: LineReceiver<Rx>,
    decoder: LabeledSampleDecoder,
    sink: S,
}

impl<Rx: Read, S: SampleSink> CollectionSession<Rx, S> {
    /// Makes sure the sink has its header before any sample arrives.
    pub fn start(rx: Rx, mut sink: S) -> Result<CollectionSession<Rx, S>, S::Error> {
        sink.ensure_header(&sample_columns())?;
        Ok(CollectionSession {
            lines: LineReceiver::new(rx),
            decoder: LabeledSampleDecoder::new(),
            sink,
        })
    }

    pub fn decoder(&self) -> &LabeledSampleDecoder {
        &self.decoder
    }

    /// Handle at most one line. WouldBlock until a whole line is in.
    pub fn poll(&mut self) -> nb::Result<Collected, CollectError<Rx::Error, S::Error>> {
        let line = self.lines.recv_line().map_err(|e| e.map(CollectError::Line))?;
        let collected = self
            .decoder
            .process(&line)
            .map_err(|e| nb::Error::Other(CollectError::Decode(e)))?;

        match &collected {
            Collected::Sample { sample, progress } => {
                self.sink
                    .append_record(sample.label, &sample.pixels)
                    .map_err(|e| nb::Error::Other(CollectError::Storage(e)))?;
                log::debug!(
                    "stored sample for label {} ({} left in batch)",
                    sample.label,
                    progress.remaining
                );
            }
            Collected::EndOfSession => log::info!("device ended the collection session"),
        }
        Ok(collected)
    }

    /// Hands back the transport and the sink.
    pub fn release(self) -> (Rx, S) {
        (self.lines.release(), self.sink)
    }
}

#![no_std]

extern crate alloc;

pub mod collect;
pub mod coordinates;
pub mod error;
pub mod protocol;
pub mod result;
pub mod sample;
pub mod serial;
pub mod session;
pub mod sink;

#[cfg(test)]
mod testing;

pub trait Decode<'a> where Self: Sized {
    type Error;

    fn decode(data: &'a [u8]) -> Result<Self, Self::Error>;
}

pub use collect::{CollectError, CollectionSession};
pub use coordinates::{extract, extract_mirrored, CoordinatePair, CoordinateStream, RawPair};
pub use error::{DecodeError, Field, FramingError, NumericParseError, SessionError, ShapeError};
pub use result::{Image, Prediction, Raster, ResultRecord};
pub use sample::{AcquisitionCounter, Collected, LabeledSample, LabeledSampleDecoder, Progress, SampleLine};
pub use serial::{ByteBuffer, LineError, LineReceiver};
pub use session::{SessionController, Tick};
pub use sink::{CsvSink, Presenter, SampleSink};

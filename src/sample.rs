//! Dataset collection: one labeled drawing per line.
//!
//! `<ignored>*<label>*<784 comma separated pixels>`, and a bare `###` line
//! when the operator ends the run.

use core::fmt;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::Decode;
use crate::error::{DecodeError, Field, FramingError, NumericParseError};
use crate::protocol::{BATCH_SIZE, END_OF_SESSION, FIELD_DELIMITER, IMAGE_LEN, VALUE_DELIMITER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSample {
    pub label: i64,
    /// Stored exactly as received
    pub pixels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleLine {
    EndOfSession,
    Sample(LabeledSample),
}

impl<'a> Decode<'a> for SampleLine {
    type Error = DecodeError;

    fn decode(data: &'a [u8]) -> Result<Self, Self::Error> {
        let line = data.trim_ascii();
        if line == END_OF_SESSION.as_bytes() {
            return Ok(SampleLine::EndOfSession);
        }

        let fields: Vec<&[u8]> = line.split(|b| *b == FIELD_DELIMITER).collect();
        if fields.len() < 3 {
            return Err(FramingError::MissingFields {
                expected: 3,
                found: fields.len(),
            }
            .into());
        }

        let label_text = core::str::from_utf8(fields[1])
            .map_err(|_| NumericParseError::from_bytes(Field::Label, fields[1]))?
            .trim();
        let label = label_text
            .parse::<i64>()
            .map_err(|_| NumericParseError::new(Field::Label, label_text))?;

        // Pixels are kept verbatim, so they have to be text already.
        let pixels = fields[2]
            .split(|b| *b == VALUE_DELIMITER)
            .map(|token| {
                core::str::from_utf8(token)
                    .map(String::from)
                    .map_err(|_| NumericParseError::from_bytes(Field::Pixels, token))
            })
            .collect::<Result<Vec<String>, _>>()?;
        if pixels.len() != IMAGE_LEN {
            log::warn!(
                "sample for label {label} has {} pixels, expected {IMAGE_LEN}",
                pixels.len()
            );
        }

        Ok(SampleLine::Sample(LabeledSample { label, pixels }))
    }
}

/// Operator-facing tally. Runs on its own and never looks at the label a
/// line carries; the stored sample always keeps the wire label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionCounter {
    current_label: i64,
    acquired_in_batch: usize,
    batch_size: usize,
}

impl Default for AcquisitionCounter {
    fn default() -> Self {
        AcquisitionCounter::new()
    }
}

impl AcquisitionCounter {
    pub const fn new() -> AcquisitionCounter {
        AcquisitionCounter::with_batch_size(BATCH_SIZE)
    }

    pub const fn with_batch_size(batch_size: usize) -> AcquisitionCounter {
        AcquisitionCounter {
            current_label: 0,
            acquired_in_batch: 0,
            batch_size: if batch_size == 0 { 1 } else { batch_size },
        }
    }

    pub fn current_label(&self) -> i64 {
        self.current_label
    }

    pub fn acquired_in_batch(&self) -> usize {
        self.acquired_in_batch
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Count one stored sample. The returned progress is taken before a
    /// full batch rolls over to the next label, so the last sample of a
    /// batch reports zero remaining.
    pub fn advance(&mut self) -> Progress {
        self.acquired_in_batch += 1;
        let progress = Progress {
            current_label: self.current_label,
            remaining: self.batch_size - self.acquired_in_batch,
        };
        if self.acquired_in_batch == self.batch_size {
            self.acquired_in_batch = 0;
            self.current_label += 1;
        }
        progress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current_label: i64,
    pub remaining: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data for label {} written. Samples remaining: {}",
            self.current_label, self.remaining
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected {
    EndOfSession,
    Sample {
        sample: LabeledSample,
        progress: Progress,
    },
}

/// Decodes dataset lines and keeps the acquisition tally.
#[derive(Debug, Default)]
pub struct LabeledSampleDecoder {
    counter: AcquisitionCounter,
}

impl LabeledSampleDecoder {
    pub fn new() -> LabeledSampleDecoder {
        LabeledSampleDecoder {
            counter: AcquisitionCounter::new(),
        }
    }

    pub fn counter(&self) -> &AcquisitionCounter {
        &self.counter
    }

    /// The counter only moves for lines that decoded into a sample.
    pub fn process(&mut self, line: &[u8]) -> Result<Collected, DecodeError> {
        match SampleLine::decode(line)? {
            SampleLine::EndOfSession => Ok(Collected::EndOfSession),
            SampleLine::Sample(sample) => {
                let progress = self.counter.advance();
                Ok(Collected::Sample { sample, progress })
            }
        }
    }
}

/// Header row for the dataset table: `label,pixel_0,...,pixel_783`.
pub fn sample_columns() -> Vec<String> {
    let mut columns = Vec::with_capacity(IMAGE_LEN + 1);
    columns.push(String::from("label"));
    columns.extend((0..IMAGE_LEN).map(|i| format!("pixel_{i}")));
    columns
}

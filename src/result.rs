//! The result frame sent once the device has classified a drawing.
//!
//! Layout after the streamed coordinates:
//! `***<784 image values>*<output vector>*<prediction>completed\n\r`,
//! each field a comma separated list of numerals.

use core::fmt;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use crate::Decode;
use crate::error::{DecodeError, Field, FramingError, NumericParseError, ShapeError};
use crate::protocol::{
    FIELD_DELIMITER, IMAGE_DIM, RESULT_DELIMITER, TERMINAL_SENTINEL, UNKNOWN_LABEL,
    VALUE_DELIMITER,
};
use crate::serial::find;

/// Square grid of `N` rows by `N` columns, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<const N: usize> {
    rows: [[f32; N]; N],
}

pub type Image = Raster<IMAGE_DIM>;

impl<const N: usize> Raster<N> {
    pub const LEN: usize = N * N;

    /// Reshape `N * N` values, row-major.
    pub fn from_flat(values: &[f32]) -> Result<Raster<N>, ShapeError> {
        if values.len() != Self::LEN {
            return Err(ShapeError {
                expected: Self::LEN,
                found: values.len(),
            });
        }
        let mut rows = [[0.0; N]; N];
        for (row, chunk) in rows.iter_mut().zip(values.chunks_exact(N)) {
            row.copy_from_slice(chunk);
        }
        Ok(Raster { rows })
    }

    /// Row i swaps with row N-1-i.
    pub fn flip_vertical(&mut self) {
        self.rows.reverse();
    }

    pub fn flipped(mut self) -> Raster<N> {
        self.flip_vertical();
        self
    }

    pub fn rows(&self) -> &[[f32; N]; N] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.rows.get(row)?.get(col).copied()
    }

    pub fn max(&self) -> f32 {
        self.rows
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// What the classifier decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Digit(i64),
    /// Device wasn't confident enough to name a digit
    Unknown,
}

impl Prediction {
    pub fn from_label(label: i64) -> Prediction {
        if label == UNKNOWN_LABEL {
            Prediction::Unknown
        } else {
            Prediction::Digit(label)
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Digit(d) => write!(f, "{d}"),
            Prediction::Unknown => f.write_str("Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Already flipped for display
    pub image: Image,
    pub output: Vec<f32>,
    /// Raw prediction field, label first
    pub prediction: Vec<f32>,
    pub label: Prediction,
}

impl<'a> Decode<'a> for ResultRecord {
    type Error = DecodeError;

    /// Decode a whole terminal buffer, coordinates and all.
    fn decode(data: &'a [u8]) -> Result<Self, Self::Error> {
        let payload = remove_all(result_payload(data)?, TERMINAL_SENTINEL);

        let fields: Vec<&[u8]> = payload.split(|b| *b == FIELD_DELIMITER).collect();
        if fields.len() < 3 {
            return Err(FramingError::MissingFields {
                expected: 3,
                found: fields.len(),
            }
            .into());
        }
        if fields.len() > 3 {
            log::debug!("ignoring {} trailing result fields", fields.len() - 3);
        }

        let image = parse_numbers(fields[0], Field::Image)?;
        let output = parse_numbers(fields[1], Field::Output)?;
        let prediction = parse_numbers(fields[2], Field::Prediction)?;
        let label = parse_label(fields[2])?;

        let image = Image::from_flat(&image)?.flipped();

        Ok(ResultRecord {
            image,
            output,
            prediction,
            label: Prediction::from_label(label),
        })
    }
}

/// The segment between the first `***` and the next one (or the end).
fn result_payload(data: &[u8]) -> Result<&[u8], FramingError> {
    let start = find(data, RESULT_DELIMITER).ok_or(FramingError::MissingResultDelimiter)?
        + RESULT_DELIMITER.len();
    let rest = &data[start..];
    Ok(match find(rest, RESULT_DELIMITER) {
        Some(end) => &rest[..end],
        None => rest,
    })
}

fn remove_all(data: &[u8], needle: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut rest = data;
    while let Some(i) = find(rest, needle) {
        out.extend_from_slice(&rest[..i]);
        rest = &rest[i + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn token_text(token: &[u8], field: Field) -> Result<&str, NumericParseError> {
    match core::str::from_utf8(token) {
        Ok(text) => Ok(text.trim_ascii()),
        Err(_) => Err(NumericParseError::from_bytes(field, token)),
    }
}

fn parse_numbers(field: &[u8], which: Field) -> Result<Vec<f32>, NumericParseError> {
    field
        .split(|b| *b == VALUE_DELIMITER)
        .map(|token| {
            let text = token_text(token, which)?;
            match text.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(NumericParseError::new(which, text)),
            }
        })
        .collect()
}

/// The first prediction token must be an integer.
fn parse_label(field: &[u8]) -> Result<i64, NumericParseError> {
    let first = field.split(|b| *b == VALUE_DELIMITER).next().unwrap_or(&[]);
    let text = token_text(first, Field::Prediction)?;
    text.parse::<i64>()
        .map_err(|_| NumericParseError::new(Field::Prediction, text))
}

/// Lossy view of a buffer for log lines.
pub(crate) fn preview(data: &[u8], max: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(&data[..data.len().min(max)])
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;

    use super::*;
    use crate::protocol::IMAGE_LEN;

    fn csv(values: impl Iterator<Item = usize>) -> String {
        values
            .map(|v| format!("{v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn frame(image: &str, output: &str, prediction: &str) -> Vec<u8> {
        format!("(5,10)(6,11)***{image}*{output}*{prediction}completed\n\r").into_bytes()
    }

    fn zeros() -> String {
        csv(core::iter::repeat(0).take(IMAGE_LEN))
    }

    #[test]
    fn missing_result_delimiter_is_framing_error() {
        let err = ResultRecord::decode(b"(5,10)(5,10)(6,11)completed").unwrap_err();
        assert_eq!(err, DecodeError::Framing(FramingError::MissingResultDelimiter));
    }

    #[test]
    fn label_eleven_is_unknown() {
        let record = ResultRecord::decode(&frame(&zeros(), "1,2,3", "11,0.9")).unwrap();
        assert_eq!(record.label, Prediction::Unknown);
        assert_eq!(format!("{}", record.label), "Unknown");
        assert_eq!(record.prediction, vec![11.0, 0.9]);
        assert_eq!(record.output, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn decodes_digit_and_flips_image() {
        let image = csv(0..IMAGE_LEN);
        let record = ResultRecord::decode(&frame(&image, "0,0,0,0,0,0,0,120,0,0", "7")).unwrap();
        assert_eq!(record.label, Prediction::Digit(7));
        // Row 0 on the wire is row 27 after the flip
        assert_eq!(record.image.get(27, 0), Some(0.0));
        assert_eq!(record.image.get(27, 27), Some(27.0));
        assert_eq!(record.image.get(0, 0), Some(756.0));
        assert_eq!(record.image.max(), 783.0);
    }

    #[test]
    fn short_image_is_shape_error() {
        let image = csv(core::iter::repeat(0).take(IMAGE_LEN - 1));
        let err = ResultRecord::decode(&frame(&image, "1", "3")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Shape(ShapeError { expected: 784, found: 783 })
        );
    }

    #[test]
    fn bad_token_names_field() {
        let err = ResultRecord::decode(&frame(&zeros(), "1,__import__,3", "3")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NumericParse(NumericParseError::new(Field::Output, "__import__"))
        );
    }

    #[test]
    fn non_finite_and_empty_tokens_rejected() {
        assert!(matches!(
            ResultRecord::decode(&frame(&zeros(), "inf", "3")),
            Err(DecodeError::NumericParse(_))
        ));
        assert!(matches!(
            ResultRecord::decode(&frame(&zeros(), "1,,2", "3")),
            Err(DecodeError::NumericParse(_))
        ));
    }

    #[test]
    fn fractional_label_rejected() {
        let err = ResultRecord::decode(&frame(&zeros(), "1", "2.5")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NumericParse(NumericParseError::new(Field::Prediction, "2.5"))
        );
    }

    #[test]
    fn too_few_fields_is_framing_error() {
        let data = format!("***{}*1,2completed", zeros());
        assert_eq!(
            ResultRecord::decode(data.as_bytes()).unwrap_err(),
            DecodeError::Framing(FramingError::MissingFields { expected: 3, found: 2 })
        );
    }

    #[test]
    fn payload_stops_at_second_delimiter() {
        let mut data = frame(&zeros(), "1", "4");
        data.extend_from_slice(b"***garbage");
        let record = ResultRecord::decode(&data).unwrap();
        assert_eq!(record.label, Prediction::Digit(4));
    }

    #[test]
    fn double_flip_is_identity() {
        let values: Vec<f32> = (0..IMAGE_LEN).map(|v| v as f32).collect();
        let image = Image::from_flat(&values).unwrap();
        assert_eq!(image.clone().flipped().flipped(), image);
        assert_ne!(image.clone().flipped(), image);
    }

    #[test]
    fn small_raster_reshape() {
        let r = Raster::<2>::from_flat(&[1.0, 2.0, 3.0, 4.0]).unwrap().flipped();
        assert_eq!(r.rows(), &[[3.0, 4.0], [1.0, 2.0]]);
        assert!(Raster::<2>::from_flat(&[1.0]).is_err());
    }
}

use core::fmt;

use alloc::string::String;

/// Which part of a frame a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Image,
    Output,
    Prediction,
    Label,
    Pixels,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Image => "image",
            Field::Output => "output",
            Field::Prediction => "prediction",
            Field::Label => "label",
            Field::Pixels => "pixels",
        };
        f.write_str(name)
    }
}

/// The delimiters of a frame don't line up with the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// Terminal sentinel seen but no `***` before the payload
    MissingResultDelimiter,
    MissingFields {
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::MissingResultDelimiter => {
                f.write_str("terminal sentinel without a result delimiter")
            }
            FramingError::MissingFields { expected, found } => {
                write!(f, "expected at least {expected} fields, found {found}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericParseError {
    pub field: Field,
    pub token: String,
}

impl NumericParseError {
    pub fn new(field: Field, token: &str) -> NumericParseError {
        NumericParseError {
            field,
            token: String::from(token),
        }
    }

    /// For tokens that aren't even UTF-8; invalid bytes show as U+FFFD.
    pub fn from_bytes(field: Field, token: &[u8]) -> NumericParseError {
        NumericParseError {
            field,
            token: String::from_utf8_lossy(token).into_owned(),
        }
    }
}

impl fmt::Display for NumericParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid numeral {:?} in {} field", self.token, self.field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeError {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image has {} values, expected {}", self.found, self.expected)
    }
}

/// Anything that can go wrong turning one frame or line into a record.
/// None of these are fatal: the frame is dropped and decoding carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Framing(FramingError),
    NumericParse(NumericParseError),
    Shape(ShapeError),
}

impl From<FramingError> for DecodeError {
    fn from(value: FramingError) -> Self {
        DecodeError::Framing(value)
    }
}

impl From<NumericParseError> for DecodeError {
    fn from(value: NumericParseError) -> Self {
        DecodeError::NumericParse(value)
    }
}

impl From<ShapeError> for DecodeError {
    fn from(value: ShapeError) -> Self {
        DecodeError::Shape(value)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Framing(e) => write!(f, "framing error: {e}"),
            DecodeError::NumericParse(e) => write!(f, "numeric parse error: {e}"),
            DecodeError::Shape(e) => write!(f, "shape error: {e}"),
        }
    }
}

impl core::error::Error for FramingError {}
impl core::error::Error for NumericParseError {}
impl core::error::Error for ShapeError {}
impl core::error::Error for DecodeError {}

/// Error from one tick of a live session. `Transport` carries the
/// transport's own error and ends the session.
#[derive(Debug)]
pub enum SessionError<ReadError> {
    Transport(ReadError),
    Decode(DecodeError),
}

impl<Er> From<DecodeError> for SessionError<Er> {
    fn from(value: DecodeError) -> Self {
        SessionError::Decode(value)
    }
}

impl<Er: fmt::Display> fmt::Display for SessionError<Er> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(e) => write!(f, "transport error: {e}"),
            SessionError::Decode(e) => write!(f, "{e}"),
        }
    }
}

impl<Er: fmt::Debug + fmt::Display> core::error::Error for SessionError<Er> {}

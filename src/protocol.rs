//! Wire constants shared with the device firmware. Changing any of these
//! means reflashing the board.

/// Present anywhere in the buffer once the device has finished a recognition.
pub const TERMINAL_SENTINEL: &[u8] = b"completed";
/// Separates the streamed coordinates from the result payload.
pub const RESULT_DELIMITER: &[u8] = b"***";
/// Separates fields inside a result payload or a dataset line.
pub const FIELD_DELIMITER: u8 = b'*';
pub const VALUE_DELIMITER: u8 = b',';
/// Sent as a whole line to end a dataset collection run.
pub const END_OF_SESSION: &str = "###";

/// The sensor reports x mirrored relative to the display axes.
pub const X_MIRROR: i64 = 111;

pub const IMAGE_DIM: usize = 28;
pub const IMAGE_LEN: usize = IMAGE_DIM * IMAGE_DIM;

/// Prediction value meaning "no confident prediction".
pub const UNKNOWN_LABEL: i64 = 11;

/// Samples collected per operator-facing label.
pub const BATCH_SIZE: usize = 30;

pub const DEFAULT_BAUD: u32 = 115_200;

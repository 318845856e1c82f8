use alloc::string::{String, ToString};
use embedded_io::Write;

use crate::coordinates::CoordinateStream;
use crate::result::ResultRecord;

/// Whatever shows the decoded data to the operator.
pub trait Presenter {
    fn show_coordinates(&mut self, stream: &CoordinateStream);

    fn show_result(&mut self, record: &ResultRecord);

    fn show_progress(&mut self, text: &str);
}

/// Durable table the collected samples go to.
pub trait SampleSink {
    type Error;

    /// Must be safe to call any number of times.
    fn ensure_header(&mut self, columns: &[String]) -> Result<(), Self::Error>;

    fn append_record(&mut self, label: i64, fields: &[String]) -> Result<(), Self::Error>;
}

/// CSV rows over any byte writer. Quoting follows Python's csv module
/// defaults so existing dataset files stay compatible.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Sink over an empty destination; the header goes out on the first
    /// `ensure_header`.
    pub fn new(writer: W) -> CsvSink<W> {
        CsvSink {
            writer,
            header_written: false,
        }
    }

    /// Sink appending to a table that already has its header.
    pub fn resume(writer: W) -> CsvSink<W> {
        CsvSink {
            writer,
            header_written: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// The whole row goes out in one `write_all`, so a failed write can't
    /// leave a half row for the next append to glue onto.
    fn write_row<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) -> Result<(), W::Error> {
        let mut row = String::new();
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                row.push(',');
            }
            push_field(&mut row, field);
        }
        row.push_str("\r\n");
        self.writer.write_all(row.as_bytes())?;
        self.writer.flush()
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\r', '\n'])
}

fn push_field(row: &mut String, field: &str) {
    if !needs_quotes(field) {
        row.push_str(field);
        return;
    }
    row.push('"');
    row.push_str(&field.replace('"', "\"\""));
    row.push('"');
}

impl<W: Write> SampleSink for CsvSink<W> {
    type Error = W::Error;

    fn ensure_header(&mut self, columns: &[String]) -> Result<(), Self::Error> {
        if self.header_written {
            return Ok(());
        }
        self.write_row(columns.iter().map(String::as_str))?;
        self.header_written = true;
        Ok(())
    }

    fn append_record(&mut self, label: i64, fields: &[String]) -> Result<(), Self::Error> {
        let label = label.to_string();
        let row = core::iter::once(label.as_str()).chain(fields.iter().map(String::as_str));
        self.write_row(row)
    }
}

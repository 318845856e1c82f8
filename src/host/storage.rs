use std::fs::{File, OpenOptions};
use std::io::{self, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use digit_telemetry::CsvSink;

#[derive(Debug)]
pub struct IoShim(pub io::Error);

impl embedded_io::Error for IoShim {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl std::fmt::Display for IoShim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only file behind the `embedded_io::Write` the sink expects.
#[derive(Debug)]
pub struct FileWriter(File);

impl embedded_io::ErrorType for FileWriter {
    type Error = IoShim;
}

impl embedded_io::Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf).map_err(IoShim)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush().map_err(IoShim)
    }
}

/// Opens the dataset for appending. A missing or empty file gets a fresh
/// header; anything else is assumed to have one already.
pub fn open_dataset(path: &Path) -> Result<CsvSink<FileWriter>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    let has_content = file.metadata()?.len() > 0;
    let writer = FileWriter(file);
    Ok(if has_content {
        log::info!("appending to {}", path.display());
        CsvSink::resume(writer)
    } else {
        log::info!("creating {}", path.display());
        CsvSink::new(writer)
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use digit_telemetry::SampleSink;

    use super::*;

    fn columns() -> Vec<String> {
        vec!["label".to_string(), "pixel_0".to_string()]
    }

    fn append(path: &Path, label: i64, pixel: &str) {
        let mut sink = open_dataset(path).unwrap();
        sink.ensure_header(&columns()).unwrap();
        sink.append_record(label, &[pixel.to_string()]).unwrap();
    }

    #[test]
    fn missing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dataset.csv");
        append(&path, 3, "17");
        assert_eq!(fs::read_to_string(&path).unwrap(), "label,pixel_0\r\n3,17\r\n");
    }

    #[test]
    fn empty_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");
        File::create(&path).unwrap();
        append(&path, 0, "255");
        assert_eq!(fs::read_to_string(&path).unwrap(), "label,pixel_0\r\n0,255\r\n");
    }

    #[test]
    fn existing_table_is_appended_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");
        fs::write(&path, "label,pixel_0\r\n1,2\r\n").unwrap();
        append(&path, 5, "6");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "label,pixel_0\r\n1,2\r\n5,6\r\n"
        );
    }

    #[test]
    fn reopening_keeps_a_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");
        append(&path, 1, "10");
        append(&path, 2, "20");
        let written = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = written.split("\r\n").filter(|r| !r.is_empty()).collect();
        assert_eq!(rows, ["label,pixel_0", "1,10", "2,20"]);
        assert_eq!(rows.iter().filter(|r| r.starts_with("label")).count(), 1);
    }
}

use std::{cell::RefCell, fs::File, io::Write, path::Path};

use crate::{csv::Row, error::ImportError};

/// Incremental CSV encoder.
///
/// Writes the header line first, then appends one line per row, so a
/// partially written output file is still inspectable after a failure
/// mid-run. Header names are joined bare; every row value is wrapped in
/// double quotes verbatim. A value containing a literal `"` is emitted
/// unescaped, the historical output shape of this tool, kept for byte
/// compatibility with existing consumers (decode un-escapes `""`, encode
/// never re-escapes; the round trip is asymmetric on purpose).
pub struct CsvWriter<W: Write> {
    wrapper: RefCell<W>,
}

impl CsvWriter<File> {
    /// Creates (or truncates) the file at `path` and wraps it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let file = File::create(path).map_err(|error| ImportError::CsvWrite(error.to_string()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wraps any `Write` sink; handy for asserting output in tests.
    pub fn from_writer(wtr: W) -> Self {
        Self {
            wrapper: RefCell::new(wtr),
        }
    }

    /// Writes the header line: names joined by `,`, not quoted.
    pub fn write_header(&self, headers: &[String]) -> Result<(), ImportError> {
        let line = format!("{}\n", headers.join(","));
        self.write_line(&line)
    }

    /// Appends one data line: every value quote-wrapped, joined by `,`.
    pub fn write_row(&self, row: &Row) -> Result<(), ImportError> {
        let quoted: Vec<String> = row
            .values()
            .iter()
            .map(|value| format!("\"{value}\""))
            .collect();
        let line = format!("{}\n", quoted.join(","));
        self.write_line(&line)
    }

    pub fn flush(&self) -> Result<(), ImportError> {
        let result = self.wrapper.borrow_mut().flush();
        match result {
            Ok(()) => Ok(()),
            Err(error) => Err(ImportError::CsvWrite(error.to_string())),
        }
    }

    pub fn into_inner(self) -> W {
        self.wrapper.into_inner()
    }

    fn write_line(&self, line: &str) -> Result<(), ImportError> {
        let result = self.wrapper.borrow_mut().write_all(line.as_bytes());
        match result {
            Ok(()) => Ok(()),
            Err(error) => Err(ImportError::CsvWrite(error.to_string())),
        }
    }
}

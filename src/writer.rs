use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::OutputFormat;
use crate::error::MetaError;

/// Append-only sink for assembled rows. The pipeline only ever sees this
/// trait; tests capture rows in memory.
pub trait RowSink {
    fn write_row(&mut self, fields: &[String]) -> Result<(), MetaError>;
}

pub struct DelimitedWriter<W: Write> {
    writer: W,
    delimiter: char,
}

impl DelimitedWriter<BufWriter<File>> {
    pub fn create(path: &Path, format: OutputFormat) -> Result<Self, MetaError> {
        let file = File::create(path).map_err(|err| MetaError::OutputIo(err.to_string()))?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            delimiter: format.delimiter(),
        }
    }

    pub fn finish(mut self) -> Result<(), MetaError> {
        self.writer
            .flush()
            .map_err(|err| MetaError::OutputIo(err.to_string()))
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for DelimitedWriter<W> {
    fn write_row(&mut self, fields: &[String]) -> Result<(), MetaError> {
        let mut line = String::new();
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                line.push(self.delimiter);
            }
            line.push_str(field);
        }
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .map_err(|err| MetaError::OutputIo(err.to_string()))
    }
}

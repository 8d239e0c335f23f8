//! Row-oriented export of the whole index

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export sink error: {0}")]
    Sink(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// One exported `(monster, item, probability, grouped)` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub monster: String,
    pub item: String,
    pub probability: f64,
    pub grouped: bool,
}

/// Destination for exported rows. Formatting is up to the sink.
pub trait ExportSink {
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError>;
}

impl ExportSink for Vec<ExportRow> {
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.push(row.clone());
        Ok(())
    }
}

impl<S: ExportSink + ?Sized> ExportSink for &mut S {
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        (**self).write_row(row)
    }
}

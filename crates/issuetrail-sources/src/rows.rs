//! Streaming CSV row source

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecordsIntoIter};
use issuetrail_core::InputRow;
use tracing::warn;

use crate::{Result, SourceError};

/// Reads one column of a CSV file, one row at a time.
///
/// The first line is the header. Rows that are too short or fail to parse
/// still produce an `InputRow`, with no value, so row positions are preserved.
pub struct RowSource<R = File> {
    records: StringRecordsIntoIter<R>,
    column: usize,
    next_index: usize,
}

impl RowSource<File> {
    pub fn open(path: impl AsRef<Path>, column: &str) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, column)
    }
}

impl<R: Read> RowSource<R> {
    pub fn from_reader(reader: R, column: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

        let column_index = reader
            .headers()?
            .iter()
            .position(|header| header.trim() == column)
            .ok_or_else(|| SourceError::MissingColumn(column.to_string()))?;

        Ok(Self {
            records: reader.into_records(),
            column: column_index,
            next_index: 0,
        })
    }
}

impl<R: Read> Iterator for RowSource<R> {
    type Item = InputRow;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let index = self.next_index;
        self.next_index += 1;

        let source = match record {
            Ok(record) => record.get(self.column).map(str::to_string),
            Err(e) => {
                warn!(row = index, error = %e, "Unreadable input row, treating it as empty");
                None
            }
        };

        Some(InputRow::new(index, source))
    }
}

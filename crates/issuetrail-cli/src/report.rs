//! CSV report output

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use issuetrail_core::{OutputRecord, ReportShape};

/// Write the header row for `shape`, then one row per record
pub fn write_report(path: &Path, shape: ReportShape, records: &[OutputRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    write_records(file, shape, records)
}

pub fn write_records<W: Write>(
    writer: W,
    shape: ReportShape,
    records: &[OutputRecord],
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(shape.headers())?;
    for record in records {
        if record.shape() != shape {
            anyhow::bail!("cannot write a {} record into a {} report", record.shape(), shape);
        }
        writer.write_record(record.cells())?;
    }

    writer.flush()?;
    Ok(())
}

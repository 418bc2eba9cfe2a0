//! Output formatting - one line per record

use crate::aggregate::Record;
use std::io::Write;
use tracing::error;

/// `"{count:4} {status} {dir}"` when metadata was collected, else just `{dir}`
#[must_use]
pub fn format_record(record: &Record) -> String {
    if record.has_metadata {
        format!(
            "{:4} {} {}",
            record.commit_count,
            record.status,
            record.dir.display()
        )
    } else {
        record.dir.display().to_string()
    }
}

/// Write records newline-terminated. A failed write is logged and the next record is tried.
pub fn render<W: Write>(records: &[Record], out: &mut W) {
    for record in records {
        if let Err(e) = writeln!(out, "{}", format_record(record)) {
            error!(dir = %record.dir.display(), error = %e, "failed to write record");
        }
    }
    if let Err(e) = out.flush() {
        error!(error = %e, "failed to flush output");
    }
}

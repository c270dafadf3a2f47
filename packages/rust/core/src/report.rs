//! Capture report text format.
//!
//! The report is append-only: a header, one block per manifest entry, then a
//! summary. Every writer here emits a complete block so the runner can stream
//! records one at a time without holding earlier content.

use std::io::{self, Write};

use doccapture_shared::{CaptureRecord, RecordBody};

/// Width of the `=` and `-` rule lines.
pub const RULE_WIDTH: usize = 80;

/// `chrono` format of the `Generated:` line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker written when a path is missing or not a regular file.
pub const NOT_FOUND_MARKER: &str = "FILE NOT FOUND OR NOT ACCESSIBLE";

/// Prefix of the marker written when reading a file failed.
pub const READ_ERROR_PREFIX: &str = "ERROR READING FILE: ";

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Write the report header: title, generation time, and requested count.
pub fn write_header<W: Write>(
    out: &mut W,
    title: &str,
    generated_at: &str,
    total: usize,
) -> io::Result<()> {
    let rule = heavy_rule();
    writeln!(out, "{rule}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "Generated: {generated_at}")?;
    writeln!(out, "Total files to capture: {total}")?;
    writeln!(out, "{rule}")?;
    writeln!(out)
}

/// Write one entry block: the identifying header followed by either the
/// verbatim contents or a miss marker.
pub fn write_record<W: Write>(out: &mut W, record: &CaptureRecord) -> io::Result<()> {
    let rule = heavy_rule();
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "FILE NAME: {}", record.file_name)?;
    writeln!(out, "FILE PATH: {}", record.absolute_path.display())?;
    writeln!(out, "RELATIVE PATH: {}", record.relative_path)?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;

    match &record.body {
        RecordBody::Contents(content) => {
            let rule = light_rule();
            writeln!(out, "CONTENTS:")?;
            writeln!(out, "{rule}")?;
            // Contents are written byte-for-byte; the closing rule always
            // starts on a fresh line even if the file ends with one.
            out.write_all(content.as_bytes())?;
            writeln!(out)?;
            writeln!(out, "{rule}")?;
        }
        RecordBody::NotFound => writeln!(out, "{NOT_FOUND_MARKER}")?,
        RecordBody::ReadError(message) => writeln!(out, "{READ_ERROR_PREFIX}{message}")?,
    }

    writeln!(out)
}

/// Write the trailing summary block.
pub fn write_summary<W: Write>(
    out: &mut W,
    requested: usize,
    captured: usize,
    missing: usize,
) -> io::Result<()> {
    let rule = heavy_rule();
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Total files requested: {requested}")?;
    writeln!(out, "Successfully captured: {captured}")?;
    writeln!(out, "Missing or errors: {missing}")?;
    writeln!(out, "{rule}")
}

//! Machine-readable run summary (`--summary-json`).

use std::path::Path;

use tracing::debug;

use doccapture_shared::{CaptureError, CaptureSummary, Result};

/// Write `summary` as pretty-printed JSON.
///
/// The file is written to a sibling temp file first and renamed into place,
/// so readers never observe a partial summary.
pub fn write_summary_json(path: &Path, summary: &CaptureSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| CaptureError::Serialization(format!("summary JSON: {e}")))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CaptureError::validation(format!("summary path has no file name: {}", path.display()))
        })?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| CaptureError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(CaptureError::io(path, e));
    }

    debug!(path = %path.display(), "wrote summary JSON");
    Ok(())
}

//! Capture runner: manifest → report file.
//!
//! Entries are processed strictly in manifest order. Each source file is read
//! in full and dropped before the next one is touched; only a content-free
//! [`EntrySummary`] survives the iteration.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use doccapture_shared::{
    CaptureError, CaptureRecord, CaptureSummary, EntrySummary, RecordBody, Result,
};

use crate::report::{self, TIMESTAMP_FORMAT};

/// Everything a single capture run needs.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Title written in the report header.
    pub title: String,
    /// Directory manifest entries are joined onto. Need not exist.
    pub base_dir: PathBuf,
    /// Relative paths, in report order.
    pub files: Vec<String>,
    /// Report destination. Created or truncated.
    pub output_path: PathBuf,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter {
    /// Called once before the first entry.
    fn started(&self, title: &str, total: usize);
    /// Called after each entry has been written to the report.
    fn entry_done(&self, record: &CaptureRecord, current: usize, total: usize);
    /// Called once the report has been flushed.
    fn done(&self, summary: &CaptureSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _title: &str, _total: usize) {}
    fn entry_done(&self, _record: &CaptureRecord, _current: usize, _total: usize) {}
    fn done(&self, _summary: &CaptureSummary) {}
}

/// Run a capture and write the report to `config.output_path`.
///
/// Missing or unreadable entries are recorded and counted; only failures on
/// the output itself abort the run.
#[instrument(skip_all, fields(title = %config.title, files = config.files.len()))]
pub fn run(config: &CaptureConfig, progress: &dyn ProgressReporter) -> Result<CaptureSummary> {
    let start = Instant::now();
    let generated_at = Local::now().format(TIMESTAMP_FORMAT).to_string();

    info!(
        base_dir = %config.base_dir.display(),
        output = %config.output_path.display(),
        "starting capture"
    );

    let file = File::create(&config.output_path)
        .map_err(|e| CaptureError::io(&config.output_path, e))?;
    let mut out = BufWriter::new(file);

    let summary = capture_to_writer(&mut out, config, &generated_at, progress)?;
    out.flush().map_err(|e| CaptureError::io(&config.output_path, e))?;
    drop(out);

    info!(
        captured = summary.captured,
        missing = summary.missing,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "capture complete"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Render the full report for `config` into `out`.
///
/// `generated_at` is written verbatim into the header, which makes output
/// fully deterministic for a fixed filesystem state.
pub fn capture_to_writer<W: Write>(
    out: &mut W,
    config: &CaptureConfig,
    generated_at: &str,
    progress: &dyn ProgressReporter,
) -> Result<CaptureSummary> {
    let output_err = |e: std::io::Error| CaptureError::io(&config.output_path, e);
    let total = config.files.len();

    progress.started(&config.title, total);
    report::write_header(out, &config.title, generated_at, total).map_err(output_err)?;

    let mut captured = 0;
    let mut missing = 0;
    let mut entries = Vec::with_capacity(total);

    for (idx, relative) in config.files.iter().enumerate() {
        let record = read_entry(&config.base_dir, relative);
        report::write_record(out, &record).map_err(output_err)?;

        if record.status().is_miss() {
            missing += 1;
        } else {
            captured += 1;
        }

        match &record.body {
            RecordBody::Contents(content) => {
                debug!(path = %relative, bytes = content.len(), "captured");
            }
            RecordBody::NotFound => debug!(path = %relative, "file not found"),
            RecordBody::ReadError(message) => {
                warn!(path = %relative, error = %message, "error reading file");
            }
        }

        progress.entry_done(&record, idx + 1, total);
        entries.push(summarize(&record));
    }

    report::write_summary(out, total, captured, missing).map_err(output_err)?;

    Ok(CaptureSummary {
        title: config.title.clone(),
        generated_at: generated_at.to_string(),
        base_dir: config.base_dir.clone(),
        output_path: config.output_path.clone(),
        requested: total,
        captured,
        missing,
        entries,
    })
}

/// Resolve and read a single manifest entry.
pub fn read_entry(base_dir: &Path, relative: &str) -> CaptureRecord {
    let absolute_path = base_dir.join(relative);
    let file_name = absolute_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // `is_file` is false for missing paths, directories, and paths whose
    // metadata cannot be read; all of those are "not found".
    let body = if absolute_path.is_file() {
        match std::fs::read_to_string(&absolute_path) {
            Ok(content) => RecordBody::Contents(content),
            Err(e) => RecordBody::ReadError(e.to_string()),
        }
    } else {
        RecordBody::NotFound
    };

    CaptureRecord {
        relative_path: relative.to_string(),
        absolute_path,
        file_name,
        body,
    }
}

fn summarize(record: &CaptureRecord) -> EntrySummary {
    let (size_bytes, sha256, error) = match &record.body {
        RecordBody::Contents(content) => {
            let mut hasher = Sha256::new();
            hasher.update(content.as_bytes());
            (Some(content.len()), Some(format!("{:x}", hasher.finalize())), None)
        }
        RecordBody::NotFound => (None, None, None),
        RecordBody::ReadError(message) => (None, None, Some(message.clone())),
    };

    EntrySummary {
        relative_path: record.relative_path.clone(),
        absolute_path: record.absolute_path.clone(),
        status: record.status(),
        size_bytes,
        sha256,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doccapture_shared::CaptureStatus;
    use std::cell::RefCell;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dc-runner-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_config(base_dir: &Path, files: &[&str]) -> CaptureConfig {
        CaptureConfig {
            title: "FILE CAPTURE REPORT".into(),
            base_dir: base_dir.to_path_buf(),
            files: files.iter().map(|f| f.to_string()).collect(),
            output_path: base_dir.join("captured_files_output.txt"),
        }
    }

    fn render(config: &CaptureConfig) -> (String, CaptureSummary) {
        let mut buf = Vec::new();
        let summary =
            capture_to_writer(&mut buf, config, "2025-01-01 12:00:00", &SilentProgress).unwrap();
        (String::from_utf8(buf).unwrap(), summary)
    }

    /// Records every callback so ordering can be asserted.
    #[derive(Default)]
    struct RecordingProgress {
        events: RefCell<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn started(&self, title: &str, total: usize) {
            self.events.borrow_mut().push(format!("start {title} {total}"));
        }
        fn entry_done(&self, record: &CaptureRecord, current: usize, total: usize) {
            self.events.borrow_mut().push(format!(
                "{current}/{total} {} {}",
                record.relative_path,
                record.status()
            ));
        }
        fn done(&self, summary: &CaptureSummary) {
            self.events
                .borrow_mut()
                .push(format!("done {}/{}", summary.captured, summary.requested));
        }
    }

    #[test]
    fn mixed_manifest_produces_exact_report() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "hello").unwrap();
        let config = make_config(&tmp, &["a.md", "missing.md"]);

        let (text, summary) = render(&config);

        let heavy = "=".repeat(80);
        let light = "-".repeat(80);
        let expected = format!(
            "{heavy}\nFILE CAPTURE REPORT\nGenerated: 2025-01-01 12:00:00\nTotal files to capture: 2\n{heavy}\n\n\
             \n{heavy}\nFILE NAME: a.md\nFILE PATH: {a}\nRELATIVE PATH: a.md\n{heavy}\n\n\
             CONTENTS:\n{light}\nhello\n{light}\n\n\
             \n{heavy}\nFILE NAME: missing.md\nFILE PATH: {m}\nRELATIVE PATH: missing.md\n{heavy}\n\n\
             FILE NOT FOUND OR NOT ACCESSIBLE\n\n\
             \n{heavy}\nSUMMARY\n{heavy}\nTotal files requested: 2\nSuccessfully captured: 1\nMissing or errors: 1\n{heavy}\n",
            a = tmp.join("a.md").display(),
            m = tmp.join("missing.md").display(),
        );
        assert_eq!(text, expected);

        assert_eq!(summary.requested, 2);
        assert_eq!(summary.captured, 1);
        assert_eq!(summary.missing, 1);
        assert!(!summary.is_complete());
        assert_eq!(summary.entries[0].status, CaptureStatus::Captured);
        assert_eq!(summary.entries[1].status, CaptureStatus::NotFound);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn all_present_captures_in_manifest_order() {
        let tmp = temp_dir();
        std::fs::create_dir_all(tmp.join("docs/specs")).unwrap();
        std::fs::write(tmp.join("docs/specs/one.md"), "first body\n").unwrap();
        std::fs::write(tmp.join("docs/two.md"), "second body\n").unwrap();
        std::fs::write(tmp.join("three.js"), "third body\n").unwrap();
        let config = make_config(&tmp, &["three.js", "docs/specs/one.md", "docs/two.md"]);

        let (text, summary) = render(&config);

        assert_eq!(summary.captured, 3);
        assert_eq!(summary.missing, 0);
        assert!(summary.is_complete());
        assert_eq!(text.matches("CONTENTS:").count(), 3);

        let third = text.find("third body").unwrap();
        let first = text.find("first body").unwrap();
        let second = text.find("second body").unwrap();
        assert!(third < first && first < second);
        assert!(text.contains("FILE NAME: one.md\n"));
        assert!(text.contains("RELATIVE PATH: docs/specs/one.md\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_manifest_reports_zero_counts() {
        let tmp = temp_dir();
        let config = make_config(&tmp, &[]);

        let (text, summary) = render(&config);

        assert_eq!(summary.requested, 0);
        assert_eq!(summary.captured, 0);
        assert_eq!(summary.missing, 0);
        assert!(summary.is_complete());
        assert!(text.contains("Total files to capture: 0\n"));
        assert!(text.contains("Total files requested: 0\n"));
        assert!(!text.contains("FILE NAME:"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn tally_matches_entry_statuses() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "hello").unwrap();
        std::fs::write(tmp.join("bad.bin"), [0xff, 0xfe]).unwrap();
        std::fs::create_dir_all(tmp.join("dir")).unwrap();
        let config = make_config(&tmp, &["a.md", "bad.bin", "dir", "gone.md", "a.md"]);

        let (text, summary) = render(&config);

        let misses = summary.entries.iter().filter(|e| e.status.is_miss()).count();
        assert_eq!(summary.missing, misses);
        assert_eq!(summary.missing, 3);
        assert_eq!(summary.captured, 2);
        assert_eq!(summary.captured + summary.missing, summary.requested);
        assert!(text.contains("Successfully captured: 2\nMissing or errors: 3\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn duplicates_are_processed_independently() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "dup").unwrap();
        let config = make_config(&tmp, &["a.md", "a.md"]);

        let (text, summary) = render(&config);

        assert_eq!(summary.captured, 2);
        assert_eq!(text.matches("RELATIVE PATH: a.md\n").count(), 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn directory_entry_is_not_found() {
        let tmp = temp_dir();
        std::fs::create_dir_all(tmp.join("docs")).unwrap();
        let config = make_config(&tmp, &["docs"]);

        let (text, summary) = render(&config);

        assert_eq!(summary.missing, 1);
        assert!(text.contains("FILE NOT FOUND OR NOT ACCESSIBLE"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_base_dir_is_not_fatal() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp.join("does-not-exist"), &["a.md", "b.md"]);
        config.output_path = tmp.join("out.txt");

        let summary = run(&config, &SilentProgress).unwrap();

        assert_eq!(summary.captured, 0);
        assert_eq!(summary.missing, 2);
        assert!(tmp.join("out.txt").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn invalid_utf8_is_a_read_error_and_iteration_continues() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("binary.bin"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        std::fs::write(tmp.join("after.md"), "still captured").unwrap();
        let config = make_config(&tmp, &["binary.bin", "after.md"]);

        let (text, summary) = render(&config);

        assert_eq!(summary.entries[0].status, CaptureStatus::ReadError);
        assert!(summary.entries[0].error.is_some());
        assert!(text.contains("ERROR READING FILE: "));
        assert_eq!(summary.entries[1].status, CaptureStatus::Captured);
        assert!(text.contains("still captured"));
        assert_eq!(summary.captured + summary.missing, 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(unix)]
    #[test]
    fn permission_denied_is_a_read_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = temp_dir();
        let locked = tmp.join("locked.md");
        std::fs::write(&locked, "secret").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        std::fs::write(tmp.join("open.md"), "public").unwrap();

        // Privileged users can read mode 000 files; nothing to assert then.
        if std::fs::read_to_string(&locked).is_ok() {
            eprintln!(
                "skipping permission_denied_is_a_read_error: mode 000 file is readable \
                 (running with elevated privileges)"
            );
            let _ = std::fs::remove_dir_all(&tmp);
            return;
        }

        let config = make_config(&tmp, &["locked.md", "open.md"]);
        let (text, summary) = render(&config);

        assert_eq!(summary.entries[0].status, CaptureStatus::ReadError);
        assert!(text.contains("ERROR READING FILE: "));
        assert_eq!(summary.captured, 1);
        assert_eq!(summary.missing, 1);

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn reruns_differ_only_in_generated_line() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "stable\n").unwrap();
        let config = make_config(&tmp, &["a.md", "gone.md"]);

        run(&config, &SilentProgress).unwrap();
        let first = std::fs::read_to_string(&config.output_path).unwrap();
        run(&config, &SilentProgress).unwrap();
        let second = std::fs::read_to_string(&config.output_path).unwrap();

        let strip = |s: &str| {
            s.lines()
                .filter(|l| !l.starts_with("Generated: "))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(first.lines().count(), second.lines().count());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn run_writes_report_file() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "hello").unwrap();
        let config = make_config(&tmp, &["a.md"]);

        let summary = run(&config, &SilentProgress).unwrap();

        let text = std::fs::read_to_string(&config.output_path).unwrap();
        assert!(text.starts_with(&"=".repeat(80)));
        assert!(text.contains("\nGenerated: "));
        assert!(text.ends_with(&format!("Missing or errors: 0\n{}\n", "=".repeat(80))));
        assert_eq!(summary.output_path, config.output_path);
        assert_eq!(summary.generated_at.len(), "2025-01-01 12:00:00".len());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let tmp = temp_dir();
        let mut config = make_config(&tmp, &["a.md"]);
        config.output_path = tmp.join("no-such-dir").join("out.txt");

        let err = run(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
        assert!(err.to_string().contains("no-such-dir"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn progress_sees_every_entry_in_order() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "hello").unwrap();
        let config = make_config(&tmp, &["a.md", "missing.md"]);
        let progress = RecordingProgress::default();

        run(&config, &progress).unwrap();

        assert_eq!(
            *progress.events.borrow(),
            vec![
                "start FILE CAPTURE REPORT 2".to_string(),
                "1/2 a.md captured".to_string(),
                "2/2 missing.md not_found".to_string(),
                "done 1/2".to_string(),
            ]
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn summary_entries_carry_hash_and_size() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("a.md"), "hello").unwrap();
        let config = make_config(&tmp, &["a.md", "missing.md"]);

        let (_, summary) = render(&config);

        let entry = &summary.entries[0];
        assert_eq!(entry.size_bytes, Some(5));
        assert_eq!(
            entry.sha256.as_deref(),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }
}

//! Shared types, error model, and configuration for doccapture.
//!
//! This crate is the foundation depended on by the other doccapture crates.
//! It provides:
//! - [`CaptureError`] — the unified error type
//! - Domain types ([`CaptureRecord`], [`CaptureStatus`], [`CaptureSummary`])
//! - Configuration ([`AppConfig`], [`ManifestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ManifestConfig, config_dir, config_file_path, expand_home,
    init_config, load_config, load_config_from, write_config,
};
pub use error::{CaptureError, Result};
pub use types::{CaptureRecord, CaptureStatus, CaptureSummary, EntrySummary, RecordBody};

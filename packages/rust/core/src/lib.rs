//! Capture runner and report format for doccapture.
//!
//! This crate turns a manifest of relative paths into a single text report
//! (`runner::run`) and resolves named manifests from config and built-ins.

pub mod manifests;
pub mod report;
pub mod runner;
pub mod summary;

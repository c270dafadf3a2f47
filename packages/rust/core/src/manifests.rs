//! Named manifests and their resolution into a [`CaptureConfig`].
//!
//! Two manifests ship built in (`specs` and `tasks`). A user config can add
//! more or shadow a built-in by reusing its name.

use std::path::{Path, PathBuf};

use tracing::debug;

use doccapture_shared::{
    AppConfig, CaptureError, DefaultsConfig, ManifestConfig, Result, expand_home,
};

use crate::runner::CaptureConfig;

/// Title used when none is given (ad-hoc runs).
pub const DEFAULT_TITLE: &str = "FILE CAPTURE REPORT";

/// Report file name used when none is given (ad-hoc runs).
pub const DEFAULT_OUTPUT: &str = "captured_files_output.txt";

const SPECS_FILES: &[&str] = &[
    "docs/specs/01-functional-specs/_index.md",
    "docs/specs/01-functional-specs/02-daa-initialization.md",
    "docs/specs/01-functional-specs/03-agent-lifecycle.md",
    "docs/specs/01-functional-specs/04-knowledge-sharing.md",
    "docs/specs/01-functional-specs/05-pattern-management.md",
    "docs/specs/01-functional-specs/06-meta-learning.md",
    "docs/specs/01-functional-specs/07-monitoring-health.md",
    "docs/specs/02-technical-specs/_index.md",
    "docs/specs/02-technical-specs/01-system-architecture.md",
    "docs/specs/02-technical-specs/02-api-design.md",
    "docs/specs/02-technical-specs/03-database-schema.md",
    "docs/specs/02-technical-specs/04-security-auth.md",
    "docs/specs/02-technical-specs/05-deployment-infrastructure.md",
    "docs/specs/02-technical-specs/06-integration-patterns.md",
    "docs/specs/04-context-templates/activeContext.md",
    "docs/specs/04-context-templates/decisionLog.md",
    "docs/specs/04-context-templates/progressTracking.md",
    "docs/specs/04-context-templates/sessionRestoration.md",
    "docs/specs/00-project-constitution.md",
    "docs/specs/03-task-specs.md",
    "docs/specs/VERIFICATION-REPORT.md",
    "docs2/neuralenhancement/NEURAL-ENHANCEMENT-FIXES-SUMMARY.md",
    "docs2/neuralenhancement/neural-enhancement-immediate.md",
    "docs2/neuralenhancement/neural-enhancement-short-term.md",
    "docs2/neuralenhancement/neural-pattern-expiry-checker.js",
];

const TASKS_FILES: &[&str] = &[
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-001.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-002.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-003.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-004.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-005.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-006.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-007.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-008.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-009.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-010.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-011.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-012.md",
    "docs2/neuralenhancement/specs/tasks/TASK-NEURAL-013.md",
    "docs2/neuralenhancement/specs/implementation-roadmap.md",
];

/// The manifests available without any config file.
pub fn builtin_manifests() -> Vec<ManifestConfig> {
    vec![
        ManifestConfig {
            name: "specs".into(),
            title: DEFAULT_TITLE.into(),
            output: DEFAULT_OUTPUT.into(),
            base_dir: None,
            files: SPECS_FILES.iter().map(|f| (*f).to_string()).collect(),
        },
        ManifestConfig {
            name: "tasks".into(),
            title: "NEURAL ENHANCEMENT TASK FILES CAPTURE REPORT".into(),
            output: "task_files_output.txt".into(),
            base_dir: None,
            files: TASKS_FILES.iter().map(|f| (*f).to_string()).collect(),
        },
    ]
}

/// All manifests visible under `config`: built-ins first (replaced in place
/// when the config shadows them), then config-only manifests in file order.
pub fn available_manifests(config: &AppConfig) -> Vec<ManifestConfig> {
    let mut manifests: Vec<ManifestConfig> = builtin_manifests()
        .into_iter()
        .map(|builtin| config.find_manifest(&builtin.name).cloned().unwrap_or(builtin))
        .collect();

    for manifest in &config.manifests {
        if !manifests.iter().any(|m| m.name == manifest.name) {
            manifests.push(manifest.clone());
        }
    }

    manifests
}

/// Look up a manifest by name, preferring the config over built-ins.
pub fn find_manifest(config: &AppConfig, name: &str) -> Result<ManifestConfig> {
    if let Some(manifest) = config.find_manifest(name) {
        debug!(name, "using manifest from config");
        return Ok(manifest.clone());
    }

    builtin_manifests()
        .into_iter()
        .find(|m| m.name == name)
        .ok_or_else(|| CaptureError::UnknownManifest(name.to_string()))
}

/// Build an unnamed manifest from paths given on the command line.
pub fn adhoc_manifest(files: Vec<String>) -> ManifestConfig {
    ManifestConfig {
        name: "adhoc".into(),
        title: DEFAULT_TITLE.into(),
        output: DEFAULT_OUTPUT.into(),
        base_dir: None,
        files,
    }
}

/// Read relative paths from a manifest file, one per line.
///
/// Blank lines and lines starting with `#` are skipped; surrounding
/// whitespace is trimmed. Order and duplicates are kept.
pub fn read_manifest_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| CaptureError::io(path, e))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// Per-invocation overrides, typically from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CaptureOverrides {
    /// Replaces every configured base directory.
    pub base_dir: Option<PathBuf>,
    /// Report destination, used as given (not joined onto the base dir).
    pub output: Option<PathBuf>,
    /// Replaces the manifest title.
    pub title: Option<String>,
}

/// Turn a manifest into a runnable [`CaptureConfig`].
///
/// Base directory precedence: override > manifest > `[defaults]` >
/// `fallback_base`. A relative manifest output resolves against the chosen
/// base directory.
pub fn resolve(
    manifest: &ManifestConfig,
    defaults: &DefaultsConfig,
    overrides: &CaptureOverrides,
    fallback_base: &Path,
) -> CaptureConfig {
    let base_dir = overrides
        .base_dir
        .clone()
        .or_else(|| manifest.base_dir.as_deref().map(expand_home))
        .or_else(|| defaults.base_dir.as_deref().map(expand_home))
        .unwrap_or_else(|| fallback_base.to_path_buf());

    let output_path = match &overrides.output {
        Some(path) => path.clone(),
        None => {
            let output = expand_home(&manifest.output);
            if output.is_absolute() {
                output
            } else {
                base_dir.join(output)
            }
        }
    };

    CaptureConfig {
        title: overrides
            .title
            .clone()
            .unwrap_or_else(|| manifest.title.clone()),
        base_dir,
        files: manifest.files.clone(),
        output_path,
    }
}

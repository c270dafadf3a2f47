//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use doccapture_core::manifests::{
    self, CaptureOverrides, adhoc_manifest, available_manifests, builtin_manifests,
};
use doccapture_core::report::RULE_WIDTH;
use doccapture_core::runner::{self, CaptureConfig, ProgressReporter};
use doccapture_core::summary::write_summary_json;
use doccapture_shared::{
    AppConfig, CaptureRecord, CaptureSummary, DefaultsConfig, RecordBody, init_config,
    load_config, load_config_from, write_config,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// doccapture — collect documentation files into a single report.
#[derive(Parser)]
#[command(
    name = "doccapture",
    version,
    about = "Capture an ordered list of documentation files into a single text report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.doccapture/doccapture.toml).
    #[arg(long, global = true, env = "DOCCAPTURE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Capture a manifest into a report file.
    Capture(CaptureArgs),

    /// List available manifests.
    Manifests {
        /// Print the entries of one manifest instead of the list.
        #[arg(long)]
        show: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `doccapture capture`.
#[derive(Args, Debug, Default)]
pub(crate) struct CaptureArgs {
    /// Named manifest to capture (see `doccapture manifests`).
    #[arg(conflicts_with_all = ["files", "files_from"])]
    pub manifest: Option<String>,

    /// Capture these relative paths instead of a named manifest (repeatable).
    #[arg(short = 'f', long = "file")]
    pub files: Vec<String>,

    /// Read relative paths from a file, one per line.
    #[arg(long, conflicts_with = "files")]
    pub files_from: Option<PathBuf>,

    /// Base directory the manifest paths are relative to.
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Report file to write.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Report title.
    #[arg(long)]
    pub title: Option<String>,

    /// Also write a JSON run summary to this path.
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file pre-filled with the built-in manifests.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// the progress lines.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "doccapture=info",
        1 => "doccapture=debug",
        _ => "doccapture=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command. `Ok` carries the process exit status; `Err` is a
/// run-level failure.
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config;
    match cli.command {
        Command::Capture(args) => {
            let config = load_app_config(config_path.as_deref())?;
            cmd_capture(&args, &config)
        }
        Command::Manifests { show } => {
            let config = load_app_config(config_path.as_deref())?;
            cmd_manifests(&config, show.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Init { force } => {
                    cmd_config_init(config_path.as_deref(), force)?;
                }
                ConfigAction::Show => {
                    let config = load_app_config(config_path.as_deref())?;
                    cmd_config_show(&config)?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// capture
// ---------------------------------------------------------------------------

/// Resolve `args` against the loaded config into a runnable capture.
pub(crate) fn build_capture_config(
    args: &CaptureArgs,
    config: &AppConfig,
    cwd: &Path,
) -> Result<CaptureConfig> {
    let manifest = if let Some(name) = &args.manifest {
        manifests::find_manifest(config, name)?
    } else if let Some(path) = &args.files_from {
        adhoc_manifest(manifests::read_manifest_file(path)?)
    } else if !args.files.is_empty() {
        adhoc_manifest(args.files.clone())
    } else {
        return Err(eyre!(
            "nothing to capture: name a manifest or pass --file / --files-from"
        ));
    };

    let overrides = CaptureOverrides {
        base_dir: args.base_dir.clone(),
        output: args.out.clone(),
        title: args.title.clone(),
    };

    Ok(manifests::resolve(&manifest, &config.defaults, &overrides, cwd))
}

fn cmd_capture(args: &CaptureArgs, config: &AppConfig) -> Result<ExitCode> {
    let cwd =
        std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    let capture = build_capture_config(args, config, &cwd)?;

    info!(
        title = %capture.title,
        files = capture.files.len(),
        base_dir = %capture.base_dir.display(),
        "capturing files"
    );

    let reporter = ConsoleProgress::new();
    let summary = runner::run(&capture, &reporter)?;

    if let Some(path) = &args.summary_json {
        write_summary_json(path, &summary)?;
    }

    print_summary(&summary);

    Ok(ExitCode::from(exit_code(&summary)))
}

/// 0 when every entry was captured, 1 otherwise.
pub(crate) fn exit_code(summary: &CaptureSummary) -> u8 {
    if summary.is_complete() { 0 } else { 1 }
}

fn print_summary(summary: &CaptureSummary) {
    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{rule}");
    println!("Capture complete!");
    println!("Output file: {}", summary.output_path.display());
    println!(
        "Successfully captured: {}/{} files",
        summary.captured, summary.requested
    );
    println!("Missing or errors: {}", summary.missing);
    println!("{rule}");
}

/// Format the console line for one finished entry.
pub(crate) fn progress_line(record: &CaptureRecord) -> String {
    match &record.body {
        RecordBody::Contents(_) => format!("✓ Captured: {}", record.relative_path),
        RecordBody::NotFound => format!("✗ Not found: {}", record.relative_path),
        RecordBody::ReadError(message) => {
            format!("✗ Error reading: {} - {message}", record.relative_path)
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Console progress: one line per entry, with an indicatif bar underneath
/// when stdout is a terminal.
struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stdout());
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressReporter for ConsoleProgress {
    fn started(&self, title: &str, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(title.to_string());
    }

    fn entry_done(&self, record: &CaptureRecord, _current: usize, _total: usize) {
        // `suspend` prints even when the bar itself is hidden (non-tty).
        let line = progress_line(record);
        self.bar.suspend(|| println!("{line}"));
        self.bar.inc(1);
    }

    fn done(&self, _summary: &CaptureSummary) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// manifests / config
// ---------------------------------------------------------------------------

fn cmd_manifests(config: &AppConfig, show: Option<&str>) -> Result<()> {
    if let Some(name) = show {
        let manifest = manifests::find_manifest(config, name)?;
        println!("Name:   {}", manifest.name);
        println!("Title:  {}", manifest.title);
        println!("Output: {}", manifest.output);
        if let Some(base) = &manifest.base_dir {
            println!("Base:   {base}");
        }
        println!();
        for (idx, file) in manifest.files.iter().enumerate() {
            println!("{:>4}. {file}", idx + 1);
        }
        return Ok(());
    }

    for manifest in available_manifests(config) {
        println!(
            "{:<12} {:>4} files  {} -> {}",
            manifest.name,
            manifest.files.len(),
            manifest.title,
            manifest.output
        );
    }
    Ok(())
}

/// Write the starter config (built-in manifests) to `path`, or to the user
/// config file when no path is given. Returns where it was written.
pub(crate) fn cmd_config_init(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let config = AppConfig {
        defaults: DefaultsConfig::default(),
        manifests: builtin_manifests(),
    };

    let path = match path {
        Some(p) => {
            write_config(p, &config, force)?;
            p.to_path_buf()
        }
        None => init_config(&config, force)?,
    };

    println!("Config initialized at: {}", path.display());
    Ok(path)
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let resolved = AppConfig {
        defaults: config.defaults.clone(),
        manifests: available_manifests(config),
    };
    let toml_str = toml::to_string_pretty(&resolved)?;
    println!("{toml_str}");
    Ok(())
}

// stocksync CLI - reconcile an inventory export against the source of truth

mod exit_codes;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use stocksync_cli::render::{self, Labels};
use stocksync_cli::sample;
use stocksync_recon::config::{delimiter_byte, ReportFormat, SyncConfig};
use stocksync_recon::loader::{DuplicatePolicy, LoadDiagnostics, LoadMode, LoadOptions};
use stocksync_recon::{ReconError, Synchronizer};

use exit_codes::{
    recon_exit_code, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_RESOURCE, EXIT_SUCCESS, EXIT_USAGE,
    EXIT_VARIANCE,
};

#[derive(Parser)]
#[command(name = "stocksync")]
#[command(about = "Reconcile two inventory datasets by SKU")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a primary inventory against the authoritative one
    #[command(after_help = "\
Input files have four columns and no header: sku,name,price,stock.
The authoritative file defines the synchronized inventory.

Examples:
  stocksync run inv1.csv inv2.csv
  stocksync run inv1.csv inv2.csv --format html --output report.html
  stocksync run inv1.csv inv2.csv --format json --strict
  stocksync run --config sync.toml
  stocksync run inv1.csv inv2.csv --fail-on-variance --quiet")]
    Run {
        /// Primary (non-authoritative) inventory file
        #[arg(required_unless_present = "config")]
        primary: Option<PathBuf>,

        /// Authoritative inventory file (source of truth)
        #[arg(required_unless_present = "config")]
        authoritative: Option<PathBuf>,

        /// Job file (*.sync.toml); replaces the positional files
        #[arg(long, short = 'c', conflicts_with_all = ["primary", "authoritative"])]
        config: Option<PathBuf>,

        /// Output format (default: text, or the job file's output.format)
        #[arg(long, short = 'f')]
        format: Option<FormatArg>,

        /// Output file, or - for stdout (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Fail on malformed rows or non-numeric fields instead of skipping/coercing
        #[arg(long)]
        strict: bool,

        /// Policy for a SKU that appears more than once in one file
        #[arg(long)]
        on_duplicate: Option<DuplicateArg>,

        /// Field delimiter
        #[arg(long)]
        delimiter: Option<char>,

        /// Treat the first row of each file as a header
        #[arg(long)]
        headers: bool,

        /// Exit 6 when any variance is found
        #[arg(long)]
        fail_on_variance: bool,

        /// Quiet mode - suppress the stderr summary and warnings
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a job file without running it
    Validate {
        /// Path to the *.sync.toml job file
        config: PathBuf,
    },

    /// Write sample website/warehouse inventories and a job file
    #[command(after_help = "\
Examples:
  stocksync sample demo/
  stocksync run --config demo/sync.toml")]
    Sample {
        /// Directory to write into (created if missing)
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Text,
    Json,
    Csv,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Csv => ReportFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DuplicateArg {
    KeepLast,
    Error,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::KeepLast => DuplicatePolicy::KeepLast,
            DuplicateArg::Error => DuplicatePolicy::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::Resource { .. } => Some("check that both inventory files exist and are readable".to_string()),
            ReconError::MalformedRow { .. }
            | ReconError::InvalidNumber { .. }
            | ReconError::InvalidEncoding { .. } => {
                Some("drop --strict (or set load.mode = \"lenient\") to skip bad rows".to_string())
            }
            ReconError::DuplicateSku { .. } => {
                Some("use --on-duplicate keep-last to let the last row win".to_string())
            }
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Everything `run` needs after flags and job file are merged.
struct RunPlan {
    primary: PathBuf,
    authoritative: PathBuf,
    labels: Labels,
    options: LoadOptions,
    format: ReportFormat,
    output: Option<PathBuf>,
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_job(config_path: &Path) -> Result<SyncConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| CliError {
        code: EXIT_RESOURCE,
        message: format!("cannot read config {}: {e}", config_path.display()),
        hint: None,
    })?;
    SyncConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: format!("{}: {e}", config_path.display()),
        hint: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn plan_run(
    primary: Option<PathBuf>,
    authoritative: Option<PathBuf>,
    config: Option<PathBuf>,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
    strict: bool,
    on_duplicate: Option<DuplicateArg>,
    delimiter: Option<char>,
    headers: bool,
) -> Result<RunPlan, CliError> {
    let mut plan = match config {
        Some(config_path) => {
            let job = read_job(&config_path)?;
            // Resolve file paths relative to the job file's directory
            let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            RunPlan {
                primary: job.primary.resolve(base_dir),
                authoritative: job.authoritative.resolve(base_dir),
                labels: Labels {
                    primary: job.primary.display_label(),
                    authoritative: job.authoritative.display_label(),
                },
                options: job.load_options()?,
                format: job.output.format.unwrap_or(ReportFormat::Text),
                output: job.output.path.as_ref().map(|p| base_dir.join(p)),
            }
        }
        None => {
            let (Some(primary), Some(authoritative)) = (primary, authoritative) else {
                return Err(CliError::args("run needs PRIMARY and AUTHORITATIVE files, or --config"));
            };
            RunPlan {
                labels: Labels {
                    primary: file_label(&primary),
                    authoritative: file_label(&authoritative),
                },
                primary,
                authoritative,
                options: LoadOptions::default(),
                format: ReportFormat::Text,
                output: None,
            }
        }
    };

    // Flags override the job file
    if let Some(f) = format {
        plan.format = f.into();
    }
    if output.is_some() {
        plan.output = output;
    }
    if strict {
        plan.options.mode = LoadMode::Strict;
    }
    if let Some(policy) = on_duplicate {
        plan.options.on_duplicate = policy.into();
    }
    if let Some(c) = delimiter {
        let mut buf = [0u8; 4];
        plan.options.delimiter = delimiter_byte(c.encode_utf8(&mut buf))
            .map_err(|e| CliError::args(e.to_string()))?;
    }
    if headers {
        plan.options.has_headers = true;
    }

    Ok(plan)
}

fn write_output(output: &Option<PathBuf>, contents: &str) -> Result<(), CliError> {
    match output {
        Some(path) if path.as_os_str() != "-" => std::fs::write(path, contents)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e))),
        _ => io::stdout()
            .write_all(contents.as_bytes())
            .map_err(|e| CliError::io(e.to_string())),
    }
}

fn warn_diagnostics(label: &str, d: &LoadDiagnostics) {
    if !d.skipped_rows.is_empty() {
        eprintln!("warning: {label}: skipped {} row(s) without 4 fields", d.skipped_rows.len());
    }
    if !d.coerced_fields.is_empty() {
        eprintln!("warning: {label}: coerced {} non-numeric field(s) to 0", d.coerced_fields.len());
    }
    if !d.lossy_fields.is_empty() {
        eprintln!("warning: {label}: {} field(s) were not valid UTF-8", d.lossy_fields.len());
    }
    if !d.duplicates.is_empty() {
        eprintln!("warning: {label}: {} duplicate SKU(s), last row kept", d.duplicates.len());
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    primary: Option<PathBuf>,
    authoritative: Option<PathBuf>,
    config: Option<PathBuf>,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
    strict: bool,
    on_duplicate: Option<DuplicateArg>,
    delimiter: Option<char>,
    headers: bool,
    fail_on_variance: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let plan = plan_run(
        primary, authoritative, config, format, output, strict, on_duplicate, delimiter, headers,
    )?;

    log::debug!(
        "reconciling {} against {} ({:?})",
        plan.primary.display(),
        plan.authoritative.display(),
        plan.options
    );
    let mut sync = Synchronizer::new(&plan.primary, &plan.authoritative).with_options(plan.options.clone());
    let result = match sync.try_synchronize() {
        Ok(result) => result,
        Err(err) => {
            // The HTML report still gets a page, just without data.
            if plan.format == ReportFormat::Html {
                write_output(&plan.output, &render::render_html_failure())?;
            }
            return Err(err.into());
        }
    };

    let rendered = render::render(result, plan.format, &plan.labels).map_err(CliError::io)?;
    write_output(&plan.output, &rendered)?;

    if !quiet {
        warn_diagnostics(&plan.labels.primary, &result.diagnostics.primary);
        warn_diagnostics(&plan.labels.authoritative, &result.diagnostics.authoritative);
        if let Some(path) = plan.output.as_ref().filter(|p| p.as_os_str() != "-") {
            eprintln!("wrote {}", path.display());
        }
        eprintln!("{}: {} records", plan.labels.primary, result.summary.primary_records);
        eprintln!("{}: {} records", plan.labels.authoritative, result.summary.authoritative_records);
        eprintln!("{}", render::summary_line(result));
    }

    if fail_on_variance && !result.summary.is_reconciled() {
        return Err(CliError { code: EXIT_VARIANCE, message: String::new(), hint: None });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// validate + sample
// ---------------------------------------------------------------------------

fn cmd_validate(config: PathBuf) -> Result<(), CliError> {
    let job = read_job(&config)?;
    let name = job.name.as_deref().unwrap_or("(unnamed)");
    println!("valid: {name}");
    println!("  primary:       {} ({})", job.primary.file, job.primary.display_label());
    println!("  authoritative: {} ({})", job.authoritative.file, job.authoritative.display_label());
    Ok(())
}

fn cmd_sample(dir: PathBuf, force: bool) -> Result<(), CliError> {
    let written = sample::write_sample(&dir, force)
        .map_err(|e| CliError::io(e).with_hint("pass --force to overwrite"))?;
    for path in written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  stocksync-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "error" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Run { quiet: true, .. });
    init_logging(quiet);

    let result = match cli.command {
        Commands::Run {
            primary,
            authoritative,
            config,
            format,
            output,
            strict,
            on_duplicate,
            delimiter,
            headers,
            fail_on_variance,
            quiet,
        } => cmd_run(
            primary, authoritative, config, format, output, strict, on_duplicate, delimiter,
            headers, fail_on_variance, quiet,
        ),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Sample { dir, force } => cmd_sample(dir, force),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#![forbid(unsafe_code)]

//! `ov`: validate, build and check the community patch overlay.
//!
//! - `ov validate` loads the source store and runs the structural lint.
//! - `ov build` compiles every override and addition into one artifact.
//! - `ov check` reconciles overrides against an upstream snapshot and reports
//!   which patches are still needed.

mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use ov_core::report::categorize_owned;
use ov_core::{DisabledPolicy, ReconcileOptions, RecordLayout, reconcile_class};
use ov_storage::{SnapshotFile, SourceStore, UpstreamProvider, compile, write_artifact};
use report::{ClassReport, print_json, print_lint, print_text};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_ARTIFACT_VERSION: &str = "0.0.0";

#[derive(Parser)]
#[command(name = "ov")]
#[command(about = "Community patch overlay for upstream game data", long_about = None)]
struct Cli {
    /// Log filter (e.g. `warn`, `ov_storage=debug`).
    #[arg(long, global = true, env = "OV_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the source store and lint every record.
    Validate {
        /// Directory holding `overrides/` and `additions/`.
        #[arg(long, env = "OV_SOURCE_DIR", default_value = "data")]
        source: PathBuf,
    },

    /// Compile the source store into a single versioned artifact.
    Build {
        #[arg(long, env = "OV_SOURCE_DIR", default_value = "data")]
        source: PathBuf,

        /// Output path of the artifact.
        #[arg(long, default_value = "dist/overlay.json")]
        out: PathBuf,

        /// Version stamped into the artifact.
        #[arg(long = "artifact-version", default_value = DEFAULT_ARTIFACT_VERSION)]
        artifact_version: String,
    },

    /// Reconcile overrides against an upstream snapshot.
    Check {
        #[arg(long, env = "OV_SOURCE_DIR", default_value = "data")]
        source: PathBuf,

        /// Upstream snapshot (JSON or YAML).
        #[arg(long, env = "OV_UPSTREAM_FILE")]
        upstream: PathBuf,

        /// Only reconcile this entity class.
        #[arg(long)]
        class: Option<String>,

        /// How `disabled: true` patches are classified.
        #[arg(long, env = "OV_DISABLED_POLICY", default_value = "flag-for-review")]
        disabled_policy: DisabledPolicy,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Exit with status 2 when any patch is still needed.
        #[arg(long)]
        fail_on_needed: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Validate { source } => validate(source),
        Commands::Build {
            source,
            out,
            artifact_version,
        } => build(source, out, &artifact_version),
        Commands::Check {
            source,
            upstream,
            class,
            disabled_policy,
            format,
            fail_on_needed,
        } => {
            let options = ReconcileOptions {
                layout: RecordLayout::default(),
                disabled_policy,
            };
            check(source, upstream, class.as_deref(), &options, format, fail_on_needed)
        }
    }
}

fn open_store(source: &Path) -> Result<SourceStore> {
    SourceStore::open(source)
        .with_context(|| format!("failed to load source store {}", source.display()))
}

fn validate(source: PathBuf) -> Result<ExitCode> {
    let store = open_store(&source)?;
    let issues = store.lint(&RecordLayout::default())?;
    let mut stdout = std::io::stdout().lock();
    print_lint(&mut stdout, store.record_count(), &issues)?;
    if issues.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn build(source: PathBuf, out: PathBuf, version: &str) -> Result<ExitCode> {
    let store = open_store(&source)?;
    let issues = store.lint(&RecordLayout::default())?;
    if !issues.is_empty() {
        let mut stderr = std::io::stderr().lock();
        print_lint(&mut stderr, store.record_count(), &issues)?;
        bail!("refusing to build: {} lint issue(s)", issues.len());
    }
    let artifact = compile(&store, version, OffsetDateTime::now_utc())?;
    write_artifact(&out, &artifact)
        .with_context(|| format!("failed to write artifact {}", out.display()))?;
    println!(
        "built {} (version {}, sha256 {})",
        out.display(),
        artifact.version,
        artifact.sha256
    );
    Ok(ExitCode::SUCCESS)
}

fn check(
    source: PathBuf,
    upstream: PathBuf,
    class: Option<&str>,
    options: &ReconcileOptions,
    format: OutputFormat,
    fail_on_needed: bool,
) -> Result<ExitCode> {
    let store = open_store(&source)?;
    let snapshot = SnapshotFile::new(&upstream)
        .fetch()
        .with_context(|| format!("failed to load upstream snapshot {}", upstream.display()))?;

    let selected: Vec<&String> = match class {
        Some(class) => {
            let Some((name, _)) = store.overrides().get_key_value(class) else {
                bail!("unknown override class '{class}'");
            };
            vec![name]
        }
        None => store.overrides().keys().collect(),
    };

    let mut reports = Vec::with_capacity(selected.len());
    for class in selected {
        let Some(patches) = store.override_class(class) else {
            continue;
        };
        let verdicts = reconcile_class(patches, snapshot.class(class), options);
        let categorized = categorize_owned(verdicts);
        tracing::info!(
            class = class.as_str(),
            total = categorized.len(),
            still_needed = categorized.still_needed.len(),
            "reconciled class"
        );
        reports.push(ClassReport {
            class: class.clone(),
            categorized,
        });
    }

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => print_text(&mut stdout, &reports)?,
        OutputFormat::Json => print_json(&mut stdout, &reports)?,
    }

    let any_needed = reports
        .iter()
        .any(|r| !r.categorized.still_needed.is_empty());
    if fail_on_needed && any_needed {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

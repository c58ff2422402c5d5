//! gbmatch - iNaturalist / GenBank name reconciliation
//!
//! Reads observation ids, fetches each observation's consensus taxon and
//! GenBank accession, resolves the accession's organism name and prints a
//! TSV row for every specimen whose two names disagree.
//!
//! Exit status: 0 on a completed run, 1 when the run aborts, 2 on
//! configuration or usage errors.

use anyhow::{Context, Result};
use clap::Parser;
use gbmatch::input::{parse_id, read_id_file};
use gbmatch::output::{DiagnosticReporter, TsvWriter};
use gbmatch::FetchError;
use gbmatch_common::config::{load_config, LoggingConfig, TomlConfig};
use gbmatch_common::ExceptionRegistry;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for gbmatch
#[derive(Parser, Debug)]
#[command(name = "gbmatch")]
#[command(about = "Flag iNaturalist observations whose name disagrees with their GenBank accession")]
#[command(version)]
struct Args {
    /// Observation ids to check
    #[arg(value_parser = parse_id)]
    ids: Vec<u64>,

    /// File of observation ids (one per line, or comma separated)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, env = "GBMATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Exception table (TOML), overrides `exceptions_file` in the config
    #[arg(short, long)]
    exceptions: Option<PathBuf>,

    /// Hide diagnostics except missing accession numbers
    #[arg(short, long)]
    quiet: bool,

    /// Contact address sent to NCBI
    #[arg(long, env = "GBMATCH_NCBI_EMAIL")]
    email: Option<String>,

    /// NCBI API key
    #[arg(long, env = "GBMATCH_NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    // Config loading logs through a temporary subscriber; the configured
    // filter only exists once the file has been read.
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter(&LoggingConfig::default(), args.quiet))
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || resolve_config(&args))?;
    init_tracing(&config, args.quiet);

    info!("Starting gbmatch {}", env!("CARGO_PKG_VERSION"));

    let ids = collect_ids(&args)?;
    if ids.is_empty() {
        return Err(gbmatch_common::Error::InvalidInput(
            "no observation ids given (pass ids or --file)".to_string(),
        )
        .into());
    }

    let exceptions = match &config.exceptions_file {
        Some(path) => ExceptionRegistry::load(path)?,
        None => ExceptionRegistry::empty(),
    };

    let orchestrator = gbmatch::build_orchestrator(&config, exceptions)?;

    let mut table = TsvWriter::new(io::stdout().lock());
    let mut diagnostics = DiagnosticReporter::new(io::stderr(), args.quiet);
    let mut write_error: Option<io::Error> = None;

    let report = orchestrator
        .run_with(&ids, |_, outcome| {
            let written = match (outcome.mismatch(), outcome.diagnostic()) {
                (Some(row), _) => table.write_row(row),
                (_, Some(diagnostic)) => diagnostics.report(diagnostic),
                _ => Ok(()),
            };
            if let Err(e) = written {
                write_error.get_or_insert(e);
            }
        })
        .await
        .context("Reconciliation run aborted")?;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write output");
    }
    diagnostics.summary(&report.statistics)?;

    Ok(())
}

/// Config file values, then command-line overrides
fn resolve_config(args: &Args) -> Result<TomlConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(path) = &args.exceptions {
        config.exceptions_file = Some(path.clone());
    }
    if let Some(email) = &args.email {
        config.ncbi.email = Some(email.clone());
    }
    if let Some(api_key) = &args.api_key {
        config.ncbi.api_key = Some(api_key.clone());
    }
    if let Some(timeout) = args.timeout {
        config.http.timeout_secs = timeout;
    }

    Ok(config)
}

fn collect_ids(args: &Args) -> Result<Vec<u64>> {
    let mut ids = args.ids.clone();
    if let Some(path) = &args.file {
        ids.extend(read_id_file(path)?);
    }
    Ok(ids)
}

/// RUST_LOG, else the configured filter
fn env_filter(logging: &LoggingConfig, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive(quiet)))
}

/// Logs go to stderr so stdout carries only the mismatch table
fn init_tracing(config: &TomlConfig, quiet: bool) {
    tracing_subscriber::registry()
        .with(env_filter(&config.logging, quiet))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<gbmatch_common::Error>().is_some() {
        ExitCode::from(2)
    } else if err.downcast_ref::<FetchError>().is_some() {
        ExitCode::from(1)
    } else {
        ExitCode::FAILURE
    }
}

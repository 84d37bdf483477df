//! Folder view command-line driver
//!
//! Runs query cycles headlessly: the host state and engine payloads are read
//! from JSON files, the navigator drives recording collaborators, and the
//! shaped query plus outcome are printed as JSON.

#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use folder_view_core::{
    CycleOutcome, FolderNavigator, FolderQuery, FolderQueryKind, FolderViewError,
    FolderViewOptions, OutgoingQuery, QueryStateSnapshot, RecordingAnalytics, RecordingRenderer,
    RenderCall, RequestContext, ResultPayload, compute_level_and_path,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid options file {}: {source}", path.display())]
    Options {
        path: PathBuf,
        source: json5::Error,
    },
    #[error(transparent)]
    FolderView(#[from] FolderViewError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Process exit code: 2 for usage and configuration problems, 1 otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Options { .. } | Self::FolderView(FolderViewError::InvalidConfig(_)) => 2,
            _ => 1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "folder-view", version, about = "Folder view navigation driver")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON5 options file (defaults to `FV_*` environment variables)
    #[arg(long, global = true)]
    pub options: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one build, built and results-ready cycle
    Cycle {
        /// Query state snapshot (JSON)
        #[arg(long)]
        state: PathBuf,

        /// Engine result payload (JSON)
        #[arg(long)]
        results: PathBuf,
    },

    /// Print the dedicated folder sub-query for a state
    FolderQuery {
        /// Query state snapshot (JSON)
        #[arg(long)]
        state: PathBuf,

        /// Sub-query to build
        #[arg(long, value_enum, default_value_t = KindArg::Facets)]
        kind: KindArg,
    },

    /// Show the effective options
    Config,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Facets,
    Results,
}

impl From<KindArg> for FolderQueryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Facets => Self::Facets,
            KindArg::Results => Self::Results,
        }
    }
}

/// Everything one cycle produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub query: OutgoingQuery,
    pub context: RequestContext,
    pub outcome: CycleOutcome,
    pub render_calls: Vec<RenderCall>,
}

/// Parse `std::env::args`, install logging, and run, returning the exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let stdout = std::io::stdout();
    finish(execute(&cli, &mut stdout.lock()))
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse `args` and run, writing JSON output to `out`.
pub fn run_from<I, T, W>(args: I, out: &mut W) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    W: Write,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => finish(execute(&cli, out)),
        Err(err) => {
            let _ = err.print();
            err.exit_code()
        }
    }
}

fn finish(result: CliResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

/// Run a parsed command.
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> CliResult<()> {
    let options = load_options(cli.options.as_deref())?;
    match &cli.command {
        Commands::Cycle { state, results } => {
            let state: QueryStateSnapshot = read_json(state)?;
            let payload: ResultPayload = read_json(results)?;
            let report = run_cycle(options, &state, payload)?;
            write_json(out, &report)
        }
        Commands::FolderQuery { state, kind } => {
            let state: QueryStateSnapshot = read_json(state)?;
            write_json(out, &folder_query(&options, &state, (*kind).into()))
        }
        Commands::Config => write_json(out, &options),
    }
}

/// Drive one full query cycle against recording collaborators.
///
/// # Errors
/// Fails when `options` do not validate.
pub fn run_cycle(
    options: FolderViewOptions,
    state: &QueryStateSnapshot,
    payload: ResultPayload,
) -> CliResult<CycleReport> {
    let mut navigator =
        FolderNavigator::new(options, RecordingRenderer::new(), RecordingAnalytics::default())?;
    let mut query = OutgoingQuery::new(state.query());
    let context = navigator.on_query_build(state, &mut query);
    navigator.on_query_built(&mut query)?;
    let outcome = navigator.on_results_ready(&context, payload);
    tracing::debug!(mode = %context.mode, level = context.level.get(), "cycle complete");

    let (renderer, _) = navigator.into_parts();
    Ok(CycleReport {
        query,
        context,
        outcome,
        render_calls: renderer.calls,
    })
}

/// Dedicated folder sub-query for `state`.
#[must_use]
pub fn folder_query(
    options: &FolderViewOptions,
    state: &QueryStateSnapshot,
    kind: FolderQueryKind,
) -> FolderQuery {
    let (level, path) = compute_level_and_path(state, &options.facet_field);
    FolderQuery::build(kind, options, level, &path)
}

/// Options from a JSON5 file, or from the environment when no file is given.
///
/// # Errors
/// Fails when the file cannot be read or parsed, or the options do not validate.
pub fn load_options(path: Option<&Path>) -> CliResult<FolderViewOptions> {
    let options = match path {
        Some(path) => {
            let text = read_file(path)?;
            json5::from_str::<FolderViewOptions>(&text).map_err(|source| CliError::Options {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => FolderViewOptions::from_env(),
    };
    options.validate()?;
    tracing::debug!(
        facet_field = %options.facet_field,
        strategy = %options.strategy,
        "options loaded"
    );
    Ok(options)
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

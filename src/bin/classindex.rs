//! classindex CLI binary entry point.
//!
//! ```bash
//! # Index declarations described by a manifest, annotation-driven
//! classindex index --manifest build/decls.json --output target/classes
//!
//! # Explicit mode: only index the named keys
//! classindex index --manifest build/rounds/ --superclass com.example.Plugin
//!
//! # Where does a key's index live?
//! classindex paths annotated com.example.Service
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use classindex::cli::{run_index, run_paths, IndexArgs};
use classindex::config::CliOverrides;
use classindex::error::{IndexError, OutputErrorCode};
use classindex::output::{emit_response, ErrorResponse};
use classindex::registry::IndexKind;

/// Compile-time annotation, subclass and package index generator.
#[derive(Parser, Debug)]
#[command(name = "classindex", version, about)]
struct Cli {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of the log lines written to stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one indexing session over a declaration manifest.
    Index {
        /// Manifest file, or directory of manifest files (one or more rounds each).
        #[arg(long)]
        manifest: PathBuf,

        /// Build-output directory the index files are merged into.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Project config file (default: classindex.json in the workspace).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Annotation to index explicitly (disables marker discovery).
        #[arg(long = "annotation")]
        annotations: Vec<String>,

        /// Superclass or interface to index explicitly (disables marker discovery).
        #[arg(long = "superclass")]
        superclasses: Vec<String>,

        /// Package to index explicitly (disables marker discovery).
        #[arg(long = "package")]
        packages: Vec<String>,
    },

    /// Print the resource path of an index key.
    Paths {
        /// Index kind.
        #[arg(value_enum)]
        kind: KindArg,
        /// Qualified name of the annotation, supertype or package.
        key: String,
    },
}

/// Index kind accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    /// Types carrying an annotation.
    #[value(alias = "annotation")]
    Annotated,
    /// Subtypes of a class or interface.
    #[value(alias = "superclass")]
    Subclasses,
    /// Types declared in a package.
    Package,
}

impl From<KindArg> for IndexKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Annotated => IndexKind::Annotated,
            KindArg::Subclasses => IndexKind::Subclasses,
            KindArg::Package => IndexKind::Package,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level, cli.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber. `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn execute(cli: Cli) -> Result<(), IndexError> {
    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| IndexError::internal(format!("cannot determine current directory: {}", e)))?,
    };

    match cli.command {
        Command::Index {
            manifest,
            output,
            config,
            annotations,
            superclasses,
            packages,
        } => {
            let args = IndexArgs {
                manifest,
                config,
                overrides: CliOverrides {
                    output_dir: output,
                    annotations,
                    superclasses,
                    packages,
                },
            };
            let response = run_index(&workspace, &args)?;
            emit(&response)
        }
        Command::Paths { kind, key } => emit(&run_paths(kind.into(), &key)),
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), IndexError> {
    emit_response(response, &mut io::stdout()).map_err(|e| IndexError::io("<stdout>", e))
}

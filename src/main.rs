//! Binary entry point for the scalaidx CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Index a source tree, one JSON response on stdout
//! scalaidx index src/main/scala
//!
//! # Answer a batch request
//! scalaidx request request.json
//!
//! # Serve requests line by line on stdin/stdout
//! scalaidx --parser command --parser-command "scalameta-json" serve
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use scalaidx::cli::{run_index, run_index_to_file, run_request, run_serve};
use scalaidx::config::{split_command, Config, ConfigOverrides, ParserKind};
use scalaidx::error::{IndexError, OutputErrorCode};
use scalaidx::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Symbol indexer for Scala sources.
///
/// Reads scalameta syntax trees and reports packages, imports, declarations,
/// referenced names and inheritance per file. All output is JSON.
#[derive(Parser, Debug)]
#[command(name = "scalaidx", version, about = "Symbol indexer for Scala sources")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Config file (default: ./scalaidx.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where syntax trees come from.
    #[arg(long, global = true, value_enum)]
    parser: Option<ParserArg>,

    /// External parser command; implies `--parser command`.
    #[arg(long, global = true)]
    parser_command: Option<String>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
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

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Parser selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ParserArg {
    /// Input files already hold scalameta JSON trees.
    Tree,
    /// Run an external command that prints the tree for source on stdin.
    Command,
}

impl From<ParserArg> for ParserKind {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::Tree => ParserKind::Tree,
            ParserArg::Command => ParserKind::Command,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Index files and directories.
    ///
    /// Directories are walked for `*.scala` files.
    Index {
        /// Files or directories to index.
        paths: Vec<PathBuf>,
        /// Write the response here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the pretty-printed syntax tree in each summary.
        #[arg(long)]
        tree: bool,
        /// Worker threads (0 = one per core, 1 = sequential).
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Pretty-print the response.
        #[arg(long)]
        pretty: bool,
    },
    /// Answer a JSON batch request read from a file (`-` for stdin).
    Request {
        /// Request file.
        #[arg(default_value = "-")]
        input: String,
        /// Worker threads (0 = one per core, 1 = sequential).
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Pretty-print the response.
        #[arg(long)]
        pretty: bool,
    },
    /// Serve requests line by line on stdin until `<<EOF>>`.
    Serve {
        /// Worker threads for batch requests.
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber on stderr.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Build config overrides from global and per-command flags.
fn overrides(global: &GlobalArgs, jobs: Option<usize>, tree: Option<bool>) -> ConfigOverrides {
    ConfigOverrides {
        parser_kind: global.parser.map(ParserKind::from),
        parser_command: global.parser_command.as_deref().map(split_command),
        jobs,
        want_parse_tree: tree,
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), IndexError> {
    let global = &cli.global;
    match cli.command {
        Command::Index {
            paths,
            output,
            tree,
            jobs,
            pretty,
        } => {
            let config = Config::resolve(
                global.config.as_deref(),
                &overrides(global, jobs, tree.then_some(true)),
            )?;
            debug!(?config, "resolved config");
            match output {
                Some(path) => run_index_to_file(&paths, &config, &path, pretty).map(|_| ()),
                None => run_index(&paths, &config, &mut io::stdout().lock(), pretty).map(|_| ()),
            }
        }
        Command::Request {
            input,
            jobs,
            pretty,
        } => {
            let config =
                Config::resolve(global.config.as_deref(), &overrides(global, jobs, None))?;
            debug!(?config, "resolved config");
            run_request(&input, &config, &mut io::stdout().lock(), pretty).map(|_| ())
        }
        Command::Serve { jobs } => {
            let config =
                Config::resolve(global.config.as_deref(), &overrides(global, jobs, None))?;
            debug!(?config, "resolved config");
            let stdin = io::stdin();
            run_serve(stdin.lock(), &mut io::stdout().lock(), &config).map(|_| ())
        }
    }
}

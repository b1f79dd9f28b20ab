//! CLI command implementations.
//!
//! The binary parses arguments and resolves configuration; the functions
//! here do the work so that they can be exercised without a process.

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use scalaidx_core::config::{Config, ParserConfig, ParserKind};
use scalaidx_core::error::{IndexError, IndexResult};
use scalaidx_core::output::{emit_response, emit_response_compact, ParseRequest, ParseResponse};

use crate::batch::{process_json_request, process_request};
use crate::files::expand_inputs;
use crate::memo::MemoParser;
use crate::parser::{CommandParser, JsonTreeParser, SourceParser};
use crate::service::{serve, ServeStats};

/// Build the parser described by `config`.
///
/// External parsers are wrapped in a [`MemoParser`] when `memoize` is set
/// and `memo_capacity` is nonzero.
pub fn build_parser(config: &ParserConfig) -> IndexResult<Box<dyn SourceParser>> {
    match config.kind {
        ParserKind::Tree => Ok(Box::new(JsonTreeParser)),
        ParserKind::Command => {
            let parser =
                CommandParser::new(&config.command, Duration::from_secs(config.timeout_secs))?;
            info!(program = %parser.program().display(), "using external parser");
            match NonZeroUsize::new(config.memo_capacity).filter(|_| config.memoize) {
                Some(capacity) => Ok(Box::new(MemoParser::with_capacity(parser, capacity))),
                None => Ok(Box::new(parser)),
            }
        }
    }
}

/// Write `response` as pretty or compact JSON.
fn write_response<W: Write>(
    response: &ParseResponse,
    writer: &mut W,
    pretty: bool,
) -> IndexResult<()> {
    let result = if pretty {
        emit_response(response, writer)
    } else {
        emit_response_compact(response, writer)
    };
    result.map_err(|e| IndexError::internal(format!("writing response: {}", e)))
}

/// Index files and directories named on the command line.
pub fn run_index<W: Write>(
    inputs: &[PathBuf],
    config: &Config,
    writer: &mut W,
    pretty: bool,
) -> IndexResult<ParseResponse> {
    if inputs.is_empty() {
        return Err(IndexError::invalid_args("no input files or directories given"));
    }
    let parser = build_parser(&config.parser)?;
    let request = ParseRequest::new(expand_inputs(inputs));
    let response = process_request(&request, parser.as_ref(), &config.index, config.batch.jobs);
    write_response(&response, writer, pretty)?;
    Ok(response)
}

/// Index into `output` instead of a writer.
pub fn run_index_to_file(
    inputs: &[PathBuf],
    config: &Config,
    output: &Path,
    pretty: bool,
) -> IndexResult<ParseResponse> {
    let mut file =
        fs::File::create(output).map_err(|e| IndexError::io(output.display().to_string(), e))?;
    let response = run_index(inputs, config, &mut file, pretty)?;
    file.flush()
        .map_err(|e| IndexError::io(output.display().to_string(), e))?;
    Ok(response)
}

/// Answer the JSON request in `input` (a path, or `-` for stdin).
pub fn run_request<W: Write>(
    input: &str,
    config: &Config,
    writer: &mut W,
    pretty: bool,
) -> IndexResult<ParseResponse> {
    let body = if input == "-" {
        let mut body = String::new();
        io::stdin()
            .read_to_string(&mut body)
            .map_err(|e| IndexError::io("<stdin>", e))?;
        body
    } else {
        fs::read_to_string(input).map_err(|e| IndexError::io(input, e))?
    };
    let parser = build_parser(&config.parser)?;
    let response =
        process_json_request(&body, parser.as_ref(), &config.index, config.batch.jobs)?;
    write_response(&response, writer, pretty)?;
    Ok(response)
}

/// Run the line service over `input` and `output`.
pub fn run_serve<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &Config,
) -> IndexResult<ServeStats> {
    let parser = build_parser(&config.parser)?;
    serve(input, output, parser.as_ref(), &config.index, config.batch.jobs)
        .map_err(|e| IndexError::io("<stdio>", e))
}

//! Parser seam: source text in, scalameta JSON tree out.
//!
//! The indexer never parses Scala itself. A [`SourceParser`] produces the
//! tree, either as a normal `Source` root or as a node carrying an `error`
//! field when the source does not parse. `Err` is reserved for the parser
//! itself failing to run.
//!
//! Implementations:
//! - [`JsonTreeParser`]: the input already is a JSON tree (pre-parsed dumps)
//! - [`CommandParser`]: pipes the source through an external parser process
//! - [`MemoParser`](crate::memo::MemoParser): caches another parser's trees

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use scalaidx_core::error::IndexError;

// ============================================================================
// Error Types
// ============================================================================

/// Failure to obtain a tree from a parser.
#[derive(Debug, Error)]
pub enum ParserError {
    /// No parser command configured.
    #[error("parser command is empty")]
    EmptyCommand,

    /// The parser executable could not be located.
    #[error("parser executable not found: {name}")]
    NotFound { name: String },

    /// The parser process could not be started.
    #[error("failed to start parser {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The parser did not finish in time and was killed.
    #[error("parser timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The parser exited unsuccessfully.
    #[error("parser exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// The parser's output was not JSON.
    #[error("parser produced invalid JSON: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("parser IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ParserError> for IndexError {
    fn from(err: ParserError) -> Self {
        IndexError::parser(err.to_string())
    }
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Turns source text into a scalameta JSON tree.
pub trait SourceParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Value, ParserError>;
}

impl<P: SourceParser + ?Sized> SourceParser for Box<P> {
    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        (**self).parse(source)
    }
}

impl<P: SourceParser + ?Sized> SourceParser for &P {
    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        (**self).parse(source)
    }
}

// ============================================================================
// JSON Tree Parser
// ============================================================================

/// Treats the input as an already-parsed JSON tree.
///
/// Input that is not valid JSON becomes an error node, the same shape a real
/// parser reports a syntax error in.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeParser;

impl SourceParser for JsonTreeParser {
    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        match tree_from_slice(source.as_bytes()) {
            Ok(tree) => Ok(tree),
            Err(e) => Ok(json!({ "error": format!("invalid tree JSON: {}", e) })),
        }
    }
}

// ============================================================================
// Command Parser
// ============================================================================

/// Runs an external parser: source on stdin, JSON tree on stdout.
#[derive(Debug, Clone)]
pub struct CommandParser {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandParser {
    /// Build from an argument vector, resolving the program on `PATH`.
    pub fn new(argv: &[String], timeout: Duration) -> Result<Self, ParserError> {
        let (name, args) = argv.split_first().ok_or(ParserError::EmptyCommand)?;
        let program = which::which(name).map_err(|_| ParserError::NotFound { name: name.clone() })?;
        debug!(program = %program.display(), "using parser command");
        Ok(CommandParser {
            program,
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl SourceParser for CommandParser {
    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ParserError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Feed stdin and drain both outputs on their own threads so a chatty
        // parser cannot block on a full pipe.
        let writer = {
            let stdin = child.stdin.take();
            let input = source.to_owned();
            thread::spawn(move || -> io::Result<()> {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(input.as_bytes())?;
                }
                Ok(())
            })
        };
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        // On timeout the reader threads are left detached rather than joined:
        // a grandchild that inherited the pipes keeps them open until it exits.
        let waited = child.wait_timeout(self.timeout);
        let status = match waited {
            Ok(Some(status)) => status,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait(); // reap
                return Err(ParserError::Io(e));
            }
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait(); // reap
                warn!(
                    program = %self.program.display(),
                    elapsed = ?start.elapsed(),
                    "parser timed out"
                );
                return Err(ParserError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        if let Ok(Err(e)) = writer.join() {
            // The parser may legitimately stop reading early.
            debug!(error = %e, "writing parser stdin");
        }
        let stdout = join_reader(stdout);
        let stderr = join_reader(stderr);

        if !status.success() {
            return Err(ParserError::Failed {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        debug!(elapsed = ?start.elapsed(), bytes = stdout.len(), "parser finished");
        Ok(tree_from_slice(&stdout)?)
    }
}

/// Deserialize a tree with no nesting limit of its own.
///
/// serde_json stops at 128 levels by default, well short of real trees for
/// long call or infix chains. Nesting is bounded later by the walkers'
/// `max_depth`; deserialization runs on a growable stack.
pub fn tree_from_slice(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let tree = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(tree)
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_reader(handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

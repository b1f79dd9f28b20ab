//! Configuration handling for scalaidx.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `scalaidx.toml` (explicit `--config` path, else the working directory)
//! 3. Environment variables (`SCALAIDX_PARSER_COMMAND`, `SCALAIDX_JOBS`,
//!    `SCALAIDX_PARSER_TIMEOUT`)
//! 4. Command-line flags ([`ConfigOverrides`])
//!
//! # Example
//!
//! ```toml
//! [index]
//! nested_imports = true
//! max_depth = 512
//!
//! [parser]
//! kind = "command"
//! command = ["scalameta-parse", "--json"]
//! timeout_secs = 30
//! memo_capacity = 1024
//!
//! [batch]
//! jobs = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IndexError, IndexResult};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "scalaidx.toml";

/// Default bound on typed-node nesting during a walk.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default external parser timeout in seconds.
pub const DEFAULT_PARSER_TIMEOUT_SECS: u64 = 60;

/// Default number of parse trees kept by the memoizing parser.
pub const DEFAULT_MEMO_CAPACITY: usize = 256;

/// scalaidx configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexOptions,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Options that change what the indexer extracts from a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Capture imports found anywhere in the tree during the name walk.
    #[serde(default = "default_true")]
    pub nested_imports: bool,

    /// Decorate harvested names with the kinds of their enclosing nodes.
    #[serde(default)]
    pub annotate_name_types: bool,

    /// Maximum typed-node nesting before a file is abandoned.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Include the pretty-printed parse tree in each summary.
    #[serde(default)]
    pub want_parse_tree: bool,
}

/// Which parser implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Inputs are already scalameta JSON trees.
    #[default]
    Tree,
    /// Inputs are source text handed to an external command.
    Command,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::Tree => "tree",
            ParserKind::Command => "command",
        }
    }
}

impl std::fmt::Display for ParserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parser settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub kind: ParserKind,

    /// Argument vector of the external parser (`kind = "command"`).
    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache trees by source hash.
    #[serde(default = "default_true")]
    pub memoize: bool,

    /// Trees kept in the cache before the least recently used is evicted.
    /// 0 turns memoization off.
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,
}

/// Batch settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker threads; 0 lets rayon decide.
    #[serde(default)]
    pub jobs: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_timeout_secs() -> u64 {
    DEFAULT_PARSER_TIMEOUT_SECS
}

fn default_memo_capacity() -> usize {
    DEFAULT_MEMO_CAPACITY
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            nested_imports: true,
            annotate_name_types: false,
            max_depth: default_max_depth(),
            want_parse_tree: false,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            kind: ParserKind::Tree,
            command: Vec::new(),
            timeout_secs: default_timeout_secs(),
            memoize: true,
            memo_capacity: default_memo_capacity(),
        }
    }
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// --parser flag.
    pub parser_kind: Option<ParserKind>,
    /// --parser-command flag, already split into argv.
    pub parser_command: Option<Vec<String>>,
    /// --jobs flag.
    pub jobs: Option<usize>,
    /// --tree flag.
    pub want_parse_tree: Option<bool>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> IndexResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IndexError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> IndexResult<Self> {
        toml::from_str(content)
            .map_err(|e| IndexError::config(format!("failed to parse config file: {}", e)))
    }

    /// Load the explicit config file, else `./scalaidx.toml` if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> IndexResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            debug!(path = %local.display(), "loading config");
            Self::load(&local)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the full layering: file, then process environment, then flags.
    pub fn resolve(explicit: Option<&Path>, overrides: &ConfigOverrides) -> IndexResult<Self> {
        let mut config = Self::load_or_default(explicit)?;
        config.apply_env_vars()?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Apply `SCALAIDX_*` variables from the process environment.
    pub fn apply_env_vars(&mut self) -> IndexResult<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply `SCALAIDX_*` variables through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> IndexResult<()> {
        if let Some(command) = lookup("SCALAIDX_PARSER_COMMAND") {
            let argv = split_command(&command);
            if !argv.is_empty() {
                self.parser.command = argv;
                self.parser.kind = ParserKind::Command;
            }
        }

        if let Some(jobs) = lookup("SCALAIDX_JOBS") {
            self.batch.jobs = jobs.trim().parse().map_err(|_| {
                IndexError::config(format!("SCALAIDX_JOBS must be a number, got {:?}", jobs))
            })?;
        }

        if let Some(timeout) = lookup("SCALAIDX_PARSER_TIMEOUT") {
            self.parser.timeout_secs = timeout.trim().parse().map_err(|_| {
                IndexError::config(format!(
                    "SCALAIDX_PARSER_TIMEOUT must be a number of seconds, got {:?}",
                    timeout
                ))
            })?;
        }

        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref command) = overrides.parser_command {
            self.parser.command = command.clone();
            self.parser.kind = ParserKind::Command;
        }

        if let Some(kind) = overrides.parser_kind {
            self.parser.kind = kind;
        }

        if let Some(jobs) = overrides.jobs {
            self.batch.jobs = jobs;
        }

        if let Some(want) = overrides.want_parse_tree {
            self.index.want_parse_tree = want;
        }
    }
}

/// Split a command line on whitespace into an argument vector.
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

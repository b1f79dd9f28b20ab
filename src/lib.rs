//! scalaidx: symbol indexer for Scala sources.
//!
//! Walks scalameta syntax trees (as JSON) and reports, per file, the
//! packages, imports, declarations, referenced type names and inheritance
//! of everything it declares.

// Core infrastructure - re-exported from scalaidx-core
pub use scalaidx_core::config;
pub use scalaidx_core::error;
pub use scalaidx_core::output;

// Tree walking and symbol extraction
pub use scalaidx_tree::{assemble_summary, parse_error, NameHarvester, SourceIndexer};
pub use scalaidx_tree::{nodes, visitor};

// Parsers and drivers
pub mod batch;
pub mod files;
pub mod memo;
pub mod parser;
pub mod service;

// Front door
pub mod cli;

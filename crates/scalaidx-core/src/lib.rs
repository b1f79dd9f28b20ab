//! Core infrastructure for scalaidx.
//!
//! This crate provides the language-agnostic pieces shared by the indexer
//! and its front doors:
//! - Error types and exit codes
//! - Per-file result records and batch request/response types
//! - JSON emission helpers
//! - Layered configuration (file, environment, CLI)

pub mod config;
pub mod error;
pub mod output;

//! Batch and parallel indexing.
//!
//! Each file is indexed independently: its own scopes, package stack and
//! tables. Failures stay inside the file's record (`{filename, error}`) and
//! never abort the batch.
//!
//! Multi-file batches fan out over rayon. Results always come back in input
//! order.

use std::fs;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use scalaidx_core::config::IndexOptions;
use scalaidx_core::error::{IndexError, IndexResult};
use scalaidx_core::output::{FileSummary, ParseRequest, ParseResponse};
use scalaidx_tree::SourceIndexer;

use crate::parser::SourceParser;

/// Index already-loaded source text.
pub fn index_source(
    filename: &str,
    source: &str,
    parser: &dyn SourceParser,
    options: &IndexOptions,
) -> FileSummary {
    let tree = match parser.parse(source) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(file = filename, error = %e, "parser failed");
            return FileSummary::failed(filename, e.to_string());
        }
    };
    match SourceIndexer::new(filename, options).index(&tree) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(file = filename, error = %e, "indexing failed");
            FileSummary::failed(filename, e.to_string())
        }
    }
}

/// Read and index one file.
pub fn index_file(path: &str, parser: &dyn SourceParser, options: &IndexOptions) -> FileSummary {
    match fs::read_to_string(path) {
        Ok(source) => index_source(path, &source, parser, options),
        Err(e) => {
            let err = IndexError::io(path, e);
            warn!(file = path, error = %err, "cannot read source");
            FileSummary::failed(path, err.to_string())
        }
    }
}

/// Index `paths`, returning one summary per path in the same order.
///
/// Runs sequentially for a single input or `jobs == 1`. Otherwise uses a
/// rayon pool of `jobs` threads (`0` for the global pool).
pub fn index_files(
    paths: &[String],
    parser: &dyn SourceParser,
    options: &IndexOptions,
    jobs: usize,
) -> Vec<FileSummary> {
    if paths.len() <= 1 || jobs == 1 {
        return paths
            .iter()
            .map(|p| index_file(p, parser, options))
            .collect();
    }

    let run = || -> Vec<FileSummary> {
        paths
            .par_iter()
            .map(|p| index_file(p, parser, options))
            .collect()
    };

    if jobs == 0 {
        return run();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, jobs, "could not build thread pool, indexing sequentially");
            paths
                .iter()
                .map(|p| index_file(p, parser, options))
                .collect()
        }
    }
}

/// Answer a batch request.
///
/// The request's `wantParseTree` is honored on top of `options`.
pub fn process_request(
    request: &ParseRequest,
    parser: &dyn SourceParser,
    options: &IndexOptions,
    jobs: usize,
) -> ParseResponse {
    let start = Instant::now();
    let options = IndexOptions {
        want_parse_tree: options.want_parse_tree || request.want_parse_tree,
        ..options.clone()
    };
    let files = index_files(&request.filenames, parser, &options, jobs);
    let elapsed_millis = start.elapsed().as_millis() as u64;
    let failed = files.iter().filter(|f| f.is_error()).count();
    info!(
        files = files.len(),
        failed,
        elapsed_millis,
        "indexed batch"
    );
    ParseResponse::new(files, elapsed_millis)
}

/// Parse and answer a JSON request body.
pub fn process_json_request(
    body: &str,
    parser: &dyn SourceParser,
    options: &IndexOptions,
    jobs: usize,
) -> IndexResult<ParseResponse> {
    let request = ParseRequest::from_json(body)?;
    Ok(process_request(&request, parser, options, jobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{JsonTreeParser, ParserError};
    use serde_json::{json, Value};

    struct Broken;

    impl SourceParser for Broken {
        fn parse(&self, _source: &str) -> Result<Value, ParserError> {
            Err(ParserError::Timeout {
                timeout: std::time::Duration::from_secs(1),
            })
        }
    }

    #[test]
    fn parser_failure_becomes_error_record() {
        let summary = index_source("A.scala", "class A", &Broken, &IndexOptions::default());
        assert_eq!(summary.filename, "A.scala");
        assert!(summary.error.unwrap().contains("timed out"));
        assert!(summary.classes.is_empty());
    }

    #[test]
    fn missing_file_becomes_error_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Gone.scala").to_string_lossy().into_owned();
        let summary = index_file(&path, &JsonTreeParser, &IndexOptions::default());
        assert_eq!(summary.filename, path);
        assert!(summary.error.unwrap().starts_with("file not found"));
    }

    #[test]
    fn too_deep_tree_becomes_error_record() {
        let mut tree = json!({ "type": "Term.Name", "value": "x" });
        for _ in 0..10 {
            tree = json!({ "type": "Term.Select", "qual": tree });
        }
        let options = IndexOptions {
            max_depth: 4,
            ..Default::default()
        };
        let summary = index_source("D.scala", &tree.to_string(), &JsonTreeParser, &options);
        assert!(summary.error.unwrap().contains("maximum depth of 4"));
    }

    #[test]
    fn deep_chain_indexes_within_default_depth() {
        let mut tree = json!({ "type": "Term.Name", "value": "Leaf" });
        for _ in 0..200 {
            tree = json!({ "type": "Term.Select", "qual": tree, "name": { "type": "Term.Name", "value": "next" } });
        }
        let summary = index_source("Chain.scala", &tree.to_string(), &JsonTreeParser, &IndexOptions::default());
        assert!(summary.error.is_none(), "unexpected error: {:?}", summary.error);
        assert!(summary.names.contains(&"Leaf".to_string()));
    }

    #[test]
    fn request_tree_flag_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("E.scala");
        std::fs::write(&path, r#"{"type": "Source", "stats": []}"#).unwrap();
        let request = ParseRequest {
            filenames: vec![path.to_string_lossy().into_owned()],
            want_parse_tree: true,
        };
        let response = process_request(&request, &JsonTreeParser, &IndexOptions::default(), 1);
        assert_eq!(response.files.len(), 1);
        assert!(response.files[0].tree.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn json_request_without_filenames_is_rejected() {
        let err = process_json_request(r#"{"files": []}"#, &JsonTreeParser, &IndexOptions::default(), 1)
            .unwrap_err();
        assert!(matches!(err, IndexError::BadRequest { .. }));
    }
}

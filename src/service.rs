//! Line-oriented indexing service.
//!
//! Reads requests one per line and answers each with one line of compact
//! JSON, flushing after every answer so a driving process can pipeline:
//!
//! - a bare path: answered with that file's `FileSummary`
//! - a JSON object: treated as a `ParseRequest`, answered with a
//!   `ParseResponse`; a malformed request is answered with
//!   `{"error": "..."}` and the service keeps going
//! - `<<EOF>>` or end of input: ends the session
//!
//! Blank lines are ignored.

use std::io::{self, BufRead, Write};

use serde_json::json;
use tracing::{debug, info};

use scalaidx_core::config::IndexOptions;
use scalaidx_core::output::emit_response_compact;

use crate::batch::{index_file, process_json_request};
use crate::parser::SourceParser;

/// Line that ends a session.
pub const FLUSH_SENTINEL: &str = "<<EOF>>";

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub requests: usize,
    pub errors: usize,
}

/// Serve requests from `input` until the sentinel or end of input.
pub fn serve<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    parser: &dyn SourceParser,
    options: &IndexOptions,
    jobs: usize,
) -> io::Result<ServeStats> {
    let mut stats = ServeStats::default();

    for line in input.lines() {
        let line = line?;
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if request == FLUSH_SENTINEL {
            debug!("flush sentinel received");
            break;
        }

        stats.requests += 1;
        if request.starts_with('{') {
            match process_json_request(request, parser, options, jobs) {
                Ok(response) => emit_response_compact(&response, output)?,
                Err(e) => {
                    stats.errors += 1;
                    emit_response_compact(&json!({ "error": e.to_string() }), output)?;
                }
            }
        } else {
            let summary = index_file(request, parser, options);
            if summary.is_error() {
                stats.errors += 1;
            }
            emit_response_compact(&summary, output)?;
        }
        output.flush()?;
    }

    info!(requests = stats.requests, errors = stats.errors, "service session ended");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JsonTreeParser;
    use scalaidx_core::error::BAD_REQUEST_MESSAGE;
    use serde_json::Value;
    use std::io::Cursor;

    fn run(input: &str) -> (Vec<Value>, ServeStats) {
        let mut out = Vec::new();
        let stats = serve(
            Cursor::new(input.to_string()),
            &mut out,
            &JsonTreeParser,
            &IndexOptions::default(),
            1,
        )
        .unwrap();
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (lines, stats)
    }

    #[test]
    fn bad_request_keeps_serving() {
        let (lines, stats) = run("{\"names\": []}\n\n<<EOF>>\n{\"filenames\": []}\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["error"], BAD_REQUEST_MESSAGE);
        assert_eq!(stats, ServeStats { requests: 1, errors: 1 });
    }

    #[test]
    fn path_line_answers_with_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("O.scala");
        std::fs::write(
            &path,
            r#"{"type": "Source", "stats": [{"type": "Defn.Object", "name": {"type": "Term.Name", "value": "O"}}]}"#,
        )
        .unwrap();

        let input = format!("{}\n{{\"filenames\": []}}\n", path.display());
        let (lines, stats) = run(&input);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["objects"], json!(["O"]));
        assert_eq!(lines[1]["files"], json!([]));
        assert_eq!(stats.errors, 0);
    }
}

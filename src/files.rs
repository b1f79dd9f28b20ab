//! Scala file collection.
//!
//! Command-line inputs may name files or directories. Files are taken as
//! given (missing ones included, so they surface as per-file errors).
//! Directories are walked for `*.scala`, skipping hidden directories and
//! build output, and their contents are returned sorted.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "bazel-out"];

/// Whether `path` names a Scala source file.
pub fn is_scala_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "scala")
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// All Scala files under `dir`, sorted.
pub fn collect_scala_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_scala_file(e.path()))
        .map(|e| e.path().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}

/// Expand command-line inputs into a file list, preserving argument order.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Vec<String> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if path.is_dir() {
            files.extend(collect_scala_files(path));
        } else {
            files.push(path.to_string_lossy().into_owned());
        }
    }
    files
}

/*!
 * Common test utilities for the ipetrans test suite
 */

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A small but representative decoded payload: preamble with the pre-title
/// macro and language toggle, one titled page, prose text, math text, and
/// a geometry subtree that must never yield segments.
pub fn sample_payload() -> &'static str {
    r#"<?xml version="1.0"?>
<ipe version="70218" creator="Ipe 7.2.24">
<preamble>\usepackage{german}
\germantrue
\newcommand{\prestitle}{Vorlesung Algorithmen}</preamble>
<page title="Sortieren und Suchen">
<text pos="16 32" stroke="black">Der Algorithmus terminiert immer.</text>
<text pos="16 64" style="math">O(n \log n)</text>
<path stroke="black">64 704 m 128 704 l h</path>
<g matrix="1 0 0 1 16 16">
<text pos="0 0" stroke="black">innerhalb der Gruppe</text>
</g>
</page>
</ipe>"#
}

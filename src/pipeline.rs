use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use log::{info, warn};
use thiserror::Error;

use crate::app_config::Config;
use crate::extractor;
use crate::file_utils::FileManager;
use crate::ipe_tools::{encode_log_path, IpeTools};
use crate::restorer;
use crate::services::Translator;

// @module: Per-document phase sequencing

/// The phases a document moves through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Decode,
    Extract,
    Translate,
    Restore,
    Encode,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::Extract => "extract",
            Self::Translate => "translate",
            Self::Restore => "restore",
            Self::Encode => "encode",
        };
        write!(f, "{}", name)
    }
}

/// How one document left the pipeline
#[derive(Debug)]
pub enum Outcome {
    /// All phases ran and the output container exists
    Completed,
    /// The document was passed through without translation
    Skipped(String),
}

/// A failure scoped to one document; the batch continues past it
#[derive(Debug, Error)]
#[error("document {document} failed in {phase} phase: {source}")]
pub struct DocumentError {
    /// Document name (container file stem)
    pub document: String,
    /// Phase that failed
    pub phase: Phase,
    /// Underlying error
    #[source]
    pub source: anyhow::Error,
}

/// All filesystem locations one document touches
#[derive(Debug, Clone)]
pub struct DocumentPaths {
    /// Document name, the container file stem
    pub name: String,
    /// Source container
    pub container: PathBuf,
    /// Decoder output payload
    pub decoded: PathBuf,
    /// Placeholder-bearing structure document
    pub structure: PathBuf,
    /// Line file sent to the translator
    pub lines: PathBuf,
    /// Line file the translator produced
    pub translated: PathBuf,
    /// Restored payload handed to the encoder
    pub restored: PathBuf,
    /// Captured encoder stderr on rejection
    pub encode_log: PathBuf,
    /// Re-encoded output container
    pub output: PathBuf,
}

impl DocumentPaths {
    /// Lay out the artifact paths for a named document under the
    /// configured directories
    pub fn for_document(config: &Config, name: &str) -> Self {
        let dirs = &config.directories;
        Self {
            name: name.to_string(),
            container: dirs.input.join(format!("{}.pdf", name)),
            decoded: dirs.decoded_dir().join(format!("{}.xml", name)),
            structure: dirs.work.join(format!("{}.xml", name)),
            lines: dirs.work.join(format!("{}.txt", name)),
            translated: dirs.translated_dir().join(format!("{}.txt", name)),
            restored: dirs.restored_dir().join(format!("{}.xml", name)),
            encode_log: encode_log_path(&dirs.logs_dir(), name),
            output: dirs.output.join(format!("{}.pdf", name)),
        }
    }
}

/// Runs one document through decode, extract, translate, restore, encode.
///
/// Every artifact is written before the next phase starts, so a failed run
/// can be picked apart from the working directory alone.
pub struct DocumentPipeline<'a> {
    config: &'a Config,
    tools: &'a IpeTools,
    translator: &'a dyn Translator,
    /// Substitute the untranslated line file instead of calling the backend
    pub no_translate: bool,
}

impl<'a> DocumentPipeline<'a> {
    pub fn new(config: &'a Config, tools: &'a IpeTools, translator: &'a dyn Translator) -> Self {
        Self {
            config,
            tools,
            translator,
            no_translate: false,
        }
    }

    pub async fn run(&self, paths: &DocumentPaths) -> Result<Outcome, DocumentError> {
        let fail = |phase: Phase, source: anyhow::Error| DocumentError {
            document: paths.name.clone(),
            phase,
            source,
        };

        // Decode
        self.tools
            .decode(&paths.container, &paths.decoded)
            .await
            .map_err(|e| fail(Phase::Decode, e.into()))?;

        // Extract
        let payload = FileManager::read_to_string(&paths.decoded)
            .map_err(|e| fail(Phase::Extract, e))?;
        let extraction = extractor::extract(&payload).map_err(|e| fail(Phase::Extract, e.into()))?;
        extraction
            .store
            .write_artifacts(&paths.structure, &paths.lines)
            .map_err(|e| fail(Phase::Extract, e))?;

        if extraction.store.is_empty() {
            // Nothing to translate; pass the container through unchanged
            FileManager::copy_file(&paths.container, &paths.output)
                .map_err(|e| fail(Phase::Extract, e))?;
            return Ok(Outcome::Skipped("no translatable text".to_string()));
        }

        // Translate
        if self.no_translate {
            FileManager::copy_file(&paths.lines, &paths.translated)
                .map_err(|e| fail(Phase::Translate, e))?;
            info!("{}: translation skipped, using source text", paths.name);
        } else {
            self.translator
                .translate(&paths.lines, &paths.translated)
                .await
                .map_err(|e| fail(Phase::Translate, e.into()))?;
        }

        // Restore
        let outcome =
            restorer::restore_files(&paths.structure, &paths.translated, &self.config.post_pass)
                .map_err(|e| fail(Phase::Restore, e.into()))?;
        if !outcome.is_complete() {
            warn!(
                "{}: {} segment(s) remain untranslated in the output",
                paths.name,
                outcome.unfilled_ids.len()
            );
        }
        FileManager::write_to_file(&paths.restored, &outcome.xml)
            .map_err(|e| fail(Phase::Restore, e))?;

        // Encode
        self.tools
            .encode(&paths.restored, &paths.output, &paths.encode_log)
            .await
            .map_err(|e| fail(Phase::Encode, e.into()))?;

        if !FileManager::file_exists(&paths.output) {
            return Err(fail(
                Phase::Encode,
                anyhow!("encoder reported success but wrote no output"),
            ));
        }
        Ok(Outcome::Completed)
    }
}

/*!
 * Error types for the ipetrans application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Errors fatal to a single document abort that document only, never the
 * batch; per-file skip decisions are ordinary return values and live in
 * `pipeline::Outcome`, not here.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting text from an XML payload
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The XML payload is not well-formed
    #[error("XML payload is not well-formed: {0}")]
    ParseError(String),

    /// The source document already contains a placeholder token the
    /// extractor would emit
    #[error("source document already contains placeholder token @PLACEHOLDER({id})@")]
    PlaceholderCollision {
        /// Segment id whose token collides
        id: u32,
    },
}

/// Errors that can occur while restoring translated text
#[derive(Error, Debug)]
pub enum RestoreError {
    /// A required input artifact does not exist
    #[error("required artifact missing: {0}")]
    MissingArtifact(PathBuf),

    /// Error reading or writing an artifact file
    #[error("artifact I/O error for {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The backend returned fewer translations than it was sent
    #[error("translation response incomplete: sent {sent}, received {received}")]
    IncompleteResponse {
        /// Number of texts sent
        sent: usize,
        /// Number of translations received
        received: usize,
    },

    /// The dictionary is missing a required entry
    #[error("dictionary has no translation for id {id} in {path}")]
    MissingDictionaryEntry {
        /// Segment id without a translation
        id: u32,
        /// Dictionary file consulted
        path: PathBuf,
    },

    /// Error reading or writing a line file
    #[error("line file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the decoder/encoder subprocess wrappers
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be launched
    #[error("failed to launch {tool}: {source}")]
    Launch {
        /// Tool name as configured
        tool: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// The tool did not finish within the configured timeout
    #[error("{tool} timed out after {seconds}s")]
    Timeout {
        /// Tool name as configured
        tool: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The decoder exited non-zero or produced no payload
    #[error("decoder failed for {input}: {detail}")]
    DecoderFailed {
        /// Container file given to the decoder
        input: PathBuf,
        /// Exit status and filtered stderr
        detail: String,
    },

    /// The encoder refused the restored XML
    #[error("encoder rejected the document (log at {log_path})")]
    EncoderRejected {
        /// Where the captured encoder stderr was written
        log_path: PathBuf,
    },
}

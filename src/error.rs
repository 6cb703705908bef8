use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests spreadsheets, talks to the directory service, or emits the
/// backup workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the configuration file is malformed or incomplete.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the input workbook contains no code list sheets.
    #[error("invalid input document or code list(s) not found")]
    NoCodeLists,

    /// Raised when the pre-change backup workbook could not be saved. No
    /// remote list is deleted once this is raised.
    #[error("failed to create backup file {path}: {reason}")]
    BackupFailed { path: PathBuf, reason: String },

    /// Raised when the directory service endpoint cannot be reached at all.
    #[error("directory service unreachable: {0}")]
    ServiceUnreachable(DirectoryError),

    /// Wrapper for remote operation failures that abort the run.
    #[error("directory service error: {0}")]
    Directory(#[from] DirectoryError),

    /// Raised after a completed run in which one or more lists failed.
    #[error("{0} code list(s) could not be reconciled")]
    ListsFailed(usize),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Classification of remote directory service failures. The distinction
/// between [`DirectoryError::NotFound`] and everything else drives the
/// update-or-create fallback in the reconciliation engine.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The named code list (or its identifier) does not exist remotely.
    #[error("code list not found")]
    NotFound,

    /// A list with the requested name already exists remotely.
    #[error("code list already exists")]
    AlreadyExists,

    /// The HTTP call itself failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status code. The raw response
    /// body is kept as diagnostic text.
    #[error("unexpected response (status {status}): {body}")]
    Protocol { status: u16, body: String },
}

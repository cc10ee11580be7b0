use std::path::PathBuf;
use thiserror::Error;

/// Run-level failures. Anything here aborts the batch.
#[derive(Error, Debug)]
pub enum FrontMonthError {
    #[error("invalid year range: start {start} is after end {end}")]
    InvalidRange { start: i32, end: i32 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("contract symbol {symbol} is generated more than once; widen the year suffix or narrow the horizon")]
    AmbiguousSymbol { symbol: String },

    #[error("data directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("no .dbn files found in {}", .0.display())]
    NoFilesFound(PathBuf),

    #[error("no valid trade data extracted from {files} files")]
    NoDataExtracted { files: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Failure to turn one file into rows. Always recoverable at the file boundary.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DBN error: {0}")]
    Dbn(#[from] databento::dbn::Error),

    #[error("symbology file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("file metadata has no schema")]
    MissingSchema,
}

pub type Result<T> = std::result::Result<T, FrontMonthError>;

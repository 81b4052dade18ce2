//! Error types for the converter.

use std::path::PathBuf;

use thiserror::Error;

use crate::infer::ColumnType;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open input file '{}': {source}", .path.display())]
    InputAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("no columns to parse from file")]
    NoColumns,

    #[error("invalid {expected} value {value:?} in column '{column}' at line {line}")]
    InvalidCell {
        column: String,
        expected: ColumnType,
        value: String,
        line: u64,
    },

    #[error(
        "schema mismatch in batch {batch}: column '{column}' was inferred as {found}, \
         but the output schema has {expected}"
    )]
    SchemaMismatch {
        batch: usize,
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("unsupported compression '{0}' (expected one of: none, snappy, gzip, brotli)")]
    UnsupportedCompression(String),

    #[error("cannot create output file '{}': {source}", .path.display())]
    OutputAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type Result<T> = std::result::Result<T, Error>;

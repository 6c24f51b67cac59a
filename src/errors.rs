use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScatterError
{
    #[error("Usage: {program} <input_file>")]
    Usage { program: String },

    #[error("Error opening input file {}: {source}", .path.display())]
    FileOpen { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to read run header: {source}")]
    HeaderRead { #[source] source: std::io::Error },

    #[error("invalid header field {field} = {value}")]
    InvalidHeader { field: &'static str, value: i64 },

    #[error("input truncated while reading points of iteration {iteration}: {source}")]
    ShortRead { iteration: usize, #[source] source: std::io::Error },

    #[error("failed to allocate {what} buffer of {len} elements")]
    Allocation { what: &'static str, len: usize },

    #[error("cannot write {}: {source}", .path.display())]
    OutputWrite { path: PathBuf, #[source] source: std::io::Error },

    #[error("mesh dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("serialization failed")]
    Serialization,

    #[error("deserialization failed")]
    Deserialization,

    #[error("LZ4 decompression failed")]
    Lz4Decompression,
}

impl ScatterError
{
    /// Errors after which the run may continue.
    pub fn is_fatal(&self) -> bool
    {
        !matches!(self, ScatterError::OutputWrite { .. })
    }
}

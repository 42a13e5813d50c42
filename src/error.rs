// Error types for the conversion pipeline (reader, normalizer, writer, config)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the converter.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Malformed numeric token or wrong number of fields on a row.
    #[error("parse error on line {line}: {message}")]
    Parse {
        line: usize,                    // 1-based line number in the input file
        message: String,
    },

    /// A section declared more rows than the file provides.
    #[error("truncated input: {section} section declares {declared} lines, found {found}")]
    TruncatedInput {
        section: &'static str,          // "node" or "element"
        declared: usize,
        found: usize,
    },

    /// Element refers to a node id outside `1..=num_nodes`.
    #[error("element {element} references node {vertex}, but the mesh has {num_nodes} nodes")]
    InvalidConnectivity {
        element: usize,                 // 1-based element id
        vertex: i64,                    // vertex id as written in the file
        num_nodes: usize,
    },

    /// Region attribute outside the configured region table.
    #[error("element {element} has attribute {attribute}, region table has {len} entries")]
    IndexOutOfRange {
        element: usize,                 // 1-based element id
        attribute: i64,
        len: usize,
    },

    /// Output path could not be created or written.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Geometry could not be analysed (e.g. empty mesh).
    #[error("geometry error: {0}")]
    GeometryError(String),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ConvertError::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn write_failure(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        ConvertError::Config(format!("invalid TOML: {}", err))
    }
}

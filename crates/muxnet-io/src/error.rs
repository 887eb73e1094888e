use thiserror::Error;

use muxnet_graph::StoreError;

/// Failures while reading or writing the network description format.
/// Line numbers are 1-based positions in the input.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unknown section: {name}")]
    UnknownSection { line: usize, name: String },

    #[error("line {line}: {message}")]
    BadRecord { line: usize, message: String },

    #[error("line {line}: unknown layer: {name}")]
    UnknownLayerRef { line: usize, name: String },

    #[error("line {line}: {source}")]
    Schema {
        line: usize,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

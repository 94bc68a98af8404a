use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading the connectome tables or
/// querying them. There is no recovery path: callers propagate and exit.
#[derive(Debug, Error)]
pub enum ConnectomeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: weight {value:?} for column {column:?} is not a number")]
    BadWeight {
        line: u64,
        column: String,
        value: String,
    },

    #[error("matrix is not square: {rows} rows, {cols} columns")]
    NotSquare { rows: usize, cols: usize },

    #[error("row and column labels differ at position {index}: {row:?} vs {col:?}")]
    LabelMismatch {
        index: usize,
        row: String,
        col: String,
    },

    #[error("unknown neuron {0:?}")]
    UnknownNeuron(String),

    #[error("neuron {0:?} has no category")]
    MissingCategory(String),

    #[error("unknown category {value:?} for neuron {neuron:?}")]
    UnknownCategory { neuron: String, value: String },

    #[error("missing column {0:?}")]
    MissingColumn(String),

    #[error("bad preferences file: {0}")]
    Prefs(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConnectomeError>;

impl ConnectomeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
